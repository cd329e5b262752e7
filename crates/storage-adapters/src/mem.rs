//! # In-memory store
//!
//! The reference `PostStore`/`BoardStore` implementation: per-board ordered
//! post maps behind dashmap shards. Suitable for development, seeding, and
//! the integration suite; a database adapter implements the same ports.

use std::collections::BTreeMap;

use async_trait::async_trait;
use dashmap::DashMap;
use domains::error::StoreError;
use domains::models::{Ban, Board, ModlogEntry, Post};
use domains::ports::{BoardStore, PostStore};

#[derive(Default)]
pub struct MemStore {
    boards: DashMap<String, Board>,
    /// Board uri -> posts ordered by id.
    posts: DashMap<String, BTreeMap<u64, Post>>,
    bans: DashMap<uuid::Uuid, Ban>,
    modlog: DashMap<String, Vec<ModlogEntry>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_board(&self, board: Board) {
        self.posts.entry(board.uri.clone()).or_default();
        self.boards.insert(board.uri.clone(), board);
    }

    pub fn insert_post(&self, post: Post) {
        self.posts
            .entry(post.board.clone())
            .or_default()
            .insert(post.post_id, post);
    }

    pub fn remove_post(&self, board: &str, id: u64) -> Option<Post> {
        self.posts.get_mut(board)?.remove(&id)
    }

    /// Ids of the replies belonging to `thread` on `board`, ascending.
    pub fn reply_ids(&self, board: &str, thread: u64) -> Vec<u64> {
        self.posts
            .get(board)
            .map(|map| {
                map.values()
                    .filter(|post| post.thread == Some(thread))
                    .map(|post| post.post_id)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Mutate one post in place; true when the post exists.
    pub fn update_post<F>(&self, board: &str, id: u64, update: F) -> bool
    where
        F: FnOnce(&mut Post),
    {
        self.posts
            .get_mut(board)
            .and_then(|mut map| map.get_mut(&id).map(update))
            .is_some()
    }

    pub fn board_posts(&self, board: &str) -> Vec<Post> {
        self.posts
            .get(board)
            .map(|map| map.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn insert_ban(&self, ban: Ban) {
        self.bans.insert(ban.id, ban);
    }

    pub fn bans(&self) -> Vec<Ban> {
        self.bans.iter().map(|entry| entry.value().clone()).collect()
    }

    pub fn append_modlog(&self, entry: ModlogEntry) {
        self.modlog
            .entry(entry.board.clone())
            .or_default()
            .push(entry);
    }

    pub fn modlog(&self, board: &str) -> Vec<ModlogEntry> {
        self.modlog
            .get(board)
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl PostStore for MemStore {
    async fn get_post(&self, board: &str, id: u64) -> Result<Option<Post>, StoreError> {
        Ok(self
            .posts
            .get(board)
            .and_then(|map| map.get(&id).cloned()))
    }

    async fn get_posts(
        &self,
        board: &str,
        ids: &[u64],
        exact: bool,
    ) -> Result<Vec<Post>, StoreError> {
        let Some(map) = self.posts.get(board) else {
            return Ok(Vec::new());
        };
        let mut matched: BTreeMap<u64, Post> = map
            .values()
            .filter(|post| ids.contains(&post.post_id))
            .map(|post| (post.post_id, post.clone()))
            .collect();
        if !exact {
            // Pull the replies of any matched OP along with it.
            let ops: Vec<u64> = matched
                .values()
                .filter(|post| post.is_op())
                .map(|post| post.post_id)
                .collect();
            for post in map.values() {
                if post.thread.is_some_and(|thread| ops.contains(&thread)) {
                    matched.entry(post.post_id).or_insert_with(|| post.clone());
                }
            }
        }
        Ok(matched.into_values().collect())
    }
}

#[async_trait]
impl BoardStore for MemStore {
    async fn find_one(&self, uri: &str) -> Result<Option<Board>, StoreError> {
        Ok(self.boards.get(uri).map(|entry| entry.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn post(board: &str, post_id: u64, thread: Option<u64>) -> Post {
        Post {
            board: board.into(),
            post_id,
            thread,
            message: String::new(),
            date: Utc::now(),
            password: None,
            files: vec![],
            sticky: 0,
            reports: vec![],
            global_reports: vec![],
        }
    }

    #[tokio::test]
    async fn batch_fetch_skips_unknown_ids() {
        let store = MemStore::new();
        store.insert_board(Board::new("b", "Random"));
        store.insert_post(post("b", 1, None));
        store.insert_post(post("b", 2, Some(1)));

        let posts = store.get_posts("b", &[1, 2, 99], true).await.unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].post_id, 1);
    }

    #[tokio::test]
    async fn inexact_fetch_pulls_replies_of_ops() {
        let store = MemStore::new();
        store.insert_board(Board::new("b", "Random"));
        store.insert_post(post("b", 1, None));
        store.insert_post(post("b", 2, Some(1)));
        store.insert_post(post("b", 3, Some(1)));

        let posts = store.get_posts("b", &[1], false).await.unwrap();
        assert_eq!(posts.len(), 3);
    }

    #[tokio::test]
    async fn unknown_board_is_empty_not_error() {
        let store = MemStore::new();
        let posts = store.get_posts("zz", &[1], true).await.unwrap();
        assert!(posts.is_empty());
        assert!(store.find_one("zz").await.unwrap().is_none());
    }
}
