//! # Move Destination Resolution
//!
//! Resolves and authorizes cross-thread and cross-board move targets, and
//! filters batches so repeated move requests stay idempotent.
//!
//! Destination misses and missing authorization share one failure message
//! upstream; the resolver never reveals which of the two occurred.

use std::sync::OnceLock;

use domains::actions::ActorContext;
use domains::error::StoreError;
use domains::models::{Board, Post};
use domains::permissions::Permission;
use domains::ports::{BoardStore, PostStore};

/// Resolution results, assigned at most once while the rule list runs and
/// read back by the pipeline after validation.
#[derive(Debug, Default)]
pub struct MoveDestination {
    thread: OnceLock<Post>,
    board: OnceLock<Board>,
}

impl MoveDestination {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn thread(&self) -> Option<&Post> {
        self.thread.get()
    }

    pub fn board(&self) -> Option<&Board> {
        self.board.get()
    }

    pub fn into_parts(self) -> (Option<Post>, Option<Board>) {
        (self.thread.into_inner(), self.board.into_inner())
    }
}

/// Asynchronous lookups embedded as deferred rules in the evaluator's list.
pub struct MoveResolver<'a> {
    posts: &'a dyn PostStore,
    boards: &'a dyn BoardStore,
}

impl<'a> MoveResolver<'a> {
    pub fn new(posts: &'a dyn PostStore, boards: &'a dyn BoardStore) -> Self {
        Self { posts, boards }
    }

    /// Look the destination thread up on the effective destination board.
    /// A hit is stashed into `dest`; a miss is a validation failure for the
    /// caller, independent of permission.
    pub async fn resolve_thread(
        &self,
        dest: &MoveDestination,
        board_uri: &str,
        thread_id: u64,
    ) -> Result<bool, StoreError> {
        match self.posts.get_post(board_uri, thread_id).await? {
            Some(post) => {
                let _ = dest.thread.set(post);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Authorize a move onto a different board.
    ///
    /// Requires an authenticated actor holding global management, or board
    /// management plus a listing in the destination board's staff map. Every
    /// other combination reads as the destination not existing.
    pub async fn resolve_board(
        &self,
        dest: &MoveDestination,
        actor: &ActorContext,
        destination_uri: &str,
    ) -> Result<bool, StoreError> {
        let Some(username) = actor.user.as_deref() else {
            return Ok(false);
        };
        let destination = self.boards.find_one(destination_uri).await?;
        if actor.permissions.has(Permission::ManageGlobalGeneral)
            || (actor.permissions.has(Permission::ManageBoardGeneral)
                && destination
                    .as_ref()
                    .is_some_and(|board| board.staff.contains_key(username)))
        {
            if let Some(board) = destination {
                let _ = dest.board.set(board);
            }
        }
        Ok(dest.board().is_some())
    }
}

/// Drop posts a same-board move to an existing thread would not touch: the
/// destination OP itself and posts already resident in it. Applies only when
/// moving within the current board; the caller rejects an emptied batch as a
/// conflict instead of dispatching a no-op.
pub fn filter_idempotent_moves(
    posts: Vec<Post>,
    move_to_thread: Option<u64>,
    move_to_board: Option<&str>,
    current_board: &str,
) -> Vec<Post> {
    let Some(destination) = move_to_thread else {
        return posts;
    };
    if move_to_board.is_some_and(|uri| uri != current_board) {
        return posts;
    }
    posts
        .into_iter()
        .filter(|post| post.post_id != destination && post.thread != Some(destination))
        .collect()
}
