//! Builders for boards, posts, actors, and a wired pipeline over the
//! in-memory adapters.

use std::sync::Arc;

use chrono::Utc;
use domains::actions::ActorContext;
use domains::models::{Board, IpKind, Post, ReporterIp};
use domains::permissions::{Permission, PermissionSet};
use services::pipeline::{ModerationPipeline, PipelineLimits};
use storage_adapters::{MemDispatcher, MemStore};

pub const POST_PASSWORD_SECRET: &str = "fixture-secret";

pub fn reporter_ip(raw: &str) -> ReporterIp {
    ReporterIp {
        cloak: format!("cloak-{raw}"),
        raw: raw.to_string(),
        kind: if raw.contains(':') {
            IpKind::Ipv6
        } else {
            IpKind::Ipv4
        },
    }
}

pub fn anon() -> ActorContext {
    ActorContext::anonymous(reporter_ip("203.0.113.50"))
}

pub fn staff(user: &str, permissions: PermissionSet) -> ActorContext {
    ActorContext {
        user: Some(user.to_string()),
        permissions,
        ip: reporter_ip("203.0.113.51"),
    }
}

pub fn board_manager(user: &str) -> ActorContext {
    staff(
        user,
        PermissionSet::empty().with(Permission::ManageBoardGeneral),
    )
}

pub fn post(board: &str, post_id: u64, thread: Option<u64>) -> Post {
    Post {
        board: board.into(),
        post_id,
        thread,
        message: format!("post {post_id}"),
        date: Utc::now(),
        password: None,
        files: vec![],
        sticky: 0,
        reports: vec![],
        global_reports: vec![],
    }
}

/// A board with every self-service toggle enabled.
pub fn open_board(uri: &str) -> Board {
    let mut board = Board::new(uri, format!("/{uri}/"));
    board.settings.user_post_delete = true;
    board.settings.user_post_spoiler = true;
    board.settings.user_post_unlink = true;
    board
}

pub struct Harness {
    pub store: Arc<MemStore>,
    pub pipeline: Arc<ModerationPipeline>,
}

/// A pipeline over freshly seeded in-memory adapters. Board "a" carries a
/// thread (1 with replies 2, 3) and a second thread 5; board "b" is empty.
pub fn harness() -> Harness {
    let store = Arc::new(MemStore::new());
    store.insert_board(open_board("a"));
    store.insert_board(open_board("b"));
    store.insert_post(post("a", 1, None));
    store.insert_post(post("a", 2, Some(1)));
    store.insert_post(post("a", 3, Some(1)));
    store.insert_post(post("a", 5, None));

    let dispatcher = Arc::new(MemDispatcher::new(store.clone(), POST_PASSWORD_SECRET));
    let pipeline = Arc::new(ModerationPipeline::new(
        store.clone(),
        store.clone(),
        dispatcher,
        PipelineLimits::default(),
    ));
    Harness { store, pipeline }
}
