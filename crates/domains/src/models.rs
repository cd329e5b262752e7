//! # Domain Models
//!
//! The core entities of ironchan: boards, posts, reports, and bans.
//! Posts are identified by `(board, post_id)`; report ids use UUID v7 for
//! time-ordered, globally unique identification.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::permissions::PermissionSet;

/// Per-board toggles consulted by the moderation pipeline.
///
/// The `user_post_*` settings control whether anonymous authors may perform
/// the matching self-service action on their own posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BoardSettings {
    pub user_post_delete: bool,
    pub user_post_spoiler: bool,
    pub user_post_unlink: bool,
    /// BCP 47 tag for board-facing messages. Carried as data only.
    pub language: String,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            user_post_delete: false,
            user_post_spoiler: false,
            user_post_unlink: false,
            language: "en-GB".to_string(),
        }
    }
}

/// A staff listing on a single board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffMember {
    pub permissions: PermissionSet,
    pub added: DateTime<Utc>,
}

impl StaffMember {
    pub fn new(permissions: PermissionSet) -> Self {
        Self {
            permissions,
            added: Utc::now(),
        }
    }
}

/// A named content partition with its own settings and staff list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    /// The URL slug (e.g. "b" for /b/).
    pub uri: String,
    pub title: String,
    pub settings: BoardSettings,
    /// Username -> staff descriptor. Membership here is what cross-board
    /// move authorization checks against.
    pub staff: HashMap<String, StaffMember>,
    pub created_at: DateTime<Utc>,
}

impl Board {
    pub fn new(uri: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            title: title.into(),
            settings: BoardSettings::default(),
            staff: HashMap::new(),
            created_at: Utc::now(),
        }
    }
}

/// A file attached to a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostFile {
    pub filename: String,
    pub original_filename: String,
    pub spoiler: bool,
}

/// The fundamental unit of conversation.
///
/// `thread` holds the parent OP's id, or `None` when this post is itself the
/// thread root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub board: String,
    pub post_id: u64,
    pub thread: Option<u64>,
    pub message: String,
    pub date: DateTime<Utc>,
    /// HMAC digest of the author-supplied deletion password, if any.
    pub password: Option<String>,
    pub files: Vec<PostFile>,
    pub sticky: u16,
    /// Board-local report list. Bounded, newest-retained.
    pub reports: Vec<Report>,
    /// Global report list. Bounded, newest-retained.
    pub global_reports: Vec<Report>,
}

impl Post {
    /// Whether this post is a thread root.
    pub fn is_op(&self) -> bool {
        self.thread.is_none()
    }
}

/// The kind of address a reporter posted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpKind {
    Ipv4,
    Ipv6,
    Bypass,
}

/// Reporter identity attached to a report entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReporterIp {
    /// Hashed, user-displayable form of the address.
    pub cloak: String,
    pub raw: String,
    #[serde(rename = "type")]
    pub kind: IpKind,
}

/// One entry in a post's bounded report list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: Uuid,
    pub reason: String,
    pub date: DateTime<Utc>,
    pub ip: ReporterIp,
}

/// A moderation action against an address, created when banning reporters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ban {
    pub id: Uuid,
    pub ip: String,
    pub reason: String,
    pub board: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// One line in a board's moderation log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModlogEntry {
    pub board: String,
    pub actions: Vec<String>,
    pub post_ids: Vec<u64>,
    pub message: Option<String>,
    pub user: Option<String>,
    pub date: DateTime<Utc>,
}
