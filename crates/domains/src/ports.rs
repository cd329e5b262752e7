//! # Ports
//!
//! Contracts the moderation pipeline consumes. Adapters implement these; the
//! pipeline only ever sees the trait objects. The `testing` feature exposes
//! the generated `MockXxx` types to external test crates.

use async_trait::async_trait;

use crate::actions::{ActionName, ActionRequest, ActorContext};
use crate::error::{DispatchError, StoreError};
use crate::models::{Board, Post};

/// Read access to the content store.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Single-post lookup, used for move-destination thread resolution.
    async fn get_post(&self, board: &str, id: u64) -> Result<Option<Post>, StoreError>;

    /// Batch fetch. Unknown ids are absent from the result rather than
    /// erroring. With `exact`, ids match both thread roots and replies.
    async fn get_posts(
        &self,
        board: &str,
        ids: &[u64],
        exact: bool,
    ) -> Result<Vec<Post>, StoreError>;
}

/// Read access to the board store.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait BoardStore: Send + Sync {
    async fn find_one(&self, uri: &str) -> Result<Option<Board>, StoreError>;
}

/// Everything the dispatcher needs to execute an approved batch.
#[derive(Debug, Clone)]
pub struct DispatchContext {
    pub board: Board,
    pub actor: ActorContext,
    pub request: ActionRequest,
    /// The authorized subset of requested actions, as computed by the
    /// permission resolver. Never empty at dispatch time.
    pub valid_actions: Vec<ActionName>,
    /// The filtered post batch the actions apply to.
    pub posts: Vec<Post>,
    pub destination_thread: Option<Post>,
    pub destination_board: Option<Board>,
}

/// The dispatcher's own success response.
#[derive(Debug, Clone, Default)]
pub struct DispatchOutcome {
    pub messages: Vec<String>,
    pub redirect: String,
}

/// The only component permitted to mutate persistent state.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ActionDispatcher: Send + Sync {
    async fn execute(&self, ctx: DispatchContext) -> Result<DispatchOutcome, DispatchError>;
}
