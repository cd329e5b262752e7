//! # Moderation Action Pipeline
//!
//! Takes a batch action request, validates it against structural, permission,
//! and cross-entity rules, resolves move destinations, filters the batch for
//! idempotence, and hands the approved result to the dispatcher.
//!
//! One pipeline instance is shared across requests; each call is an
//! independent task and the pipeline owns no cross-request mutable state.

use std::sync::Arc;

use domains::actions::{ActionRequest, ActorContext};
use domains::error::{DispatchError, StoreError};
use domains::models::Board;
use domains::permissions::Permission;
use domains::ports::{ActionDispatcher, BoardStore, DispatchContext, DispatchOutcome, PostStore};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::checker;
use crate::moves::{filter_idempotent_moves, MoveDestination, MoveResolver};
use crate::schema::{check_schema, field_len, length_out_of, Rule};

/// Batch size ceilings, split by whether the actor manages the board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiInputs {
    pub posts_anon: usize,
    pub posts_staff: usize,
}

/// Maximum lengths for free-text fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldLengths {
    pub postpassword: usize,
    pub report_reason: usize,
    pub ban_reason: usize,
    pub log_message: usize,
}

/// Limits consumed by the rule list. Passed at construction so the pipeline
/// is deterministic and testable without process-wide setup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineLimits {
    pub multi_inputs: MultiInputs,
    pub field_length: FieldLengths,
}

impl Default for PipelineLimits {
    fn default() -> Self {
        Self {
            multi_inputs: MultiInputs {
                posts_anon: 10,
                posts_staff: 100,
            },
            field_length: FieldLengths {
                postpassword: 64,
                report_reason: 50,
                ban_reason: 50,
                log_message: 50,
            },
        }
    }
}

/// A structured refusal: title, one or more messages, and where to send the
/// actor back to.
#[derive(Debug, Clone, Serialize)]
pub struct Rejection {
    pub title: String,
    pub errors: Vec<String>,
    pub redirect: String,
}

impl Rejection {
    fn new(title: &str, errors: Vec<String>, redirect: &str) -> Self {
        Self {
            title: title.to_string(),
            errors,
            redirect: redirect.to_string(),
        }
    }
}

/// Terminal states of one pipeline execution.
#[derive(Debug)]
pub enum Outcome {
    /// Validation failed; respond 400.
    Rejected(Rejection),
    /// No selected posts exist; respond 404.
    NotFound(Rejection),
    /// Idempotent filtering emptied a move batch; respond 409.
    Conflict(Rejection),
    /// Edit is a single-object flow with its own view; dispatch is bypassed.
    EditRedirect { board: String, post_id: u64 },
    Dispatched(DispatchOutcome),
}

/// Infrastructure failures, surfaced to the caller's generic handler.
/// Dispatch failures stay distinguishable from validation rejections.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

pub struct ModerationPipeline {
    posts: Arc<dyn PostStore>,
    boards: Arc<dyn BoardStore>,
    dispatcher: Arc<dyn ActionDispatcher>,
    limits: PipelineLimits,
}

impl ModerationPipeline {
    pub fn new(
        posts: Arc<dyn PostStore>,
        boards: Arc<dyn BoardStore>,
        dispatcher: Arc<dyn ActionDispatcher>,
        limits: PipelineLimits,
    ) -> Self {
        Self {
            posts,
            boards,
            dispatcher,
            limits,
        }
    }

    /// Run one batch action request to a terminal state.
    pub async fn run(
        &self,
        board: &Board,
        actor: &ActorContext,
        request: ActionRequest,
    ) -> Result<Outcome, PipelineError> {
        let redirect = format!("/{}/", board.uri);
        let resolved = checker::resolve(actor, &request);
        let dest = MoveDestination::new();
        let resolver = MoveResolver::new(self.posts.as_ref(), self.boards.as_ref());
        let limits = &self.limits;

        let checked_posts = request.checkedposts.len();
        let checked_reports = request.checkedreports.len();

        // Declared order is a contract: structural rules run and block before
        // the deferred destination lookups at the tail.
        let rules = vec![
            Rule::immediate(request.checkedposts.is_empty(), false, "Must select at least one post")
                .blocking(),
            Rule::immediate(resolved.valid_actions.is_empty(), false, "No actions selected")
                .blocking(),
            Rule::immediate(
                length_out_of(checked_posts, 1, limits.multi_inputs.posts_anon),
                false,
                format!(
                    "Must not select >{} posts per request",
                    limits.multi_inputs.posts_anon
                ),
            )
            .skip_for(Permission::ManageBoardGeneral),
            Rule::immediate(
                length_out_of(checked_posts, 1, limits.multi_inputs.posts_staff),
                false,
                format!(
                    "Must not select >{} posts per request",
                    limits.multi_inputs.posts_staff
                ),
            ),
            Rule::immediate(
                request.report_ban && request.checkedreports.is_empty(),
                false,
                "Must select post and reports to ban reporter",
            ),
            Rule::immediate(
                !request.checkedreports.is_empty() && !request.report_ban,
                false,
                "Must select a report action if checked reports",
            ),
            Rule::immediate(
                !request.checkedreports.is_empty() && request.checkedposts.is_empty(),
                false,
                "Must check parent post if checking reports for report action",
            ),
            Rule::immediate(
                !request.checkedreports.is_empty()
                    && !request.checkedposts.is_empty()
                    && length_out_of(checked_reports, 1, checked_posts * 5),
                false,
                "Invalid number of reports checked",
            ),
            Rule::immediate(resolved.has_permission, true, "No permission").blocking(),
            Rule::immediate(
                request.delete && !board.settings.user_post_delete,
                false,
                "User post deletion is disabled on this board",
            )
            .skip_for(Permission::ManageBoardGeneral),
            Rule::immediate(
                request.spoiler && !board.settings.user_post_spoiler,
                false,
                "User file spoiling is disabled on this board",
            )
            .skip_for(Permission::ManageBoardGeneral),
            Rule::immediate(
                request.unlink_file && !board.settings.user_post_unlink,
                false,
                "User file unlinking is disabled on this board",
            )
            .skip_for(Permission::ManageBoardGeneral),
            Rule::immediate(
                request.edit && length_out_of(checked_posts, 1, 1),
                false,
                "Must select only 1 post for edit action",
            ),
            Rule::immediate(
                length_out_of(
                    field_len(request.postpassword.as_deref()),
                    0,
                    limits.field_length.postpassword,
                ),
                false,
                format!(
                    "Password must be {} characters or less",
                    limits.field_length.postpassword
                ),
            ),
            Rule::immediate(
                length_out_of(
                    field_len(request.report_reason.as_deref()),
                    0,
                    limits.field_length.report_reason,
                ),
                false,
                format!(
                    "Report must be {} characters or less",
                    limits.field_length.report_reason
                ),
            ),
            Rule::immediate(
                length_out_of(
                    field_len(request.ban_reason.as_deref()),
                    0,
                    limits.field_length.ban_reason,
                ),
                false,
                format!(
                    "Ban reason must be {} characters or less",
                    limits.field_length.ban_reason
                ),
            ),
            Rule::immediate(
                length_out_of(
                    field_len(request.log_message.as_deref()),
                    0,
                    limits.field_length.log_message,
                ),
                false,
                format!(
                    "Modlog message must be {} characters or less",
                    limits.field_length.log_message
                ),
            ),
            Rule::immediate(
                (request.report || request.global_report)
                    && field_len(request.report_reason.as_deref()) == 0,
                false,
                "Reports must have a reason",
            )
            .blocking(),
            Rule::immediate(
                request.move_posts
                    && request.move_to_thread.is_none()
                    && request.move_to_board.is_none(),
                false,
                "Must input destination thread number or board to move posts",
            ),
            Rule::deferred(
                Box::pin(async {
                    if request.move_posts {
                        if let Some(thread_id) = request.move_to_thread {
                            let effective =
                                request.move_to_board.as_deref().unwrap_or(&board.uri);
                            return resolver.resolve_thread(&dest, effective, thread_id).await;
                        }
                    }
                    Ok(true)
                }),
                true,
                "Destination for move does not exist",
            ),
            Rule::deferred(
                Box::pin(async {
                    match request.move_to_board.as_deref() {
                        Some(uri) if request.move_posts && uri != board.uri => {
                            resolver.resolve_board(&dest, actor, uri).await
                        }
                        _ => Ok(true),
                    }
                }),
                true,
                "Destination for move does not exist, or you do not have permission",
            ),
        ];

        let errors = check_schema(rules, &actor.permissions).await?;
        if !errors.is_empty() {
            debug!(board = %board.uri, ?errors, "action request rejected");
            return Ok(Outcome::Rejected(Rejection::new(
                "Bad request",
                errors,
                &redirect,
            )));
        }

        let mut posts = self
            .posts
            .get_posts(&board.uri, &request.checkedposts, true)
            .await?;
        if posts.is_empty() {
            return Ok(Outcome::NotFound(Rejection::new(
                "Not found",
                vec!["Selected posts not found".to_string()],
                &redirect,
            )));
        }

        if request.edit {
            // Edit only allows a single post; it has its own view and never
            // reaches the dispatcher.
            let target = &posts[0];
            return Ok(Outcome::EditRedirect {
                board: target.board.clone(),
                post_id: target.post_id,
            });
        }

        if request.move_posts {
            if dest.thread().is_none() && dest.board().is_none() {
                return Ok(Outcome::Rejected(Rejection::new(
                    "Bad request",
                    vec!["Invalid post move destination".to_string()],
                    &redirect,
                )));
            }
            let same_board = request
                .move_to_board
                .as_deref()
                .map_or(true, |uri| uri == board.uri);
            if request.move_to_thread.is_some() && same_board {
                posts = filter_idempotent_moves(
                    posts,
                    request.move_to_thread,
                    request.move_to_board.as_deref(),
                    &board.uri,
                );
                if posts.is_empty() {
                    return Ok(Outcome::Conflict(Rejection::new(
                        "Conflict",
                        vec!["Invalid selected posts or destination thread".to_string()],
                        &redirect,
                    )));
                }
            }
        }

        let (destination_thread, destination_board) = dest.into_parts();
        info!(
            board = %board.uri,
            posts = posts.len(),
            actions = ?resolved.valid_actions,
            "dispatching batch action"
        );
        let outcome = self
            .dispatcher
            .execute(DispatchContext {
                board: board.clone(),
                actor: actor.clone(),
                request,
                valid_actions: resolved.valid_actions,
                posts,
                destination_thread,
                destination_board,
            })
            .await?;
        Ok(Outcome::Dispatched(outcome))
    }
}
