//! # Handlers
//!
//! The HTTP surface of the moderation pipeline: one route taking the actions
//! form for a board and mapping pipeline outcomes onto statuses. Validation
//! failures are 400, missing posts 404, emptied move batches 409; anything
//! infrastructural is logged and answered with a generic 500 so store details
//! never leak.

use std::sync::Arc;

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::post;
use axum::{Extension, Router};
use domains::actions::ActorContext;
use domains::error::DispatchError;
use domains::ports::BoardStore;
use services::pipeline::{ModerationPipeline, Outcome, PipelineError};
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::forms::{normalize, RawActionForm};
use crate::middleware::attach_actor;
use crate::responses::DynamicMessage;

/// State shared across workers.
pub struct AppState {
    pub pipeline: Arc<ModerationPipeline>,
    pub boards: Arc<dyn BoardStore>,
    pub ip_hash_secret: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/forms/board/{board}/actions", post(board_actions))
        .layer(from_fn_with_state(state.clone(), attach_actor))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn json(status: StatusCode, body: DynamicMessage) -> Response {
    (status, Json(body)).into_response()
}

fn internal() -> Response {
    json(
        StatusCode::INTERNAL_SERVER_ERROR,
        DynamicMessage::failure("Internal server error", "Something went wrong", "/"),
    )
}

/// Batch moderation actions against a board.
pub async fn board_actions(
    State(state): State<Arc<AppState>>,
    Path(board_uri): Path<String>,
    Extension(actor): Extension<ActorContext>,
    Json(raw): Json<RawActionForm>,
) -> Response {
    let board = match state.boards.find_one(&board_uri).await {
        Ok(Some(board)) => board,
        Ok(None) => {
            return json(
                StatusCode::NOT_FOUND,
                DynamicMessage::failure("Not found", "Board does not exist", "/"),
            );
        }
        Err(err) => {
            error!(%err, board = %board_uri, "board lookup failed");
            return internal();
        }
    };

    let request = normalize(raw);
    match state.pipeline.run(&board, &actor, request).await {
        Ok(Outcome::Rejected(rejection)) => json(StatusCode::BAD_REQUEST, rejection.into()),
        Ok(Outcome::NotFound(rejection)) => json(StatusCode::NOT_FOUND, rejection.into()),
        Ok(Outcome::Conflict(rejection)) => json(StatusCode::CONFLICT, rejection.into()),
        Ok(Outcome::EditRedirect { board, post_id }) => {
            Redirect::to(&format!("/{board}/manage/editpost/{post_id}.html")).into_response()
        }
        Ok(Outcome::Dispatched(outcome)) => json(
            StatusCode::OK,
            DynamicMessage::success(outcome.messages, outcome.redirect),
        ),
        Err(PipelineError::Dispatch(DispatchError::PasswordMismatch)) => json(
            StatusCode::FORBIDDEN,
            DynamicMessage::failure(
                "Forbidden",
                "Password did not match any selected posts",
                format!("/{}/", board.uri),
            ),
        ),
        Err(err) => {
            error!(%err, board = %board.uri, "action pipeline failed");
            internal()
        }
    }
}
