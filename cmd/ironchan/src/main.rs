//! # ironchan binary
//!
//! Assembles the application: configuration, tracing, the in-memory
//! reference adapters, the moderation pipeline, and the axum surface.

use std::sync::Arc;

use api_adapters::handlers::{router, AppState};
use configs::AppConfig;
use domains::models::Board;
use secrecy::ExposeSecret;
use services::pipeline::{FieldLengths, ModerationPipeline, MultiInputs, PipelineLimits};
use storage_adapters::{MemDispatcher, MemStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn pipeline_limits(config: &AppConfig) -> PipelineLimits {
    PipelineLimits {
        multi_inputs: MultiInputs {
            posts_anon: config.global_limits.multi_inputs.posts.anon,
            posts_staff: config.global_limits.multi_inputs.posts.staff,
        },
        field_length: FieldLengths {
            postpassword: config.global_limits.field_length.postpassword,
            report_reason: config.global_limits.field_length.report_reason,
            ban_reason: config.global_limits.field_length.ban_reason,
            log_message: config.global_limits.field_length.log_message,
        },
    }
}

/// Development seed so the server answers something out of the box.
fn seed(store: &MemStore) {
    let mut board = Board::new("b", "Random");
    board.settings.user_post_delete = true;
    board.settings.user_post_spoiler = true;
    store.insert_board(board);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = configs::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let store = Arc::new(MemStore::new());
    seed(&store);

    let dispatcher = Arc::new(MemDispatcher::new(
        store.clone(),
        config.secrets.post_password_secret.expose_secret(),
    ));
    let pipeline = Arc::new(ModerationPipeline::new(
        store.clone(),
        store.clone(),
        dispatcher,
        pipeline_limits(&config),
    ));
    let state = Arc::new(AppState {
        pipeline,
        boards: store.clone(),
        ip_hash_secret: config.secrets.ip_hash_secret.expose_secret().to_string(),
    });

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!(bind = %config.server.bind, "ironchan listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
