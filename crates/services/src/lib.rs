//! ironchan/crates/services/src/lib.rs
//!
//! The moderation action pipeline and its parts: the declarative rule
//! evaluator, the permission resolver, move-destination resolution with
//! idempotent batch filtering, and the bounded report sub-model.

pub mod checker;
pub mod hashing;
pub mod moves;
pub mod pipeline;
pub mod reports;
pub mod schema;

pub use checker::PermissionResult;
pub use pipeline::{ModerationPipeline, Outcome, PipelineError, PipelineLimits, Rejection};
