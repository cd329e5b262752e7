//! # Domain Errors
//!
//! Failures crossing the port boundaries. Validation failures never appear
//! here: they are carried as message lists by the pipeline itself.

use thiserror::Error;

/// Failures from the content and board stores.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Connectivity or backend failure. Not retried by the pipeline.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// An identifier the store cannot interpret.
    #[error("malformed identifier: {0}")]
    Malformed(String),
}

/// Failures raised while executing an approved batch.
///
/// Kept distinct from validation so the caller can preserve the difference
/// between "bad request" and "failed to apply".
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The supplied post password matched none of the selected posts.
    #[error("password did not match any selected posts")]
    PasswordMismatch,

    #[error("action failed: {0}")]
    Failed(String),
}
