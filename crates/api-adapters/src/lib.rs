//! ironchan/crates/api-adapters/src/lib.rs
//!
//! HTTP adapters for the moderation pipeline. The axum surface is gated
//! behind the `web-axum` feature; form normalization and the dynamic
//! response shapes are always available.

pub mod forms;
pub mod responses;

#[cfg(feature = "web-axum")]
pub mod handlers;
#[cfg(feature = "web-axum")]
pub mod middleware;
