//! ironchan/crates/domains/src/lib.rs
//!
//! Domain models, permission sets, and port definitions for ironchan.

pub mod actions;
pub mod error;
pub mod models;
pub mod permissions;
pub mod ports;

// Re-exporting for easier access in other crates
pub use actions::*;
pub use error::*;
pub use models::*;
pub use permissions::*;
pub use ports::*;
