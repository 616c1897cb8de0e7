//! Cancellation Common Utilities
//!
//! Shared infrastructure for all cancellation analysis crates:
//! - Error types and result aliases
//! - Task duration helpers (millisecond totals, `HH:MM:SS` rendering)
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
