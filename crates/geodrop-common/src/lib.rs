//! Geodrop Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared error and logging infrastructure for the geodrop workspace.
//!
//! # Overview
//!
//! This crate provides the functionality used by both the ingestion daemon
//! and the operator CLI:
//!
//! - **Error Handling**: the workspace error type and result alias
//! - **Logging**: tracing subscriber configuration and initialization

pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{GeodropError, Result};
