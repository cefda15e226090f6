//! Citescope Common Library
//!
//! Shared code for the Citescope client crates including:
//! - Wire models for the paper backend
//! - Backend API client abstraction
//! - Error types and handling
//! - Configuration management
//! - Metrics and observability

pub mod api;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod models;

// Re-export commonly used types
pub use api::{ChunkStream, HttpPaperApi, MockPaperApi, PaperApi};
pub use config::AppConfig;
pub use errors::{AppError, Result};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
