//! HTTP API module.
//!
//! The axum server, its response bodies, and the SSE log broadcaster that
//! the pipeline reports through.

pub mod logs;
pub mod server;
pub mod types;

pub use logs::{log_error, log_info, log_success, log_warning, LogEntry, LogLevel, LOG_BROADCASTER};
pub use server::{router, start_server, AppState};
pub use types::{error_response, CategoriesResponse, LoadResponse};
