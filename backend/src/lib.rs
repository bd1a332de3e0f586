//! # Pulseboard - weekly metrics report normalization
//!
//! Pulseboard turns a loosely structured weekly metrics CSV (one row per
//! metric, L1/L2 category labels, a run of weekly period columns followed
//! by monthly averages) into an ordered category tree a dashboard can
//! render directly.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  CSV text   │────▶│   Parser    │────▶│  Normalize  │────▶│ Categories  │
//! │ (file/URL)  │     │  (auto-enc) │     │ (group+trend│     │  (ordered)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pulseboard::{normalize_text, NormalizeOptions};
//!
//! let csv = std::fs::read_to_string("weekly.csv")?;
//! let result = normalize_text(&csv, &NormalizeOptions::with_seed(7))?;
//! for category in &result.categories {
//!     println!("{}: {} metrics", category.name, category.metrics.len());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Dashboard model (CategoryNode, MetricRecord, PeriodValue)
//! - [`parser`] - CSV parsing with auto-detection
//! - [`transform`] - Classification, grouping, trends and the pipeline
//! - [`source`] - Raw text acquisition (file or URL)
//! - [`dashboard`] - The held category set, reset and update listeners
//! - [`config`] - Environment configuration
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Normalization
pub mod transform;

// Loading
pub mod dashboard;
pub mod source;

pub mod config;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{CsvError, LoadError, PipelineError, ServerError, SourceError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    CategoryNode,
    MetricRecord,
    MetricValue,
    PeriodFields,
    PeriodValue,
    RawRow,
    TrendDirection,
    TrendPoint,
};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    decode_content,
    detect_delimiter,
    detect_encoding,
    parse_bytes_auto,
    parse_text,
    parse_text_auto,
    ParseResult,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    build_categories,
    normalize_bytes,
    normalize_records,
    normalize_text,
    CsvInfo,
    LoadStats,
    NormalizeOptions,
    NormalizeResult,
};

pub use transform::{classify, group_periods, ColumnClassification, ColumnMap, PeriodGroups};

// =============================================================================
// Re-exports - Loading
// =============================================================================

pub use config::Config;
pub use dashboard::{acquire, Dashboard, DataUpdateListener, LoadInfo, LoadTrigger};
pub use source::TextSource;

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
