//! Normalization module.
//!
//! This module turns parsed CSV rows into the dashboard model:
//! - Value: cell text to typed period values
//! - Columns: period-column detection and display grouping
//! - Grouper: L1 carry-forward and L2 sub-groups
//! - Trend: fixed-length trend series
//! - Assembler: one metric per row
//! - Pipeline: category tree and end-to-end entry points

pub mod assembler;
pub mod columns;
pub mod grouper;
pub mod pipeline;
pub mod trend;
pub mod value;

pub use assembler::{assemble, compute_trend, slugify, ColumnMap};
pub use columns::{
    classify, compact_label, group_periods, infer_group_size, ColumnClassification, PeriodGroups,
    PeriodKind,
};
pub use grouper::{group_rows, GroupedRow, Grouping, L1Group, L2Group};
pub use pipeline::*;
pub use trend::{build_series, TREND_POINTS};
pub use value::{parse_value, RawCell};
