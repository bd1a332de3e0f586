//! High-level pipeline API: raw CSV to the ordered category tree.
//!
//! ```text
//! text ─▶ parser ─▶ classify (header, once) ─▶ group_rows (L1 carry-forward)
//!      ─▶ assemble (per row) ─▶ build_categories ─▶ Vec<CategoryNode>
//! ```
//!
//! One call runs the whole chain synchronously and returns a fresh result;
//! nothing is patched in place. Either the full category set comes back or
//! an error does.
//!
//! # Example
//!
//! ```rust,ignore
//! use pulseboard::transform::pipeline::{normalize_text, NormalizeOptions};
//!
//! let csv = "L1 metric,L2 metric,MTM,10 Mar - 16 Mar,03 Mar - 09 Mar\n\
//!            Bookings,,Total Bookings,\"100,955\",\"99,480\"";
//! let result = normalize_text(csv, &NormalizeOptions::default())?;
//! assert_eq!(result.categories[0].id, "bookings");
//! ```

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::assembler::{assemble, slugify, ColumnMap};
use super::columns::{classify, group_periods, ColumnClassification, PeriodGroups};
use super::grouper::{group_rows, Grouping};
use crate::api::logs::{log_info, log_success, log_warning};
use crate::error::{PipelineError, PipelineResult};
use crate::models::{CategoryNode, RawRow};
use crate::parser::{parse_bytes_auto, parse_text_auto, ParseResult};

/// Options for one normalization run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizeOptions {
    /// Header labels for identity, hierarchy and averages
    #[serde(default)]
    pub columns: ColumnMap,

    /// Seed for synthesized trend points; entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

impl NormalizeOptions {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// CSV file information
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
}

/// What happened to the input rows
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadStats {
    pub rows_read: usize,
    /// Dropped: no L1 label on the row or any row before it
    pub rows_without_l1: usize,
    /// Dropped: blank name cell
    pub rows_without_name: usize,
    /// Kept rows whose L1 label was carried forward from an earlier row
    pub rows_with_inherited_l1: usize,
    /// Metric ids that needed a numeric suffix to stay unique
    pub renamed_ids: usize,
    /// Category slugs that needed a numeric suffix to stay unique
    pub renamed_categories: usize,
    pub metric_count: usize,
    pub category_count: usize,
}

/// Result of a complete normalization run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizeResult {
    /// Final ordered category tree
    pub categories: Vec<CategoryNode>,

    /// Period vs identity columns, header order
    pub classification: ColumnClassification,

    /// Display blocks for the period columns
    pub period_groups: PeriodGroups,

    pub stats: LoadStats,

    pub csv_info: CsvInfo,
}

/// Normalize raw CSV text (delimiter auto-detected).
pub fn normalize_text(text: &str, options: &NormalizeOptions) -> PipelineResult<NormalizeResult> {
    let parsed = parse_text_auto(text)?;
    normalize_parsed(parsed, options)
}

/// Normalize raw CSV bytes (encoding and delimiter auto-detected).
pub fn normalize_bytes(
    bytes: &[u8],
    options: &NormalizeOptions,
) -> PipelineResult<NormalizeResult> {
    let parsed = parse_bytes_auto(bytes)?;
    normalize_parsed(parsed, options)
}

/// Normalize rows produced by another row parser.
///
/// `headers` must be in source order; period-column order comes from it.
pub fn normalize_records(
    records: Vec<RawRow>,
    headers: Vec<String>,
    options: &NormalizeOptions,
) -> PipelineResult<NormalizeResult> {
    let parsed = ParseResult {
        records,
        encoding: "utf-8".to_string(),
        delimiter: ',',
        headers,
    };
    normalize_parsed(parsed, options)
}

/// Internal: normalize parsed CSV data
fn normalize_parsed(
    parsed: ParseResult,
    options: &NormalizeOptions,
) -> PipelineResult<NormalizeResult> {
    log_info(format!(
        "📖 Read {} rows, {} columns (delimiter '{}')",
        parsed.records.len(),
        parsed.headers.len(),
        format_delimiter(parsed.delimiter)
    ));

    if parsed.records.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let classification = classify(&parsed.headers);
    if classification.period_columns.is_empty() {
        log_warning("No period columns detected");
    } else {
        log_success(format!(
            "{} period columns: {}",
            classification.period_columns.len(),
            classification.period_columns.join(", ")
        ));
    }

    let period_groups = group_periods(&classification.period_columns);
    log_info(format!(
        "Period groups: {} of size {}",
        period_groups.groups.len(),
        period_groups.group_size
    ));

    let grouping = group_rows(&parsed.records, &options.columns.l1, &options.columns.l2);
    if !grouping.orphaned.is_empty() {
        log_warning(format!(
            "{} rows before the first '{}' label were dropped",
            grouping.orphaned.len(),
            options.columns.l1
        ));
    }

    log_info(format!(
        "{} rows grouped into {} L1 labels",
        grouping.row_count(),
        grouping.groups.len()
    ));
    for group in &grouping.groups {
        let sub_groups: Vec<&str> = group.sub_groups().iter().map(|g| g.label).collect();
        log_info(format!("   {}: {}", group.label, sub_groups.join(", ")));
    }

    let mut stats = LoadStats {
        rows_read: parsed.records.len(),
        rows_without_l1: grouping.orphaned.len(),
        rows_with_inherited_l1: grouping
            .groups
            .iter()
            .flat_map(|g| &g.rows)
            .filter(|r| r.l1_inherited)
            .count(),
        ..LoadStats::default()
    };

    let mut rng = options.rng();
    let categories =
        build_categories(&grouping, &classification, &options.columns, &mut rng, &mut stats);

    if stats.rows_without_name > 0 {
        log_warning(format!(
            "{} rows without a '{}' value skipped",
            stats.rows_without_name, options.columns.name
        ));
    }
    if stats.renamed_ids > 0 {
        log_warning(format!("{} duplicate metric ids suffixed", stats.renamed_ids));
    }
    log_success(format!(
        "{} metrics in {} categories",
        stats.metric_count, stats.category_count
    ));

    let csv_info = CsvInfo {
        encoding: parsed.encoding,
        delimiter: parsed.delimiter,
        row_count: parsed.records.len(),
        headers: parsed.headers,
    };

    Ok(NormalizeResult {
        categories,
        classification,
        period_groups,
        stats,
        csv_info,
    })
}

/// Fold L1 groups through the assembler into the final category list.
///
/// Groups left with no metrics are dropped. Metric ids are made unique
/// across the whole output and category slugs across categories, both by
/// appending `-2`, `-3`, ... to later occurrences.
pub fn build_categories<R: Rng>(
    grouping: &Grouping<'_>,
    columns: &ColumnClassification,
    map: &ColumnMap,
    rng: &mut R,
    stats: &mut LoadStats,
) -> Vec<CategoryNode> {
    let mut metric_ids = UniqueIds::default();
    let mut category_ids = UniqueIds::default();
    let mut categories = Vec::with_capacity(grouping.groups.len());

    for group in &grouping.groups {
        let mut metrics = Vec::with_capacity(group.rows.len());

        for row in &group.rows {
            let Some(mut metric) = assemble(row, columns, map, rng) else {
                stats.rows_without_name += 1;
                continue;
            };
            let id = metric_ids.claim(&metric.id);
            if id != metric.id {
                stats.renamed_ids += 1;
                metric.id = id;
            }
            metrics.push(metric);
        }

        if metrics.is_empty() {
            continue;
        }

        let slug = slugify(&group.label);
        let id = category_ids.claim(&slug);
        if id != slug {
            stats.renamed_categories += 1;
            log_warning(format!(
                "Category '{}' collides with an earlier slug '{}', using '{}'",
                group.label, slug, id
            ));
        }

        stats.metric_count += metrics.len();
        categories.push(CategoryNode {
            id,
            name: group.label.clone(),
            metrics,
        });
    }

    stats.category_count = categories.len();
    categories
}

/// Hands out ids, suffixing repeats.
#[derive(Default)]
struct UniqueIds {
    taken: HashSet<String>,
}

impl UniqueIds {
    fn claim(&mut self, base: &str) -> String {
        if self.taken.insert(base.to_string()) {
            return base.to_string();
        }
        let taken = &mut self.taken;
        (2..)
            .map(|n| format!("{}-{}", base, n))
            .find(|candidate| taken.insert(candidate.clone()))
            .unwrap_or_else(|| base.to_string())
    }
}

/// Format delimiter for display
fn format_delimiter(d: char) -> &'static str {
    match d {
        ';' => ";",
        ',' => ",",
        '\t' => "TAB",
        '|' => "|",
        _ => "?",
    }
}
