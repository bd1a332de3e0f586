//! Build one [`MetricRecord`] from one grouped row.
//!
//! Rows without a name are filtered out here (not an error). Everything else
//! degrades: unparseable cells stay as text and are skipped by the numeric
//! computations (trend percentage, trend series).

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::columns::ColumnClassification;
use super::grouper::GroupedRow;
use super::trend::{apply_overrides, build_series, TREND_POINTS};
use super::value::parse_value;
use crate::models::{MetricRecord, MetricValue, PeriodFields, PeriodValue, TrendDirection};

/// Header labels the assembler looks for. Matched exactly and case-sensitively.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMap {
    pub l1: String,
    pub l2: String,
    pub name: String,
    pub id: String,
    pub feb_avg: String,
    pub jan_avg: String,
    pub dec_avg: String,
    /// Prefix of explicit trend columns (`trend_0` .. `trend_13`).
    pub trend_prefix: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            l1: "L1 metric".to_string(),
            l2: "L2 metric".to_string(),
            name: "MTM".to_string(),
            id: "id".to_string(),
            feb_avg: "Feb Avg".to_string(),
            jan_avg: "Jan Avg".to_string(),
            dec_avg: "Dec Avg".to_string(),
            trend_prefix: "trend_".to_string(),
        }
    }
}

/// Lowercase, whitespace runs to single hyphens.
pub fn slugify(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Direction and rounded magnitude of the change from `previous` to `current`.
///
/// Falls back to `(Stable, None)` when either side is not a number or
/// `previous` is zero.
pub fn compute_trend(
    current: &PeriodValue,
    previous: &PeriodValue,
) -> (TrendDirection, Option<f64>) {
    let (Some(current), Some(previous)) = (current.as_number(), previous.as_number()) else {
        return (TrendDirection::Stable, None);
    };
    if previous == 0.0 {
        return (TrendDirection::Stable, None);
    }

    let pct = (current - previous) / previous * 100.0;
    if pct > 0.0 {
        (TrendDirection::Up, Some(round1(pct.abs())))
    } else if pct < 0.0 {
        (TrendDirection::Down, Some(round1(pct.abs())))
    } else {
        (TrendDirection::Stable, None)
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Assemble one metric. Returns `None` when the name cell is blank.
pub fn assemble<R: Rng>(
    row: &GroupedRow<'_>,
    columns: &ColumnClassification,
    map: &ColumnMap,
    rng: &mut R,
) -> Option<MetricRecord> {
    let cell = |column: &str| row.row.get(column).map(|s| s.trim()).filter(|s| !s.is_empty());

    let name = cell(map.name.as_str())?.to_string();

    let id = match cell(map.id.as_str()) {
        Some(id) => id.to_string(),
        None => format!("{}-{}-{}", slugify(&row.l1), slugify(&row.l2), slugify(&name)),
    };

    let additional_fields: PeriodFields = columns
        .period_columns
        .iter()
        .map(|column| (column.as_str(), parse_value(row.row.get(column))))
        .collect();

    let period = |column: Option<&str>| {
        column
            .and_then(|c| additional_fields.get(c))
            .cloned()
            .unwrap_or_default()
    };
    let current = period(columns.current_column());
    let previous = period(columns.previous_column());
    let (trend, trend_percentage) = compute_trend(&current, &previous);

    let average = |column: &str| MetricValue::plain(parse_value(row.row.get(column)));

    let mut trend_data = build_series(additional_fields.values(), TREND_POINTS, rng);
    let explicit = (0..TREND_POINTS).filter_map(|i| {
        parse_value(row.row.get(&format!("{}{}", map.trend_prefix, i)))
            .as_number()
            .map(|v| (i, v))
    });
    apply_overrides(&mut trend_data, explicit);

    Some(MetricRecord {
        id,
        name,
        l1_category: row.l1.clone(),
        l2_category: row.l2.clone(),
        current_period: MetricValue {
            value: current,
            trend: Some(trend),
            trend_percentage,
        },
        previous_period: MetricValue::plain(previous),
        feb_avg: average(map.feb_avg.as_str()),
        jan_avg: average(map.jan_avg.as_str()),
        dec_avg: average(map.dec_avg.as_str()),
        trend_data,
        additional_fields,
    })
}
