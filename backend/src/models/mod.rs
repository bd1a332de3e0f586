//! Domain models for the Pulseboard normalization pipeline.
//!
//! This module contains the typed dashboard model the pipeline emits:
//!
//! - [`CategoryNode`] - Top-level (L1) category with its ordered metrics
//! - [`MetricRecord`] - One normalized metric row
//! - [`MetricValue`] - A period value, optionally with a trend
//! - [`PeriodValue`] - Number, verbatim percentage/text, or explicit "no data"
//! - [`PeriodFields`] - Ordered period-label → value mapping
//! - [`TrendPoint`] / [`TrendDirection`] - Derived trend data

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One input record: header label → raw cell text, keys exactly as they
/// appear in the source header row.
pub type RawRow = HashMap<String, String>;

// =============================================================================
// Period Value
// =============================================================================

/// A parsed cell.
///
/// `Empty` means the source had no data for this period. It is distinct
/// from `Number(0.0)` and serializes as `null`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PeriodValue {
    /// Absent, null, or blank cell.
    #[default]
    Empty,
    /// A finite number.
    Number(f64),
    /// Percentage string kept verbatim (`"4.70%"`) or unparseable text.
    Text(String),
}

impl PeriodValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, PeriodValue::Empty)
    }

    /// Numeric payload, if any. Text and empty values are excluded from
    /// every numeric computation.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PeriodValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PeriodValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for PeriodValue {
    fn from(n: f64) -> Self {
        PeriodValue::Number(n)
    }
}

impl Serialize for PeriodValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PeriodValue::Empty => serializer.serialize_none(),
            PeriodValue::Number(n) => serializer.serialize_f64(*n),
            PeriodValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

// =============================================================================
// Ordered period fields
// =============================================================================

/// Period label → value, in period-column order.
///
/// Lookup is by label; iteration follows the order the columns appeared
/// in the header row. Serializes as a JSON object with keys in that order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PeriodFields {
    entries: Vec<(String, PeriodValue)>,
}

impl PeriodFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value. An existing label keeps its position and gets the new value.
    pub fn insert(&mut self, label: impl Into<String>, value: PeriodValue) {
        let label = label.into();
        match self.entries.iter_mut().find(|(l, _)| *l == label) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((label, value)),
        }
    }

    pub fn get(&self, label: &str) -> Option<&PeriodValue> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PeriodValue)> {
        self.entries.iter().map(|(l, v)| (l.as_str(), v))
    }

    pub fn values(&self) -> impl Iterator<Item = &PeriodValue> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(l, _)| l.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, PeriodValue)> for PeriodFields {
    fn from_iter<I: IntoIterator<Item = (K, PeriodValue)>>(iter: I) -> Self {
        let mut fields = PeriodFields::new();
        for (label, value) in iter {
            fields.insert(label, value);
        }
        fields
    }
}

impl Serialize for PeriodFields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, value) in &self.entries {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}

// =============================================================================
// Trend
// =============================================================================

/// Direction of change between the current and previous period.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    #[default]
    Stable,
}

/// One point of the 14-point trend line.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TrendPoint {
    pub index: usize,
    pub value: f64,
}

// =============================================================================
// Metric
// =============================================================================

/// A period value plus, for the current period, the computed trend.
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MetricValue {
    pub value: PeriodValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<TrendDirection>,
    /// Absolute change in percent, one decimal. Absent when the trend is a fallback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend_percentage: Option<f64>,
}

impl MetricValue {
    pub fn plain(value: PeriodValue) -> Self {
        Self {
            value,
            trend: None,
            trend_percentage: None,
        }
    }
}

/// One normalized metric row.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricRecord {
    /// Unique within one load.
    pub id: String,
    pub name: String,
    pub l1_category: String,
    pub l2_category: String,
    pub current_period: MetricValue,
    pub previous_period: MetricValue,
    pub feb_avg: MetricValue,
    pub jan_avg: MetricValue,
    pub dec_avg: MetricValue,
    /// Always exactly [`crate::transform::trend::TREND_POINTS`] points.
    pub trend_data: Vec<TrendPoint>,
    /// Every detected period column, in header order.
    pub additional_fields: PeriodFields,
}

// =============================================================================
// Category
// =============================================================================

/// A top-level category. Only emitted when it holds at least one metric.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryNode {
    pub id: String,
    pub name: String,
    pub metrics: Vec<MetricRecord>,
}

impl CategoryNode {
    pub fn metric(&self, id: &str) -> Option<&MetricRecord> {
        self.metrics.iter().find(|m| m.id == id)
    }
}

// =============================================================================
// Tests
// =============================================================================
