//! Header classification and period-column grouping.
//!
//! Weekly exports have no fixed schema, so the set of period columns is
//! inferred from the header text alone:
//!
//! ```text
//! id | L1 metric | MTM | 10 Mar - 16 Mar | 03 Mar - 09 Mar | ... | Feb Avg | Oct
//!                       └──── week ─────┘ └──── week ─────┘       └ avg ─┘ └month┘
//! ```
//!
//! Column order is never re-sorted: the first two weekly columns are the
//! current and previous period, and display groups are cut in header order.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Group size used when no week run is visible (four weeks + one average).
pub const DEFAULT_GROUP_SIZE: usize = 5;

static MONTH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)$").expect("valid month regex")
});

static DAY_MONTH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})\s+([A-Za-z]{3})$").expect("valid day-month regex"));

/// What a period column represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    /// Date range such as `10 Mar - 16 Mar`.
    Week,
    /// Any header mentioning `Avg`.
    Average,
    /// Bare month abbreviation such as `Oct`.
    Month,
}

/// Classify a single header. `None` means identity/category column.
pub fn period_kind(header: &str) -> Option<PeriodKind> {
    if header.contains('-') {
        Some(PeriodKind::Week)
    } else if header.contains("Avg") {
        Some(PeriodKind::Average)
    } else if MONTH_RE.is_match(header.trim()) {
        Some(PeriodKind::Month)
    } else {
        None
    }
}

pub fn is_weekly(header: &str) -> bool {
    period_kind(header) == Some(PeriodKind::Week)
}

/// Header split into period and identity columns, both in header order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnClassification {
    pub period_columns: Vec<String>,
    pub identity_columns: Vec<String>,
}

impl ColumnClassification {
    /// Weekly columns in header order.
    pub fn weekly_columns(&self) -> impl Iterator<Item = &str> {
        self.period_columns
            .iter()
            .map(String::as_str)
            .filter(|c| is_weekly(c))
    }

    /// First weekly column: the current period.
    pub fn current_column(&self) -> Option<&str> {
        self.weekly_columns().next()
    }

    /// Second weekly column: the previous period.
    pub fn previous_column(&self) -> Option<&str> {
        self.weekly_columns().nth(1)
    }
}

/// Split a header row into period and identity columns.
///
/// Repeated headers are reported once, at their first position.
pub fn classify<S: AsRef<str>>(headers: &[S]) -> ColumnClassification {
    let mut out = ColumnClassification::default();

    for header in headers {
        let header = header.as_ref();
        let bucket = if period_kind(header).is_some() {
            &mut out.period_columns
        } else {
            &mut out.identity_columns
        };
        if !bucket.iter().any(|h| h == header) {
            bucket.push(header.to_string());
        }
    }

    out
}

// =============================================================================
// Display groups
// =============================================================================

/// Period columns cut into display blocks.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodGroups {
    pub group_size: usize,
    pub groups: Vec<Vec<String>>,
}

/// Infer how many columns make up one display block.
///
/// Longest run of consecutive weekly columns, plus one when some run is
/// immediately followed by an `Avg` column. No run at all gives
/// [`DEFAULT_GROUP_SIZE`].
pub fn infer_group_size<S: AsRef<str>>(period_columns: &[S]) -> usize {
    let mut run = 0usize;
    let mut max_run = 0usize;
    let mut trailing_avg = false;

    for column in period_columns {
        let column = column.as_ref();
        if is_weekly(column) {
            run += 1;
            continue;
        }
        if run > 0 {
            max_run = max_run.max(run);
            if column.contains("Avg") {
                trailing_avg = true;
            }
        }
        run = 0;
    }
    max_run = max_run.max(run);

    match (max_run, trailing_avg) {
        (0, _) => DEFAULT_GROUP_SIZE,
        (n, true) => n + 1,
        (n, false) => n,
    }
}

/// Partition period columns into consecutive blocks of the inferred size.
/// The last block may be shorter.
pub fn group_periods<S: AsRef<str>>(period_columns: &[S]) -> PeriodGroups {
    let group_size = infer_group_size(period_columns);
    let groups = period_columns
        .chunks(group_size)
        .map(|chunk| chunk.iter().map(|c| c.as_ref().to_string()).collect())
        .collect();

    PeriodGroups { group_size, groups }
}

/// Compact a week label for display.
///
/// `10 Mar - 16 Mar` → `10-16 Mar`, `25 Feb - 02 Mar` → `25 Feb-02 Mar`.
/// Labels that are not two `<day> <mon>` halves come back unchanged.
pub fn compact_label(label: &str) -> String {
    let parts: Vec<&str> = label.split('-').map(str::trim).collect();
    if parts.len() != 2 {
        return label.to_string();
    }

    match (DAY_MONTH_RE.captures(parts[0]), DAY_MONTH_RE.captures(parts[1])) {
        (Some(a), Some(b)) => {
            let (day1, month1) = (&a[1], &a[2]);
            let (day2, month2) = (&b[1], &b[2]);
            if month1 == month2 {
                format!("{}-{} {}", day1, day2, month1)
            } else {
                format!("{} {}-{} {}", day1, month1, day2, month2)
            }
        }
        _ => label.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_mixed_header() {
        let headers = ["id", "name", "10 Mar - 16 Mar", "Feb Avg", "Oct"];
        let result = classify(&headers);

        assert_eq!(result.period_columns, vec!["10 Mar - 16 Mar", "Feb Avg", "Oct"]);
        assert_eq!(result.identity_columns, vec!["id", "name"]);
    }

    #[test]
    fn test_classify_preserves_source_order() {
        let headers = ["MTM", "Dec Avg", "03 Mar - 09 Mar", "10 Mar - 16 Mar", "Jan"];
        let result = classify(&headers);

        assert_eq!(
            result.period_columns,
            vec!["Dec Avg", "03 Mar - 09 Mar", "10 Mar - 16 Mar", "Jan"]
        );
        assert_eq!(result.current_column(), Some("03 Mar - 09 Mar"));
        assert_eq!(result.previous_column(), Some("10 Mar - 16 Mar"));
    }

    #[test]
    fn test_month_must_be_bare_abbreviation() {
        assert_eq!(period_kind("Oct"), Some(PeriodKind::Month));
        assert_eq!(period_kind("October"), None);
        assert_eq!(period_kind("oct"), None);
        assert_eq!(period_kind("MTM"), None);
        assert_eq!(period_kind("Feb Avg Last Year"), Some(PeriodKind::Average));
    }

    #[test]
    fn test_duplicate_headers_reported_once() {
        let result = classify(&["Oct", "MTM", "Oct"]);
        assert_eq!(result.period_columns, vec!["Oct"]);
    }

    #[test]
    fn test_no_weekly_columns() {
        let result = classify(&["MTM", "Feb Avg"]);
        assert_eq!(result.current_column(), None);
        assert_eq!(result.previous_column(), None);
    }

    #[test]
    fn test_group_size_weeks_plus_average() {
        let cols = [
            "10 Mar - 16 Mar",
            "03 Mar - 09 Mar",
            "25 Feb - 02 Mar",
            "18 Feb - 24 Feb",
            "Feb Avg",
            "11 Feb - 17 Feb",
            "04 Feb - 10 Feb",
            "28 Jan - 03 Feb",
            "21 Jan - 27 Jan",
            "Jan Avg",
            "Dec Avg",
        ];
        let grouped = group_periods(&cols);

        assert_eq!(grouped.group_size, 5);
        assert_eq!(grouped.groups.len(), 3);
        assert_eq!(grouped.groups[0].last().map(String::as_str), Some("Feb Avg"));
        assert_eq!(grouped.groups[1].last().map(String::as_str), Some("Jan Avg"));
        assert_eq!(grouped.groups[2], vec!["Dec Avg"]);
    }

    #[test]
    fn test_group_size_without_average() {
        let cols = ["10 Mar - 16 Mar", "03 Mar - 09 Mar", "25 Feb - 02 Mar", "Oct"];
        assert_eq!(infer_group_size(&cols), 3);
    }

    #[test]
    fn test_group_size_run_at_end() {
        let cols = ["Feb Avg", "10 Mar - 16 Mar", "03 Mar - 09 Mar"];
        assert_eq!(infer_group_size(&cols), 2);
    }

    #[test]
    fn test_group_size_defaults_without_weeks() {
        let cols = ["Feb Avg", "Jan Avg", "Oct", "Sep", "Aug", "Jul", "Jun"];
        let grouped = group_periods(&cols);

        assert_eq!(grouped.group_size, DEFAULT_GROUP_SIZE);
        assert_eq!(grouped.groups.len(), 2);
        assert_eq!(grouped.groups[1], vec!["Jul", "Jun"]);
    }

    #[test]
    fn test_group_empty_input() {
        let grouped = group_periods::<&str>(&[]);
        assert_eq!(grouped.group_size, DEFAULT_GROUP_SIZE);
        assert!(grouped.groups.is_empty());
    }

    #[test]
    fn test_compact_label() {
        assert_eq!(compact_label("10 Mar - 16 Mar"), "10-16 Mar");
        assert_eq!(compact_label("25 Feb - 02 Mar"), "25 Feb-02 Mar");
        assert_eq!(compact_label("Feb Avg"), "Feb Avg");
        assert_eq!(compact_label("Q1 - Q2"), "Q1 - Q2");
        assert_eq!(compact_label("1 Jan - 2 Jan - 3 Jan"), "1 Jan - 2 Jan - 3 Jan");
    }
}
