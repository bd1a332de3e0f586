//! Group raw rows into L1 categories and L2 sub-groups.
//!
//! Report authors write a category label once and leave it blank for the
//! rows below it. Grouping is a left fold over the rows that carries the
//! last non-blank L1 label forward:
//!
//! ```text
//! L1 metric   | L2 metric | MTM                 resolved L1
//! ────────────┼───────────┼──────────────       ─────────────
//!             |           | Orphan          →   (dropped)
//! Bookings    |           | Total Bookings  →   Bookings
//!             | Android   | Brand Android   →   Bookings (inherited)
//! Conversion  |           | Overall         →   Conversion
//! ```
//!
//! A blank L2 cell resolves to the row's L1 label.

use std::collections::HashMap;

use crate::models::RawRow;

/// A raw row with its resolved hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedRow<'a> {
    /// Position in the input sequence.
    pub index: usize,
    pub row: &'a RawRow,
    pub l1: String,
    pub l2: String,
    /// The L1 label came from an earlier row.
    pub l1_inherited: bool,
}

/// All rows resolved to one L1 label, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct L1Group<'a> {
    pub label: String,
    pub rows: Vec<GroupedRow<'a>>,
}

/// Rows of one L2 label inside an L1 group.
#[derive(Debug, Clone, PartialEq)]
pub struct L2Group<'g, 'a> {
    pub label: &'g str,
    pub rows: Vec<&'g GroupedRow<'a>>,
}

impl<'a> L1Group<'a> {
    /// L2 sub-groups in first-seen order. Rows keep source order inside each.
    pub fn sub_groups(&self) -> Vec<L2Group<'_, 'a>> {
        let mut subs: Vec<L2Group<'_, 'a>> = Vec::new();
        for row in &self.rows {
            match subs.iter_mut().find(|g| g.label == row.l2) {
                Some(group) => group.rows.push(row),
                None => subs.push(L2Group {
                    label: &row.l2,
                    rows: vec![row],
                }),
            }
        }
        subs
    }
}

/// Output of [`group_rows`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grouping<'a> {
    /// L1 groups in first-seen label order.
    pub groups: Vec<L1Group<'a>>,
    /// Indices of rows dropped because no L1 label preceded them.
    pub orphaned: Vec<usize>,
}

impl Grouping<'_> {
    pub fn row_count(&self) -> usize {
        self.groups.iter().map(|g| g.rows.len()).sum()
    }
}

/// Fold accumulator: the carried label plus the groups built so far.
#[derive(Default)]
struct CarryForward<'a> {
    last_l1: Option<String>,
    positions: HashMap<String, usize>,
    grouping: Grouping<'a>,
}

impl<'a> CarryForward<'a> {
    fn push(mut self, index: usize, row: &'a RawRow, l1_column: &str, l2_column: &str) -> Self {
        let own_l1 = non_blank(row, l1_column);
        let l1_inherited = own_l1.is_none();

        if let Some(label) = own_l1 {
            self.last_l1 = Some(label.to_string());
        }

        let Some(l1) = self.last_l1.clone() else {
            self.grouping.orphaned.push(index);
            return self;
        };

        let l2 = non_blank(row, l2_column)
            .map(str::to_string)
            .unwrap_or_else(|| l1.clone());

        let position = match self.positions.get(&l1) {
            Some(&p) => p,
            None => {
                self.grouping.groups.push(L1Group {
                    label: l1.clone(),
                    rows: Vec::new(),
                });
                let p = self.grouping.groups.len() - 1;
                self.positions.insert(l1.clone(), p);
                p
            }
        };

        self.grouping.groups[position].rows.push(GroupedRow {
            index,
            row,
            l1,
            l2,
            l1_inherited,
        });
        self
    }
}

fn non_blank<'r>(row: &'r RawRow, column: &str) -> Option<&'r str> {
    row.get(column).map(|s| s.trim()).filter(|s| !s.is_empty())
}

/// Group rows by resolved L1 label, carrying the last non-blank L1 forward.
pub fn group_rows<'a>(rows: &'a [RawRow], l1_column: &str, l2_column: &str) -> Grouping<'a> {
    rows.iter()
        .enumerate()
        .fold(CarryForward::default(), |acc, (index, row)| {
            acc.push(index, row, l1_column, l2_column)
        })
        .grouping
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(l1: &str, l2: &str, name: &str) -> RawRow {
        [("L1 metric", l1), ("L2 metric", l2), ("MTM", name)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_carry_forward_l1() {
        let rows = vec![
            row("Bookings", "", "Total Bookings"),
            row("", "Android", "Brand Android"),
            row("  ", "iOS", "Brand iOS"),
        ];
        let grouping = group_rows(&rows, "L1 metric", "L2 metric");

        assert_eq!(grouping.groups.len(), 1);
        let group = &grouping.groups[0];
        assert_eq!(group.label, "Bookings");
        assert_eq!(group.rows.len(), 3);
        assert!(!group.rows[0].l1_inherited);
        assert!(group.rows[1].l1_inherited);
        assert!(group.rows.iter().all(|r| r.l1 == "Bookings"));
    }

    #[test]
    fn test_leading_rows_without_l1_are_dropped() {
        let rows = vec![
            row("", "", "Orphan"),
            row("", "x", "Orphan 2"),
            row("Bookings", "", "Total"),
        ];
        let grouping = group_rows(&rows, "L1 metric", "L2 metric");

        assert_eq!(grouping.orphaned, vec![0, 1]);
        assert_eq!(grouping.row_count(), 1);
    }

    #[test]
    fn test_missing_l1_column_drops_everything() {
        let rows = vec![row("Bookings", "", "Total")];
        let grouping = group_rows(&rows, "Category", "L2 metric");

        assert!(grouping.groups.is_empty());
        assert_eq!(grouping.orphaned, vec![0]);
    }

    #[test]
    fn test_groups_keep_first_seen_order() {
        let rows = vec![
            row("Pricing", "", "Discount"),
            row("Bookings", "", "Total"),
            row("Pricing", "", "ATV"),
        ];
        let grouping = group_rows(&rows, "L1 metric", "L2 metric");

        let labels: Vec<&str> = grouping.groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["Pricing", "Bookings"]);
        let indices: Vec<usize> = grouping.groups[0].rows.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 2]);
    }

    #[test]
    fn test_blank_l2_falls_back_to_l1() {
        let rows = vec![row("Bookings", "", "Total"), row("", "Android", "Brand Android")];
        let grouping = group_rows(&rows, "L1 metric", "L2 metric");

        assert_eq!(grouping.groups[0].rows[0].l2, "Bookings");
        assert_eq!(grouping.groups[0].rows[1].l2, "Android");
    }

    #[test]
    fn test_sub_groups() {
        let rows = vec![
            row("Bookings", "Android", "A1"),
            row("", "iOS", "I1"),
            row("", "Android", "A2"),
        ];
        let grouping = group_rows(&rows, "L1 metric", "L2 metric");
        let subs = grouping.groups[0].sub_groups();

        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].label, "Android");
        assert_eq!(subs[0].rows.len(), 2);
        assert_eq!(subs[1].label, "iOS");
        // Parent keeps source order regardless of sub-grouping
        let names: Vec<&str> = grouping.groups[0]
            .rows
            .iter()
            .map(|r| r.row["MTM"].as_str())
            .collect();
        assert_eq!(names, vec!["A1", "I1", "A2"]);
    }
}
