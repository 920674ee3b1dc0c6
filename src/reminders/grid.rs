use serde::{Deserialize, Serialize};

use crate::models::reminder::{ReminderDraft, ReminderRecord};
use crate::models::zone::PLACEHOLDER_ZONE;

/// One editable row: a zone selection, the reminder text and the hidden id.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct GridRow {
    pub map_id: u32,
    pub text: String,
    pub id: u32,
}

impl GridRow {
    pub fn new(map_id: u32, text: impl Into<String>) -> Self {
        Self {
            map_id,
            text: text.into(),
            id: 0,
        }
    }

    fn is_blank(&self) -> bool {
        self.map_id == PLACEHOLDER_ZONE && self.text.trim().is_empty()
    }
}

impl From<&ReminderRecord> for GridRow {
    fn from(record: &ReminderRecord) -> Self {
        Self {
            map_id: record.map_id,
            text: record.text.to_string(),
            id: record.id,
        }
    }
}

#[derive(strum_macros::Display, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowProblem {
    #[strum(serialize = "no zone selected")]
    MissingZone,
    #[strum(serialize = "reminder text is blank")]
    BlankText,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RowIssue {
    pub row: usize,
    pub problem: RowProblem,
}

impl std::fmt::Display for RowIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "row {}: {}", self.row + 1, self.problem)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowCollection {
    pub drafts: Vec<ReminderDraft>,
    pub issues: Vec<RowIssue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditGrid {
    rows: Vec<GridRow>,
}

impl EditGrid {
    // A fresh grid shows one empty row
    pub fn new() -> Self {
        Self {
            rows: vec![GridRow::default()],
        }
    }

    pub fn load(&mut self, records: &[ReminderRecord]) {
        self.rows = records.iter().map(GridRow::from).collect();
    }

    pub fn rows(&self) -> &[GridRow] {
        &self.rows
    }

    pub fn append_row(&mut self, row: GridRow) {
        self.rows.push(row);
    }

    pub fn remove_row(&mut self, index: usize) -> Option<GridRow> {
        if index < self.rows.len() {
            Some(self.rows.remove(index))
        } else {
            None
        }
    }

    pub fn replace_rows(&mut self, rows: Vec<GridRow>) {
        self.rows = rows;
    }

    /// Trims text and keeps rows that have both a zone and some text.
    /// Untouched rows are ignored; half-filled ones are reported.
    pub fn collect(&self) -> RowCollection {
        let mut collection = RowCollection::default();
        for (row, entry) in self.rows.iter().enumerate() {
            if entry.is_blank() {
                continue;
            }
            let text = entry.text.trim();
            if entry.map_id == PLACEHOLDER_ZONE {
                collection.issues.push(RowIssue {
                    row,
                    problem: RowProblem::MissingZone,
                });
            } else if text.is_empty() {
                collection.issues.push(RowIssue {
                    row,
                    problem: RowProblem::BlankText,
                });
            } else {
                collection.drafts.push(ReminderDraft::new(entry.map_id, text));
            }
        }
        collection
    }
}

impl Default for EditGrid {
    fn default() -> Self {
        EditGrid::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_replaces_rows_and_keeps_ids() {
        let mut grid = EditGrid::new();
        grid.load(&[ReminderRecord::new(15, "a", 7), ReminderRecord::new(50, "b", 8)]);
        assert_eq!(grid.rows().len(), 2);
        assert_eq!(grid.rows()[1].id, 8);
    }

    #[test]
    fn collect_trims_and_skips_untouched_rows() {
        let mut grid = EditGrid::new();
        grid.append_row(GridRow::new(15, "  buy kits  "));
        grid.append_row(GridRow::new(0, "   "));
        let collection = grid.collect();
        assert_eq!(collection.drafts, vec![ReminderDraft::new(15, "buy kits")]);
        assert!(collection.issues.is_empty());
    }

    #[test]
    fn half_filled_rows_are_reported() {
        let mut grid = EditGrid::new();
        grid.replace_rows(vec![
            GridRow::new(0, "no zone"),
            GridRow::new(15, " "),
            GridRow::new(23, "fine"),
        ]);
        let collection = grid.collect();
        assert_eq!(collection.drafts.len(), 1);
        assert_eq!(
            collection.issues,
            vec![
                RowIssue {
                    row: 0,
                    problem: RowProblem::MissingZone
                },
                RowIssue {
                    row: 1,
                    problem: RowProblem::BlankText
                },
            ]
        );
        assert_eq!(collection.issues[0].to_string(), "row 1: no zone selected");
    }

    #[test]
    fn remove_row_out_of_range_is_none() {
        let mut grid = EditGrid::new();
        assert!(grid.remove_row(3).is_none());
        assert!(grid.remove_row(0).is_some());
        assert!(grid.rows().is_empty());
    }
}
