//! Spreadsheet sink capability and the in-memory sheet buffer.

use std::collections::BTreeMap;

use crate::conf::EnumFmtKey;
use crate::spec::{SpecMergeRange, TemplateError};
use crate::util::derive_range_address;

/// Content of one written cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumCellContent {
    /// Literal text.
    String(String),
    /// Formula text, including the leading `=`.
    Formula(String),
}

/// Destination for layout instructions.
///
/// Indices are zero-based. Implementations decide when instructions reach
/// persistent storage.
pub trait TemplateSink {
    /// Write literal text.
    fn write_string(
        &mut self,
        row_idx: usize,
        col_idx: usize,
        text: &str,
    ) -> Result<(), TemplateError>;

    /// Write a formula such as `=E3*F3`.
    fn write_formula(
        &mut self,
        row_idx: usize,
        col_idx: usize,
        formula: &str,
    ) -> Result<(), TemplateError>;

    /// Assign a row format. A later call for the same row replaces the earlier one.
    fn set_row_format(&mut self, row_idx: usize, fmt: EnumFmtKey) -> Result<(), TemplateError>;

    /// Declare a merged range holding `merge.text`.
    fn merge_range(&mut self, merge: &SpecMergeRange) -> Result<(), TemplateError>;

    /// Set a column width in character units.
    fn set_column_width(&mut self, col_idx: usize, width: usize) -> Result<(), TemplateError>;

    /// Name the worksheet.
    fn set_sheet_name(&mut self, name: &str) -> Result<(), TemplateError>;
}

/// In-memory sheet buffer.
///
/// Used directly by tests and as the staging area of
/// [`crate::writer::XlsxTemplateWriter`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySink {
    cells: BTreeMap<(usize, usize), EnumCellContent>,
    row_formats: BTreeMap<usize, EnumFmtKey>,
    merges: Vec<SpecMergeRange>,
    column_widths: BTreeMap<usize, usize>,
    sheet_name: Option<String>,
}

impl MemorySink {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Content written at a cell, if any.
    pub fn cell(&self, row_idx: usize, col_idx: usize) -> Option<&EnumCellContent> {
        self.cells.get(&(row_idx, col_idx))
    }

    /// Text written at a cell, if it is a literal.
    pub fn text(&self, row_idx: usize, col_idx: usize) -> Option<&str> {
        match self.cell(row_idx, col_idx) {
            Some(EnumCellContent::String(val)) => Some(val),
            _ => None,
        }
    }

    /// Formula written at a cell, if it is a formula.
    pub fn formula(&self, row_idx: usize, col_idx: usize) -> Option<&str> {
        match self.cell(row_idx, col_idx) {
            Some(EnumCellContent::Formula(val)) => Some(val),
            _ => None,
        }
    }

    /// All written cells ordered by `(row, col)`.
    pub fn cells(&self) -> &BTreeMap<(usize, usize), EnumCellContent> {
        &self.cells
    }

    /// Final format of a row.
    pub fn row_format(&self, row_idx: usize) -> Option<EnumFmtKey> {
        self.row_formats.get(&row_idx).copied()
    }

    /// Final row formats ordered by row.
    pub fn row_formats(&self) -> &BTreeMap<usize, EnumFmtKey> {
        &self.row_formats
    }

    /// Merge declarations in emission order.
    pub fn merges(&self) -> &[SpecMergeRange] {
        &self.merges
    }

    /// Column widths ordered by column.
    pub fn column_widths(&self) -> &BTreeMap<usize, usize> {
        &self.column_widths
    }

    /// Worksheet name, if one was set.
    pub fn sheet_name(&self) -> Option<&str> {
        self.sheet_name.as_deref()
    }

    /// Highest row index touched by a cell, a row format or a merge.
    pub fn row_idx_max(&self) -> Option<usize> {
        let n_cells = self.cells.keys().map(|(row_idx, _)| *row_idx).max();
        let n_fmts = self.row_formats.keys().max().copied();
        let n_merges = self.merges.iter().map(|merge| merge.row_idx_end).max();
        [n_cells, n_fmts, n_merges].into_iter().flatten().max()
    }
}

impl TemplateSink for MemorySink {
    fn write_string(
        &mut self,
        row_idx: usize,
        col_idx: usize,
        text: &str,
    ) -> Result<(), TemplateError> {
        self.cells.insert(
            (row_idx, col_idx),
            EnumCellContent::String(text.to_string()),
        );
        Ok(())
    }

    fn write_formula(
        &mut self,
        row_idx: usize,
        col_idx: usize,
        formula: &str,
    ) -> Result<(), TemplateError> {
        self.cells.insert(
            (row_idx, col_idx),
            EnumCellContent::Formula(formula.to_string()),
        );
        Ok(())
    }

    fn set_row_format(&mut self, row_idx: usize, fmt: EnumFmtKey) -> Result<(), TemplateError> {
        self.row_formats.insert(row_idx, fmt);
        Ok(())
    }

    fn merge_range(&mut self, merge: &SpecMergeRange) -> Result<(), TemplateError> {
        if let Some(existing) = self.merges.iter().find(|existing| existing.overlaps(merge)) {
            return Err(TemplateError::MergeOverlap {
                range_new: derive_range_address(
                    merge.row_idx_start,
                    merge.col_idx_start,
                    merge.row_idx_end,
                    merge.col_idx_end,
                ),
                range_existing: derive_range_address(
                    existing.row_idx_start,
                    existing.col_idx_start,
                    existing.row_idx_end,
                    existing.col_idx_end,
                ),
            });
        }
        self.merges.push(merge.clone());
        Ok(())
    }

    fn set_column_width(&mut self, col_idx: usize, width: usize) -> Result<(), TemplateError> {
        self.column_widths.insert(col_idx, width);
        Ok(())
    }

    fn set_sheet_name(&mut self, name: &str) -> Result<(), TemplateError> {
        self.sheet_name = Some(name.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn merge_c(row_idx_start: usize, row_idx_end: usize, text: &str) -> SpecMergeRange {
        SpecMergeRange {
            row_idx_start,
            col_idx_start: 2,
            row_idx_end,
            col_idx_end: 2,
            text: text.to_string(),
            fmt: EnumFmtKey::Merge,
        }
    }

    #[test]
    fn test_memory_sink_last_row_format_wins() {
        let mut sink = MemorySink::new();
        sink.set_row_format(5, EnumFmtKey::ConditionEnd).unwrap();
        sink.set_row_format(5, EnumFmtKey::BlockEnd).unwrap();
        assert_eq!(sink.row_format(5), Some(EnumFmtKey::BlockEnd));
        assert_eq!(sink.row_format(4), None);
    }

    #[test]
    fn test_memory_sink_separates_text_and_formula() {
        let mut sink = MemorySink::new();
        sink.write_string(2, 3, "S").unwrap();
        sink.write_formula(2, 6, "=E3*F3").unwrap();
        assert_eq!(sink.text(2, 3), Some("S"));
        assert_eq!(sink.formula(2, 3), None);
        assert_eq!(sink.formula(2, 6), Some("=E3*F3"));
        assert_eq!(sink.row_idx_max(), Some(2));
    }

    #[test]
    fn test_memory_sink_rejects_overlapping_merge() {
        let mut sink = MemorySink::new();
        sink.merge_range(&merge_c(2, 5, "GAPDH")).unwrap();
        sink.merge_range(&merge_c(6, 9, "Ab1")).unwrap();

        let err = sink.merge_range(&merge_c(9, 12, "Ab2")).unwrap_err();
        assert_eq!(err.to_string(), "merge range C10:C13 overlaps C7:C10");
        assert_eq!(sink.merges().len(), 2);
    }
}
