//! XLSX writer kernel that turns buffered layout instructions into a workbook.

use std::collections::BTreeMap;
use std::path::PathBuf;

use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use tracing::info;

use crate::conf::{EnumFmtKey, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX};
use crate::sink::{EnumCellContent, MemorySink, TemplateSink};
use crate::spec::{SpecCellFormat, SpecMergeRange, SpecTemplateFormats, TemplateError};

/// Stateful template writer backed by `rust_xlsxwriter`.
///
/// Instructions are buffered in memory until [`Self::close`] is called, so a
/// row format assigned after its cells still reaches them.
pub struct XlsxTemplateWriter {
    path_file_out: PathBuf,
    formats: SpecTemplateFormats,
    sheet: MemorySink,
    if_closed: bool,
}

impl XlsxTemplateWriter {
    /// Create writer bound to output path and format presets.
    pub fn new(path_file_out: PathBuf, formats: SpecTemplateFormats) -> Self {
        Self {
            path_file_out,
            formats,
            sheet: MemorySink::new(),
            if_closed: false,
        }
    }

    /// Buffered instructions written so far.
    pub fn sheet(&self) -> &MemorySink {
        &self.sheet
    }

    /// Whether the workbook has been saved.
    pub fn is_closed(&self) -> bool {
        self.if_closed
    }

    /// Build the workbook and save it to disk. Idempotent.
    pub fn close(&mut self) -> Result<(), TemplateError> {
        if self.if_closed {
            return Ok(());
        }

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        write_sheet(worksheet, &self.sheet, &self.formats)?;
        workbook.save(&self.path_file_out)?;
        self.if_closed = true;

        info!(
            path = %self.path_file_out.display(),
            cells = self.sheet.cells().len(),
            merges = self.sheet.merges().len(),
            "workbook saved"
        );
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), TemplateError> {
        if self.if_closed {
            return Err(TemplateError::WriterClosed);
        }
        Ok(())
    }
}

impl TemplateSink for XlsxTemplateWriter {
    fn write_string(
        &mut self,
        row_idx: usize,
        col_idx: usize,
        text: &str,
    ) -> Result<(), TemplateError> {
        self.ensure_open()?;
        validate_cell_index(row_idx, col_idx)?;
        self.sheet.write_string(row_idx, col_idx, text)
    }

    fn write_formula(
        &mut self,
        row_idx: usize,
        col_idx: usize,
        formula: &str,
    ) -> Result<(), TemplateError> {
        self.ensure_open()?;
        validate_cell_index(row_idx, col_idx)?;
        self.sheet.write_formula(row_idx, col_idx, formula)
    }

    fn set_row_format(&mut self, row_idx: usize, fmt: EnumFmtKey) -> Result<(), TemplateError> {
        self.ensure_open()?;
        cast_row_num(row_idx)?;
        self.sheet.set_row_format(row_idx, fmt)
    }

    fn merge_range(&mut self, merge: &SpecMergeRange) -> Result<(), TemplateError> {
        self.ensure_open()?;
        validate_cell_index(merge.row_idx_end, merge.col_idx_end)?;
        self.sheet.merge_range(merge)
    }

    fn set_column_width(&mut self, col_idx: usize, width: usize) -> Result<(), TemplateError> {
        self.ensure_open()?;
        cast_col_num(col_idx)?;
        self.sheet.set_column_width(col_idx, width)
    }

    fn set_sheet_name(&mut self, name: &str) -> Result<(), TemplateError> {
        self.ensure_open()?;
        self.sheet.set_sheet_name(name)
    }
}

fn write_sheet(
    worksheet: &mut Worksheet,
    sheet: &MemorySink,
    formats: &SpecTemplateFormats,
) -> Result<(), TemplateError> {
    if let Some(name) = sheet.sheet_name() {
        worksheet.set_name(name)?;
    }

    let dict_fmt: BTreeMap<EnumFmtKey, Format> = EnumFmtKey::ALL
        .iter()
        .map(|key| (*key, derive_rust_xlsx_format(formats.get(*key))))
        .collect();

    for (col_idx, width) in sheet.column_widths() {
        worksheet.set_column_width(cast_col_num(*col_idx)?, *width as f64)?;
    }
    for (row_idx, key) in sheet.row_formats() {
        worksheet.set_row_format(cast_row_num(*row_idx)?, &dict_fmt[key])?;
    }

    for ((row_idx, col_idx), content) in sheet.cells() {
        let n_row = cast_row_num(*row_idx)?;
        let n_col = cast_col_num(*col_idx)?;
        let fmt_row = sheet.row_format(*row_idx).map(|key| &dict_fmt[&key]);

        match (content, fmt_row) {
            (EnumCellContent::String(val), Some(fmt)) => {
                worksheet.write_string_with_format(n_row, n_col, val, fmt)?;
            }
            (EnumCellContent::String(val), None) => {
                worksheet.write_string(n_row, n_col, val)?;
            }
            (EnumCellContent::Formula(val), Some(fmt)) => {
                worksheet.write_formula_with_format(n_row, n_col, val.as_str(), fmt)?;
            }
            (EnumCellContent::Formula(val), None) => {
                worksheet.write_formula(n_row, n_col, val.as_str())?;
            }
        }
    }

    for merge in sheet.merges() {
        worksheet.merge_range(
            cast_row_num(merge.row_idx_start)?,
            cast_col_num(merge.col_idx_start)?,
            cast_row_num(merge.row_idx_end)?,
            cast_col_num(merge.col_idx_end)?,
            &merge.text,
            &dict_fmt[&merge.fmt],
        )?;
    }

    Ok(())
}

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }
    if let Some(val) = &spec.valign
        && let Some(align) = derive_format_valign(val)
    {
        format = format.set_align(align);
    }

    if let Some(val) = spec.top {
        format = format.set_border_top(derive_format_border(val));
    }
    if let Some(val) = spec.bottom {
        format = format.set_border_bottom(derive_format_border(val));
    }
    if let Some(val) = spec.right {
        format = format.set_border_right(derive_format_border(val));
    }

    if spec.text_wrap.unwrap_or(false) {
        format = format.set_text_wrap();
    }

    format
}

fn derive_format_border(border: i64) -> FormatBorder {
    match border {
        1 => FormatBorder::Thin,
        6 => FormatBorder::Double,
        _ => FormatBorder::None,
    }
}

fn derive_format_valign(align: &str) -> Option<FormatAlign> {
    match align.trim().to_ascii_lowercase().as_str() {
        "vcenter" => Some(FormatAlign::VerticalCenter),
        _ => None,
    }
}

fn validate_cell_index(row_idx: usize, col_idx: usize) -> Result<(), TemplateError> {
    cast_row_num(row_idx)?;
    cast_col_num(col_idx)?;
    Ok(())
}

fn cast_row_num(value: usize) -> Result<u32, TemplateError> {
    if value >= N_NROWS_EXCEL_MAX {
        return Err(TemplateError::IndexOverflow { axis: "row", value });
    }
    u32::try_from(value).map_err(|_| TemplateError::IndexOverflow { axis: "row", value })
}

fn cast_col_num(value: usize) -> Result<u16, TemplateError> {
    if value >= N_NCOLS_EXCEL_MAX {
        return Err(TemplateError::IndexOverflow {
            axis: "column",
            value,
        });
    }
    u16::try_from(value).map_err(|_| TemplateError::IndexOverflow {
        axis: "column",
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_after_close_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = XlsxTemplateWriter::new(
            dir.path().join("closed.xlsx"),
            SpecTemplateFormats::default(),
        );
        writer.write_string(0, 0, "RPE-1 cells").unwrap();
        writer.close().unwrap();
        writer.close().unwrap();

        assert!(writer.is_closed());
        assert!(matches!(
            writer.write_string(1, 0, "late"),
            Err(TemplateError::WriterClosed)
        ));
    }

    #[test]
    fn test_index_overflow_is_reported() {
        let mut writer = XlsxTemplateWriter::new(
            PathBuf::from("unused.xlsx"),
            SpecTemplateFormats::default(),
        );
        let err = writer
            .write_formula(N_NROWS_EXCEL_MAX, 0, "=A1")
            .unwrap_err();
        assert_eq!(err.to_string(), format!("row index overflow: {N_NROWS_EXCEL_MAX}"));
        assert!(writer.sheet().cells().is_empty());
    }

    #[test]
    fn test_border_codes_match_xlsxwriter_table() {
        assert_eq!(derive_format_border(1), FormatBorder::Thin);
        assert_eq!(derive_format_border(6), FormatBorder::Double);
        assert_eq!(derive_format_border(2), FormatBorder::None);
        assert_eq!(
            derive_format_valign(" VCenter "),
            Some(FormatAlign::VerticalCenter)
        );
    }

    #[test]
    fn test_close_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = XlsxTemplateWriter::new(
            dir.path().join("missing").join("out.xlsx"),
            SpecTemplateFormats::default(),
        );
        writer.write_string(0, 0, "RPE-1 cells").unwrap();

        assert!(matches!(writer.close(), Err(TemplateError::Xlsx(_))));
        assert!(!writer.is_closed());
    }
}
