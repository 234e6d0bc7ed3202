//! Template constants and default format presets.

use crate::spec::{SpecCellFormat, SpecTemplateFormats};

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Excel maximum characters in one cell string.
pub const N_LEN_EXCEL_STRING_MAX: usize = 32_767;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];

////////////////////////////////////////////////////////////////////////////////
// #region RowLayout

/// Zero-based row of the title cell.
pub const N_ROW_IDX_TITLE: usize = 0;
/// Zero-based row of the column header line.
pub const N_ROW_IDX_HEADER: usize = 1;
/// Zero-based row where the first block starts (row 3 in A1 notation).
pub const N_ROW_IDX_BODY_START: usize = 2;
/// Rows per condition pair: sample row, then background row.
pub const N_ROWS_PER_CONDITION: usize = 2;
/// Blocks per antibody group: loading control, then antibody.
pub const N_BLOCKS_PER_GROUP: usize = 2;

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Defaults

/// Title written to `A1`.
pub const C_TITLE_DEFAULT: &str = "RPE-1 cells";
/// Default number of conditions.
pub const N_CONDITIONS_DEFAULT: i64 = 2;
/// Default antibody name.
pub const C_ANTIBODY_DEFAULT: &str = "Ab1";
/// Default loading-control name.
pub const C_LOADING_CTRL_DEFAULT: &str = "GAPDH";
/// Marker written to column `D` of a sample row.
pub const C_MARKER_SAMPLE: &str = "S";
/// Marker written to column `D` of a background row.
pub const C_MARKER_BACKGROUND: &str = "B";

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Columns

/// Template columns `A..J` in sheet order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EnumTemplateColumn {
    /// `A`: condition label.
    Condition,
    /// `B`: amount of lysate, filled in by hand.
    AmtLysate,
    /// `C`: merged antibody/loading-control label.
    Antibody,
    /// `D`: `S`/`B` marker.
    SampleBackground,
    /// `E`: measured area.
    Area,
    /// `F`: measured mean gray value.
    MeanGray,
    /// `G`: integrated density (`Area * Mean gray`).
    IntDen,
    /// `H`: background-subtracted signal.
    BkgdSubtract,
    /// `I`: ratio to the matching loading-control row.
    NormLoadingCtrl,
    /// `J`: ratio to the positive control, filled in by hand.
    NormPositiveCtrl,
}

impl EnumTemplateColumn {
    /// All columns, left to right.
    pub const ALL: [EnumTemplateColumn; 10] = [
        Self::Condition,
        Self::AmtLysate,
        Self::Antibody,
        Self::SampleBackground,
        Self::Area,
        Self::MeanGray,
        Self::IntDen,
        Self::BkgdSubtract,
        Self::NormLoadingCtrl,
        Self::NormPositiveCtrl,
    ];

    /// Zero-based column index.
    pub fn col_idx(self) -> usize {
        self as usize
    }

    /// Header text on row 2.
    pub fn header(self) -> &'static str {
        match self {
            Self::Condition => "Condition",
            Self::AmtLysate => "Amt lysate",
            Self::Antibody => "Antibody",
            Self::SampleBackground => "S/B",
            Self::Area => "Area",
            Self::MeanGray => "Mean gray",
            Self::IntDen => "IntDen",
            Self::BkgdSubtract => "Bkgd subtract",
            Self::NormLoadingCtrl => "Norm to loading ctrl",
            Self::NormPositiveCtrl => "Norm to (+) ctrl",
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FormatPresets

/// Canonical format preset keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EnumFmtKey {
    /// Column header row.
    Header,
    /// Background row between two condition pairs.
    ConditionEnd,
    /// Last row of a block.
    BlockEnd,
    /// Merged label cell in column `C`.
    Merge,
}

impl EnumFmtKey {
    /// Every preset key.
    pub const ALL: [EnumFmtKey; 4] = [
        Self::Header,
        Self::ConditionEnd,
        Self::BlockEnd,
        Self::Merge,
    ];
}

/// Build default format presets used by [`crate::writer::XlsxTemplateWriter`].
///
/// Border codes follow the xlsxwriter index table: `1` is thin, `6` is the
/// double line used to close a block.
pub fn derive_default_template_formats() -> SpecTemplateFormats {
    let cfg_base_fmt_spec = SpecCellFormat::default();

    SpecTemplateFormats {
        header: cfg_base_fmt_spec.with_(SpecCellFormat {
            bold: Some(true),
            bottom: Some(6),
            right: Some(1),
            top: Some(1),
            text_wrap: Some(true),
            ..Default::default()
        }),
        condition_end: cfg_base_fmt_spec.with_(SpecCellFormat {
            bottom: Some(1),
            ..Default::default()
        }),
        block_end: cfg_base_fmt_spec.with_(SpecCellFormat {
            bottom: Some(6),
            ..Default::default()
        }),
        merge: cfg_base_fmt_spec.with_(SpecCellFormat {
            valign: Some("vcenter".to_string()),
            bottom: Some(6),
            ..Default::default()
        }),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_are_dense_and_ordered() {
        for (n_idx, col) in EnumTemplateColumn::ALL.iter().enumerate() {
            assert_eq!(col.col_idx(), n_idx);
        }
        assert_eq!(EnumTemplateColumn::NormPositiveCtrl.col_idx(), 9);
    }

    #[test]
    fn test_default_formats_close_blocks_with_double_bottom() {
        let fmts = derive_default_template_formats();
        assert_eq!(fmts.get(EnumFmtKey::BlockEnd).bottom, Some(6));
        assert_eq!(fmts.get(EnumFmtKey::Merge).bottom, Some(6));
        assert_eq!(fmts.get(EnumFmtKey::ConditionEnd).bottom, Some(1));
        assert_eq!(fmts.get(EnumFmtKey::Header).bold, Some(true));
        assert_eq!(fmts.get(EnumFmtKey::Header).text_wrap, Some(true));
    }
}
