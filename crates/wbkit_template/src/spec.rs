//! Template specification models and the crate error type.

use thiserror::Error;

use crate::conf::{
    C_ANTIBODY_DEFAULT, C_LOADING_CTRL_DEFAULT, C_TITLE_DEFAULT, EnumFmtKey, N_CONDITIONS_DEFAULT,
    N_ROWS_PER_CONDITION, derive_default_template_formats,
};

////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Cell format specification, one optional field per xlsxwriter property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Bold style.
    pub bold: Option<bool>,
    /// Vertical alignment.
    pub valign: Option<String>,
    /// Text wrap.
    pub text_wrap: Option<bool>,

    /// Top border override.
    pub top: Option<i64>,
    /// Bottom border override.
    pub bottom: Option<i64>,
    /// Right border override.
    pub right: Option<i64>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            bold: other.bold.or(self.bold),
            valign: other.valign.clone().or_else(|| self.valign.clone()),
            text_wrap: other.text_wrap.or(self.text_wrap),
            top: other.top.or(self.top),
            bottom: other.bottom.or(self.bottom),
            right: other.right.or(self.right),
        }
    }
}

/// The four named presets a template uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecTemplateFormats {
    /// Header row (row 2).
    pub header: SpecCellFormat,
    /// Background row between condition pairs.
    pub condition_end: SpecCellFormat,
    /// Last row of every block.
    pub block_end: SpecCellFormat,
    /// Merged label cell in column `C`.
    pub merge: SpecCellFormat,
}

impl SpecTemplateFormats {
    /// Resolve a preset by key.
    pub fn get(&self, key: EnumFmtKey) -> &SpecCellFormat {
        match key {
            EnumFmtKey::Header => &self.header,
            EnumFmtKey::ConditionEnd => &self.condition_end,
            EnumFmtKey::BlockEnd => &self.block_end,
            EnumFmtKey::Merge => &self.merge,
        }
    }
}

impl Default for SpecTemplateFormats {
    fn default() -> Self {
        derive_default_template_formats()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ConfigurationSpecification

/// Raw, unvalidated template inputs as they arrive from a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecTemplateArgs {
    /// Requested number of conditions; must be `> 0`.
    pub conditions: i64,
    /// Antibody names in sheet order.
    pub antibodies: Vec<String>,
    /// Loading-control names; a short list is broadcast from its first entry.
    pub loading_controls: Vec<String>,
    /// Title text for `A1`.
    pub title: String,
    /// Optional worksheet name.
    pub sheet_name: Option<String>,
}

impl Default for SpecTemplateArgs {
    fn default() -> Self {
        Self {
            conditions: N_CONDITIONS_DEFAULT,
            antibodies: vec![C_ANTIBODY_DEFAULT.to_string()],
            loading_controls: vec![C_LOADING_CTRL_DEFAULT.to_string()],
            title: C_TITLE_DEFAULT.to_string(),
            sheet_name: None,
        }
    }
}

/// Validated template configuration.
///
/// `loading_controls.len() == antibodies.len()` always holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecTemplateConfig {
    /// Number of conditions per block (`>= 1`).
    pub conditions: usize,
    /// Antibody names in sheet order.
    pub antibodies: Vec<String>,
    /// Loading control paired with each antibody.
    pub loading_controls: Vec<String>,
    /// Title text for `A1`.
    pub title: String,
    /// Sanitized worksheet name.
    pub sheet_name: Option<String>,
    /// Loading controls given beyond the antibody count, not used.
    pub loading_controls_dropped: Vec<String>,
}

impl SpecTemplateConfig {
    /// Number of antibody groups.
    pub fn n_groups(&self) -> usize {
        self.antibodies.len()
    }

    /// `(antibody, loading_control)` pairs in sheet order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.antibodies
            .iter()
            .map(String::as_str)
            .zip(self.loading_controls.iter().map(String::as_str))
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region LayoutSpecification

/// Which label a block carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumBlockKind {
    /// Loading-control block, written first in each group.
    LoadingControl,
    /// Antibody block, normalized against the loading-control block above it.
    Antibody,
}

/// One planned block of rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecRowBlock {
    /// Block kind.
    pub kind: EnumBlockKind,
    /// Zero-based antibody group index.
    pub group_idx: usize,
    /// Text merged into column `C`.
    pub label: String,
    /// Number of condition pairs in the block.
    pub conditions: usize,
    /// First row index (inclusive).
    pub row_idx_start: usize,
    /// Last row index (inclusive).
    pub row_idx_end: usize,
}

impl SpecRowBlock {
    /// Row count of the block.
    pub fn n_rows(&self) -> usize {
        self.row_idx_end + 1 - self.row_idx_start
    }

    /// Sample row index for `condition_idx`.
    pub fn row_idx_sample(&self, condition_idx: usize) -> usize {
        self.row_idx_start + condition_idx * N_ROWS_PER_CONDITION
    }
}

/// One sample/background row pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecRowPair {
    /// Zero-based condition index; labelled `Condition {condition_idx + 1}`.
    pub condition_idx: usize,
    /// Sample row index.
    pub row_idx_sample: usize,
    /// Background row index, always `row_idx_sample + 1`.
    pub row_idx_background: usize,
    /// Row format applied to the background row.
    pub fmt_background: EnumFmtKey,
    /// Sample row whose column `H` this pair is normalized against.
    pub row_idx_norm_target: Option<usize>,
}

/// Merged range declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecMergeRange {
    /// First row index (inclusive).
    pub row_idx_start: usize,
    /// First column index (inclusive).
    pub col_idx_start: usize,
    /// Last row index (inclusive).
    pub row_idx_end: usize,
    /// Last column index (inclusive).
    pub col_idx_end: usize,
    /// Merge display text.
    pub text: String,
    /// Format preset of the merged cell.
    pub fmt: EnumFmtKey,
}

impl SpecMergeRange {
    /// Whether two ranges share at least one cell.
    pub fn overlaps(&self, other: &SpecMergeRange) -> bool {
        self.row_idx_start <= other.row_idx_end
            && other.row_idx_start <= self.row_idx_end
            && self.col_idx_start <= other.col_idx_end
            && other.col_idx_start <= self.col_idx_end
    }
}

/// Autofit policy for header-driven column widths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecAutofitCellsPolicy {
    /// Minimum final width.
    pub width_cell_min: usize,
    /// Maximum final width.
    pub width_cell_max: usize,
    /// Width padding added after inference.
    pub width_cell_padding: usize,
}

impl Default for SpecAutofitCellsPolicy {
    fn default() -> Self {
        Self {
            width_cell_min: 8,
            width_cell_max: 60,
            width_cell_padding: 2,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// Summary of one `generate_template` run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecTemplateReport {
    /// Number of antibody groups written.
    pub n_groups: usize,
    /// Last used row in 1-based sheet numbering (header rows included).
    pub n_rows_total: usize,
    /// Blocks in emission order.
    pub blocks: Vec<SpecRowBlock>,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecTemplateReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Errors raised while resolving, laying out or saving a template.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// An input field failed validation.
    #[error("{message}")]
    InvalidConfiguration {
        /// Offending field name.
        field: &'static str,
        /// User-facing message.
        message: String,
    },
    /// Row/column index does not fit the xlsx index types.
    #[error("{axis} index overflow: {value}")]
    IndexOverflow {
        /// `row` or `column`.
        axis: &'static str,
        /// Offending index.
        value: usize,
    },
    /// A merge declaration overlaps an earlier one.
    #[error("merge range {range_new} overlaps {range_existing}")]
    MergeOverlap {
        /// A1 range of the rejected merge.
        range_new: String,
        /// A1 range already declared.
        range_existing: String,
    },
    /// Sink was used after `close()`.
    #[error("cannot write after close()")]
    WriterClosed,
    /// Error reported by `rust_xlsxwriter`.
    #[error("xlsx write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

impl TemplateError {
    /// Shorthand for [`TemplateError::InvalidConfiguration`].
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            field,
            message: message.into(),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
