//! Stateless helper utilities used by the layout engine and the writer.

use crate::conf::{
    N_BLOCKS_PER_GROUP, N_LEN_EXCEL_SHEET_NAME_MAX, N_ROW_IDX_BODY_START, N_ROWS_PER_CONDITION,
    TUP_EXCEL_ILLEGAL,
};
use crate::spec::{SpecAutofitCellsPolicy, TemplateError};

////////////////////////////////////////////////////////////////////////////////
// #region CellAddressing

/// Convert a zero-based column index to its letters (`0 -> A`, `26 -> AA`).
pub fn derive_column_letters(col_idx: usize) -> String {
    let mut l_chars = Vec::new();
    let mut n_rest = col_idx + 1;
    while n_rest > 0 {
        let n_digit = (n_rest - 1) % 26;
        l_chars.push(char::from(b'A' + n_digit as u8));
        n_rest = (n_rest - 1) / 26;
    }
    l_chars.iter().rev().collect()
}

/// A1 address of a zero-based cell (`(6, 7) -> H7`).
pub fn derive_cell_address(row_idx: usize, col_idx: usize) -> String {
    format!("{}{}", derive_column_letters(col_idx), row_idx + 1)
}

/// A1 range of zero-based inclusive corners (`C3:C6`).
pub fn derive_range_address(
    row_idx_start: usize,
    col_idx_start: usize,
    row_idx_end: usize,
    col_idx_end: usize,
) -> String {
    format!(
        "{}:{}",
        derive_cell_address(row_idx_start, col_idx_start),
        derive_cell_address(row_idx_end, col_idx_end)
    )
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region RowArithmetic

/// Rows spanned by one block.
pub fn calculate_block_height(conditions: usize) -> usize {
    conditions * N_ROWS_PER_CONDITION
}

/// First row index of antibody group `group_idx`.
pub fn calculate_group_start_row(group_idx: usize, conditions: usize) -> usize {
    N_ROW_IDX_BODY_START + group_idx * calculate_block_height(conditions) * N_BLOCKS_PER_GROUP
}

/// Last used row in 1-based numbering, header rows included.
pub fn calculate_n_rows_total(n_groups: usize, conditions: usize) -> usize {
    calculate_group_start_row(n_groups, conditions)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ConfigurationHelpers

/// Pair each antibody with a loading control.
///
/// Short lists are right-padded with their first entry. Returns the paired
/// list plus any entries beyond `n_antibodies`, which are not used.
pub fn broadcast_loading_controls(
    n_antibodies: usize,
    loading_controls: &[String],
) -> Result<(Vec<String>, Vec<String>), TemplateError> {
    let Some(c_first) = loading_controls.first() else {
        return Err(TemplateError::invalid(
            "loading_controls",
            "--loading-ctrl requires at least one value",
        ));
    };

    let n_keep = usize::min(n_antibodies, loading_controls.len());
    let mut l_paired = loading_controls[..n_keep].to_vec();
    l_paired.resize(n_antibodies, c_first.clone());
    let l_dropped = loading_controls[n_keep..].to_vec();

    Ok((l_paired, l_dropped))
}

/// Replace invalid chars and trim to valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    c_name = c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect();
    c_name = c_name.trim().trim_matches('\'').trim().to_string();
    if c_name.is_empty() {
        c_name = "Sheet".to_string();
    }

    c_name
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ColumnWidth

/// Validate autofit bounds.
pub fn validate_policy_autofit(policy_autofit: &SpecAutofitCellsPolicy) -> Result<(), String> {
    if policy_autofit.width_cell_min == 0 {
        return Err("policy_autofit.width_cell_min must be >= 1.".to_string());
    }
    if policy_autofit.width_cell_max < policy_autofit.width_cell_min {
        return Err(
            "policy_autofit.width_cell_max must be >= policy_autofit.width_cell_min.".to_string(),
        );
    }
    Ok(())
}

/// Estimate displayed width units for a text cell.
pub fn estimate_unicode_string_width(s: &str) -> usize {
    let n_ascii = s.chars().filter(|chr| chr.is_ascii()).count();
    let n_non_ascii = s.chars().count().saturating_sub(n_ascii);
    n_ascii + (n_non_ascii as f64 * 1.6).round() as usize
}

/// Final column width for `text` under `policy_autofit`, clamped to Excel's 255.
pub fn calculate_autofit_width(text: &str, policy_autofit: &SpecAutofitCellsPolicy) -> usize {
    let n_min = usize::max(1, policy_autofit.width_cell_min);
    let n_max = usize::min(255, usize::max(n_min, policy_autofit.width_cell_max));
    let n_width_recorded = estimate_unicode_string_width(text);
    usize::min(
        n_max,
        usize::max(n_min, n_width_recorded + policy_autofit.width_cell_padding),
    )
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    fn to_strings(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_column_letters() {
        assert_eq!(derive_column_letters(0), "A");
        assert_eq!(derive_column_letters(9), "J");
        assert_eq!(derive_column_letters(25), "Z");
        assert_eq!(derive_column_letters(26), "AA");
        assert_eq!(derive_column_letters(701), "ZZ");
        assert_eq!(derive_column_letters(702), "AAA");
    }

    #[test]
    fn test_cell_and_range_address() {
        assert_eq!(derive_cell_address(6, 7), "H7");
        assert_eq!(derive_range_address(2, 2, 5, 2), "C3:C6");
    }

    #[test]
    fn test_group_start_rows() {
        assert_eq!(calculate_group_start_row(0, 2), 2);
        assert_eq!(calculate_group_start_row(1, 2), 10);
        assert_eq!(calculate_group_start_row(1, 1), 6);
        assert_eq!(calculate_n_rows_total(1, 2), 10);
        assert_eq!(calculate_n_rows_total(3, 5), 2 + 3 * 5 * 4);
    }

    #[test]
    fn test_broadcast_single_loading_control() {
        let (l_paired, l_dropped) = broadcast_loading_controls(3, &to_strings(&["X"])).unwrap();
        assert_eq!(l_paired, to_strings(&["X", "X", "X"]));
        assert!(l_dropped.is_empty());
    }

    #[test]
    fn test_broadcast_pads_with_first_entry() {
        let (l_paired, _) = broadcast_loading_controls(4, &to_strings(&["X", "Y"])).unwrap();
        assert_eq!(l_paired, to_strings(&["X", "Y", "X", "X"]));
    }

    #[test]
    fn test_broadcast_reports_extra_entries() {
        let (l_paired, l_dropped) =
            broadcast_loading_controls(1, &to_strings(&["X", "Y", "Z"])).unwrap();
        assert_eq!(l_paired, to_strings(&["X"]));
        assert_eq!(l_dropped, to_strings(&["Y", "Z"]));
    }

    #[test]
    fn test_broadcast_does_not_touch_input() {
        let l_input = to_strings(&["X"]);
        let _ = broadcast_loading_controls(5, &l_input).unwrap();
        assert_eq!(l_input, to_strings(&["X"]));
    }

    #[test]
    fn test_broadcast_rejects_empty_list() {
        let err = broadcast_loading_controls(2, &[]).unwrap_err();
        assert!(matches!(
            err,
            TemplateError::InvalidConfiguration {
                field: "loading_controls",
                ..
            }
        ));
    }

    #[test]
    fn test_sanitize_sheet_name() {
        assert_eq!(sanitize_sheet_name("WB [run 1]", "_"), "WB _run 1_");
        assert_eq!(sanitize_sheet_name("   ", "_"), "Sheet");
        assert_eq!(sanitize_sheet_name(&"x".repeat(40), "_").len(), 31);
    }

    #[test]
    fn test_sanitize_sheet_name_never_ends_with_apostrophe() {
        let c_name = sanitize_sheet_name(&format!("{}'bbbb", "a".repeat(30)), "_");
        assert_eq!(c_name, "a".repeat(30));
        assert_eq!(sanitize_sheet_name("'Blot'", "_"), "Blot");
        assert_eq!(sanitize_sheet_name("''", "_"), "Sheet");
    }

    #[test]
    fn test_autofit_width_clamps() {
        let policy = SpecAutofitCellsPolicy::default();
        assert_eq!(calculate_autofit_width("S/B", &policy), 8);
        assert_eq!(calculate_autofit_width("Norm to loading ctrl", &policy), 22);
        assert_eq!(calculate_autofit_width(&"x".repeat(100), &policy), 60);
        assert!(validate_policy_autofit(&policy).is_ok());
    }
}
