//! Row-layout engine: configuration resolver, header, row pairs and blocks.
//!
//! Every instruction goes through a [`TemplateSink`]; the engine never opens
//! or closes files.

use tracing::{debug, info, warn};

use crate::conf::{
    C_MARKER_BACKGROUND, C_MARKER_SAMPLE, EnumFmtKey, EnumTemplateColumn, N_BLOCKS_PER_GROUP,
    N_LEN_EXCEL_STRING_MAX, N_NROWS_EXCEL_MAX, N_ROW_IDX_BODY_START, N_ROW_IDX_HEADER,
    N_ROW_IDX_TITLE, N_ROWS_PER_CONDITION,
};
use crate::sink::TemplateSink;
use crate::spec::{
    EnumBlockKind, SpecAutofitCellsPolicy, SpecMergeRange, SpecRowBlock, SpecRowPair,
    SpecTemplateArgs, SpecTemplateConfig, SpecTemplateReport, TemplateError,
};
use crate::util::{
    broadcast_loading_controls, calculate_autofit_width, calculate_block_height,
    calculate_group_start_row, calculate_n_rows_total, derive_cell_address, derive_range_address,
    sanitize_sheet_name, validate_policy_autofit,
};

////////////////////////////////////////////////////////////////////////////////
// #region ConfigurationResolver

/// Validate raw inputs and pair every antibody with a loading control.
///
/// Runs before any sink exists, so a rejected configuration never leaves a
/// file behind.
pub fn resolve_template_config(
    args: &SpecTemplateArgs,
) -> Result<SpecTemplateConfig, TemplateError> {
    if args.conditions <= 0 {
        return Err(TemplateError::invalid(
            "conditions",
            "--conditions must be greater than 0",
        ));
    }
    let n_conditions = usize::try_from(args.conditions).map_err(|_| {
        TemplateError::invalid("conditions", "--conditions does not fit this platform")
    })?;

    if args.antibodies.is_empty() {
        return Err(TemplateError::invalid(
            "antibodies",
            "--ab requires at least one value",
        ));
    }

    let n_rows_total = args
        .antibodies
        .len()
        .checked_mul(n_conditions)
        .and_then(|val| val.checked_mul(N_ROWS_PER_CONDITION * N_BLOCKS_PER_GROUP))
        .and_then(|val| val.checked_add(N_ROW_IDX_BODY_START));
    if n_rows_total.is_none_or(|val| val > N_NROWS_EXCEL_MAX) {
        return Err(TemplateError::invalid(
            "conditions",
            format!(
                "--conditions={} with {} antibodies exceeds Excel's {N_NROWS_EXCEL_MAX} rows",
                args.conditions,
                args.antibodies.len()
            ),
        ));
    }

    validate_cell_text("title", "--title", &args.title)?;
    for c_antibody in &args.antibodies {
        validate_cell_text("antibodies", "--ab", c_antibody)?;
    }
    for c_loading_ctrl in &args.loading_controls {
        validate_cell_text("loading_controls", "--loading-ctrl", c_loading_ctrl)?;
    }

    let (l_loading_controls, l_dropped) =
        broadcast_loading_controls(args.antibodies.len(), &args.loading_controls)?;
    if !l_dropped.is_empty() {
        warn!(
            dropped = ?l_dropped,
            "more loading controls than antibodies; extra entries are ignored"
        );
    }

    Ok(SpecTemplateConfig {
        conditions: n_conditions,
        antibodies: args.antibodies.clone(),
        loading_controls: l_loading_controls,
        title: args.title.clone(),
        sheet_name: args
            .sheet_name
            .as_deref()
            .map(|name| sanitize_sheet_name(name, "_")),
        loading_controls_dropped: l_dropped,
    })
}

fn validate_cell_text(field: &'static str, flag: &str, text: &str) -> Result<(), TemplateError> {
    let n_len = text.chars().count();
    if n_len > N_LEN_EXCEL_STRING_MAX {
        return Err(TemplateError::invalid(
            field,
            format!("{flag} has {n_len} characters; Excel allows {N_LEN_EXCEL_STRING_MAX}"),
        ));
    }
    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region HeaderWriter

/// Write the title cell, the ten column headers and the header row format.
///
/// Column widths follow the header text under `policy_autofit`.
pub fn write_header<S: TemplateSink + ?Sized>(
    sink: &mut S,
    title: &str,
    policy_autofit: &SpecAutofitCellsPolicy,
) -> Result<(), TemplateError> {
    validate_policy_autofit(policy_autofit)
        .map_err(|msg| TemplateError::invalid("policy_autofit", msg))?;

    sink.write_string(
        N_ROW_IDX_TITLE,
        EnumTemplateColumn::Condition.col_idx(),
        title,
    )?;
    for col in EnumTemplateColumn::ALL {
        sink.write_string(N_ROW_IDX_HEADER, col.col_idx(), col.header())?;
        sink.set_column_width(
            col.col_idx(),
            calculate_autofit_width(col.header(), policy_autofit),
        )?;
    }
    sink.set_row_format(N_ROW_IDX_HEADER, EnumFmtKey::Header)?;
    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region RowPairWriter

/// Write one sample/background pair.
///
/// Column `H` is computed on the sample row only.
pub fn write_row_pair<S: TemplateSink + ?Sized>(
    sink: &mut S,
    pair: &SpecRowPair,
) -> Result<(), TemplateError> {
    let SpecRowPair {
        condition_idx,
        row_idx_sample: n_row_s,
        row_idx_background: n_row_b,
        fmt_background,
        row_idx_norm_target,
    } = *pair;

    let col_area = EnumTemplateColumn::Area.col_idx();
    let col_gray = EnumTemplateColumn::MeanGray.col_idx();
    let col_intden = EnumTemplateColumn::IntDen.col_idx();
    let col_bkgd = EnumTemplateColumn::BkgdSubtract.col_idx();
    let col_marker = EnumTemplateColumn::SampleBackground.col_idx();

    sink.write_string(
        n_row_s,
        EnumTemplateColumn::Condition.col_idx(),
        &format!("Condition {}", condition_idx + 1),
    )?;
    sink.write_string(n_row_s, col_marker, C_MARKER_SAMPLE)?;
    sink.write_string(n_row_b, col_marker, C_MARKER_BACKGROUND)?;

    for n_row in [n_row_s, n_row_b] {
        sink.write_formula(
            n_row,
            col_intden,
            &format!(
                "={}*{}",
                derive_cell_address(n_row, col_area),
                derive_cell_address(n_row, col_gray)
            ),
        )?;
    }
    sink.write_formula(
        n_row_s,
        col_bkgd,
        &format!(
            "={}-{}",
            derive_cell_address(n_row_s, col_intden),
            derive_cell_address(n_row_b, col_intden)
        ),
    )?;
    sink.set_row_format(n_row_b, fmt_background)?;

    if let Some(n_row_target) = row_idx_norm_target {
        sink.write_formula(
            n_row_s,
            EnumTemplateColumn::NormLoadingCtrl.col_idx(),
            &format!(
                "={}/{}",
                derive_cell_address(n_row_s, col_bkgd),
                derive_cell_address(n_row_target, col_bkgd)
            ),
        )?;
    }
    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region BlockEmitter

/// Plan every block: per group, the loading-control block then the antibody block.
pub fn plan_row_blocks(config: &SpecTemplateConfig) -> Vec<SpecRowBlock> {
    let n_block_height = calculate_block_height(config.conditions);
    let mut l_blocks = Vec::with_capacity(config.n_groups() * N_BLOCKS_PER_GROUP);

    for (group_idx, (c_antibody, c_loading_ctrl)) in config.pairs().enumerate() {
        let mut n_row_cursor = calculate_group_start_row(group_idx, config.conditions);
        for (kind, label) in [
            (EnumBlockKind::LoadingControl, c_loading_ctrl),
            (EnumBlockKind::Antibody, c_antibody),
        ] {
            l_blocks.push(SpecRowBlock {
                kind,
                group_idx,
                label: label.to_string(),
                conditions: config.conditions,
                row_idx_start: n_row_cursor,
                row_idx_end: n_row_cursor + n_block_height - 1,
            });
            n_row_cursor += n_block_height;
        }
    }

    l_blocks
}

/// Emit one block and return its sample rows, indexed by condition.
///
/// `rows_norm_target[i]` is the sample row that condition `i` divides by.
pub fn emit_block<S: TemplateSink + ?Sized>(
    sink: &mut S,
    block: &SpecRowBlock,
    rows_norm_target: Option<&[usize]>,
) -> Result<Vec<usize>, TemplateError> {
    let mut l_rows_sample = Vec::with_capacity(block.conditions);

    for condition_idx in 0..block.conditions {
        let n_row_sample = block.row_idx_sample(condition_idx);
        write_row_pair(
            sink,
            &SpecRowPair {
                condition_idx,
                row_idx_sample: n_row_sample,
                row_idx_background: n_row_sample + 1,
                fmt_background: EnumFmtKey::ConditionEnd,
                row_idx_norm_target: rows_norm_target
                    .and_then(|l_rows| l_rows.get(condition_idx).copied()),
            },
        )?;
        l_rows_sample.push(n_row_sample);
    }

    let col_label = EnumTemplateColumn::Antibody.col_idx();
    sink.merge_range(&SpecMergeRange {
        row_idx_start: block.row_idx_start,
        col_idx_start: col_label,
        row_idx_end: block.row_idx_end,
        col_idx_end: col_label,
        text: block.label.clone(),
        fmt: EnumFmtKey::Merge,
    })?;
    sink.set_row_format(block.row_idx_end, EnumFmtKey::BlockEnd)?;

    debug!(
        kind = ?block.kind,
        group = block.group_idx,
        label = %block.label,
        rows = block.n_rows(),
        range = %derive_range_address(block.row_idx_start, col_label, block.row_idx_end, col_label),
        "block emitted"
    );
    Ok(l_rows_sample)
}

/// Lay out the whole template into `sink`.
///
/// The caller owns the sink and closes it afterwards.
pub fn generate_template<S: TemplateSink + ?Sized>(
    config: &SpecTemplateConfig,
    sink: &mut S,
) -> Result<SpecTemplateReport, TemplateError> {
    let mut report = SpecTemplateReport {
        n_groups: config.n_groups(),
        n_rows_total: calculate_n_rows_total(config.n_groups(), config.conditions),
        ..Default::default()
    };
    if !config.loading_controls_dropped.is_empty() {
        report.warn(format!(
            "Ignored {} loading control(s) beyond the antibody count: {:?}",
            config.loading_controls_dropped.len(),
            config.loading_controls_dropped
        ));
    }

    if let Some(c_sheet_name) = &config.sheet_name {
        sink.set_sheet_name(c_sheet_name)?;
    }
    write_header(sink, &config.title, &SpecAutofitCellsPolicy::default())?;

    let mut l_rows_loading_ctrl: Vec<usize> = Vec::new();
    for block in plan_row_blocks(config) {
        match block.kind {
            EnumBlockKind::LoadingControl => {
                l_rows_loading_ctrl = emit_block(sink, &block, None)?;
            }
            EnumBlockKind::Antibody => {
                emit_block(sink, &block, Some(l_rows_loading_ctrl.as_slice()))?;
            }
        }
        report.blocks.push(block);
    }

    info!(
        groups = report.n_groups,
        conditions = config.conditions,
        rows = report.n_rows_total,
        "template laid out"
    );
    Ok(report)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
