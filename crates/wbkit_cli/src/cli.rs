use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{ArgAction, Parser};
use tracing::{debug, info, warn};
use wbkit_template::{
    C_ANTIBODY_DEFAULT, C_LOADING_CTRL_DEFAULT, C_TITLE_DEFAULT, N_CONDITIONS_DEFAULT,
    SpecTemplateArgs, SpecTemplateReport, XlsxTemplateWriter, derive_default_template_formats,
    generate_template, resolve_template_config,
};

use crate::logging::init_tracing;
use crate::paths::resolve_output_path;

/// Creates an xlsx file set up for analyzing WBs.
#[derive(Debug, Parser)]
#[command(name = "wb-template", version, about = "Creates an xlsx file set up for analyzing WBs")]
pub struct Args {
    /// Where the file should be saved to.
    #[arg(value_name = "OUT")]
    pub out: PathBuf,

    /// The number of conditions.
    #[arg(
        long,
        value_name = "INT",
        default_value_t = N_CONDITIONS_DEFAULT,
        allow_negative_numbers = true
    )]
    pub conditions: i64,

    /// The name of each antibody (repeatable).
    #[arg(long = "ab", value_name = "STR", default_value = C_ANTIBODY_DEFAULT)]
    pub antibodies: Vec<String>,

    /// The name of the loading control (repeatable, one per antibody).
    ///
    /// A single value is shared by every antibody.
    #[arg(long = "loading-ctrl", value_name = "STR", default_value = C_LOADING_CTRL_DEFAULT)]
    pub loading_controls: Vec<String>,

    /// Title written to cell A1.
    #[arg(long, value_name = "STR", default_value = C_TITLE_DEFAULT)]
    pub title: String,

    /// Worksheet name; illegal characters are replaced with `_`.
    #[arg(long, value_name = "STR")]
    pub sheet_name: Option<String>,

    /// Increase log verbosity (`-v` info, `-vv` debug). `RUST_LOG` overrides.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Raw template inputs carried by these arguments.
    pub fn to_template_args(&self) -> SpecTemplateArgs {
        SpecTemplateArgs {
            conditions: self.conditions,
            antibodies: self.antibodies.clone(),
            loading_controls: self.loading_controls.clone(),
            title: self.title.clone(),
            sheet_name: self.sheet_name.clone(),
        }
    }
}

/// Parse process arguments, run, and map the outcome to an exit code.
pub fn run() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => return report_parse_error(&err),
    };
    init_tracing(args.verbose);

    match run_with_args(&args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::from(1)
        }
    }
}

/// Validate, lay out and save one template. Returns the written path.
///
/// Nothing touches the filesystem until the configuration and output path
/// have been validated.
pub fn run_with_args(args: &Args) -> Result<PathBuf> {
    let config = resolve_template_config(&args.to_template_args())?;
    let path_out = resolve_output_path(&args.out)?;
    info!(
        path = %path_out.display(),
        conditions = config.conditions,
        antibodies = ?config.antibodies,
        loading_controls = ?config.loading_controls,
        "writing template"
    );

    let mut writer = XlsxTemplateWriter::new(path_out.clone(), derive_default_template_formats());
    let result_layout = generate_template(&config, &mut writer);
    let result_close = writer
        .close()
        .with_context(|| format!("Failed to write {}", path_out.display()));

    let report = result_layout.context("Failed to lay out template")?;
    result_close?;
    log_report(&report);

    Ok(path_out)
}

fn log_report(report: &SpecTemplateReport) {
    for c_warning in &report.warnings {
        warn!("{c_warning}");
    }
    for block in &report.blocks {
        debug!(
            kind = ?block.kind,
            label = %block.label,
            first_row = block.row_idx_start + 1,
            last_row = block.row_idx_end + 1,
            "block"
        );
    }
    info!(
        groups = report.n_groups,
        rows = report.n_rows_total,
        "template written"
    );
}

fn report_parse_error(err: &clap::Error) -> ExitCode {
    let _ = err.print();
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
        _ => ExitCode::from(1),
    }
}
