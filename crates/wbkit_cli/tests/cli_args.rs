use clap::Parser;
use clap::error::ErrorKind;
use wbkit_cli::cli::{Args, run_with_args};

fn parse(argv: &[&str]) -> Result<Args, clap::Error> {
    Args::try_parse_from(std::iter::once("wb-template").chain(argv.iter().copied()))
}

#[test]
fn test_defaults_match_usage() {
    let args = parse(&["out.xlsx"]).unwrap();
    assert_eq!(args.conditions, 2);
    assert_eq!(args.antibodies, vec!["Ab1".to_string()]);
    assert_eq!(args.loading_controls, vec!["GAPDH".to_string()]);
    assert_eq!(args.title, "RPE-1 cells");
    assert_eq!(args.sheet_name, None);
}

#[test]
fn test_repeatable_flags_keep_order() {
    let args = parse(&[
        "out.xlsx",
        "--conditions=3",
        "--ab=pERK",
        "--ab=ERK",
        "--loading-ctrl=GAPDH",
        "--loading-ctrl=Tubulin",
    ])
    .unwrap();
    assert_eq!(args.conditions, 3);
    assert_eq!(args.antibodies, vec!["pERK".to_string(), "ERK".to_string()]);
    assert_eq!(
        args.loading_controls,
        vec!["GAPDH".to_string(), "Tubulin".to_string()]
    );
}

#[test]
fn test_help_and_version_are_not_failures() {
    assert_eq!(parse(&["--help"]).unwrap_err().kind(), ErrorKind::DisplayHelp);
    assert_eq!(parse(&["-h"]).unwrap_err().kind(), ErrorKind::DisplayHelp);
    assert_eq!(
        parse(&["--version"]).unwrap_err().kind(),
        ErrorKind::DisplayVersion
    );
}

#[test]
fn test_malformed_conditions_fail_to_parse() {
    assert_eq!(
        parse(&["out.xlsx", "--conditions=two"]).unwrap_err().kind(),
        ErrorKind::ValueValidation
    );
    assert!(parse(&[]).is_err());
}

#[test]
fn test_negative_conditions_reach_validation() {
    let args = parse(&["out.xlsx", "--conditions", "-1"]).unwrap();
    assert_eq!(args.conditions, -1);
}

#[test]
fn test_zero_conditions_creates_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let path_out = dir.path().join("wb.xlsx");
    let args = parse(&[path_out.to_str().unwrap(), "--conditions=0"]).unwrap();

    let err = run_with_args(&args).unwrap_err();
    assert_eq!(err.to_string(), "--conditions must be greater than 0");
    assert!(!path_out.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_writes_template_to_exact_path() {
    let dir = tempfile::tempdir().unwrap();
    let path_arg = dir.path().join("blot");
    let args = parse(&[
        path_arg.to_str().unwrap(),
        "--conditions=1",
        "--ab=Ab1",
        "--ab=Ab2",
        "--sheet-name=Blot 1",
    ])
    .unwrap();

    let path_out = run_with_args(&args).unwrap();
    assert_eq!(path_out, path_arg);
    assert!(path_out.is_file());
    assert!(!dir.path().join("blot.xlsx").exists());
    assert!(std::fs::metadata(&path_out).unwrap().len() > 0);
}

#[test]
fn test_missing_output_directory_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path_out = dir.path().join("missing").join("wb.xlsx");
    let args = parse(&[path_out.to_str().unwrap()]).unwrap();

    assert!(run_with_args(&args).is_err());
    assert!(!path_out.exists());
}
