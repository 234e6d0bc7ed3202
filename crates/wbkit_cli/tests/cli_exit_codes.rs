use std::path::Path;
use std::process::{Command, Output};

fn run_bin(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_wb-template"))
        .args(args)
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .output()
        .expect("spawn wb-template")
}

fn describe(output: &Output) -> String {
    format!(
        "status: {:?}\nstdout:\n{}\nstderr:\n{}",
        output.status.code(),
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

#[test]
fn test_success_exits_zero_and_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_bin(&["wb.xlsx", "--conditions=2", "--ab=Ab1"], dir.path());

    assert_eq!(output.status.code(), Some(0), "{}", describe(&output));
    assert!(dir.path().join("wb.xlsx").is_file());
}

#[test]
fn test_help_and_version_exit_zero() {
    let dir = tempfile::tempdir().unwrap();
    for flag in ["--help", "--version"] {
        let output = run_bin(&[flag], dir.path());
        assert_eq!(output.status.code(), Some(0), "{}", describe(&output));
        assert!(!output.stdout.is_empty());
    }
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_invalid_conditions_exit_one_without_file() {
    let dir = tempfile::tempdir().unwrap();
    for value in ["0", "-2"] {
        let output = run_bin(&["wb.xlsx", "--conditions", value], dir.path());
        assert_eq!(output.status.code(), Some(1), "{}", describe(&output));
        assert!(
            String::from_utf8_lossy(&output.stderr)
                .contains("--conditions must be greater than 0"),
            "{}",
            describe(&output)
        );
    }
    assert!(!dir.path().join("wb.xlsx").exists());
}

#[test]
fn test_argument_errors_exit_one() {
    let dir = tempfile::tempdir().unwrap();
    for args in [
        &[][..],
        &["wb.xlsx", "--conditions=two"][..],
        &["wb.xlsx", "--unknown"][..],
    ] {
        let output = run_bin(args, dir.path());
        assert_eq!(output.status.code(), Some(1), "{}", describe(&output));
    }
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_missing_output_directory_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_bin(&["missing/wb.xlsx"], dir.path());

    assert_eq!(output.status.code(), Some(1), "{}", describe(&output));
    assert!(
        String::from_utf8_lossy(&output.stderr).contains("Output directory does not exist"),
        "{}",
        describe(&output)
    );
}
