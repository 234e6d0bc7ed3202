use std::process::ExitCode;

fn main() -> ExitCode {
    wbkit_cli::cli::run()
}
