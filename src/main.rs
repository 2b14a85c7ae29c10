use std::process::ExitCode;

fn main() -> ExitCode {
    feature_report::cli::run()
}
