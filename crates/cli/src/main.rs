use std::process::ExitCode;

fn main() -> ExitCode {
    trimscout_cli::run()
}
