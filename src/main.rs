use std::process::ExitCode;

fn main() -> ExitCode {
    match wardwatch_lib::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("wardwatch: {e}");
            ExitCode::FAILURE
        }
    }
}
