mod cli;
mod paths;
mod run;
mod settings;

use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = cli::parse();
    match run::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "fatal error");
            eprintln!("autoart: {err:#}");
            ExitCode::FAILURE
        }
    }
}
