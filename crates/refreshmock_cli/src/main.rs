//! `refreshmock` operator entry point.

use clap::Parser;
use log::error;
use refreshmock_cli::{execute, Cli};
use refreshmock_core::{init_logging, AppConfig};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_run module=cli status=error error={err}");
            eprintln!("refreshmock: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    init_logging(&config.log_level, config.log_dir.as_deref())?;
    execute(cli, &config, &mut std::io::stdout().lock())
}
