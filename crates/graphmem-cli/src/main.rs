mod bootstrap;
mod cli_args;
mod commands;

use std::process::ExitCode;

use clap::Parser;

use crate::bootstrap::{exit_status_for, init_tracing};
use crate::cli_args::Cli;
use crate::commands::render_output;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match commands::run(cli).await {
        Ok(output) => {
            println!("{}", render_output(&output));
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(exit_status_for(&error))
        }
    }
}
