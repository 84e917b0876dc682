use clap::Parser;
use std::process::ExitCode;

use bughive::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    bughive::logging::init();

    let cli = Cli::parse();
    match cli.command.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
