use std::process::ExitCode;

use clap::Parser;
use trialcheck::cli::{self, Cli};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = trialcheck::logging::init_tracing(cli.verbose) {
        eprintln!("Error: failed to initialise logging: {err}");
    }

    match cli::run(cli).await {
        Ok(output) => {
            println!("{}", output.text);
            if output.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(2)
        }
    }
}
