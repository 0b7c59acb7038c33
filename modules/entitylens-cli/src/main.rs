use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod demo;
mod lens_source;
mod run;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("entitylens=info".parse().unwrap()))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run(args) => run::run(args).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "run failed");
            ExitCode::from(2)
        }
    }
}
