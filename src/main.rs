//! Conduit MCP - command line and line-delimited tool server

use clap::Parser;

mod cli;

use cli::{Cli, Commands, GlobalOptions};
use conduit_mcp::error::Result;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

/// Logs go to stderr; stdout carries command output and tool responses.
fn init_logging(debug: bool) {
    let default_filter = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let opts = GlobalOptions::from_cli(&cli);

    match cli.command {
        Commands::Status => cli::status::run(&opts),
        Commands::Whoami => cli::call::whoami(&opts).await,
        Commands::Ping => cli::call::ping(&opts).await,
        Commands::Call {
            method,
            params,
            json,
        } => cli::call::call(&opts, &method, &params, json.as_deref()).await,
        Commands::Serve { stateless } => cli::serve::run(&opts, stateless).await,
    }
}
