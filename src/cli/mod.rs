//! CLI command definitions and handlers

use clap::{Parser, Subcommand};

pub mod args;
pub mod call;
pub mod context;
pub mod serve;
pub mod status;

pub use args::GlobalOptions;
pub use context::CommandContext;

/// Conduit MCP - caching, retrying client for the Phabricator Conduit API
#[derive(Parser, Debug)]
#[command(name = "conduit-mcp")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Conduit API URL, e.g. https://phabricator.example.com/api/
    #[arg(long, global = true, env = "PHABRICATOR_URL", hide_env_values = true)]
    pub url: Option<String>,

    /// Conduit API token (32 characters)
    #[arg(long, global = true, env = "PHABRICATOR_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Override config file location
    #[arg(long, global = true, env = "CONDUIT_MCP_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "CONDUIT_MCP_DEBUG", hide_env = true)]
    pub debug: bool,

    /// Bypass the response cache
    #[arg(long, global = true, env = "CONDUIT_MCP_NO_CACHE", hide_env = true)]
    pub no_cache: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show resolved configuration
    Status,

    /// Show the user behind the configured token
    Whoami,

    /// Check connectivity with conduit.ping
    Ping,

    /// Call any Conduit method
    Call {
        /// Method name, e.g. maniphest.search
        method: String,

        /// Form parameter as key=value (repeatable)
        #[arg(long = "param", short = 'p', value_parser = args::parse_key_val)]
        params: Vec<(String, String)>,

        /// Parameters as a JSON object
        #[arg(long, conflicts_with = "params")]
        json: Option<String>,
    },

    /// Serve tool requests as JSON lines on stdin/stdout
    Serve {
        /// Require a token header on every request and build a client per request
        #[arg(long, env = "CONDUIT_MCP_STATELESS", hide_env = true)]
        stateless: bool,
    },
}
