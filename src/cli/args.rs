//! Global CLI options shared across all commands

use crate::cli::Cli;

/// Global CLI options passed to all command handlers.
///
/// Precedence: CLI flag > environment variable > config file > default.
/// This struct captures the CLI layer; the rest is resolved in
/// [`CommandContext`](super::CommandContext).
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub url: Option<String>,
    pub token: Option<String>,
    /// Custom config file path (defaults to ~/.conduit-mcp/config.yaml)
    pub config: Option<String>,
    pub no_cache: bool,
}

impl GlobalOptions {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            url: cli.url.clone(),
            token: cli.token.clone(),
            config: cli.config.clone(),
            no_cache: cli.no_cache,
        }
    }

    pub fn config_ref(&self) -> Option<&str> {
        self.config.as_deref()
    }
}

/// Parse a `key=value` pair. The value may itself contain `=`.
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=value: no `=` found in `{}`", s))?;
    if key.is_empty() {
        return Err(format!("invalid KEY=value: empty key in `{}`", s));
    }
    Ok((key.to_string(), value.to_string()))
}
