//! Command execution context
//!
//! Resolves configuration from file, environment and flags, and builds the
//! client factory every command needs.

use conduit_mcp::client::ConduitClient;
use conduit_mcp::config::Config;
use conduit_mcp::error::{AuthError, Result};
use conduit_mcp::session::{ClientFactory, validate_token};

use crate::cli::GlobalOptions;

/// Validated configuration plus a factory for clients built from it
pub struct CommandContext {
    pub config: Config,
    pub factory: ClientFactory,
}

impl CommandContext {
    /// Load and validate configuration.
    ///
    /// `require_token` is false only for stateless serving, where every
    /// request brings its own token.
    pub fn new(opts: &GlobalOptions, require_token: bool) -> Result<Self> {
        let mut config = resolve_config(opts)?;
        config.validate(require_token)?;
        let factory = ClientFactory::from_config(&config)?;

        Ok(Self { config, factory })
    }

    /// A client for the configured process token
    pub fn client(&self) -> Result<ConduitClient> {
        let raw = self.config.token.as_deref().ok_or(AuthError::MissingToken)?;
        self.factory.build(validate_token(raw)?)
    }
}

/// Config file and environment, with CLI flags applied on top. Not validated.
pub fn resolve_config(opts: &GlobalOptions) -> Result<Config> {
    let mut config = Config::load(opts.config_ref())?;

    if let Some(ref url) = opts.url {
        config.url = Some(url.clone());
    }
    if let Some(ref token) = opts.token {
        config.token = Some(token.clone());
    }
    if opts.no_cache {
        config.client.enable_cache = false;
    }

    Ok(config)
}
