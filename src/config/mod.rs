//! Configuration management for the Conduit client
//!
//! Settings are resolved from defaults, an optional YAML file, and the
//! environment, in that order of precedence. CLI flags are applied on top by
//! the binary.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::client::retry::RetryPolicy;
use crate::error::{ConfigError, Result};
use crate::session::validate_token;

/// Process-wide configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Conduit API base URL, e.g. `https://phabricator.example.com/api/`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Process-wide API token (stateful mode only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Optional HTTP(S) proxy URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,

    /// Skip TLS certificate verification
    #[serde(default)]
    pub disable_cert_verify: bool,

    /// Per-client HTTP, retry and cache settings
    #[serde(default)]
    pub client: ClientSettings,
}

/// Per-client settings. Every field can be overridden per client instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Overall request timeout in seconds
    pub timeout: f64,

    /// Connect timeout in seconds
    pub connect_timeout: f64,

    /// Retry attempts after the first failure
    pub max_retries: u32,

    /// Initial delay between retries in seconds
    pub retry_delay: f64,

    /// Multiplier applied to the delay after each retry
    pub retry_backoff: f64,

    /// Cache idempotent GET responses
    pub enable_cache: bool,

    /// Cache time-to-live in seconds
    pub cache_ttl: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            timeout: 30.0,
            connect_timeout: 10.0,
            max_retries: 3,
            retry_delay: 1.0,
            retry_backoff: 2.0,
            enable_cache: true,
            cache_ttl: 300,
        }
    }
}

impl ClientSettings {
    pub fn timeout(&self) -> Duration {
        saturating_secs(self.timeout)
    }

    pub fn connect_timeout(&self) -> Duration {
        saturating_secs(self.connect_timeout)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }

    /// Retry policy derived from these settings
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            initial_delay: saturating_secs(self.retry_delay),
            backoff_multiplier: self.retry_backoff,
        }
    }

    /// Reject values that would make the client misbehave
    pub fn validate(&self) -> Result<()> {
        if !(self.timeout.is_finite() && self.timeout > 0.0) {
            return Err(ConfigError::Invalid("timeout must be positive".to_string()).into());
        }
        if !(self.connect_timeout.is_finite() && self.connect_timeout > 0.0) {
            return Err(
                ConfigError::Invalid("connect_timeout must be positive".to_string()).into(),
            );
        }
        if !(self.retry_delay.is_finite() && self.retry_delay >= 0.0) {
            return Err(
                ConfigError::Invalid("retry_delay must not be negative".to_string()).into(),
            );
        }
        for (name, secs) in [
            ("timeout", self.timeout),
            ("connect_timeout", self.connect_timeout),
            ("retry_delay", self.retry_delay),
        ] {
            if Duration::try_from_secs_f64(secs).is_err() {
                return Err(ConfigError::Invalid(format!("{} is out of range", name)).into());
            }
        }
        if !(self.retry_backoff.is_finite() && self.retry_backoff >= 1.0) {
            return Err(
                ConfigError::Invalid("retry_backoff must be at least 1.0".to_string()).into(),
            );
        }
        Ok(())
    }
}

/// Seconds to a `Duration`, clamped to `[0, Duration::MAX]`
fn saturating_secs(secs: f64) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

/// Looks up environment variables. Swappable so tests never touch the real environment.
pub trait EnvSource {
    fn var(&self, key: &str) -> Option<String>;
}

/// The process environment
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.is_empty())
    }
}

impl Config {
    /// Get the default config file path (~/.conduit-mcp/config.yaml)
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".conduit-mcp").join("config.yaml"))
    }

    /// Load configuration: file (explicit path, or the default path if it exists),
    /// then the process environment.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::load_from(Path::new(p))?,
            None => {
                let default = Self::default_path()?;
                if default.exists() {
                    Self::load_from(&default)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env(&ProcessEnv)?;
        Ok(config)
    }

    /// Load configuration from a specific YAML file
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()).into());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;

        Ok(config)
    }

    /// Overlay environment variables onto this configuration
    pub fn apply_env(&mut self, env: &dyn EnvSource) -> Result<()> {
        if let Some(url) = env.var("PHABRICATOR_URL") {
            self.url = Some(url);
        }
        if let Some(token) = env.var("PHABRICATOR_TOKEN") {
            self.token = Some(token);
        }
        if let Some(proxy) = env.var("PHABRICATOR_PROXY") {
            self.proxy = Some(proxy);
        }
        if let Some(flag) = env.var("PHABRICATOR_DISABLE_CERT_VERIFY") {
            self.disable_cert_verify = parse_flag(&flag);
        }

        let client = &mut self.client;
        if let Some(v) = env.var("CONDUIT_TIMEOUT") {
            client.timeout = parse_number("CONDUIT_TIMEOUT", &v)?;
        }
        if let Some(v) = env.var("CONDUIT_MAX_RETRIES") {
            client.max_retries = parse_number("CONDUIT_MAX_RETRIES", &v)?;
        }
        if let Some(v) = env.var("CONDUIT_RETRY_DELAY") {
            client.retry_delay = parse_number("CONDUIT_RETRY_DELAY", &v)?;
        }
        if let Some(v) = env.var("CONDUIT_RETRY_BACKOFF") {
            client.retry_backoff = parse_number("CONDUIT_RETRY_BACKOFF", &v)?;
        }
        if let Some(v) = env.var("CONDUIT_ENABLE_CACHE") {
            client.enable_cache = parse_flag(&v);
        }
        if let Some(v) = env.var("CONDUIT_CACHE_TTL") {
            client.cache_ttl = parse_number("CONDUIT_CACHE_TTL", &v)?;
        }
        Ok(())
    }

    /// Validate the configuration.
    ///
    /// `require_token` is true for stateful mode, where the process token is
    /// the only credential source.
    pub fn validate(&mut self, require_token: bool) -> Result<()> {
        let url = self.url.as_deref().ok_or(ConfigError::MissingUrl)?;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid(
                "PHABRICATOR_URL must start with http:// or https://".to_string(),
            )
            .into());
        }
        if !url.ends_with('/') {
            self.url = Some(format!("{}/", url));
        }

        match self.token.as_deref() {
            Some(token) => {
                validate_token(token)?;
            }
            None if require_token => {
                return Err(crate::error::AuthError::MissingToken.into());
            }
            None => {}
        }

        self.client.validate()
    }

    /// Base URL, once validated
    pub fn url(&self) -> Result<&str> {
        Ok(self.url.as_deref().ok_or(ConfigError::MissingUrl)?)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "1" | "true" | "yes")
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("{} has an invalid value: {}", key, value)).into())
}
