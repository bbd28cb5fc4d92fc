//! Status command implementation

use colored::Colorize;

use conduit_mcp::config::Config;
use conduit_mcp::error::Result;
use conduit_mcp::session::validate_token;

use crate::cli::GlobalOptions;
use crate::cli::context::resolve_config;

/// Display the resolved configuration without contacting the server
pub fn run(opts: &GlobalOptions) -> Result<()> {
    println!("{}\n", "Conduit MCP Configuration Status".bold());

    match opts.config_ref() {
        Some(path) => println!("Config file: {}", path.cyan()),
        None => {
            let path = Config::default_path()?;
            if path.exists() {
                println!("Config file: {}", path.display().to_string().cyan());
            } else {
                println!("Config file: {}", "none (environment only)".dimmed());
            }
        }
    }
    println!();

    let config = resolve_config(opts)?;

    match config.url.as_deref() {
        Some(url) => println!("{} API URL: {}", "✓".green(), url.cyan()),
        None => {
            println!("{} API URL not configured", "✗".red());
            println!("  → Set PHABRICATOR_URL or pass --url");
        }
    }

    // Never print the token itself
    match config.token.as_deref() {
        Some(token) => match validate_token(token) {
            Ok(_) => println!("{} API token configured", "✓".green()),
            Err(err) => println!("{} API token invalid: {}", "✗".red(), err),
        },
        None => {
            println!(
                "{} No process token (stateless serving only)",
                "○".dimmed()
            );
        }
    }

    if let Some(ref proxy) = config.proxy {
        println!("{} Proxy: {}", "○".dimmed(), proxy.cyan());
    }
    if config.disable_cert_verify {
        println!("{} TLS certificate verification disabled", "⚠".yellow());
    }

    let client = &config.client;
    println!();
    println!(
        "Timeout: {}s (connect {}s)",
        client.timeout, client.connect_timeout
    );
    println!(
        "Retries: {} (delay {}s, backoff x{})",
        client.max_retries, client.retry_delay, client.retry_backoff
    );
    if client.enable_cache {
        println!("Cache: {} (ttl {}s)", "enabled".green(), client.cache_ttl);
    } else {
        println!("Cache: {}", "disabled".yellow());
    }

    if let Err(err) = client.validate() {
        println!("\n{} {}", "✗".red(), err);
    }

    Ok(())
}
