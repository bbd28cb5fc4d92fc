//! Conduit MCP client core
//!
//! A caching, retrying client for the Phabricator/Phorge Conduit API with
//! per-request session isolation, plus the tool adapter used by the
//! `conduit-mcp` binary.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod session;
pub mod tools;

pub use client::{ConduitClient, HttpRequest, Transport};
pub use config::{ClientSettings, Config};
pub use error::{Error, Result};
pub use session::{ClientFactory, RequestContext, SessionMode, SessionProvider};
pub use tools::{ToolRequest, ToolResponse};
