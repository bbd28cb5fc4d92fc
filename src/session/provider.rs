//! Stateless and stateful session providers

use std::sync::{Arc, Mutex};

use crate::client::ConduitClient;
use crate::error::{AuthError, Result};

use super::{ClientFactory, RequestContext, SessionMode, SessionProvider, validate_token};

/// Multi-tenant mode: a new client per request, token from the header only.
pub struct StatelessSessionProvider {
    factory: ClientFactory,
}

impl StatelessSessionProvider {
    pub fn new(factory: ClientFactory) -> Self {
        Self { factory }
    }
}

impl SessionProvider for StatelessSessionProvider {
    fn get_or_create_client(&self, context: &RequestContext) -> Result<Arc<ConduitClient>> {
        let raw = context.token().ok_or(AuthError::MissingHeaderToken)?;
        let token = validate_token(raw)?;

        log::debug!(
            "Creating per-request client (token {})",
            token.fingerprint()
        );
        Ok(Arc::new(self.factory.build(token)?))
    }

    fn mode(&self) -> SessionMode {
        SessionMode::Stateless
    }
}

/// Single-tenant mode: one client, built on first use and then reused.
pub struct StatefulSessionProvider {
    factory: ClientFactory,
    process_token: Option<String>,
    client: Mutex<Option<Arc<ConduitClient>>>,
}

impl StatefulSessionProvider {
    pub fn new(factory: ClientFactory, process_token: Option<String>) -> Self {
        Self {
            factory,
            process_token: process_token.filter(|t| !t.is_empty()),
            client: Mutex::new(None),
        }
    }
}

impl SessionProvider for StatefulSessionProvider {
    fn get_or_create_client(&self, context: &RequestContext) -> Result<Arc<ConduitClient>> {
        let header_token = context.token();

        // Malformed header tokens are rejected even once a client exists
        if let Some(raw) = header_token {
            validate_token(raw)?;
        }

        let mut slot = self.client.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(ref client) = *slot {
            return Ok(client.clone());
        }

        let raw = header_token
            .or(self.process_token.as_deref())
            .ok_or(AuthError::MissingToken)?;
        let token = validate_token(raw)?;

        log::debug!("Creating shared client (token {})", token.fingerprint());
        let client = Arc::new(self.factory.build(token)?);
        *slot = Some(client.clone());
        Ok(client)
    }

    fn mode(&self) -> SessionMode {
        SessionMode::Stateful
    }
}
