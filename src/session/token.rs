//! API token validation

use sha2::{Digest, Sha256};
use std::fmt;

use crate::error::{AuthError, Result};

/// Inbound header carrying a per-request token (matched case-insensitively)
pub const TOKEN_HEADER: &str = "x-phabricator-token";

/// Required token length in characters
pub const TOKEN_LENGTH: usize = 32;

/// A Conduit API token that passed validation.
///
/// `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short digest that identifies the token without revealing it.
    ///
    /// Used to partition shared cache keys and in log lines.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.0.as_bytes());
        format!("{:x}", digest)[..16].to_string()
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ApiToken").field(&"<redacted>").finish()
    }
}

/// Check that a token is exactly [`TOKEN_LENGTH`] characters long.
///
/// Tokens are neither trimmed, truncated nor padded.
pub fn validate_token(token: &str) -> Result<ApiToken> {
    let len = token.chars().count();
    if len != TOKEN_LENGTH {
        return Err(AuthError::InvalidTokenLength(len).into());
    }
    Ok(ApiToken(token.to_string()))
}
