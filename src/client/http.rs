//! Raw HTTP transport on reqwest

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde_json::Value;

use super::{HttpRequest, Transport};
use crate::config::{ClientSettings, Config};
use crate::error::{ApiError, ConfigError, Result};

const USER_AGENT: &str = concat!(
    "conduit-mcp/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/modelcontextprotocol/servers)"
);

/// Connection options shared by every client built from one configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionOptions {
    /// HTTP(S) proxy URL
    pub proxy: Option<String>,

    /// Skip TLS certificate verification
    pub disable_cert_verify: bool,
}

impl From<&Config> for ConnectionOptions {
    fn from(config: &Config) -> Self {
        Self {
            proxy: config.proxy.clone(),
            disable_cert_verify: config.disable_cert_verify,
        }
    }
}

/// The innermost layer: performs the actual network call.
///
/// Non-2xx responses become [`ApiError::HttpStatus`]; bodies that are not JSON
/// become [`ApiError::InvalidResponse`].
pub struct HttpTransport {
    http: HttpClient,
}

impl HttpTransport {
    pub fn new(settings: &ClientSettings, options: &ConnectionOptions) -> Result<Self> {
        let mut builder = HttpClient::builder()
            .timeout(settings.timeout())
            .connect_timeout(settings.connect_timeout())
            .user_agent(USER_AGENT);

        if let Some(ref proxy) = options.proxy {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|e| ConfigError::Invalid(format!("Invalid proxy URL: {}", e)))?;
            builder = builder.proxy(proxy);
        }

        if options.disable_cert_verify {
            log::warn!("TLS certificate verification is disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let http = builder
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &HttpRequest) -> Result<Value> {
        let mut builder = self.http.request(request.method.clone(), &request.url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if !request.form.is_empty() {
            builder = builder.form(&request.form);
        }
        if let Some(ref payload) = request.json {
            builder = builder.json(payload);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(ApiError::from)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| status.to_string());
            return Err(ApiError::HttpStatus {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let text = response.text().await.map_err(ApiError::from)?;
        let data = serde_json::from_str(&text).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse response: {}", e))
        })?;
        Ok(data)
    }
}
