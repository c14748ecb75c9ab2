//! # JSON Transport
//!
//! `JsonTransport` is the network seam of the existence check: POST a JSON
//! body with credentials, get parsed JSON back. `HttpTransport` implements it
//! with `reqwest`, keeping a cookie store so credentials set by the publisher
//! are sent on later calls.
//!
//! No retry is built in. A failed existence check is reported to the caller,
//! who decides whether to run the flow again.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::config::ReconConfig;
use crate::error::TransportError;

/// Sends JSON requests and returns parsed JSON responses.
#[async_trait]
pub trait JsonTransport: Send + Sync {
    /// POST `body` to `url` with credentials.
    async fn post_json(&self, url: &Url, body: &Value) -> Result<Value, TransportError>;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport from configuration.
    pub fn new(config: &ReconConfig) -> Result<Self, TransportError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        if let Some(token) = &config.api_token {
            let value = reqwest::header::HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| TransportError::Unavailable {
                    endpoint: "client_init".into(),
                    reason: "invalid API token characters".into(),
                })?;
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .cookie_store(true)
            .default_headers(headers)
            .build()
            .map_err(|e| TransportError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl JsonTransport for HttpTransport {
    async fn post_json(&self, url: &Url, body: &Value) -> Result<Value, TransportError> {
        let endpoint = endpoint_label(url);
        tracing::debug!(%endpoint, "POST");

        let resp = self
            .client
            .post(url.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                endpoint,
                status: status.as_u16(),
                body,
            });
        }

        resp.json::<Value>()
            .await
            .map_err(|e| TransportError::Deserialization {
                endpoint,
                source: e,
            })
    }
}

/// Scheme, host and path only; query strings carry reader auth context and
/// stay out of errors and logs.
fn endpoint_label(url: &Url) -> String {
    let mut label = url.clone();
    label.set_query(None);
    label.set_fragment(None);
    label.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_label_strips_query() {
        let url: Url = "https://pub.example/has?rid=secret#x".parse().unwrap();
        assert_eq!(endpoint_label(&url), "https://pub.example/has");
    }

    #[test]
    fn rejects_token_with_newline() {
        let config = ReconConfig {
            api_token: Some("bad\ntoken".into()),
            ..ReconConfig::default()
        };
        assert!(matches!(
            HttpTransport::new(&config),
            Err(TransportError::Unavailable { .. })
        ));
    }
}
