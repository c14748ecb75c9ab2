//! # Authenticated URL Building
//!
//! The existence endpoint identifies the reader through query parameters
//! added on top of the configured base URL. `UrlBuilder` is the seam; the
//! flow asks for auth context and does not care how it is encoded.

use async_trait::async_trait;
use url::Url;

use crate::config::ReconConfig;
use crate::error::UrlBuildError;

/// Builds request URLs from configured base endpoints.
#[async_trait]
pub trait UrlBuilder: Send + Sync {
    /// Return `base` with auth context appended when `include_auth` is set.
    async fn build_url(&self, base: &Url, include_auth: bool) -> Result<Url, UrlBuildError>;
}

/// Appends a fixed set of query pairs as auth context.
#[derive(Debug, Clone, Default)]
pub struct AuthQueryUrlBuilder {
    params: Vec<(String, String)>,
    require_auth: bool,
}

impl AuthQueryUrlBuilder {
    /// Builder with no auth context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder carrying the reader id from `config` as `rid`.
    pub fn from_config(config: &ReconConfig) -> Self {
        let mut builder = Self::new();
        if let Some(reader_id) = &config.reader_id {
            builder = builder.with_param("rid", reader_id);
        }
        builder
    }

    /// Add a query pair sent whenever auth is requested.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    /// Fail instead of sending an unauthenticated request when auth is
    /// requested but no pairs are configured.
    pub fn require_auth(mut self) -> Self {
        self.require_auth = true;
        self
    }
}

#[async_trait]
impl UrlBuilder for AuthQueryUrlBuilder {
    async fn build_url(&self, base: &Url, include_auth: bool) -> Result<Url, UrlBuildError> {
        if !matches!(base.scheme(), "http" | "https") {
            return Err(UrlBuildError::UnsupportedScheme {
                url: base.to_string(),
                scheme: base.scheme().to_string(),
            });
        }
        let mut url = base.clone();
        if !include_auth {
            return Ok(url);
        }
        if self.params.is_empty() {
            if self.require_auth {
                return Err(UrlBuildError::MissingAuth {
                    url: base.to_string(),
                });
            }
            return Ok(url);
        }
        {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &self.params {
                pairs.append_pair(name, value);
            }
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        "https://pub.example/api/has-account?v=2".parse().unwrap()
    }

    #[tokio::test]
    async fn appends_params_when_auth_requested() {
        let builder = AuthQueryUrlBuilder::new().with_param("rid", "reader 1");
        let url = builder.build_url(&base(), true).await.unwrap();
        assert_eq!(url.as_str(), "https://pub.example/api/has-account?v=2&rid=reader+1");
    }

    #[tokio::test]
    async fn leaves_url_untouched_without_auth() {
        let builder = AuthQueryUrlBuilder::new().with_param("rid", "r");
        let url = builder.build_url(&base(), false).await.unwrap();
        assert_eq!(url, base());
    }

    #[tokio::test]
    async fn from_config_uses_reader_id() {
        let config = ReconConfig {
            reader_id: Some("abc".into()),
            ..ReconConfig::default()
        };
        let url = AuthQueryUrlBuilder::from_config(&config)
            .build_url(&base(), true)
            .await
            .unwrap();
        assert_eq!(url.query(), Some("v=2&rid=abc"));
    }

    #[tokio::test]
    async fn required_auth_without_params_fails() {
        let err = AuthQueryUrlBuilder::new()
            .require_auth()
            .build_url(&base(), true)
            .await
            .unwrap_err();
        assert!(matches!(err, UrlBuildError::MissingAuth { .. }));
    }

    #[tokio::test]
    async fn rejects_non_http_scheme() {
        let ftp: Url = "ftp://pub.example/x".parse().unwrap();
        let err = AuthQueryUrlBuilder::new().build_url(&ftp, true).await.unwrap_err();
        assert!(matches!(err, UrlBuildError::UnsupportedScheme { scheme, .. } if scheme == "ftp"));
    }
}
