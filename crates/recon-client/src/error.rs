//! Client error types.

/// Errors from a JSON transport call.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// Endpoint returned a non-2xx status.
    #[error("{endpoint} returned {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// Response body was not JSON.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },
    /// Transport could not be reached for a reason other than HTTP.
    #[error("transport unavailable for {endpoint}: {reason}")]
    Unavailable { endpoint: String, reason: String },
}

/// Errors from building a request URL.
#[derive(Debug, thiserror::Error)]
pub enum UrlBuildError {
    /// Only http and https endpoints can carry auth context.
    #[error("unsupported URL scheme {scheme:?} in {url}")]
    UnsupportedScheme { url: String, scheme: String },
    /// Auth was requested but the builder has no auth context.
    #[error("auth context requested for {url} but none is configured")]
    MissingAuth { url: String },
}
