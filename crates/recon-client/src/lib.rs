//! # recon-client: Existence Check Collaborators
//!
//! Everything the reconciliation flow needs to talk to the publisher's
//! "has associated account" endpoint, expressed as narrow traits with one
//! production implementation each:
//!
//! - [`UrlBuilder`] / [`AuthQueryUrlBuilder`]: turn a configured base
//!   endpoint into a request URL, appending reader auth context on demand.
//! - [`JsonTransport`] / [`HttpTransport`]: POST a JSON body with
//!   credentials and return the parsed JSON response.
//! - [`ReconConfig`]: the endpoints, token, and timeout, loaded from the
//!   environment.
//!
//! This crate does not know what an entitlement is. The flow crate builds
//! the request body and interprets the response.

pub mod config;
pub mod error;
pub mod transport;
pub mod url_builder;

pub use config::{ConfigError, ReconConfig};
pub use error::{TransportError, UrlBuildError};
pub use transport::{HttpTransport, JsonTransport};
pub use url_builder::{AuthQueryUrlBuilder, UrlBuilder};
