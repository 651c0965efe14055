//! Outbound HTTP collaborators: the Pandora-style token services and the optional OneApi gateway.

mod client;
mod oneapi;
mod token;

pub use client::build_http_client;
pub use oneapi::OneApiClient;
pub use token::{TokenService, TokenUsage};

use url::Url;

/// Joins `path` onto `base` the way the upstream docs spell their URLs
/// (`{domain}/{path}`), keeping any path prefix the operator configured.
pub(crate) fn endpoint(base: &Url, path: &str) -> Result<Url, url::ParseError> {
    Url::parse(&format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    ))
}
