use crate::config::HttpConfig;
use crate::error::HelperError;
use std::time::Duration;

const USER_AGENT: &str = concat!("pandora-helper/", env!("CARGO_PKG_VERSION"));

/// Builds the one `reqwest::Client` shared by every upstream collaborator.
pub fn build_http_client(cfg: &HttpConfig) -> Result<reqwest::Client, HelperError> {
    let mut builder = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .timeout(Duration::from_secs(cfg.timeout_secs));

    if let Some(proxy_url) = cfg.proxy.as_ref() {
        builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
    }

    Ok(builder.build()?)
}
