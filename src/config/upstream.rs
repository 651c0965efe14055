use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use url::Url;

static DEFAULT_DOMAIN: LazyLock<Url> =
    LazyLock::new(|| Url::parse("http://127.0.0.1:8899").expect("valid default upstream URL"));

/// Base URLs of the Pandora-style services this backend drives.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PandoraConfig {
    /// Share-token registration and token-info service.
    /// TOML: `pandora.chat_domain`.
    #[serde(default = "default_domain")]
    pub chat_domain: Url,

    /// Refresh-token exchange service.
    /// TOML: `pandora.token_domain`.
    #[serde(default = "default_domain")]
    pub token_domain: Url,

    /// End-user login (OAuth token) service.
    /// TOML: `pandora.index_domain`.
    #[serde(default = "default_domain")]
    pub index_domain: Url,

    /// Claude share login service.
    /// TOML: `pandora.claude_domain`.
    #[serde(default = "default_domain")]
    pub claude_domain: Url,
}

impl Default for PandoraConfig {
    fn default() -> Self {
        Self {
            chat_domain: default_domain(),
            token_domain: default_domain(),
            index_domain: default_domain(),
            claude_domain: default_domain(),
        }
    }
}

/// OneApi gateway settings. Both fields must be non-empty to enable the integration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OneApiConfig {
    /// TOML: `oneapi.token`.
    #[serde(default)]
    pub token: String,

    /// TOML: `oneapi.domain`. Example: `https://oneapi.example.com`.
    #[serde(default)]
    pub domain: String,
}

#[derive(Debug, Clone)]
pub struct OneApiResolvedConfig {
    pub token: String,
    pub domain: Url,
}

impl OneApiConfig {
    /// `Ok(None)` leaves the gateway disabled; a set but malformed domain is an error.
    pub fn resolve(&self) -> Result<Option<OneApiResolvedConfig>, url::ParseError> {
        let token = self.token.trim();
        let domain = self.domain.trim();
        if token.is_empty() || domain.is_empty() {
            return Ok(None);
        }
        Ok(Some(OneApiResolvedConfig {
            token: token.to_string(),
            domain: Url::parse(domain)?,
        }))
    }
}

/// Which kinds of self-service share login are offered on the public account list.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ShareListConfig {
    /// TOML: `share.custom`. Default: `false`.
    #[serde(default)]
    pub custom: bool,

    /// TOML: `share.random`. Default: `false`.
    #[serde(default)]
    pub random: bool,
}

/// Shared outbound HTTP client settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    /// Whole-request timeout in seconds.
    /// TOML: `http.timeout_secs`. Default: `30`.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// TOML: `http.connect_timeout_secs`. Default: `10`.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Optional upstream HTTP proxy.
    /// TOML: `http.proxy`. Example: `http://127.0.0.1:1080`.
    #[serde(default)]
    pub proxy: Option<Url>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            proxy: None,
        }
    }
}

fn default_domain() -> Url {
    DEFAULT_DOMAIN.clone()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}
