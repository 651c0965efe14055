mod basic;
mod upstream;

pub use basic::BasicConfig;
pub use upstream::{
    HttpConfig, OneApiConfig, OneApiResolvedConfig, PandoraConfig, ShareListConfig,
};

use figment::{
    Figment,
    providers::{Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

/// Application configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Core server configuration (see `basic` table in config.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// Pandora-style upstream services (see `pandora` table in config.toml).
    #[serde(default)]
    pub pandora: PandoraConfig,

    /// Optional OneApi gateway (see `oneapi` table in config.toml).
    #[serde(default)]
    pub oneapi: OneApiConfig,

    /// Public share-account listing policy (see `share` table in config.toml).
    #[serde(default)]
    pub share: ShareListConfig,

    /// Outbound HTTP client settings (see `http` table in config.toml).
    #[serde(default)]
    pub http: HttpConfig,
}

const DEFAULT_CONFIG_FILE: &str = "config.toml";

impl Config {
    /// Builds a Figment that merges defaults and a config TOML file.
    pub fn figment() -> Figment {
        let figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if PathBuf::from(DEFAULT_CONFIG_FILE).is_file() {
            figment.merge(Toml::file(DEFAULT_CONFIG_FILE))
        } else {
            figment
        }
    }

    /// Loads configuration from the TOML file (with defaults) and validates required fields.
    pub fn from_toml() -> Self {
        if !PathBuf::from(DEFAULT_CONFIG_FILE).is_file() {
            panic!("config file not found: {}", DEFAULT_CONFIG_FILE);
        }
        let cfg: Self = Self::figment().extract().unwrap_or_else(|err| {
            panic!(
                "failed to extract configuration from {}: {err}",
                DEFAULT_CONFIG_FILE
            )
        });
        if cfg.basic.admin_password.trim().is_empty() {
            panic!("basic.admin_password must be set and non-empty");
        }
        if let Err(err) = cfg.oneapi.resolve() {
            panic!("invalid oneapi.domain {:?}: {err}", cfg.oneapi.domain);
        }
        cfg
    }

    /// The OneApi capability, resolved once. `None` disables every channel operation.
    ///
    /// `from_toml` already refuses a malformed domain; configs built in code
    /// get a warning naming it instead.
    pub fn oneapi(&self) -> Option<OneApiResolvedConfig> {
        self.oneapi.resolve().unwrap_or_else(|err| {
            warn!(
                domain = %self.oneapi.domain,
                error = %err,
                "invalid oneapi.domain, integration disabled"
            );
            None
        })
    }
}
