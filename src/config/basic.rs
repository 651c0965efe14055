use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::net::{IpAddr, Ipv4Addr};

/// `[basic]` table: where the helper listens, where it keeps its data, and
/// how the admin console is unlocked.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BasicConfig {
    /// TOML: `basic.listen_addr`. Default: `0.0.0.0`.
    #[serde(default = "default_listen_ip")]
    pub listen_addr: IpAddr,

    /// Port serving both the admin API and the public share login API.
    /// TOML: `basic.listen_port`. Default: `8181`.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// SQLite file holding accounts and shares; created on first start.
    /// TOML: `basic.database_url`. Default: `sqlite://data.db`.
    #[serde(default)]
    pub database_url: String,

    /// Fallback filter when `RUST_LOG` is unset.
    /// TOML: `basic.loglevel`. Default: `info`.
    #[serde(default)]
    pub loglevel: String,

    /// Password exchanged at `POST /api/login` for the admin bearer token.
    ///
    /// The token is minted per process, so a restart (or a password change)
    /// signs every admin out. Required; numbers are accepted and read as text.
    /// TOML: `basic.admin_password`.
    #[serde(default)]
    #[serde(deserialize_with = "deserialize_admin_password")]
    pub admin_password: String,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_ip(),
            listen_port: default_listen_port(),
            database_url: "sqlite://data.db".to_string(),
            loglevel: "info".to_string(),
            // Left empty on purpose: `Config::from_toml()` refuses to start without one.
            admin_password: String::new(),
        }
    }
}

fn deserialize_admin_password<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;

    match v {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(serde::de::Error::custom(
            "expected a string or a number for basic.admin_password",
        )),
    }
}

fn default_listen_ip() -> IpAddr {
    Ipv4Addr::new(0, 0, 0, 0).into()
}

fn default_listen_port() -> u16 {
    8181
}
