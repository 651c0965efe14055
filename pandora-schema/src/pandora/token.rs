use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Form body for `POST /api/auth/refresh` on the token service.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshTokenForm<'a> {
    pub refresh_token: &'a str,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefreshTokenResponse {
    #[serde(default)]
    pub access_token: String,
}

/// Form body for `POST /token/register` on the chat service.
///
/// Field values are sent exactly as the upstream expects them. In particular
/// `show_conversations` carries the upstream polarity, which is the inverse of
/// the share's own flag; callers are responsible for the flip.
#[derive(Debug, Clone, Serialize)]
pub struct TokenRegisterForm<'a> {
    pub unique_name: &'a str,
    pub access_token: &'a str,
    pub expires_in: i64,
    pub site_limit: &'a str,
    pub reset_limit: bool,
    pub show_conversations: bool,
    pub show_userinfo: bool,
    pub temporary_chat: bool,
    pub gpt35_limit: i64,
    pub gpt4_limit: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenRegisterResponse {
    #[serde(default)]
    pub token_key: String,
}

/// Response of `GET /token/info/{share_token}`.
///
/// The upstream reports limits as strings most of the time, occasionally as
/// numbers. Anything that does not read as an integer counts as `0`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenInfoResponse {
    #[serde(default)]
    pub gpt35_limit: Value,
    #[serde(default)]
    pub gpt4_limit: Value,
}

impl TokenInfoResponse {
    pub fn gpt35_limit(&self) -> i64 {
        lax_i64(&self.gpt35_limit)
    }

    pub fn gpt4_limit(&self) -> i64 {
        lax_i64(&self.gpt4_limit)
    }
}

fn lax_i64(v: &Value) -> i64 {
    match v {
        Value::String(s) => s.trim().parse().unwrap_or(0),
        Value::Number(n) => n.as_i64().unwrap_or(0),
        _ => 0,
    }
}
