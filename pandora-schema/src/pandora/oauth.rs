use serde::{Deserialize, Serialize};

/// JSON body for `POST /api/auth/oauth_token` on the index service.
#[derive(Debug, Clone, Serialize)]
pub struct OauthTokenRequest<'a> {
    pub share_token: &'a str,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OauthTokenResponse {
    #[serde(default)]
    pub login_url: String,
    #[serde(default)]
    pub oauth_token: String,
}

/// JSON body for `POST /manage-api/auth/oauth_token` on the Claude service.
#[derive(Debug, Clone, Serialize)]
pub struct ClaudeOauthRequest<'a> {
    pub session_key: &'a str,
    pub unique_name: &'a str,
    pub expires_in: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClaudeOauthResponse {
    #[serde(default)]
    pub login_url: String,
    #[serde(default)]
    pub oauth_token: String,
}
