use pandora_schema::{
    ClaudeOauthRequest, ClaudeOauthResponse, OauthTokenRequest, OauthTokenResponse,
    RefreshTokenForm, RefreshTokenResponse, TokenInfoResponse, TokenRegisterForm,
    TokenRegisterResponse,
};
use reqwest::header::AUTHORIZATION;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};
use url::Url;

use super::endpoint;
use crate::config::PandoraConfig;
use crate::db::Share;
use crate::error::HelperError;
use crate::utils::logging::mask_secret;

/// Per-model usage reported by the token-info endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TokenUsage {
    pub gpt35: i64,
    pub gpt4: i64,
}

/// Client for the Pandora-style token services (refresh, register, info, login).
#[derive(Clone)]
pub struct TokenService {
    client: reqwest::Client,
    cfg: Arc<PandoraConfig>,
}

impl TokenService {
    pub fn new(client: reqwest::Client, cfg: Arc<PandoraConfig>) -> Self {
        Self { client, cfg }
    }

    /// Exchanges a refresh token for a fresh access token.
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<String, HelperError> {
        let url = endpoint(&self.cfg.token_domain, "api/auth/refresh")?;
        let exchange_err = |e: &dyn std::fmt::Display| {
            error!(error = %e, "refresh token exchange failed");
            HelperError::CredentialExchange(e.to_string())
        };

        let resp = self
            .client
            .post(url)
            .form(&RefreshTokenForm { refresh_token })
            .send()
            .await
            .map_err(|e| exchange_err(&e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(exchange_err(&format!("upstream status {status}")));
        }

        let body: RefreshTokenResponse = resp.json().await.map_err(|e| exchange_err(&e))?;
        if body.access_token.is_empty() {
            return Err(exchange_err(&"upstream returned an empty access_token"));
        }

        info!(
            refresh_token = %mask_secret(refresh_token),
            access_token = %mask_secret(&body.access_token),
            "refresh token exchanged"
        );
        Ok(body.access_token)
    }

    /// Registers (or re-registers) `share` upstream and returns its share token.
    ///
    /// Uses `share.expires_in` as-is; callers resolve it first.
    pub async fn register_share_token(
        &self,
        access_token: &str,
        share: &Share,
        reset_limit: bool,
    ) -> Result<String, HelperError> {
        let url = endpoint(&self.cfg.chat_domain, "token/register")?;
        let form = TokenRegisterForm {
            unique_name: &share.unique_name,
            access_token,
            expires_in: share.expires_in,
            site_limit: &share.site_limit,
            reset_limit,
            // The upstream flag means "hide conversations".
            show_conversations: !share.show_conversations,
            show_userinfo: share.show_userinfo,
            temporary_chat: share.temporary_chat,
            gpt35_limit: share.gpt35_limit,
            gpt4_limit: share.gpt4_limit,
        };
        let registration_err = |e: &dyn std::fmt::Display| {
            error!(unique_name = %share.unique_name, error = %e, "share token registration failed");
            HelperError::UpstreamRegistration(e.to_string())
        };

        let resp = self
            .client
            .post(url)
            .form(&form)
            .send()
            .await
            .map_err(|e| registration_err(&e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(registration_err(&format!("upstream status {status}")));
        }

        let body: TokenRegisterResponse = resp.json().await.map_err(|e| registration_err(&e))?;
        info!(
            unique_name = %share.unique_name,
            expires_in = share.expires_in,
            reset_limit,
            token_key = %mask_secret(&body.token_key),
            "share token registered"
        );
        Ok(body.token_key)
    }

    /// Reads usage counters of a share token. Non-numeric counters read as `0`.
    pub async fn share_token_info(
        &self,
        share_token: &str,
        access_token: &str,
    ) -> Result<TokenUsage, HelperError> {
        let url = token_info_url(&self.cfg.chat_domain, share_token)?;
        let mut req = self.client.get(url);
        if !access_token.is_empty() {
            req = req.header(AUTHORIZATION, format!("Bearer {access_token}"));
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(HelperError::UpstreamStatus(status));
        }

        let info: TokenInfoResponse = resp.json().await?;
        Ok(TokenUsage {
            gpt35: info.gpt35_limit(),
            gpt4: info.gpt4_limit(),
        })
    }

    /// Trades a share token for a one-shot login URL on the index service.
    pub async fn oauth_login_url(&self, share_token: &str) -> Result<String, HelperError> {
        let url = endpoint(&self.cfg.index_domain, "api/auth/oauth_token")?;
        let resp = self
            .client
            .post(url)
            .json(&OauthTokenRequest { share_token })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(HelperError::UpstreamStatus(status));
        }

        let body: OauthTokenResponse = resp.json().await?;
        let mut login = endpoint(&self.cfg.index_domain, "auth/login_oauth")?;
        login
            .query_pairs_mut()
            .append_pair("token", &body.oauth_token);

        info!(share_token = %mask_secret(share_token), "oauth login url issued");
        Ok(login.into())
    }

    /// Issues a login URL on the Claude service for a session key.
    pub async fn claude_login_url(
        &self,
        session_key: &str,
        unique_name: &str,
        expires_in: i64,
    ) -> Result<String, HelperError> {
        let url = endpoint(&self.cfg.claude_domain, "manage-api/auth/oauth_token")?;
        let resp = self
            .client
            .post(url)
            .json(&ClaudeOauthRequest {
                session_key,
                unique_name,
                expires_in,
            })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(HelperError::UpstreamStatus(status));
        }

        let body: ClaudeOauthResponse = resp.json().await?;
        let login = resolve_login_url(&self.cfg.claude_domain, &body.login_url)?;

        info!(unique_name, expires_in, "claude login url issued");
        Ok(login.into())
    }
}

/// `{chat_domain}/token/info/{share_token}` with the token as one encoded segment.
fn token_info_url(base: &Url, share_token: &str) -> Result<Url, HelperError> {
    let mut url = endpoint(base, "token/info")?;
    url.path_segments_mut()
        .map_err(|()| HelperError::validation(format!("{base} cannot be a base URL")))?
        .push(share_token);
    Ok(url)
}

/// The Claude service answers with a path; absolute URLs are kept as-is.
fn resolve_login_url(base: &Url, login_url: &str) -> Result<Url, url::ParseError> {
    match Url::parse(login_url) {
        Ok(absolute) => Ok(absolute),
        Err(url::ParseError::RelativeUrlWithoutBase) => endpoint(base, login_url),
        Err(e) => Err(e),
    }
}
