use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::HelperError;

/// Literal comment prefix recording that a share's expiry has been processed.
///
/// Rows written by earlier deployments carry exactly these bytes, so the text
/// must not change. New code goes through [`Share::is_expired`] and
/// [`Share::mark_expired`] instead of looking at the comment directly.
pub const EXPIRED_MARKER: &str = "[已过期]";

/// Sentinel for "no usage cap" on every per-model limit.
pub const UNLIMITED: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    #[serde(rename = "chatgpt")]
    ChatGpt,
    Claude,
}

impl AccountType {
    /// Empty means ChatGPT, for rows created before the column was introduced.
    pub fn parse(raw: &str) -> Result<Self, HelperError> {
        match raw {
            "" | "chatgpt" => Ok(AccountType::ChatGpt),
            "claude" => Ok(AccountType::Claude),
            other => Err(HelperError::validation(format!(
                "unsupported account type: {other}"
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AccountType::ChatGpt => "chatgpt",
            AccountType::Claude => "claude",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(default, rename_all = "camelCase")]
pub struct Account {
    pub id: i64,
    pub account_type: String,
    pub email: String,
    /// Upstream account password, kept for operator reference only.
    #[serde(skip_serializing)]
    pub password: String,
    pub access_token: String,
    pub refresh_token: String,
    /// Claude web session key.
    pub session_key: String,
    pub shared: bool,
    /// OneApi channel id as entered by the operator; empty when unlinked.
    pub one_api_channel_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn kind(&self) -> Result<AccountType, HelperError> {
        AccountType::parse(&self.account_type)
    }

    /// Only ChatGPT accounts (including legacy empty-type rows) mint tokens from refresh tokens.
    pub fn is_chatgpt(&self) -> bool {
        matches!(self.kind(), Ok(AccountType::ChatGpt))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(default, rename_all = "camelCase")]
pub struct Share {
    pub id: i64,
    pub account_id: i64,
    pub unique_name: String,
    /// Opaque token returned by the registration endpoint.
    pub share_token: String,
    pub share_type: String,
    /// Seconds of lifetime requested at registration. `0` = no constraint, `-1` = revoke.
    pub expires_in: i64,
    /// Last valid calendar day (`YYYY-MM-DD`); empty means no expiry policy.
    pub expires_at: String,
    pub site_limit: String,
    pub gpt35_limit: i64,
    pub gpt4_limit: i64,
    pub gpt4o_limit: i64,
    pub gpt4o_mini_limit: i64,
    pub o1_limit: i64,
    pub o1_mini_limit: i64,
    pub show_conversations: bool,
    pub show_userinfo: bool,
    pub temporary_chat: bool,
    pub comment: String,
    /// End-user login password. Stored as entered and never echoed back.
    #[serde(skip_serializing)]
    pub password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for Share {
    fn default() -> Self {
        Self {
            id: 0,
            account_id: 0,
            unique_name: String::new(),
            share_token: String::new(),
            share_type: String::new(),
            expires_in: 0,
            expires_at: String::new(),
            site_limit: String::new(),
            gpt35_limit: UNLIMITED,
            gpt4_limit: UNLIMITED,
            gpt4o_limit: UNLIMITED,
            gpt4o_mini_limit: UNLIMITED,
            o1_limit: UNLIMITED,
            o1_mini_limit: UNLIMITED,
            show_conversations: false,
            show_userinfo: false,
            temporary_chat: false,
            comment: String::new(),
            password: String::new(),
            created_at: DateTime::default(),
            updated_at: DateTime::default(),
        }
    }
}

impl Share {
    /// The declared last valid day, if an expiry policy is set.
    pub fn expiry_date(&self) -> Option<&str> {
        let trimmed = self.expires_at.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    pub fn is_expired(&self) -> bool {
        self.comment.starts_with(EXPIRED_MARKER)
    }

    /// Revokes the share and records it in the comment. Idempotent.
    pub fn mark_expired(&mut self) {
        self.expires_in = -1;
        if !self.is_expired() {
            self.comment = format!("{EXPIRED_MARKER}{}", self.comment);
        }
    }
}
