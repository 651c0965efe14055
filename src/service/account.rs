use pandora_schema::OneApiChannel;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use super::credentials::AccountCredentialSource;
use super::share::ShareService;
use crate::config::ShareListConfig;
use crate::db::{Account, AccountType, Repository, Share, UNLIMITED};
use crate::error::HelperError;
use crate::upstream::{OneApiClient, TokenService};

/// Lifetime of the throwaway shares handed out by self-service login.
const SELF_SERVICE_EXPIRES_IN: i64 = 60 * 60 * 24;

/// What the public login page may see of a shared account.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicAccount {
    pub id: i64,
    pub account_type: String,
    pub email: String,
}

impl From<Account> for PublicAccount {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            account_type: account.account_type,
            email: account.email,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareAccountList {
    pub accounts: Vec<PublicAccount>,
    pub custom: bool,
    pub random: bool,
}

#[derive(Clone)]
pub struct AccountService {
    repo: Arc<dyn Repository>,
    tokens: TokenService,
    credentials: AccountCredentialSource,
    shares: ShareService,
    oneapi: Option<OneApiClient>,
    share_list: ShareListConfig,
}

impl AccountService {
    pub fn new(
        repo: Arc<dyn Repository>,
        tokens: TokenService,
        credentials: AccountCredentialSource,
        shares: ShareService,
        oneapi: Option<OneApiClient>,
        share_list: ShareListConfig,
    ) -> Self {
        Self {
            repo,
            tokens,
            credentials,
            shares,
            oneapi,
            share_list,
        }
    }

    /// Reads an account, lazily minting its access token (see [`AccountCredentialSource::get_account`]).
    pub async fn get(&self, id: i64) -> Result<Account, HelperError> {
        self.credentials.get_account(id).await
    }

    pub async fn search(
        &self,
        account_type: &str,
        keyword: &str,
    ) -> Result<Vec<Account>, HelperError> {
        self.repo.search_accounts(account_type, keyword).await
    }

    pub async fn create(&self, mut account: Account) -> Result<Account, HelperError> {
        account.kind()?;
        account.id = self.repo.create_account(&account).await?;
        info!(account_id = account.id, account_type = %account.account_type, "account created");
        Ok(account)
    }

    /// Persists `account`; ChatGPT accounts are then refreshed along with their shares.
    ///
    /// A failing refresh does not undo the write. It comes back as
    /// [`HelperError::UpdatedWithIssues`].
    pub async fn update(&self, account: Account) -> Result<(), HelperError> {
        let kind = account.kind()?;
        self.repo.update_account(&account).await?;
        if kind == AccountType::ChatGpt {
            self.refresh(account.id)
                .await
                .map_err(|e| HelperError::UpdatedWithIssues(Box::new(e)))?;
        }
        Ok(())
    }

    /// Shares are left in place.
    pub async fn delete(&self, id: i64) -> Result<(), HelperError> {
        self.repo.delete_account(id).await?;
        info!(account_id = id, "account deleted");
        Ok(())
    }

    /// Renews the account's access token, re-registers every share under it, and
    /// pushes the token to the linked OneApi channel.
    ///
    /// Stops at the first share that fails; earlier shares stay refreshed.
    pub async fn refresh(&self, id: i64) -> Result<(), HelperError> {
        let mut account = self.repo.get_account(id).await?;
        self.credentials.renew(&mut account).await?;

        let shares = self.repo.get_shares_by_account_id(id).await?;
        let total = shares.len();
        for share in shares {
            self.shares
                .update_with_token(share, Some(&account.access_token))
                .await?;
        }
        info!(account_id = id, shares = total, "account shares refreshed");

        // Legacy untyped rows are refreshed like ChatGPT but never pushed to OneApi.
        let pushes_to_oneapi = account.account_type == AccountType::ChatGpt.as_str();
        if pushes_to_oneapi && !account.one_api_channel_id.trim().is_empty() {
            let channel_id: i64 = account.one_api_channel_id.trim().parse().map_err(|_| {
                HelperError::validation(format!(
                    "invalid OneApi channel id: {}",
                    account.one_api_channel_id
                ))
            })?;
            self.update_oneapi_channel_key(channel_id, &account.access_token)
                .await?;
        }
        Ok(())
    }

    /// Channels of the OneApi gateway; empty when the gateway is not configured.
    pub async fn oneapi_channels(&self) -> Result<Vec<OneApiChannel>, HelperError> {
        match &self.oneapi {
            Some(client) => client.list_channels().await,
            None => {
                warn!("oneapi is not configured, channel list disabled");
                Ok(Vec::new())
            }
        }
    }

    pub async fn update_oneapi_channel_key(
        &self,
        channel_id: i64,
        key: &str,
    ) -> Result<(), HelperError> {
        match &self.oneapi {
            Some(client) => client.update_channel_key(channel_id, key).await,
            None => {
                warn!(channel_id, "oneapi is not configured, channel update skipped");
                Ok(())
            }
        }
    }

    /// Shared accounts offered on the public login page.
    pub async fn share_account_list(&self) -> Result<ShareAccountList, HelperError> {
        let ShareListConfig { custom, random } = self.share_list;
        if !custom && !random {
            return Ok(ShareAccountList {
                accounts: Vec::new(),
                custom: false,
                random: false,
            });
        }

        let accounts: Vec<PublicAccount> = self
            .repo
            .list_shared_accounts()
            .await?
            .into_iter()
            .map(PublicAccount::from)
            .collect();
        if accounts.is_empty() {
            return Ok(ShareAccountList {
                accounts,
                custom: false,
                random: false,
            });
        }
        Ok(ShareAccountList {
            accounts,
            custom,
            random,
        })
    }

    /// Self-service login on a shared account under `unique_name`.
    ///
    /// `select_type` of `"random"` asks for a temporary-chat session.
    pub async fn login_share_account(
        &self,
        id: i64,
        unique_name: &str,
        select_type: &str,
    ) -> Result<String, HelperError> {
        let account = self.repo.get_account(id).await?;
        if !account.shared {
            return Err(HelperError::validation("sharing is disabled on this account"));
        }

        match account.kind()? {
            AccountType::ChatGpt => {
                let share = Share {
                    account_id: account.id,
                    unique_name: unique_name.to_string(),
                    share_type: account.account_type.clone(),
                    temporary_chat: select_type == "random",
                    expires_in: SELF_SERVICE_EXPIRES_IN,
                    gpt4_limit: UNLIMITED,
                    gpt4o_limit: UNLIMITED,
                    gpt4o_mini_limit: UNLIMITED,
                    o1_limit: UNLIMITED,
                    o1_mini_limit: UNLIMITED,
                    show_conversations: true,
                    ..Default::default()
                };
                let share_token = self
                    .tokens
                    .register_share_token(&account.access_token, &share, true)
                    .await?;
                self.tokens.oauth_login_url(&share_token).await
            }
            AccountType::Claude => {
                self.tokens
                    .claude_login_url(&account.session_key, unique_name, SELF_SERVICE_EXPIRES_IN)
                    .await
            }
        }
    }
}
