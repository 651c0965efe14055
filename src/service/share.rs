use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::{info, warn};

use super::credentials::AccountCredentialSource;
use super::reconcile::{Reconciliation, reconcile};
use crate::db::{Repository, Share};
use crate::error::HelperError;
use crate::upstream::TokenService;

/// Chart data for per-share usage of one account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareStatistic {
    pub categories: Vec<String>,
    pub series: Vec<StatisticSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticSeries {
    pub name: &'static str,
    pub data: Vec<i64>,
}

#[derive(Clone)]
pub struct ShareService {
    repo: Arc<dyn Repository>,
    tokens: TokenService,
    credentials: AccountCredentialSource,
}

impl ShareService {
    pub fn new(
        repo: Arc<dyn Repository>,
        tokens: TokenService,
        credentials: AccountCredentialSource,
    ) -> Self {
        Self {
            repo,
            tokens,
            credentials,
        }
    }

    /// Reconciles `share`'s lifetime and registers it upstream.
    ///
    /// `access_token` of `None` uses the owning account's token (minting one if needed).
    /// Returns the new share token, or `None` when the share was skipped or has just
    /// been marked expired. Only the mark-expired outcome writes to the store, and only
    /// for shares that already exist there.
    pub async fn refresh_share_token(
        &self,
        share: &mut Share,
        access_token: Option<&str>,
        reset_limit: bool,
    ) -> Result<Option<String>, HelperError> {
        self.refresh_share_token_at(share, access_token, reset_limit, &Local::now())
            .await
    }

    /// [`Self::refresh_share_token`] against a fixed clock; the share's last day
    /// ends at 23:59:59 in `now`'s timezone.
    pub async fn refresh_share_token_at<Tz: TimeZone>(
        &self,
        share: &mut Share,
        access_token: Option<&str>,
        reset_limit: bool,
        now: &DateTime<Tz>,
    ) -> Result<Option<String>, HelperError> {
        let fetched;
        let access_token = match access_token {
            Some(token) if !token.is_empty() => token,
            _ => {
                fetched = self.credentials.get_account(share.account_id).await?;
                fetched.access_token.as_str()
            }
        };

        match reconcile(share, access_token, now)? {
            Reconciliation::Proceed { expires_in } => {
                share.expires_in = expires_in;
                let token = self
                    .tokens
                    .register_share_token(access_token, share, reset_limit)
                    .await?;
                Ok(Some(token))
            }
            Reconciliation::Skip => {
                info!(share_id = share.id, unique_name = %share.unique_name, "share already expired");
                Ok(None)
            }
            Reconciliation::MarkExpired => {
                share.mark_expired();
                if share.id != 0 {
                    self.repo.update_share(share).await?;
                }
                info!(share_id = share.id, unique_name = %share.unique_name, "share marked expired");
                Ok(None)
            }
        }
    }

    pub async fn get(&self, id: i64) -> Result<Share, HelperError> {
        self.repo.get_share(id).await
    }

    pub async fn search(&self, email: &str, unique_name: &str) -> Result<Vec<Share>, HelperError> {
        self.repo.search_shares(email, unique_name).await
    }

    pub async fn shares_by_account(&self, account_id: i64) -> Result<Vec<Share>, HelperError> {
        self.repo.get_shares_by_account_id(account_id).await
    }

    /// Registers a new share and stores it with the issued token.
    pub async fn create(&self, mut share: Share) -> Result<Share, HelperError> {
        if share.unique_name.trim().is_empty() {
            return Err(HelperError::validation("unique name must not be empty"));
        }
        share.id = 0;
        if let Some(token) = self.refresh_share_token(&mut share, None, false).await? {
            share.share_token = token;
        }
        share.id = self.repo.create_share(&share).await?;
        info!(share_id = share.id, unique_name = %share.unique_name, "share created");
        Ok(share)
    }

    /// Re-registers `share` and persists the whole record.
    pub async fn update(&self, share: Share) -> Result<Share, HelperError> {
        self.update_with_token(share, None).await
    }

    pub(crate) async fn update_with_token(
        &self,
        mut share: Share,
        access_token: Option<&str>,
    ) -> Result<Share, HelperError> {
        if let Some(token) = self
            .refresh_share_token(&mut share, access_token, false)
            .await?
            .filter(|t| !t.is_empty())
        {
            share.share_token = token;
        }
        self.repo.update_share(&share).await?;
        Ok(share)
    }

    /// Revokes the share upstream, then deletes it.
    ///
    /// Revocation bypasses expiry reconciliation so a future last day cannot
    /// turn it back into a renewal. Shares whose account is gone are deleted
    /// without a revocation call.
    pub async fn delete(&self, id: i64) -> Result<(), HelperError> {
        let mut share = self.repo.get_share(id).await?;
        match self.credentials.get_account(share.account_id).await {
            Ok(account) => {
                share.expires_in = -1;
                self.tokens
                    .register_share_token(&account.access_token, &share, false)
                    .await?;
            }
            Err(HelperError::NotFound) => {
                warn!(share_id = id, account_id = share.account_id, "owning account missing; skipping revocation");
            }
            Err(e) => return Err(e),
        }
        self.repo.delete_share(id).await?;
        info!(share_id = id, "share deleted");
        Ok(())
    }

    /// Re-registers the share with its usage counters reset. Nothing is persisted.
    pub async fn reset_limit(&self, id: i64) -> Result<(), HelperError> {
        let mut share = self.repo.get_share(id).await?;
        self.refresh_share_token(&mut share, None, true).await?;
        Ok(())
    }

    /// End-user login: checks the share's password and returns a login URL.
    pub async fn login_by_password(
        &self,
        unique_name: &str,
        password: &str,
    ) -> Result<String, HelperError> {
        let share = self
            .repo
            .get_share_by_unique_name(unique_name)
            .await
            .map_err(|_| HelperError::wrong_credentials())?;
        if !password_matches(&share.password, password) {
            return Err(HelperError::wrong_credentials());
        }
        self.tokens.oauth_login_url(&share.share_token).await
    }

    pub async fn reset_password(
        &self,
        unique_name: &str,
        password: &str,
        new_password: &str,
        confirm_new_password: &str,
    ) -> Result<(), HelperError> {
        let mut share = self.repo.get_share_by_unique_name(unique_name).await?;
        if !password_matches(&share.password, password) {
            return Err(HelperError::wrong_credentials());
        }
        if new_password != confirm_new_password {
            return Err(HelperError::validation("passwords do not match"));
        }
        if new_password.is_empty() {
            return Err(HelperError::validation("new password must not be empty"));
        }
        share.password = new_password.to_string();
        self.repo.update_share(&share).await?;
        info!(share_id = share.id, "share password reset");
        Ok(())
    }

    /// Usage of every share on an account, as chart series.
    pub async fn statistic(&self, account_id: i64) -> Result<ShareStatistic, HelperError> {
        let account = self.credentials.get_account(account_id).await?;
        let shares = self.repo.get_shares_by_account_id(account_id).await?;

        let mut categories = Vec::with_capacity(shares.len());
        let mut gpt35 = Vec::with_capacity(shares.len());
        let mut gpt4 = Vec::with_capacity(shares.len());
        for share in shares {
            let usage = self
                .tokens
                .share_token_info(&share.share_token, &account.access_token)
                .await?;
            categories.push(share.unique_name);
            gpt35.push(usage.gpt35);
            gpt4.push(usage.gpt4);
        }

        Ok(ShareStatistic {
            categories,
            series: vec![
                StatisticSeries {
                    name: "GPT-3.5",
                    data: gpt35,
                },
                StatisticSeries {
                    name: "GPT-4",
                    data: gpt4,
                },
            ],
        })
    }
}

/// Shares without a password cannot be logged into.
fn password_matches(stored: &str, given: &str) -> bool {
    !stored.is_empty() && bool::from(stored.as_bytes().ct_eq(given.as_bytes()))
}
