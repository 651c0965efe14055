use std::sync::Arc;
use tracing::{info, warn};

use crate::db::{Account, Repository};
use crate::error::HelperError;
use crate::upstream::TokenService;

/// Supplies usable upstream access tokens for accounts.
#[derive(Clone)]
pub struct AccountCredentialSource {
    repo: Arc<dyn Repository>,
    tokens: TokenService,
}

impl AccountCredentialSource {
    pub fn new(repo: Arc<dyn Repository>, tokens: TokenService) -> Self {
        Self { repo, tokens }
    }

    /// Fetches an account, minting and persisting an access token first when a
    /// ChatGPT account has none.
    ///
    /// A ChatGPT account with neither token is unusable and reads as
    /// [`HelperError::NotFound`]. Other account types come back untouched.
    pub async fn get_account(&self, id: i64) -> Result<Account, HelperError> {
        let mut account = self.repo.get_account(id).await?;
        if !account.is_chatgpt() || !account.access_token.is_empty() {
            return Ok(account);
        }

        if account.refresh_token.is_empty() {
            warn!(account_id = id, "account has neither access nor refresh token");
            return Err(HelperError::NotFound);
        }

        account.access_token = self.tokens.refresh_access_token(&account.refresh_token).await?;
        self.repo.update_account(&account).await?;
        info!(account_id = id, "access token minted on read");
        Ok(account)
    }

    /// Renews `account`'s access token from its refresh token (if any) and persists the account.
    ///
    /// Without a refresh token the stored access token is kept and written back as-is.
    pub async fn renew(&self, account: &mut Account) -> Result<(), HelperError> {
        if !account.refresh_token.is_empty() {
            account.access_token = self.tokens.refresh_access_token(&account.refresh_token).await?;
        }
        self.repo.update_account(account).await?;
        info!(account_id = account.id, "account credential renewed");
        Ok(())
    }
}
