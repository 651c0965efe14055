use async_trait::async_trait;

use crate::db::models::{Account, Share};
use crate::error::HelperError;

/// Persistence boundary for accounts and shares.
///
/// Missing rows are reported as [`HelperError::NotFound`], for reads and updates alike.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn get_account(&self, id: i64) -> Result<Account, HelperError>;

    /// Inserts the account and returns its new id. `id` and timestamps on the input are ignored.
    async fn create_account(&self, account: &Account) -> Result<i64, HelperError>;

    async fn update_account(&self, account: &Account) -> Result<(), HelperError>;

    async fn delete_account(&self, id: i64) -> Result<(), HelperError>;

    /// `account_type` of `"chatgpt"` also matches legacy empty-type rows; empty matches all.
    async fn search_accounts(
        &self,
        account_type: &str,
        keyword: &str,
    ) -> Result<Vec<Account>, HelperError>;

    async fn list_shared_accounts(&self) -> Result<Vec<Account>, HelperError>;

    async fn get_share(&self, id: i64) -> Result<Share, HelperError>;

    async fn get_share_by_unique_name(&self, unique_name: &str) -> Result<Share, HelperError>;

    async fn create_share(&self, share: &Share) -> Result<i64, HelperError>;

    async fn update_share(&self, share: &Share) -> Result<(), HelperError>;

    async fn delete_share(&self, id: i64) -> Result<(), HelperError>;

    /// Substring search on the owning account's email and the share's unique name.
    async fn search_shares(&self, email: &str, unique_name: &str)
    -> Result<Vec<Share>, HelperError>;

    async fn get_shares_by_account_id(&self, account_id: i64) -> Result<Vec<Share>, HelperError>;
}
