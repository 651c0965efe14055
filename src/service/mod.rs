//! Account and share services.
//!
//! Wiring: [`AccountCredentialSource`] supplies access tokens, [`reconcile`]
//! decides share lifetimes, [`ShareService`] registers shares with the token
//! service, and [`AccountService`] cascades credential renewals over shares.

mod account;
mod credentials;
mod reconcile;
mod share;

pub use account::{AccountService, PublicAccount, ShareAccountList};
pub use credentials::AccountCredentialSource;
pub use reconcile::{Reconciliation, reconcile};
pub use share::{ShareService, ShareStatistic, StatisticSeries};

use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::db::Repository;
use crate::upstream::{OneApiClient, TokenService};

/// Every service, wired once at startup.
#[derive(Clone)]
pub struct Services {
    pub accounts: AccountService,
    pub shares: ShareService,
}

impl Services {
    pub fn new(repo: Arc<dyn Repository>, cfg: &Config, client: reqwest::Client) -> Self {
        let oneapi_cfg = cfg.oneapi();

        // Log resolved upstream configuration here so `main` stays wiring-only.
        info!(
            chat_domain = %cfg.pandora.chat_domain,
            token_domain = %cfg.pandora.token_domain,
            index_domain = %cfg.pandora.index_domain,
            claude_domain = %cfg.pandora.claude_domain,
            "Pandora upstreams (effective)"
        );
        info!(
            oneapi_enabled = oneapi_cfg.is_some(),
            oneapi_domain = %oneapi_cfg.as_ref().map(|c| c.domain.as_str()).unwrap_or("<none>"),
            share_custom = cfg.share.custom,
            share_random = cfg.share.random,
            "Integrations (effective)"
        );

        let tokens = TokenService::new(client.clone(), Arc::new(cfg.pandora.clone()));
        let credentials = AccountCredentialSource::new(repo.clone(), tokens.clone());
        let shares = ShareService::new(repo.clone(), tokens.clone(), credentials.clone());
        let oneapi = oneapi_cfg.map(|c| OneApiClient::new(client, Arc::new(c)));
        let accounts = AccountService::new(
            repo,
            tokens,
            credentials,
            shares.clone(),
            oneapi,
            cfg.share.clone(),
        );

        Self { accounts, shares }
    }
}
