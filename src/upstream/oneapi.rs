use pandora_schema::{OneApiChannel, OneApiEnvelope};
use reqwest::header::AUTHORIZATION;
use std::sync::Arc;
use tracing::info;

use super::endpoint;
use crate::config::OneApiResolvedConfig;
use crate::error::HelperError;
use crate::utils::logging::{debug_pretty_json, mask_secret};

/// Admin client for a OneApi gateway. Only constructed when the gateway is configured.
#[derive(Clone)]
pub struct OneApiClient {
    client: reqwest::Client,
    cfg: Arc<OneApiResolvedConfig>,
}

impl OneApiClient {
    pub fn new(client: reqwest::Client, cfg: Arc<OneApiResolvedConfig>) -> Self {
        Self { client, cfg }
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.cfg.token)
    }

    pub async fn list_channels(&self) -> Result<Vec<OneApiChannel>, HelperError> {
        let url = endpoint(
            &self.cfg.domain,
            "api/channel/?p=0&page_size=1000&id_sort=true",
        )?;
        // The list endpoint has always been called with the raw token, no scheme.
        let resp = self
            .client
            .get(url)
            .header(AUTHORIZATION, self.cfg.token.as_str())
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(HelperError::UpstreamStatus(status));
        }

        let envelope: OneApiEnvelope<Vec<OneApiChannel>> = resp.json().await?;
        info!(count = envelope.data.len(), "oneapi channels listed");
        Ok(envelope.data)
    }

    pub async fn get_channel(&self, id: i64) -> Result<OneApiChannel, HelperError> {
        let url = endpoint(&self.cfg.domain, &format!("api/channel/{id}"))?;
        let resp = self
            .client
            .get(url)
            .header(AUTHORIZATION, self.bearer())
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(HelperError::UpstreamStatus(status));
        }

        let envelope: OneApiEnvelope<OneApiChannel> = resp.json().await?;
        debug_pretty_json("oneapi channel fetched", envelope.data.as_map());
        Ok(envelope.data)
    }

    /// Read-modify-write of one channel: fetch it, replace `key`, PUT the whole object back.
    pub async fn update_channel_key(&self, id: i64, key: &str) -> Result<(), HelperError> {
        let mut channel = self.get_channel(id).await?;
        channel.set_key(key);

        let url = endpoint(&self.cfg.domain, "api/channel")?;
        let resp = self
            .client
            .put(url)
            .header(AUTHORIZATION, self.bearer())
            .json(&channel)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(HelperError::UpstreamStatus(status));
        }

        info!(channel_id = id, key = %mask_secret(key), "oneapi channel key updated");
        Ok(())
    }
}
