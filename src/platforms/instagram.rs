use async_trait::async_trait;

use super::facebook::GraphCount;
use super::request::{browser_headers, get_json, require};
use super::traits::{store_renewed_token, RenewOutcome, StatsFetcher, StatsResult, TokenRenewer};
use super::Platform;
use crate::config::Config;
use crate::error::StatsError;
use crate::store::{TokenKey, TokenStore};

const GRAPH_URL: &str = "https://graph.instagram.com";
const GRAPH_VERSION: &str = "v17.0";

/// Instagram Basic Display long-lived tokens all carry this prefix.
const LONG_LIVED_PREFIX: &str = "IGQVJ";

/// Instagram account followers via the Instagram Graph API.
///
/// Only long-lived Basic Display tokens can be renewed with
/// `ig_refresh_token`; anything else is left alone by the renewer.
pub struct InstagramFetcher {
    account_id: Option<String>,
    seed_token: Option<String>,
    tokens: TokenStore,
    http: reqwest::Client,
    base_url: String,
}

impl InstagramFetcher {
    pub fn new(config: &Config, tokens: TokenStore, http: reqwest::Client) -> Self {
        Self {
            account_id: config.instagram_page_id.clone(),
            seed_token: config.instagram_access_token.clone(),
            tokens,
            http,
            base_url: GRAPH_URL.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn current_token(&self) -> Result<String, StatsError> {
        self.tokens
            .get_token(TokenKey::INSTAGRAM, self.seed_token.as_deref())
            .await
    }
}

#[async_trait]
impl StatsFetcher for InstagramFetcher {
    fn platform(&self) -> Platform {
        Platform::Instagram
    }

    async fn fetch(&self) -> Result<StatsResult, StatsError> {
        let account_id = require(&self.account_id, Platform::Instagram, "INSTAGRAM_PAGE_ID")?;
        let token = self.current_token().await?;

        let req = self
            .http
            .get(format!("{}/{GRAPH_VERSION}/{account_id}", self.base_url))
            .query(&[("access_token", token.as_str()), ("fields", "followers_count")]);

        let count: GraphCount = get_json(browser_headers(req), Platform::Instagram).await?;
        Ok(StatsResult::subscribers(count.subscribers()))
    }
}

#[async_trait]
impl TokenRenewer for InstagramFetcher {
    fn platform(&self) -> Platform {
        Platform::Instagram
    }

    async fn renew(&self) -> Result<RenewOutcome, StatsError> {
        let current = self.current_token().await?;
        if current.is_empty() {
            return Ok(RenewOutcome::Skipped("no token stored or configured"));
        }
        if !current.starts_with(LONG_LIVED_PREFIX) {
            return Ok(RenewOutcome::Skipped("not a long-lived Instagram token"));
        }

        let resp = self
            .http
            .get(format!("{}/refresh_access_token", self.base_url))
            .query(&[
                ("grant_type", "ig_refresh_token"),
                ("access_token", current.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                StatsError::RefreshFailed(format!("Instagram refresh request failed: {e}"))
            })?;

        let payload: serde_json::Value = resp.json().await.unwrap_or_default();
        store_renewed_token(
            &self.tokens,
            TokenKey::INSTAGRAM,
            Platform::Instagram,
            &payload,
        )
        .await
    }
}
