use async_trait::async_trait;
use serde::Deserialize;

use super::request::{browser_headers, get_json, lenient_count, require};
use super::traits::{store_renewed_token, RenewOutcome, StatsFetcher, StatsResult, TokenRenewer};
use super::Platform;
use crate::config::Config;
use crate::error::StatsError;
use crate::store::{TokenKey, TokenStore};

const GRAPH_URL: &str = "https://graph.facebook.com";
const GRAPH_VERSION: &str = "v22.0";

/// Facebook page followers via the Graph API.
///
/// Quirks:
/// - The page token is long-lived (~60 days) and has to be re-exchanged
///   with `fb_exchange_token` before it lapses; the renewed value lives in
///   the token store and wins over the seed token from the environment.
/// - Group-like pages report `member_count` instead of `followers_count`.
pub struct FacebookFetcher {
    page_id: Option<String>,
    seed_token: Option<String>,
    app_id: Option<String>,
    app_secret: Option<String>,
    tokens: TokenStore,
    http: reqwest::Client,
    base_url: String,
}

/// Follower payload shared by the Facebook and Instagram Graph APIs.
#[derive(Debug, Deserialize)]
pub(super) struct GraphCount {
    #[serde(default, deserialize_with = "lenient_count")]
    member_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    followers_count: Option<u64>,
}

impl GraphCount {
    /// `member_count`, else `followers_count`, else 0. A zero member count falls through.
    pub(super) fn subscribers(&self) -> u64 {
        self.member_count
            .filter(|n| *n > 0)
            .or(self.followers_count)
            .unwrap_or(0)
    }
}

impl FacebookFetcher {
    pub fn new(config: &Config, tokens: TokenStore, http: reqwest::Client) -> Self {
        Self {
            page_id: config.facebook_page_id.clone(),
            seed_token: config.facebook_access_token.clone(),
            app_id: config.facebook_app_id.clone(),
            app_secret: config.facebook_app_secret.clone(),
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
            .get_token(TokenKey::FACEBOOK, self.seed_token.as_deref())
            .await
    }
}

#[async_trait]
impl StatsFetcher for FacebookFetcher {
    fn platform(&self) -> Platform {
        Platform::Facebook
    }

    async fn fetch(&self) -> Result<StatsResult, StatsError> {
        let page_id = require(&self.page_id, Platform::Facebook, "FACEBOOK_PAGE_ID")?;
        let token = self.current_token().await?;

        let req = self
            .http
            .get(format!("{}/{GRAPH_VERSION}/{page_id}", self.base_url))
            .query(&[("access_token", token.as_str()), ("fields", "followers_count")]);

        let count: GraphCount = get_json(browser_headers(req), Platform::Facebook).await?;
        Ok(StatsResult::subscribers(count.subscribers()))
    }
}

#[async_trait]
impl TokenRenewer for FacebookFetcher {
    fn platform(&self) -> Platform {
        Platform::Facebook
    }

    async fn renew(&self) -> Result<RenewOutcome, StatsError> {
        let current = self.current_token().await?;
        if current.is_empty() {
            return Ok(RenewOutcome::Skipped("no token stored or configured"));
        }

        let platform = Platform::Facebook;
        let app_id = require(&self.app_id, platform, "FACEBOOK_APP_ID")?;
        let app_secret = require(&self.app_secret, platform, "FACEBOOK_APP_SECRET")?;

        let resp = self
            .http
            .get(format!("{}/{GRAPH_VERSION}/oauth/access_token", self.base_url))
            .query(&[
                ("grant_type", "fb_exchange_token"),
                ("client_id", app_id),
                ("client_secret", app_secret),
                ("fb_exchange_token", current.as_str()),
            ])
            .send()
            .await
            .map_err(|e| StatsError::RefreshFailed(format!("Facebook exchange request failed: {e}")))?;

        // Graph API errors come back as JSON bodies; read it whatever the status.
        let payload: serde_json::Value = resp.json().await.unwrap_or_default();
        store_renewed_token(&self.tokens, TokenKey::FACEBOOK, platform, &payload).await
    }
}
