use async_trait::async_trait;
use serde::Deserialize;

use super::request::{bearer, get_json, lenient_count, require};
use super::traits::{StatsFetcher, StatsResult};
use super::Platform;
use crate::config::Config;
use crate::error::StatsError;

const API_URL: &str = "https://api.twitter.com";

/// X (Twitter) followers via the v2 user lookup.
///
/// Quirks:
/// - `X_USER_ID` is the account's username (handle), not the numeric id;
///   it goes through `/users/by/username/`.
/// - App-only bearer token; no user context or refresh.
/// - Unknown users return 200 with an `errors` array and no `data`.
pub struct XFetcher {
    username: Option<String>,
    bearer_token: Option<String>,
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct UserLookup {
    data: Option<XUser>,
}

#[derive(Debug, Deserialize)]
struct XUser {
    public_metrics: Option<PublicMetrics>,
}

#[derive(Debug, Deserialize)]
struct PublicMetrics {
    #[serde(default, deserialize_with = "lenient_count")]
    followers_count: Option<u64>,
}

impl XFetcher {
    pub fn new(config: &Config, http: reqwest::Client) -> Self {
        Self {
            username: config.x_user_id.clone(),
            bearer_token: config.x_bearer_token.clone(),
            http,
            base_url: API_URL.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl StatsFetcher for XFetcher {
    fn platform(&self) -> Platform {
        Platform::X
    }

    async fn fetch(&self) -> Result<StatsResult, StatsError> {
        let username = require(&self.username, self.platform(), "X_USER_ID")?;
        let token = require(&self.bearer_token, self.platform(), "X_BEARER_TOKEN")?;

        let req = self
            .http
            .get(format!("{}/2/users/by/username/{username}", self.base_url))
            .query(&[("user.fields", "public_metrics")]);

        let lookup: UserLookup = get_json(bearer(req, token), self.platform()).await?;
        let user = lookup
            .data
            .ok_or_else(|| StatsError::parse(self.platform().display_name(), "no user data"))?;

        let followers = user
            .public_metrics
            .and_then(|m| m.followers_count)
            .unwrap_or(0);

        Ok(StatsResult::subscribers(followers))
    }
}
