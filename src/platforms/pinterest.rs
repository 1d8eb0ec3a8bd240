use async_trait::async_trait;
use serde::Deserialize;

use super::request::{bearer, get_json, lenient_count, require};
use super::traits::{StatsFetcher, StatsResult};
use super::Platform;
use crate::config::Config;
use crate::error::StatsError;

const API_URL: &str = "https://api.pinterest.com";

/// Pinterest followers of the account that owns the access token.
pub struct PinterestFetcher {
    access_token: Option<String>,
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct UserAccount {
    #[serde(default, deserialize_with = "lenient_count")]
    follower_count: Option<u64>,
}

impl PinterestFetcher {
    pub fn new(config: &Config, http: reqwest::Client) -> Self {
        Self {
            access_token: config.pinterest_access_token.clone(),
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
impl StatsFetcher for PinterestFetcher {
    fn platform(&self) -> Platform {
        Platform::Pinterest
    }

    async fn fetch(&self) -> Result<StatsResult, StatsError> {
        let token = require(&self.access_token, self.platform(), "PINTEREST_ACCESS_TOKEN")?;

        let req = self.http.get(format!("{}/v5/user_account", self.base_url));
        let account: UserAccount = get_json(bearer(req, token), self.platform()).await?;

        Ok(StatsResult::subscribers(account.follower_count.unwrap_or(0)))
    }
}
