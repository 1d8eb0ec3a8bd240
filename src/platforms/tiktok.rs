use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;

use super::request::{browser_headers, require, send_checked};
use super::traits::{StatsFetcher, StatsResult};
use super::Platform;
use crate::config::Config;
use crate::error::StatsError;

const SITE_URL: &str = "https://www.tiktok.com";

static FOLLOWER_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""followerCount":(\d+)"#).expect("valid followerCount regex"));
static HEART_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""heartCount":(\d+)"#).expect("valid heartCount regex"));

/// TikTok followers and total likes, scraped from the public profile page.
///
/// There is no public API for this; the profile HTML embeds a JSON blob with
/// `followerCount` and `heartCount`. A missing field counts as 0.
pub struct TiktokFetcher {
    user: Option<String>,
    http: reqwest::Client,
    base_url: String,
}

impl TiktokFetcher {
    pub fn new(config: &Config, http: reqwest::Client) -> Self {
        Self {
            user: config.tiktok_user.clone(),
            http,
            base_url: SITE_URL.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Pull the counts out of a profile page.
pub fn parse_profile(html: &str) -> StatsResult {
    let capture = |re: &Regex| {
        re.captures(html)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .unwrap_or(0)
    };

    StatsResult::subscribers(capture(&FOLLOWER_COUNT)).with_likes(capture(&HEART_COUNT))
}

#[async_trait]
impl StatsFetcher for TiktokFetcher {
    fn platform(&self) -> Platform {
        Platform::Tiktok
    }

    async fn fetch(&self) -> Result<StatsResult, StatsError> {
        let user = require(&self.user, self.platform(), "TIKTOK_USER")?;

        let req = self.http.get(format!("{}/@{user}", self.base_url));
        let html = send_checked(browser_headers(req), self.platform())
            .await?
            .text()
            .await
            .map_err(|e| StatsError::upstream(self.platform().display_name(), e))?;

        Ok(parse_profile(&html))
    }

    fn zero(&self) -> StatsResult {
        StatsResult::subscribers(0).with_likes(0)
    }
}
