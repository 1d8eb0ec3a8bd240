use async_trait::async_trait;
use serde::Deserialize;

use super::request::{browser_headers, get_json, lenient_count, require};
use super::traits::{StatsFetcher, StatsResult};
use super::Platform;
use crate::config::Config;
use crate::error::StatsError;

const API_URL: &str = "https://www.googleapis.com";

/// YouTube channel subscribers and total views via Data API v3.
///
/// The API sends counts as decimal strings (`"subscriberCount": "1200"`).
pub struct YoutubeFetcher {
    channel_id: Option<String>,
    api_key: Option<String>,
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ChannelsResponse {
    #[serde(default)]
    items: Vec<Channel>,
}

#[derive(Debug, Deserialize)]
struct Channel {
    statistics: Option<ChannelStatistics>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelStatistics {
    #[serde(default, deserialize_with = "lenient_count")]
    subscriber_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    view_count: Option<u64>,
}

impl ChannelsResponse {
    fn into_stats(self) -> StatsResult {
        let stats = self.items.into_iter().next().and_then(|c| c.statistics);
        let (subscribers, views) = match stats {
            Some(s) => (s.subscriber_count, s.view_count),
            None => (None, None),
        };
        StatsResult::subscribers(subscribers.unwrap_or(0)).with_views(views.unwrap_or(0))
    }
}

impl YoutubeFetcher {
    pub fn new(config: &Config, http: reqwest::Client) -> Self {
        Self {
            channel_id: config.youtube_channel_id.clone(),
            api_key: config.youtube_api_key.clone(),
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
impl StatsFetcher for YoutubeFetcher {
    fn platform(&self) -> Platform {
        Platform::Youtube
    }

    async fn fetch(&self) -> Result<StatsResult, StatsError> {
        let channel_id = require(&self.channel_id, self.platform(), "YOUTUBE_CHANNEL_ID")?;
        let api_key = require(&self.api_key, self.platform(), "YOUTUBE_API_KEY")?;

        let req = self
            .http
            .get(format!("{}/youtube/v3/channels", self.base_url))
            .query(&[("part", "statistics"), ("id", channel_id), ("key", api_key)]);

        let channels: ChannelsResponse = get_json(browser_headers(req), self.platform()).await?;
        Ok(channels.into_stats())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> StatsResult {
        serde_json::from_value::<ChannelsResponse>(value)
            .unwrap()
            .into_stats()
    }

    #[test]
    fn test_string_counts() {
        let stats = parse(json!({
            "items": [{ "statistics": { "subscriberCount": "1200", "viewCount": "98765" } }]
        }));
        assert_eq!(stats, StatsResult::subscribers(1200).with_views(98765));
    }

    #[test]
    fn test_unknown_channel_yields_zero_counts() {
        let stats = parse(json!({ "pageInfo": { "totalResults": 0 } }));
        assert_eq!(stats, StatsResult::subscribers(0).with_views(0));
    }

    #[test]
    fn test_hidden_subscriber_count() {
        let stats = parse(json!({
            "items": [{ "statistics": { "hiddenSubscriberCount": true, "viewCount": "5" } }]
        }));
        assert_eq!(stats, StatsResult::subscribers(0).with_views(5));
    }
}
