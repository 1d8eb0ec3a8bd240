use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::Platform;
use crate::error::StatsError;
use crate::store::{TokenKey, TokenStore};

/// Normalized counts returned for every platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsResult {
    pub subscribers: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views: Option<u64>,
}

impl StatsResult {
    pub fn subscribers(subscribers: u64) -> Self {
        Self {
            subscribers,
            ..Self::default()
        }
    }

    pub fn with_likes(mut self, likes: u64) -> Self {
        self.likes = Some(likes);
        self
    }

    pub fn with_views(mut self, views: u64) -> Self {
        self.views = Some(views);
        self
    }
}

/// Trait that every platform fetcher implements.
#[async_trait]
pub trait StatsFetcher: Send + Sync {
    fn platform(&self) -> Platform;

    /// Call the vendor API and normalize its response.
    async fn fetch(&self) -> Result<StatsResult, StatsError>;

    /// What callers receive when `fetch` fails.
    fn zero(&self) -> StatsResult {
        StatsResult::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenewOutcome {
    Renewed,
    Skipped(&'static str),
}

/// Providers whose long-lived token can be exchanged for a fresh one.
#[async_trait]
pub trait TokenRenewer: Send + Sync {
    fn platform(&self) -> Platform;

    async fn renew(&self) -> Result<RenewOutcome, StatsError>;
}

/// Persist the `access_token` of a renewal response, or report the vendor's payload.
pub(crate) async fn store_renewed_token(
    tokens: &TokenStore,
    key: TokenKey,
    platform: Platform,
    payload: &serde_json::Value,
) -> Result<RenewOutcome, StatsError> {
    let fresh = payload
        .get("access_token")
        .and_then(|v| v.as_str())
        .filter(|v| !v.is_empty());

    match fresh {
        Some(token) => {
            tokens.set_token(key, token).await?;
            tokens.mark_updated(key).await?;
            Ok(RenewOutcome::Renewed)
        }
        None => Err(StatsError::RefreshFailed(format!(
            "{} rejected renewal: {payload}",
            platform.display_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_counts_are_omitted() {
        let json = serde_json::to_value(StatsResult::subscribers(12)).unwrap();
        assert_eq!(json, serde_json::json!({ "subscribers": 12 }));

        let json = serde_json::to_value(StatsResult::subscribers(1).with_likes(0)).unwrap();
        assert_eq!(json, serde_json::json!({ "subscribers": 1, "likes": 0 }));

        let json = serde_json::to_value(StatsResult::subscribers(5).with_views(900)).unwrap();
        assert_eq!(json, serde_json::json!({ "subscribers": 5, "views": 900 }));
    }
}
