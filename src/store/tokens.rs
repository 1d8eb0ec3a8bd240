//! Long-lived vendor tokens kept in the key-value store.
//!
//! One value per provider; the refresh daemon overwrites it on every
//! successful renewal and stamps `<PROVIDER>_UPDATED_AT` alongside.

use super::kv::KvStore;
use crate::error::StatsError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// Stored tokens expire after 60 days unless renewed first.
pub const TOKEN_TTL: Duration = Duration::from_secs(60 * 24 * 60 * 60);

/// Store keys for one provider's token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenKey {
    pub token: &'static str,
    pub updated_at: &'static str,
}

impl TokenKey {
    pub const FACEBOOK: TokenKey = TokenKey {
        token: "FACEBOOK_ACCESS_TOKEN",
        updated_at: "FACEBOOK_UPDATED_AT",
    };

    pub const INSTAGRAM: TokenKey = TokenKey {
        token: "INSTAGRAM_ACCESS_TOKEN",
        updated_at: "INSTAGRAM_UPDATED_AT",
    };
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    pub value: String,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct TokenStore {
    kv: KvStore,
}

impl TokenStore {
    pub fn new(kv: KvStore) -> Self {
        Self { kv }
    }

    pub fn kv(&self) -> &KvStore {
        &self.kv
    }

    /// Current token: the stored one, else `fallback`, else empty. Always trimmed.
    pub async fn get_token(
        &self,
        key: TokenKey,
        fallback: Option<&str>,
    ) -> Result<String, StatsError> {
        let stored = self.kv.get(key.token).await?;
        let value = stored
            .as_deref()
            .filter(|v| !v.is_empty())
            .or(fallback)
            .unwrap_or_default();

        Ok(value.trim().to_string())
    }

    /// Persist a renewed token. Empty values are ignored; returns whether a write happened.
    pub async fn set_token(&self, key: TokenKey, value: &str) -> Result<bool, StatsError> {
        if value.is_empty() {
            return Ok(false);
        }
        self.kv.put(key.token, value, Some(TOKEN_TTL)).await?;
        Ok(true)
    }

    /// Stamp the renewal time (epoch millis, no expiry).
    pub async fn mark_updated(&self, key: TokenKey) -> Result<(), StatsError> {
        let now = Utc::now().timestamp_millis().to_string();
        self.kv.put(key.updated_at, &now, None).await
    }

    /// The stored token and when it was last renewed. `None` if nothing is stored.
    pub async fn record(&self, key: TokenKey) -> Result<Option<TokenRecord>, StatsError> {
        let Some(value) = self.kv.get(key.token).await? else {
            return Ok(None);
        };

        let updated_at = self
            .kv
            .get(key.updated_at)
            .await?
            .and_then(|ms| ms.trim().parse::<i64>().ok())
            .and_then(DateTime::<Utc>::from_timestamp_millis);

        Ok(Some(TokenRecord { value, updated_at }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_tokens() -> TokenStore {
        let kv = KvStore::new("sqlite::memory:").await.unwrap();
        kv.migrate().await.unwrap();
        TokenStore::new(kv)
    }

    #[tokio::test]
    async fn test_get_token_prefers_stored_over_fallback() {
        let tokens = test_tokens().await;
        let key = TokenKey::INSTAGRAM;

        assert_eq!(tokens.get_token(key, None).await.unwrap(), "");
        assert_eq!(
            tokens.get_token(key, Some("  seed-token \n")).await.unwrap(),
            "seed-token"
        );

        tokens.set_token(key, "renewed-token ").await.unwrap();
        assert_eq!(
            tokens.get_token(key, Some("seed-token")).await.unwrap(),
            "renewed-token"
        );
    }

    #[tokio::test]
    async fn test_set_token_ignores_empty_value() {
        let tokens = test_tokens().await;
        let key = TokenKey::FACEBOOK;

        tokens.set_token(key, "abc").await.unwrap();
        assert!(!tokens.set_token(key, "").await.unwrap());
        assert_eq!(tokens.get_token(key, None).await.unwrap(), "abc");
    }

    #[tokio::test]
    async fn test_record_includes_updated_at() {
        let tokens = test_tokens().await;
        let key = TokenKey::FACEBOOK;
        assert_eq!(tokens.record(key).await.unwrap(), None);

        tokens.set_token(key, "abc").await.unwrap();
        let record = tokens.record(key).await.unwrap().unwrap();
        assert_eq!(record.value, "abc");
        assert!(record.updated_at.is_none());

        let before = Utc::now().timestamp_millis();
        tokens.mark_updated(key).await.unwrap();
        let record = tokens.record(key).await.unwrap().unwrap();
        let stamped = record.updated_at.unwrap().timestamp_millis();
        assert!(stamped >= before);
    }
}
