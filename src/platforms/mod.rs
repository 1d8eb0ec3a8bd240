mod facebook;
mod instagram;
mod pinterest;
mod registry;
mod request;
mod telegram;
mod tiktok;
mod traits;
mod x;
mod youtube;

pub use facebook::FacebookFetcher;
pub use instagram::InstagramFetcher;
pub use pinterest::PinterestFetcher;
pub use registry::FetcherRegistry;
pub use telegram::TelegramFetcher;
pub use tiktok::TiktokFetcher;
pub use traits::{RenewOutcome, StatsFetcher, StatsResult, TokenRenewer};
pub use x::XFetcher;
pub use youtube::YoutubeFetcher;

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::config::Config;
use crate::error::StatsError;
use crate::store::TokenStore;

/// Platforms the router accepts in `?platform=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Facebook,
    Instagram,
    Youtube,
    Tiktok,
    Pinterest,
    X,
    Telegram,
}

impl Platform {
    pub const ALL: [Platform; 7] = [
        Platform::Facebook,
        Platform::Instagram,
        Platform::Youtube,
        Platform::Tiktok,
        Platform::Pinterest,
        Platform::X,
        Platform::Telegram,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Facebook => "facebook",
            Platform::Instagram => "instagram",
            Platform::Youtube => "youtube",
            Platform::Tiktok => "tiktok",
            Platform::Pinterest => "pinterest",
            Platform::X => "x",
            Platform::Telegram => "telegram",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Facebook => "Facebook",
            Platform::Instagram => "Instagram",
            Platform::Youtube => "YouTube",
            Platform::Tiktok => "TikTok",
            Platform::Pinterest => "Pinterest",
            Platform::X => "X",
            Platform::Telegram => "Telegram",
        }
    }

    /// Key under which this platform's stats are cached.
    pub fn cache_key(&self) -> String {
        format!("stats_{}", self.as_str())
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str() == lower)
            .ok_or(StatsError::InvalidPlatform)
    }
}

/// Shared outbound client; every fetcher clones it.
pub fn http_client(config: &Config) -> Result<reqwest::Client, StatsError> {
    reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()
        .map_err(|e| StatsError::Internal(format!("Failed to build HTTP client: {e}")))
}

/// Register all seven fetchers and the two token renewers.
///
/// Fetchers are registered even when their credentials are missing; they
/// report `NotConfigured` on fetch, which the router degrades to zero.
pub fn register_defaults(
    registry: &mut FetcherRegistry,
    config: &Config,
    tokens: &TokenStore,
    http: &reqwest::Client,
) {
    let facebook = Arc::new(FacebookFetcher::new(config, tokens.clone(), http.clone()));
    let instagram = Arc::new(InstagramFetcher::new(config, tokens.clone(), http.clone()));

    registry.register(facebook.clone());
    registry.register(instagram.clone());
    registry.register(Arc::new(YoutubeFetcher::new(config, http.clone())));
    registry.register(Arc::new(TiktokFetcher::new(config, http.clone())));
    registry.register(Arc::new(PinterestFetcher::new(config, http.clone())));
    registry.register(Arc::new(XFetcher::new(config, http.clone())));
    registry.register(Arc::new(TelegramFetcher::new(config, http.clone())));

    // Instagram renews first, then Facebook.
    registry.register_renewer(instagram);
    registry.register_renewer(facebook);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("facebook".parse::<Platform>().unwrap(), Platform::Facebook);
        assert_eq!("YouTube".parse::<Platform>().unwrap(), Platform::Youtube);
        assert_eq!("X".parse::<Platform>().unwrap(), Platform::X);
        assert_eq!("TELEGRAM".parse::<Platform>().unwrap(), Platform::Telegram);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(matches!(
            "myspace".parse::<Platform>(),
            Err(StatsError::InvalidPlatform)
        ));
        assert!("".parse::<Platform>().is_err());
        assert!(" tiktok".parse::<Platform>().is_err());
    }

    #[test]
    fn test_cache_key() {
        assert_eq!(Platform::Tiktok.cache_key(), "stats_tiktok");
        assert_eq!(Platform::X.cache_key(), "stats_x");
    }

    #[test]
    fn test_all_round_trips_through_as_str() {
        for platform in Platform::ALL {
            assert_eq!(platform.as_str().parse::<Platform>().unwrap(), platform);
        }
    }
}
