use anyhow::{Context, Result};
use std::time::Duration;

/// Application configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // ── Server ──────────────────────────────────────────────────────────
    pub host: String,
    pub port: u16,

    // ── Key-value store (SQLite) ────────────────────────────────────────
    pub database_url: String,

    // ── Stats cache ─────────────────────────────────────────────────────
    pub cache_enabled: bool,
    pub cache_ttl: Duration,

    // ── Jobs / outbound HTTP ────────────────────────────────────────────
    pub token_refresh_interval: Duration,
    pub http_timeout: Duration,

    // ── Facebook ────────────────────────────────────────────────────────
    pub facebook_page_id: Option<String>,
    /// Seed token, used until the refresh job has stored one.
    pub facebook_access_token: Option<String>,
    pub facebook_app_id: Option<String>,
    pub facebook_app_secret: Option<String>,

    // ── Instagram ───────────────────────────────────────────────────────
    pub instagram_page_id: Option<String>,
    pub instagram_access_token: Option<String>,

    // ── Other platforms ─────────────────────────────────────────────────
    pub youtube_channel_id: Option<String>,
    pub youtube_api_key: Option<String>,
    pub tiktok_user: Option<String>,
    pub pinterest_access_token: Option<String>,
    pub x_user_id: Option<String>,
    pub x_bearer_token: Option<String>,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: "0.0.0.0".into(),
            port: 8787,
            database_url: "sqlite::memory:".into(),
            cache_enabled: true,
            cache_ttl: Duration::from_secs(60),
            token_refresh_interval: Duration::from_secs(24 * 3600),
            http_timeout: Duration::from_secs(10),
            facebook_page_id: None,
            facebook_access_token: None,
            facebook_app_id: None,
            facebook_app_secret: None,
            instagram_page_id: None,
            instagram_access_token: None,
            youtube_channel_id: None,
            youtube_api_key: None,
            tiktok_user: None,
            pinterest_access_token: None,
            x_user_id: None,
            x_bearer_token: None,
            telegram_bot_token: None,
            telegram_chat_id: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8787".into())
                .parse()
                .context("Invalid PORT")?,

            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://social-stats.db?mode=rwc".into()),

            cache_enabled: std::env::var("STATS_CACHE_ENABLED")
                .map(|v| parse_bool(&v))
                .unwrap_or(Ok(true))
                .context("Invalid STATS_CACHE_ENABLED")?,
            cache_ttl: secs_var("STATS_CACHE_TTL_SECS", 60)?,

            token_refresh_interval: secs_var("TOKEN_REFRESH_INTERVAL_SECS", 24 * 3600)?,
            http_timeout: secs_var("HTTP_TIMEOUT_SECS", 10)?,

            facebook_page_id: optional("FACEBOOK_PAGE_ID"),
            facebook_access_token: optional("FACEBOOK_ACCESS_TOKEN"),
            facebook_app_id: optional("FACEBOOK_APP_ID"),
            facebook_app_secret: optional("FACEBOOK_APP_SECRET"),

            instagram_page_id: optional("INSTAGRAM_PAGE_ID"),
            instagram_access_token: optional("INSTAGRAM_ACCESS_TOKEN"),

            youtube_channel_id: optional("YOUTUBE_CHANNEL_ID"),
            youtube_api_key: optional("YOUTUBE_API_KEY"),
            tiktok_user: optional("TIKTOK_USER"),
            pinterest_access_token: optional("PINTEREST_ACCESS_TOKEN"),
            x_user_id: optional("X_USER_ID"),
            x_bearer_token: optional("X_BEARER_TOKEN"),
            telegram_bot_token: optional("TELEGRAM_BOT_TOKEN"),
            telegram_chat_id: optional("TELEGRAM_CHAT_ID"),
        })
    }

    /// Whether the read-through stats cache should be consulted at all.
    pub fn cache_active(&self) -> bool {
        self.cache_enabled && !self.cache_ttl.is_zero()
    }
}

/// Non-empty env var, trimmed.
fn optional(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn secs_var(name: &str, default: u64) -> Result<Duration> {
    match std::env::var(name) {
        Ok(v) => {
            let secs: u64 = v.trim().parse().with_context(|| format!("Invalid {name}"))?;
            Ok(Duration::from_secs(secs))
        }
        Err(_) => Ok(Duration::from_secs(default)),
    }
}

fn parse_bool(v: &str) -> Result<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("expected a boolean, got {other:?}"),
    }
}
