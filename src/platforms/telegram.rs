use async_trait::async_trait;
use serde::Deserialize;

use super::request::{lenient_count, require};
use super::traits::{StatsFetcher, StatsResult};
use super::Platform;
use crate::config::Config;
use crate::error::StatsError;

const API_URL: &str = "https://api.telegram.org";

/// Telegram channel/group member count via the Bot API.
///
/// The bot must be a member of the chat. Bot API failures come back as
/// `{"ok": false, "description": ...}`, often with a 4xx status, so the body
/// is decoded before the status is considered.
pub struct TelegramFetcher {
    bot_token: Option<String>,
    chat_id: Option<String>,
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct BotResponse {
    ok: bool,
    #[serde(default, deserialize_with = "lenient_count")]
    result: Option<u64>,
    description: Option<String>,
}

impl TelegramFetcher {
    pub fn new(config: &Config, http: reqwest::Client) -> Self {
        Self {
            bot_token: config.telegram_bot_token.clone(),
            chat_id: config.telegram_chat_id.clone(),
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
impl StatsFetcher for TelegramFetcher {
    fn platform(&self) -> Platform {
        Platform::Telegram
    }

    async fn fetch(&self) -> Result<StatsResult, StatsError> {
        let name = self.platform().display_name();
        let bot_token = require(&self.bot_token, self.platform(), "TELEGRAM_BOT_TOKEN")?;
        let chat_id = require(&self.chat_id, self.platform(), "TELEGRAM_CHAT_ID")?;

        let resp = self
            .http
            .get(format!("{}/bot{bot_token}/getChatMembersCount", self.base_url))
            .query(&[("chat_id", chat_id)])
            .send()
            .await
            .map_err(|e| StatsError::upstream(name, e))?;

        let body: BotResponse = resp.json().await.map_err(|e| StatsError::parse(name, e))?;
        if !body.ok {
            return Err(StatsError::Upstream {
                platform: name,
                message: body
                    .description
                    .unwrap_or_else(|| "Bot API returned ok=false".into()),
            });
        }

        Ok(StatsResult::subscribers(body.result.unwrap_or(0)))
    }
}
