//! Shared request plumbing for the platform fetchers.

use reqwest::header::{ACCEPT_LANGUAGE, AUTHORIZATION, USER_AGENT};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::Platform;
use crate::error::StatsError;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/110.0.0.0 Safari/537.36";

/// Some vendors (and TikTok's HTML) answer differently to non-browser clients.
pub(crate) fn browser_headers(req: RequestBuilder) -> RequestBuilder {
    req.header(USER_AGENT, BROWSER_USER_AGENT)
        .header(ACCEPT_LANGUAGE, "en")
}

pub(crate) fn bearer(req: RequestBuilder, token: &str) -> RequestBuilder {
    req.header(AUTHORIZATION, format!("Bearer {token}"))
}

/// Send and reject any non-2xx status.
pub(crate) async fn send_checked(
    req: RequestBuilder,
    platform: Platform,
) -> Result<reqwest::Response, StatsError> {
    let name = platform.display_name();
    let resp = req.send().await.map_err(|e| StatsError::upstream(name, e))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(StatsError::UpstreamStatus {
            platform: name,
            status: status.as_u16(),
        });
    }

    Ok(resp)
}

pub(crate) async fn get_json<T: DeserializeOwned>(
    req: RequestBuilder,
    platform: Platform,
) -> Result<T, StatsError> {
    let resp = send_checked(req, platform).await?;
    let body = resp
        .text()
        .await
        .map_err(|e| StatsError::upstream(platform.display_name(), e))?;

    serde_json::from_str(&body).map_err(|e| StatsError::parse(platform.display_name(), e))
}

pub(crate) fn require<'a>(
    value: &'a Option<String>,
    platform: Platform,
    missing: &'static str,
) -> Result<&'a str, StatsError> {
    value.as_deref().ok_or(StatsError::NotConfigured {
        platform: platform.display_name(),
        missing,
    })
}

/// Vendors disagree on whether counts are numbers or numeric strings.
pub(crate) fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(count_of))
}

pub(crate) fn count_of(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
