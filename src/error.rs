use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Unified error type for the social-stats service.
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    // ── Request Errors ──────────────────────────────────────────────────
    #[error("Invalid platform")]
    InvalidPlatform,

    // ── Platform Errors ─────────────────────────────────────────────────
    #[error("{platform} is not configured: {missing} missing")]
    NotConfigured {
        platform: &'static str,
        missing: &'static str,
    },

    #[error("{platform} request failed: {message}")]
    Upstream {
        platform: &'static str,
        message: String,
    },

    #[error("{platform} returned HTTP {status}")]
    UpstreamStatus { platform: &'static str, status: u16 },

    #[error("{platform} response could not be parsed: {message}")]
    Parse {
        platform: &'static str,
        message: String,
    },

    // ── Token Errors ────────────────────────────────────────────────────
    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    // ── Internal ────────────────────────────────────────────────────────
    #[error("Store error: {0}")]
    Store(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl StatsError {
    pub fn upstream(platform: &'static str, e: reqwest::Error) -> Self {
        StatsError::Upstream {
            platform,
            message: e.to_string(),
        }
    }

    pub fn parse(platform: &'static str, message: impl ToString) -> Self {
        StatsError::Parse {
            platform,
            message: message.to_string(),
        }
    }
}

impl From<sqlx::Error> for StatsError {
    fn from(e: sqlx::Error) -> Self {
        tracing::error!("Store error: {e}");
        StatsError::Store(e.to_string())
    }
}

impl IntoResponse for StatsError {
    fn into_response(self) -> Response {
        let status = match &self {
            StatsError::InvalidPlatform => StatusCode::UNPROCESSABLE_ENTITY,
            StatsError::NotConfigured { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            StatsError::Upstream { .. }
            | StatsError::UpstreamStatus { .. }
            | StatsError::Parse { .. }
            | StatsError::RefreshFailed(_) => StatusCode::BAD_GATEWAY,
            StatsError::Store(_) | StatsError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Browser widgets read `error` as a plain string.
        let body = json!({ "error": self.to_string() });

        (status, axum::Json(body)).into_response()
    }
}
