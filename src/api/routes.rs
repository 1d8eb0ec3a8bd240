//! Route handlers. All handlers receive `SharedState` via Axum state extraction.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

use crate::error::StatsError;
use crate::platforms::{Platform, StatsResult};
use crate::SharedState;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(stats).post(stats).options(preflight))
        // `?platform=` takes precedence over the health and listing documents.
        .route("/status", get(status).post(status).options(preflight))
        .route("/platforms", get(platforms).post(platforms).options(preflight))
        // Widgets are deployed against arbitrary paths; only `?platform=` matters.
        .method_not_allowed_fallback(any_path)
        .fallback(any_path)
        .with_state(state)
}

/// Raw query pairs. A malformed query string reads as no platform at all.
type QueryPairs = Result<Query<Vec<(String, String)>>, QueryRejection>;

/// First `platform` value, the way `URLSearchParams::get` picks it.
fn platform_param(query: QueryPairs) -> Option<String> {
    let Query(pairs) = query.ok()?;
    pairs
        .into_iter()
        .find(|(key, _)| key == "platform")
        .map(|(_, value)| value)
}

// =============================================================================
// Health
// =============================================================================

async fn status(State(state): State<SharedState>, query: QueryPairs) -> Response {
    if let Some(platform) = platform_param(query) {
        return serve_stats(&state, Some(platform)).await.into_response();
    }

    Json(json!({
        "status": "ok",
        "service": "social-stats",
        "version": env!("CARGO_PKG_VERSION"),
    }))
    .into_response()
}

async fn platforms(State(state): State<SharedState>, query: QueryPairs) -> Response {
    if let Some(platform) = platform_param(query) {
        return serve_stats(&state, Some(platform)).await.into_response();
    }

    Json(json!({ "platforms": state.registry.list() })).into_response()
}

// =============================================================================
// Stats
// =============================================================================

/// GET|POST /?platform=<name> — normalized stats for one platform.
async fn stats(
    State(state): State<SharedState>,
    query: QueryPairs,
) -> Result<Json<StatsResult>, StatsError> {
    serve_stats(&state, platform_param(query)).await
}

/// Vendor failures never surface as errors: the caller gets the platform's
/// zero result and the failure is logged.
async fn serve_stats(
    state: &SharedState,
    platform: Option<String>,
) -> Result<Json<StatsResult>, StatsError> {
    let platform: Platform = platform.ok_or(StatsError::InvalidPlatform)?.parse()?;

    let fetcher = state
        .registry
        .get(platform)
        .ok_or(StatsError::InvalidPlatform)?;

    let result = match state
        .cache
        .get_or_fetch(platform, || fetcher.fetch())
        .await
    {
        Ok(stats) => stats,
        Err(e) => {
            tracing::error!(%platform, "Error fetching stats: {e}");
            fetcher.zero()
        }
    };

    Ok(Json(result))
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn any_path(method: Method, state: State<SharedState>, query: QueryPairs) -> Response {
    if method == Method::OPTIONS {
        return preflight().await.into_response();
    }
    stats(state, query).await.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::FromRequestParts;
    use axum::http::Request;

    async fn pairs(uri: &str) -> QueryPairs {
        let (mut parts, _) = Request::builder().uri(uri).body(()).unwrap().into_parts();
        Query::<Vec<(String, String)>>::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_platform_param_takes_first_value() {
        assert_eq!(
            platform_param(pairs("/?platform=tiktok&platform=x").await).as_deref(),
            Some("tiktok")
        );
        assert_eq!(
            platform_param(pairs("/?ref=widget&platform=X").await).as_deref(),
            Some("X")
        );
    }

    #[tokio::test]
    async fn test_platform_param_missing_or_empty() {
        assert_eq!(platform_param(pairs("/").await), None);
        assert_eq!(platform_param(pairs("/?ref=widget").await), None);
        assert_eq!(platform_param(pairs("/?platform=").await).as_deref(), Some(""));
    }
}
