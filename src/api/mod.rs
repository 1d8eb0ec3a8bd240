//! HTTP surface for social-stats.
//!
//! - `/?platform=<name>` — normalized stats for one platform (any path works)
//! - `/platforms`        — supported platform names
//! - `/status`           — health check
//!
//! A `platform` query wins on every path, `/status` and `/platforms`
//! included. `OPTIONS` answers 200 with an empty body everywhere.
//!
//! Every response carries permissive CORS headers so browser widgets on
//! any origin can call the service directly.

pub mod routes;

use crate::SharedState;
use axum::http::{header, HeaderValue};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

pub const ALLOWED_METHODS: &str = "GET, POST, OPTIONS";
pub const ALLOWED_HEADERS: &str = "Content-Type, Authorization, X-Requested-With";

pub fn router(state: SharedState) -> Router {
    routes::router(state)
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        ))
        .layer(TraceLayer::new_for_http())
}
