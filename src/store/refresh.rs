//! Background renewal of long-lived Instagram and Facebook tokens.
//!
//! Runs once per `TOKEN_REFRESH_INTERVAL_SECS` (default 24h). Every renewer
//! runs concurrently and independently; one failing never stops another.

use futures_util::future::join_all;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::platforms::{Platform, RenewOutcome};
use crate::AppState;

/// Start the refresh daemon loop.
pub async fn refresh_daemon(state: Arc<AppState>) {
    let interval = state.config.token_refresh_interval;
    if interval.is_zero() {
        warn!("Token refresh daemon disabled (TOKEN_REFRESH_INTERVAL_SECS=0)");
        return;
    }
    info!("Token refresh daemon started (interval: {}s)", interval.as_secs());

    loop {
        tokio::time::sleep(interval).await;
        refresh_cycle(&state).await;
    }
}

/// One pass: renew every token, then prune expired store keys and cache entries.
/// Returns the per-platform outcome, mostly for tests.
pub async fn refresh_cycle(state: &AppState) -> Vec<(Platform, bool)> {
    let renewals = state.registry.renewers().iter().map(|renewer| async move {
        let platform = renewer.platform();
        match renewer.renew().await {
            Ok(RenewOutcome::Renewed) => {
                info!(%platform, "Token refreshed");
                (platform, true)
            }
            Ok(RenewOutcome::Skipped(reason)) => {
                info!(%platform, "Token refresh skipped: {reason}");
                (platform, false)
            }
            Err(e) => {
                error!(%platform, "Token refresh error: {e}");
                (platform, false)
            }
        }
    });
    let outcomes = join_all(renewals).await;

    match state.tokens.kv().prune_expired().await {
        Ok(0) => {}
        Ok(n) => info!("Pruned {n} expired store keys"),
        Err(e) => warn!("Failed to prune expired store keys: {e}"),
    }
    state.cache.purge_expired().await;

    outcomes
}
