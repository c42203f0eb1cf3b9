//! Snapshot refresh background task

use std::{sync::Arc, time::Duration};

use tokio::time::interval;
use tracing::{info, warn};

use crate::state::AppState;

/// Background task that periodically republishes registry snapshots so
/// display subscribers see running timers advance.
///
/// Read-and-publish only: elapsed time is derived at read time, so the
/// tick never writes accrual back into the registry and a late or missed
/// tick cannot lose or double-count time. The caller owns the task's
/// `JoinHandle` and aborts it on shutdown.
pub async fn snapshot_ticker_task(state: Arc<AppState>, tick: Duration) {
    info!("Starting snapshot ticker ({}ms interval)", tick.as_millis());

    let mut interval = interval(tick);

    loop {
        interval.tick().await;

        if let Err(e) = state.publish_snapshots() {
            warn!("Failed to publish snapshots: {}", e);
        }
    }
}
