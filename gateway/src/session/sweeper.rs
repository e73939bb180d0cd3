use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::session::store::SessionStoreRef;

/// Periodically drop expired sessions so abandoned ones don't wait for the next login.
///
/// Returns `None` when `interval` is zero. Abort the handle to stop the task.
pub fn spawn_sweeper(store: SessionStoreRef, interval: Duration) -> Option<JoinHandle<()>> {
    if interval.is_zero() {
        info!("Background session sweep disabled");
        return None;
    }

    info!(interval_secs = interval.as_secs(), "Starting background session sweep");

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let removed = store.sweep_expired().await;
            if removed > 0 {
                info!(removed, "Swept expired sessions");
            } else {
                debug!("Session sweep found nothing to remove");
            }
        }
    }))
}
