//! services/api/src/web/sweep_task.rs
//!
//! Background task that drops sessions nobody has been connected to for a while.

use crate::web::state::AppState;
use std::sync::Arc;
use tokio::{
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::info;

/// Runs `SessionRegistry::evict_idle` once per idle timeout for the life of the process.
pub fn spawn_sweep_task(app_state: Arc<AppState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let max_idle = app_state.config.session_idle_timeout;
        let mut ticker = interval_at(Instant::now() + max_idle, max_idle);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let evicted = app_state.sessions.evict_idle(max_idle).await;
            if evicted > 0 {
                let remaining = app_state.sessions.len().await;
                info!(
                    evicted,
                    remaining,
                    "Evicted idle sessions."
                );
            }
        }
    })
}
