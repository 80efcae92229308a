//! Session Sweep Task
//!
//! Periodically drops expired sessions so abandoned logins do not pile up.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::session::SessionStore;

/// Spawns the session sweep. The first sweep runs one full interval after start.
pub fn spawn_session_sweep_task(
    sessions: Arc<RwLock<SessionStore>>,
    sweep_interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(sweep_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting session sweep task with interval of {} seconds",
            sweep_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = sessions.write().await.cleanup_expired();
            if removed > 0 {
                info!("Session sweep: removed {} expired sessions", removed);
            } else {
                debug!("Session sweep: nothing to remove");
            }
        }
    })
}
