//! Delayed spawn-to-idle transition

use std::sync::Weak;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::manager::AgentManager;

/// Handle to a scheduled startup completion
///
/// Dropping the handle leaves the timer running. Call [`cancel`](Self::cancel)
/// to stop it; the agent then stays in spawning until completed by hand or
/// recovered as stuck.
pub struct StartupHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl StartupHandle {
    /// Complete startup of `agent_id` after `delay` unless cancelled first
    ///
    /// Holds only a weak reference so a pending timer never keeps the
    /// manager alive.
    pub(crate) fn schedule(manager: Weak<AgentManager>, agent_id: String, delay: Duration) -> Self {
        let token = CancellationToken::new();
        let cancelled = token.clone();

        let task = tokio::spawn(async move {
            tokio::select! {
                _ = cancelled.cancelled() => {
                    debug!(agent_id = %agent_id, "Startup timer cancelled");
                }
                _ = tokio::time::sleep(delay) => {
                    let Some(manager) = manager.upgrade() else {
                        debug!(agent_id = %agent_id, "Manager dropped before startup completed");
                        return;
                    };
                    if let Err(e) = manager.complete_startup(&agent_id).await {
                        warn!(agent_id = %agent_id, error = %e, "Failed to complete agent startup");
                    }
                }
            }
        });

        Self { token, task }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the timer to fire or be cancelled
    pub async fn wait(self) {
        if let Err(e) = self.task.await {
            warn!(error = %e, "Startup task ended abnormally");
        }
    }
}
