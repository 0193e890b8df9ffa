//! Background polling of a sync run until it settles.

use std::time::Duration;

use actix_web::rt::task::JoinHandle;

use crate::domain::sync::SyncStatus;
use crate::domain::types::SyncId;
use crate::repository::SyncStatusReader;

use super::{ServiceError, ServiceResult};

/// How often [`watch_sync`] polls when the caller does not pick an interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Handle to a running watcher task.
pub struct WatchHandle {
    handle: JoinHandle<()>,
}

impl WatchHandle {
    /// Stops the watcher without waiting for the next poll.
    pub fn stop(&self) {
        self.handle.abort();
    }

    /// Whether the watcher has stopped, on its own or via [`WatchHandle::stop`].
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Polls a sync run's status until it reaches a terminal state.
///
/// Every observation is handed to `on_update`, errors included: a missing
/// record or a failed read is reported and polling continues, so a transient
/// database hiccup does not kill the watcher. The task stops on its own after
/// reporting a terminal status.
pub fn watch_sync<R, F>(
    repo: R,
    sync_id: SyncId,
    interval: Duration,
    mut on_update: F,
) -> WatchHandle
where
    R: SyncStatusReader + 'static,
    F: FnMut(ServiceResult<SyncStatus>) + 'static,
{
    let handle = actix_web::rt::spawn(async move {
        loop {
            match repo.get_sync_by_id(sync_id) {
                Ok(Some(status)) => {
                    let terminal = status.is_terminal();
                    on_update(Ok(status));
                    if terminal {
                        break;
                    }
                }
                Ok(None) => on_update(Err(ServiceError::NotFound)),
                Err(e) => {
                    log::warn!("Failed to poll sync {sync_id}: {e}");
                    on_update(Err(ServiceError::Internal));
                }
            }
            actix_web::rt::time::sleep(interval).await;
        }
    });
    WatchHandle { handle }
}
