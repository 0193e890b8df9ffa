//! Sync orchestration: triggering runs, driving them in the background and
//! exposing their status.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use actix_web::rt::task::JoinHandle;
use chrono::Utc;
use serde_json::{Value, json};

use crate::auth::AuthenticatedUser;
use crate::domain::material::NewMaterial;
use crate::domain::sync::{NewSyncStatus, SyncMetadata, SyncState};
use crate::domain::system_event::NewSystemEvent;
use crate::domain::types::{EventSeverity, MaterialsCount, SourceName, SyncId, UserId};
use crate::dto::sync::{CancelOutcome, SyncStatusResponse, TriggeredSync};
use crate::extraction::ExtractionClient;
use crate::extraction::normalize::normalize;
use crate::forms::sync::TriggerSyncFormPayload;
use crate::models::config::SyncSettings;
use crate::repository::errors::RepositoryError;
use crate::repository::{MaterialWriter, SyncStatusReader, SyncStatusWriter, SystemEventWriter};

use super::{ServiceError, ServiceResult};

/// How often the supervisor checks whether a run task has settled.
const SUPERVISOR_POLL: Duration = Duration::from_millis(200);

/// Handles of currently running sync tasks, keyed by sync id.
///
/// Entries are added when a run is spawned and removed by the supervisor once
/// the task settles, so membership doubles as a liveness check.
#[derive(Clone, Default)]
pub struct SyncRegistry {
    inner: Arc<Mutex<HashMap<SyncId, JoinHandle<()>>>>,
}

impl SyncRegistry {
    /// Whether a task for this sync is still registered.
    pub fn is_running(&self, sync_id: SyncId) -> bool {
        self.lock().contains_key(&sync_id)
    }

    /// Whether the registered task has settled, or `None` when no task is
    /// registered under this id.
    pub fn is_finished(&self, sync_id: SyncId) -> Option<bool> {
        self.lock().get(&sync_id).map(JoinHandle::is_finished)
    }

    fn register(&self, sync_id: SyncId, handle: JoinHandle<()>) {
        self.lock().insert(sync_id, handle);
    }

    fn deregister(&self, sync_id: SyncId) -> Option<JoinHandle<()>> {
        self.lock().remove(&sync_id)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SyncId, JoinHandle<()>>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Kicks off a background sync run and returns its identifier immediately.
///
/// The record is created in the `pending` state, the run itself happens on a
/// spawned task, and a supervisor task waits on the handle so even a
/// panicking run is driven to the `failed` state. Restricting the run to a
/// category outside the configured set is a validation error.
pub fn trigger_sync<R>(
    payload: TriggerSyncFormPayload,
    user: &AuthenticatedUser,
    repo: &R,
    client: &Arc<dyn ExtractionClient>,
    settings: &SyncSettings,
    registry: &SyncRegistry,
) -> ServiceResult<TriggeredSync>
where
    R: SyncStatusReader
        + SyncStatusWriter
        + MaterialWriter
        + SystemEventWriter
        + Clone
        + 'static,
{
    if let Some(category) = &payload.category {
        if !settings.categories.iter().any(|c| c == category.as_str()) {
            return Err(ServiceError::Validation(format!(
                "unknown category: {}",
                category.as_str()
            )));
        }
    }

    let source = match SourceName::new(settings.source.clone()) {
        Ok(source) => source,
        Err(e) => {
            log::error!("Invalid sync source in settings: {e}");
            return Err(ServiceError::Internal);
        }
    };

    let sync_id = SyncId::generate();
    let new_sync = NewSyncStatus {
        sync_id,
        source,
        category: payload.category.clone(),
        started_at: Utc::now().naive_utc(),
    };

    let status = match repo.create_sync(&new_sync) {
        Ok(status) => status,
        Err(e) => {
            log::error!("Failed to create sync record: {e}");
            return Err(ServiceError::Internal);
        }
    };

    record_event(
        repo,
        "sync_started",
        EventSeverity::Info,
        format!("Sync {sync_id} started"),
        Some(json!({
            "sync_id": sync_id.to_string(),
            "category": payload.category.as_ref().map(|c| c.as_str()),
        })),
        UserId::new(user.sub.clone()).ok(),
    );

    let mut run_settings = settings.clone();
    if let Some(category) = &payload.category {
        run_settings.categories = vec![category.as_str().to_string()];
    }

    let run_repo = repo.clone();
    let run_client = Arc::clone(client);
    let handle = actix_web::rt::spawn(async move {
        run_sync(run_repo, run_client, run_settings, sync_id).await;
    });
    registry.register(sync_id, handle);

    let supervisor_repo = repo.clone();
    let supervisor_registry = registry.clone();
    actix_web::rt::spawn(async move {
        supervise(supervisor_repo, supervisor_registry, sync_id).await;
    });

    Ok(TriggeredSync::from(status))
}

/// Looks up a sync run by its public identifier.
pub fn check_sync_status<R>(sync_id: &str, repo: &R) -> ServiceResult<SyncStatusResponse>
where
    R: SyncStatusReader,
{
    let sync_id = match SyncId::parse(sync_id) {
        Ok(sync_id) => sync_id,
        Err(e) => return Err(ServiceError::Validation(e.to_string())),
    };

    match repo.get_sync_by_id(sync_id) {
        Ok(Some(status)) => Ok(SyncStatusResponse::from(status)),
        Ok(None) => Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get sync status: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Fetches the most recently started sync run, if any exists.
pub fn latest_sync<R>(repo: &R) -> ServiceResult<Option<SyncStatusResponse>>
where
    R: SyncStatusReader,
{
    match repo.latest_sync() {
        Ok(status) => Ok(status.map(SyncStatusResponse::from)),
        Err(e) => {
            log::error!("Failed to get latest sync: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Requests cancellation of a pending or in-progress sync.
///
/// A run that already reached a terminal state cannot be canceled; that case
/// is reported as a rejected [`CancelOutcome`] carrying the state conflict
/// message rather than as an error.
pub fn cancel_sync<R>(
    sync_id: &str,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<CancelOutcome>
where
    R: SyncStatusWriter + SystemEventWriter,
{
    let sync_id = match SyncId::parse(sync_id) {
        Ok(sync_id) => sync_id,
        Err(e) => return Err(ServiceError::Validation(e.to_string())),
    };

    match repo.cancel_sync(sync_id) {
        Ok(_) => {
            record_event(
                repo,
                "sync_canceled",
                EventSeverity::Info,
                format!("Sync {sync_id} canceled"),
                Some(json!({ "sync_id": sync_id.to_string() })),
                UserId::new(user.sub.clone()).ok(),
            );
            Ok(CancelOutcome::canceled())
        }
        Err(RepositoryError::NotFound) => Err(ServiceError::NotFound),
        Err(RepositoryError::InvalidState(message)) => Ok(CancelOutcome::rejected(message)),
        Err(e) => {
            log::error!("Failed to cancel sync: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Drives one sync run to a terminal state.
///
/// Any error escaping the run body marks the record failed, so the spawned
/// task always settles without leaving the record active.
async fn run_sync<R, C>(repo: R, client: Arc<C>, settings: SyncSettings, sync_id: SyncId)
where
    R: SyncStatusReader + SyncStatusWriter + MaterialWriter + SystemEventWriter,
    C: ExtractionClient + ?Sized,
{
    if let Err(e) = run_sync_inner(&repo, client.as_ref(), &settings, sync_id).await {
        log::error!("Sync {sync_id} failed: {e}");
        let message = e.to_string();
        if let Err(e) = repo.fail_sync(sync_id, &message) {
            log::warn!("Failed to mark sync {sync_id} as failed: {e}");
        }
        record_event(
            &repo,
            "sync_failed",
            EventSeverity::Error,
            format!("Sync {sync_id} failed: {message}"),
            Some(json!({ "sync_id": sync_id.to_string() })),
            None,
        );
    }
}

/// One full pass over the configured categories.
///
/// A single category failing to extract or store is logged and skipped; the
/// run only fails outright when the status record itself cannot be advanced.
/// Cancellation is observed between categories and again before each write,
/// so a batch fetched while the cancel landed is discarded.
async fn run_sync_inner<R, C>(
    repo: &R,
    client: &C,
    settings: &SyncSettings,
    sync_id: SyncId,
) -> Result<(), RepositoryError>
where
    R: SyncStatusReader + SyncStatusWriter + MaterialWriter + SystemEventWriter,
    C: ExtractionClient + ?Sized,
{
    match repo.mark_in_progress(sync_id) {
        Ok(_) => {}
        // Canceled between trigger and pickup; nothing to do.
        Err(RepositoryError::InvalidState(_)) => return Ok(()),
        Err(e) => return Err(e),
    }

    let total_categories = settings.categories.len();
    let mut materials_total = 0usize;

    for (index, category) in settings.categories.iter().enumerate() {
        if sync_is_canceled(repo, sync_id)? {
            return Ok(());
        }

        let progress = ((index as f64 / total_categories as f64) * 100.0).round() as u8;
        match repo.advance_sync(sync_id, &SyncMetadata::category_progress(category, progress)) {
            Ok(_) => {}
            // A cancel can land between the check above and this write.
            Err(RepositoryError::InvalidState(_)) => return Ok(()),
            Err(e) => return Err(e),
        }

        let raw = match client
            .fetch_category(category, settings.per_category_limit)
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("Sync {sync_id}: extraction failed for {category}: {e}");
                record_event(
                    repo,
                    "sync_category_error",
                    EventSeverity::Warning,
                    format!("Extraction failed for {category}: {e}"),
                    Some(json!({ "sync_id": sync_id.to_string(), "category": category })),
                    None,
                );
                continue;
            }
        };

        let synced_at = Utc::now().naive_utc();
        let listed = raw.len();
        let materials: Vec<NewMaterial> = raw
            .into_iter()
            .filter_map(|product| {
                normalize(product, category, &settings.vendor, &settings.source, synced_at)
            })
            .collect();
        if materials.len() < listed {
            log::warn!(
                "Sync {sync_id}: dropped {} of {listed} {category} listings without usable identity",
                listed - materials.len()
            );
        }
        if materials.is_empty() {
            continue;
        }

        // A cancel that raced the fetch discards the in-flight batch.
        if sync_is_canceled(repo, sync_id)? {
            return Ok(());
        }

        match repo.upsert_materials(&materials) {
            Ok(written) => materials_total += written,
            Err(e) => {
                log::warn!("Sync {sync_id}: failed to store {category} materials: {e}");
                record_event(
                    repo,
                    "sync_category_error",
                    EventSeverity::Warning,
                    format!("Failed to store {category} materials: {e}"),
                    Some(json!({ "sync_id": sync_id.to_string(), "category": category })),
                    None,
                );
            }
        }
    }

    let outcome = if materials_total == 0 {
        SyncState::CompletedNoData
    } else {
        SyncState::Completed
    };
    match repo.complete_sync(sync_id, outcome, MaterialsCount::from_usize(materials_total)) {
        Ok(_) => {
            record_event(
                repo,
                "sync_completed",
                EventSeverity::Info,
                format!("Sync {sync_id} completed with {materials_total} materials"),
                Some(json!({
                    "sync_id": sync_id.to_string(),
                    "materials_count": materials_total,
                })),
                None,
            );
            Ok(())
        }
        // A cancel that landed after the last category wins.
        Err(RepositoryError::InvalidState(_)) => Ok(()),
        Err(e) => Err(e),
    }
}

fn sync_is_canceled<R>(repo: &R, sync_id: SyncId) -> Result<bool, RepositoryError>
where
    R: SyncStatusReader,
{
    match repo.get_sync_by_id(sync_id)? {
        Some(status) => Ok(status.status == SyncState::Canceled),
        None => Err(RepositoryError::NotFound),
    }
}

/// Waits for a run task to settle, then clears its registry entry.
///
/// A task that panics never reaches its own failure handling, so the
/// supervisor records the failure on its behalf.
async fn supervise<R>(repo: R, registry: SyncRegistry, sync_id: SyncId)
where
    R: SyncStatusWriter + SystemEventWriter,
{
    loop {
        match registry.is_finished(sync_id) {
            Some(false) => actix_web::rt::time::sleep(SUPERVISOR_POLL).await,
            Some(true) | None => break,
        }
    }

    let Some(handle) = registry.deregister(sync_id) else {
        return;
    };
    match handle.await {
        Ok(()) => {}
        Err(e) if e.is_panic() => {
            log::error!("Sync {sync_id} task panicked");
            if let Err(e) = repo.fail_sync(sync_id, "sync task panicked") {
                log::warn!("Failed to mark panicked sync {sync_id} as failed: {e}");
            }
            record_event(
                &repo,
                "sync_failed",
                EventSeverity::Error,
                format!("Sync {sync_id} failed: sync task panicked"),
                Some(json!({ "sync_id": sync_id.to_string() })),
                None,
            );
        }
        Err(_) => {}
    }
}

fn record_event<R>(
    repo: &R,
    event_type: &str,
    severity: EventSeverity,
    message: String,
    metadata: Option<Value>,
    user_id: Option<UserId>,
) where
    R: SystemEventWriter,
{
    let event = NewSystemEvent {
        event_type: event_type.to_string(),
        severity,
        message,
        metadata,
        user_id,
        created_at: Utc::now().naive_utc(),
    };
    if let Err(e) = repo.log_system_event(&event) {
        log::warn!("Failed to record {event_type} event: {e}");
    }
}
