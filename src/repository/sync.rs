use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::domain::sync::{NewSyncStatus, SyncMetadata, SyncState, SyncStatus};
use crate::domain::types::{MaterialsCount, SyncId};
use crate::models::sync::{
    NewSyncStatus as DbNewSyncStatus, SyncStatus as DbSyncStatus, metadata_to_column,
    parse_metadata,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, SyncStatusReader, SyncStatusWriter};

/// States from which a sync record may still transition.
const ACTIVE_STATES: [&str; 2] = [
    SyncState::Pending.as_str(),
    SyncState::InProgress.as_str(),
];

/// Classify a guarded update that matched no rows: either the record does not
/// exist or its current state does not allow the transition.
fn transition_conflict(
    conn: &mut SqliteConnection,
    sync_id: SyncId,
    verb: &str,
) -> RepositoryError {
    use crate::schema::sync_status;

    let current = sync_status::table
        .filter(sync_status::sync_id.eq(sync_id.to_string()))
        .select(sync_status::status)
        .first::<String>(conn)
        .optional();

    match current {
        Ok(Some(status)) => {
            RepositoryError::InvalidState(format!("Cannot {verb} sync in {status} state"))
        }
        Ok(None) => RepositoryError::NotFound,
        Err(e) => RepositoryError::Database(e),
    }
}

impl SyncStatusReader for DieselRepository {
    fn get_sync_by_id(&self, sync_id: SyncId) -> RepositoryResult<Option<SyncStatus>> {
        use crate::schema::sync_status;

        let mut conn = self.conn()?;

        let sync = sync_status::table
            .filter(sync_status::sync_id.eq(sync_id.to_string()))
            .first::<DbSyncStatus>(&mut conn)
            .optional()?;

        let sync = sync.map(TryInto::try_into).transpose()?;
        Ok(sync)
    }

    fn latest_sync(&self) -> RepositoryResult<Option<SyncStatus>> {
        use crate::schema::sync_status;

        let mut conn = self.conn()?;

        let sync = sync_status::table
            .order((sync_status::started_at.desc(), sync_status::id.desc()))
            .first::<DbSyncStatus>(&mut conn)
            .optional()?;

        let sync = sync.map(TryInto::try_into).transpose()?;
        Ok(sync)
    }
}

impl SyncStatusWriter for DieselRepository {
    fn create_sync(&self, sync: &NewSyncStatus) -> RepositoryResult<SyncStatus> {
        use crate::schema::sync_status;

        let mut conn = self.conn()?;
        let record: DbNewSyncStatus = sync.into();

        let created = diesel::insert_into(sync_status::table)
            .values(&record)
            .get_result::<DbSyncStatus>(&mut conn)?;

        Ok(created.try_into()?)
    }

    fn mark_in_progress(&self, sync_id: SyncId) -> RepositoryResult<SyncStatus> {
        use crate::schema::sync_status;

        let mut conn = self.conn()?;

        let updated = diesel::update(
            sync_status::table
                .filter(sync_status::sync_id.eq(sync_id.to_string()))
                .filter(sync_status::status.eq(SyncState::Pending.as_str())),
        )
        .set(sync_status::status.eq(SyncState::InProgress.as_str()))
        .get_result::<DbSyncStatus>(&mut conn)
        .optional()?;

        match updated {
            Some(row) => Ok(row.try_into()?),
            None => Err(transition_conflict(&mut conn, sync_id, "start")),
        }
    }

    fn advance_sync(&self, sync_id: SyncId, patch: &SyncMetadata) -> RepositoryResult<SyncStatus> {
        use crate::schema::sync_status;

        let mut conn = self.conn()?;

        // Read, merge and write under one transaction so concurrent patches
        // cannot drop each other's keys.
        let updated = conn.transaction::<_, RepositoryError, _>(|conn| {
            let row = sync_status::table
                .filter(sync_status::sync_id.eq(sync_id.to_string()))
                .first::<DbSyncStatus>(conn)
                .optional()?
                .ok_or(RepositoryError::NotFound)?;

            let state = SyncState::try_from(row.status.as_str())?;
            if state.is_terminal() {
                return Err(RepositoryError::InvalidState(format!(
                    "Cannot update sync in {} state",
                    row.status
                )));
            }

            let mut metadata = parse_metadata(row.metadata.as_deref())?;
            metadata.merge(patch);
            let column = metadata_to_column(&metadata)?;

            let updated = diesel::update(sync_status::table.filter(sync_status::id.eq(row.id)))
                .set(sync_status::metadata.eq(column))
                .get_result::<DbSyncStatus>(conn)?;

            Ok(updated)
        })?;

        Ok(updated.try_into()?)
    }

    fn complete_sync(
        &self,
        sync_id: SyncId,
        outcome: SyncState,
        materials_count: MaterialsCount,
    ) -> RepositoryResult<SyncStatus> {
        use crate::schema::sync_status;

        if !matches!(outcome, SyncState::Completed | SyncState::CompletedNoData) {
            return Err(RepositoryError::ValidationError(format!(
                "{outcome} is not a successful terminal state"
            )));
        }

        let mut conn = self.conn()?;

        let updated = diesel::update(
            sync_status::table
                .filter(sync_status::sync_id.eq(sync_id.to_string()))
                .filter(sync_status::status.eq_any(ACTIVE_STATES)),
        )
        .set((
            sync_status::status.eq(outcome.as_str()),
            sync_status::completed_at.eq(Utc::now().naive_utc()),
            sync_status::materials_count.eq(materials_count.get()),
        ))
        .get_result::<DbSyncStatus>(&mut conn)
        .optional()?;

        match updated {
            Some(row) => Ok(row.try_into()?),
            None => Err(transition_conflict(&mut conn, sync_id, "complete")),
        }
    }

    fn fail_sync(&self, sync_id: SyncId, error_message: &str) -> RepositoryResult<SyncStatus> {
        use crate::schema::sync_status;

        let mut conn = self.conn()?;

        let updated = diesel::update(
            sync_status::table
                .filter(sync_status::sync_id.eq(sync_id.to_string()))
                .filter(sync_status::status.eq_any(ACTIVE_STATES)),
        )
        .set((
            sync_status::status.eq(SyncState::Failed.as_str()),
            sync_status::completed_at.eq(Utc::now().naive_utc()),
            sync_status::error_message.eq(error_message),
        ))
        .get_result::<DbSyncStatus>(&mut conn)
        .optional()?;

        match updated {
            Some(row) => Ok(row.try_into()?),
            None => Err(transition_conflict(&mut conn, sync_id, "fail")),
        }
    }

    fn cancel_sync(&self, sync_id: SyncId) -> RepositoryResult<SyncStatus> {
        use crate::schema::sync_status;

        let mut conn = self.conn()?;

        let updated = diesel::update(
            sync_status::table
                .filter(sync_status::sync_id.eq(sync_id.to_string()))
                .filter(sync_status::status.eq_any(ACTIVE_STATES)),
        )
        .set((
            sync_status::status.eq(SyncState::Canceled.as_str()),
            sync_status::completed_at.eq(Utc::now().naive_utc()),
        ))
        .get_result::<DbSyncStatus>(&mut conn)
        .optional()?;

        match updated {
            Some(row) => Ok(row.try_into()?),
            None => Err(transition_conflict(&mut conn, sync_id, "cancel")),
        }
    }
}
