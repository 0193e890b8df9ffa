//! Diesel rows for the `sync_status` table.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::sync::{
    NewSyncStatus as DomainNewSyncStatus, SyncMetadata, SyncState,
    SyncStatus as DomainSyncStatus,
};
use crate::domain::types::{CategoryName, SourceName, SyncId, TypeConstraintError};

/// Diesel representation of a sync run row.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::sync_status)]
pub struct SyncStatus {
    pub id: i32,
    pub sync_id: String,
    pub status: String,
    pub source: String,
    pub category: Option<String>,
    pub started_at: NaiveDateTime,
    pub completed_at: Option<NaiveDateTime>,
    pub materials_count: Option<i32>,
    pub error_message: Option<String>,
    pub metadata: Option<String>,
}

/// Insertable form of [`SyncStatus`]; rows always open as `pending`.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::sync_status)]
pub struct NewSyncStatus {
    pub sync_id: String,
    pub status: String,
    pub source: String,
    pub category: Option<String>,
    pub started_at: NaiveDateTime,
}

pub(crate) fn parse_metadata(raw: Option<&str>) -> Result<SyncMetadata, TypeConstraintError> {
    match raw {
        None => Ok(SyncMetadata::default()),
        Some(text) => {
            let value: serde_json::Value = serde_json::from_str(text).map_err(|e| {
                TypeConstraintError::InvalidValue(format!("sync metadata: {e}"))
            })?;
            SyncMetadata::try_from(value)
        }
    }
}

/// Serializes metadata for storage; an empty object is stored as NULL.
pub(crate) fn metadata_to_column(metadata: &SyncMetadata) -> Result<Option<String>, serde_json::Error> {
    if metadata.is_empty() {
        return Ok(None);
    }
    serde_json::to_string(&metadata.as_value()).map(Some)
}

impl TryFrom<SyncStatus> for DomainSyncStatus {
    type Error = TypeConstraintError;

    fn try_from(row: SyncStatus) -> Result<Self, Self::Error> {
        Ok(Self {
            sync_id: SyncId::parse(&row.sync_id)?,
            status: SyncState::try_from(row.status)?,
            source: SourceName::new(row.source)?,
            category: row.category.map(CategoryName::new).transpose()?,
            started_at: row.started_at,
            completed_at: row.completed_at,
            materials_count: row.materials_count.map(TryInto::try_into).transpose()?,
            error_message: row.error_message,
            metadata: parse_metadata(row.metadata.as_deref())?,
        })
    }
}

impl From<&DomainNewSyncStatus> for NewSyncStatus {
    fn from(new_sync: &DomainNewSyncStatus) -> Self {
        Self {
            sync_id: new_sync.sync_id.to_string(),
            status: SyncState::Pending.as_str().to_string(),
            source: new_sync.source.as_str().to_string(),
            category: new_sync
                .category
                .as_ref()
                .map(|value| value.as_str().to_string()),
            started_at: new_sync.started_at,
        }
    }
}
