use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::Value;

use crate::domain::sync::SyncStatus;

/// Sync run as rendered in API responses.
///
/// `progress` and `current_category` are lifted out of the metadata so
/// pollers do not need to dig through the raw object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncStatusResponse {
    pub sync_id: String,
    pub status: String,
    pub source: String,
    pub category: Option<String>,
    pub progress: u8,
    pub current_category: Option<String>,
    pub started_at: NaiveDateTime,
    pub completed_at: Option<NaiveDateTime>,
    pub materials_count: Option<i32>,
    pub error_message: Option<String>,
    pub metadata: Option<Value>,
}

impl From<SyncStatus> for SyncStatusResponse {
    fn from(value: SyncStatus) -> Self {
        let progress = value.progress();
        let current_category = value.metadata.current_category().map(str::to_string);
        let metadata = if value.metadata.is_empty() {
            None
        } else {
            Some(value.metadata.as_value())
        };

        Self {
            sync_id: value.sync_id.to_string(),
            status: value.status.as_str().to_string(),
            source: value.source.into_inner(),
            category: value.category.map(|c| c.into_inner()),
            progress,
            current_category,
            started_at: value.started_at,
            completed_at: value.completed_at,
            materials_count: value.materials_count.map(|c| c.get()),
            error_message: value.error_message,
            metadata,
        }
    }
}

/// Acknowledgement returned when a sync run is accepted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggeredSync {
    pub sync_id: String,
    pub status: String,
}

impl From<SyncStatus> for TriggeredSync {
    fn from(value: SyncStatus) -> Self {
        Self {
            sync_id: value.sync_id.to_string(),
            status: value.status.as_str().to_string(),
        }
    }
}

/// Result of a cancellation request.
///
/// A rejected cancellation is still a well-formed answer: `success` is false
/// and `message` says why, mirroring what the status endpoint reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CancelOutcome {
    pub success: bool,
    pub message: String,
}

impl CancelOutcome {
    pub fn canceled() -> Self {
        Self {
            success: true,
            message: "Sync canceled".to_string(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sync::{SyncMetadata, SyncState};
    use crate::domain::types::{SourceName, SyncId};
    use chrono::Utc;

    #[test]
    fn response_lifts_progress_out_of_metadata() {
        let status = SyncStatus {
            sync_id: SyncId::generate(),
            status: SyncState::InProgress,
            source: SourceName::new("home_depot").unwrap(),
            category: None,
            started_at: Utc::now().naive_utc(),
            completed_at: None,
            materials_count: None,
            error_message: None,
            metadata: SyncMetadata::category_progress("drywall", 40),
        };

        let response = SyncStatusResponse::from(status);
        assert_eq!(response.progress, 40);
        assert_eq!(response.current_category.as_deref(), Some("drywall"));
        assert_eq!(response.status, "in_progress");
        assert!(response.metadata.is_some());
    }

    #[test]
    fn empty_metadata_serializes_as_null() {
        let status = SyncStatus {
            sync_id: SyncId::generate(),
            status: SyncState::Pending,
            source: SourceName::new("home_depot").unwrap(),
            category: None,
            started_at: Utc::now().naive_utc(),
            completed_at: None,
            materials_count: None,
            error_message: None,
            metadata: SyncMetadata::default(),
        };

        let response = SyncStatusResponse::from(status);
        assert_eq!(response.progress, 0);
        assert!(response.metadata.is_none());
    }
}
