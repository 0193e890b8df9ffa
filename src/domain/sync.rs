//! Sync run tracking: the lifecycle state machine and its per-run record.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};

use crate::domain::types::{
    CategoryName, MaterialsCount, SourceName, SyncId, TypeConstraintError,
};

/// Lifecycle state of a sync run.
///
/// Transitions are monotonic: `pending -> in_progress -> completed |
/// completed_no_data | failed`, with `canceled` reachable from `pending` and
/// `in_progress` only. Terminal states are sticky; nothing transitions out of
/// them.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    Pending,
    InProgress,
    Completed,
    /// The run finished normally but wrote zero material records.
    CompletedNoData,
    Failed,
    Canceled,
}

impl SyncState {
    /// String representation used in persistence.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::CompletedNoData => "completed_no_data",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
        }
    }

    /// Whether the state admits no further transitions.
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Completed | Self::CompletedNoData | Self::Failed | Self::Canceled
        )
    }
}

impl Display for SyncState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for SyncState {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, TypeConstraintError> {
        match value.trim() {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "completed_no_data" => Ok(Self::CompletedNoData),
            "failed" => Ok(Self::Failed),
            "canceled" => Ok(Self::Canceled),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "sync state: {other}"
            ))),
        }
    }
}

impl TryFrom<String> for SyncState {
    type Error = TypeConstraintError;

    fn try_from(value: String) -> Result<Self, TypeConstraintError> {
        Self::try_from(value.as_str())
    }
}

impl From<SyncState> for String {
    fn from(value: SyncState) -> Self {
        value.as_str().to_string()
    }
}

/// Free-form JSON object attached to a sync run.
///
/// The orchestrator records `current_category` and `progress` here; callers
/// may stash additional keys. Updates are shallow merges so unrelated keys
/// survive each patch.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct SyncMetadata(Map<String, Value>);

impl SyncMetadata {
    /// The patch the orchestrator applies before each category.
    pub fn category_progress(category: &str, progress: u8) -> Self {
        let mut map = Map::new();
        map.insert("current_category".to_string(), Value::from(category));
        map.insert("progress".to_string(), Value::from(progress));
        Self(map)
    }

    /// Shallow-merges `patch` into this metadata; keys in `patch` win.
    pub fn merge(&mut self, patch: &SyncMetadata) {
        for (key, value) in &patch.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Recorded percentage, when present and in range.
    pub fn progress(&self) -> Option<u8> {
        self.0
            .get("progress")
            .and_then(Value::as_u64)
            .filter(|value| *value <= 100)
            .map(|value| value as u8)
    }

    /// Category the run was last working on, when recorded.
    pub fn current_category(&self) -> Option<&str> {
        self.0.get("current_category").and_then(Value::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The underlying JSON object.
    pub fn as_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl TryFrom<Value> for SyncMetadata {
    type Error = TypeConstraintError;

    fn try_from(value: Value) -> Result<Self, TypeConstraintError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "sync metadata must be a JSON object, got {other}"
            ))),
        }
    }
}

/// One sync run, as persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncStatus {
    pub sync_id: SyncId,
    pub status: SyncState,
    pub source: SourceName,
    /// Set when the run was restricted to a single category.
    pub category: Option<CategoryName>,
    pub started_at: NaiveDateTime,
    /// Set exactly once, when the run reaches a terminal state.
    pub completed_at: Option<NaiveDateTime>,
    pub materials_count: Option<MaterialsCount>,
    pub error_message: Option<String>,
    pub metadata: SyncMetadata,
}

impl SyncStatus {
    /// Derived completion percentage in `0..=100`.
    ///
    /// Successful terminal states always report 100 regardless of what the
    /// metadata last recorded; failed and canceled runs keep the metadata
    /// value so observers can see how far the run got.
    pub fn progress(&self) -> u8 {
        match self.status {
            SyncState::Pending => 0,
            SyncState::Completed | SyncState::CompletedNoData => 100,
            SyncState::InProgress | SyncState::Failed | SyncState::Canceled => {
                self.metadata.progress().unwrap_or(0)
            }
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Information required to open a new [`SyncStatus`] record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewSyncStatus {
    pub sync_id: SyncId,
    pub source: SourceName,
    pub category: Option<CategoryName>,
    pub started_at: NaiveDateTime,
}
