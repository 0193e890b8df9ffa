//! Operational event log entries written by the sync pipeline.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::types::{EventSeverity, UserId};

/// A recorded operational event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SystemEvent {
    pub id: i32,
    pub event_type: String,
    pub severity: EventSeverity,
    pub message: String,
    pub metadata: Option<Value>,
    pub user_id: Option<UserId>,
    pub created_at: NaiveDateTime,
}

/// Information required to record a new [`SystemEvent`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewSystemEvent {
    pub event_type: String,
    pub severity: EventSeverity,
    pub message: String,
    pub metadata: Option<Value>,
    pub user_id: Option<UserId>,
    pub created_at: NaiveDateTime,
}
