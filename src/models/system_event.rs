//! Diesel rows for the `system_events` table.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::system_event::{
    NewSystemEvent as DomainNewSystemEvent, SystemEvent as DomainSystemEvent,
};
use crate::domain::types::{EventSeverity, TypeConstraintError, UserId};

/// Diesel representation of a system event row.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::system_events)]
pub struct SystemEvent {
    pub id: i32,
    pub event_type: String,
    pub severity: String,
    pub message: String,
    pub metadata: Option<String>,
    pub user_id: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Insertable form of [`SystemEvent`].
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::system_events)]
pub struct NewSystemEvent {
    pub event_type: String,
    pub severity: String,
    pub message: String,
    pub metadata: Option<String>,
    pub user_id: Option<String>,
    pub created_at: NaiveDateTime,
}

impl TryFrom<SystemEvent> for DomainSystemEvent {
    type Error = TypeConstraintError;

    fn try_from(row: SystemEvent) -> Result<Self, Self::Error> {
        let metadata = row
            .metadata
            .map(|text| {
                serde_json::from_str(&text).map_err(|e| {
                    TypeConstraintError::InvalidValue(format!("system event metadata: {e}"))
                })
            })
            .transpose()?;

        Ok(Self {
            id: row.id,
            event_type: row.event_type,
            severity: EventSeverity::try_from(row.severity.as_str())?,
            message: row.message,
            metadata,
            user_id: row.user_id.map(UserId::new).transpose()?,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<&DomainNewSystemEvent> for NewSystemEvent {
    type Error = serde_json::Error;

    fn try_from(event: &DomainNewSystemEvent) -> Result<Self, Self::Error> {
        let metadata = event
            .metadata
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        Ok(Self {
            event_type: event.event_type.clone(),
            severity: event.severity.as_str().to_string(),
            message: event.message.clone(),
            metadata,
            user_id: event.user_id.as_ref().map(|id| id.as_str().to_string()),
            created_at: event.created_at,
        })
    }
}
