//! Searches a user has chosen to keep.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::types::{SavedSearchId, SearchText, UserId};

/// A stored search belonging to one user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavedSearch {
    pub id: SavedSearchId,
    pub user_id: UserId,
    pub search_query: SearchText,
    /// Browse filters captured alongside the query, as submitted.
    pub filters: Option<Value>,
    pub created_at: NaiveDateTime,
}

/// Information required to create a new [`SavedSearch`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewSavedSearch {
    pub user_id: UserId,
    pub search_query: SearchText,
    pub filters: Option<Value>,
    pub created_at: NaiveDateTime,
}
