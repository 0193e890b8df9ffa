//! Diesel rows for the `saved_searches` table.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::saved_search::{
    NewSavedSearch as DomainNewSavedSearch, SavedSearch as DomainSavedSearch,
};
use crate::domain::types::{SearchText, TypeConstraintError, UserId};

/// Diesel representation of a saved search row.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::saved_searches)]
pub struct SavedSearch {
    pub id: i32,
    pub user_id: String,
    pub search_query: String,
    pub filters: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Insertable form of [`SavedSearch`].
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::saved_searches)]
pub struct NewSavedSearch {
    pub user_id: String,
    pub search_query: String,
    pub filters: Option<String>,
    pub created_at: NaiveDateTime,
}

impl TryFrom<SavedSearch> for DomainSavedSearch {
    type Error = TypeConstraintError;

    fn try_from(row: SavedSearch) -> Result<Self, Self::Error> {
        let filters = row
            .filters
            .map(|text| {
                serde_json::from_str(&text).map_err(|e| {
                    TypeConstraintError::InvalidValue(format!("saved search filters: {e}"))
                })
            })
            .transpose()?;

        Ok(Self {
            id: row.id.try_into()?,
            user_id: UserId::new(row.user_id)?,
            search_query: SearchText::new(row.search_query)?,
            filters,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<&DomainNewSavedSearch> for NewSavedSearch {
    type Error = serde_json::Error;

    fn try_from(saved: &DomainNewSavedSearch) -> Result<Self, Self::Error> {
        let filters = saved
            .filters
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        Ok(Self {
            user_id: saved.user_id.as_str().to_string(),
            search_query: saved.search_query.as_str().to_string(),
            filters,
            created_at: saved.created_at,
        })
    }
}
