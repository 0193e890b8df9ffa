use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::domain::saved_search::SavedSearch;
use crate::dto::material::MaterialDto;

/// Pagination block of a search response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaginationInfo {
    pub total_results: usize,
    pub current_page: usize,
    pub total_pages: usize,
    pub limit: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseMetadata {
    pub timestamp: DateTime<Utc>,
}

/// Envelope returned by the material search endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialSearchResponse {
    pub results: Vec<MaterialDto>,
    pub pagination: PaginationInfo,
    pub metadata: ResponseMetadata,
}

impl MaterialSearchResponse {
    pub fn new(results: Vec<MaterialDto>, total_results: usize, page: usize, limit: usize) -> Self {
        Self {
            results,
            pagination: PaginationInfo {
                total_results,
                current_page: page,
                total_pages: total_results.div_ceil(limit.max(1)),
                limit,
            },
            metadata: ResponseMetadata {
                timestamp: Utc::now(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedSearchDto {
    pub id: i32,
    pub search_query: String,
    pub filters: Option<Value>,
    pub created_at: NaiveDateTime,
}

impl From<SavedSearch> for SavedSearchDto {
    fn from(value: SavedSearch) -> Self {
        Self {
            id: value.id.get(),
            search_query: value.search_query.into_inner(),
            filters: value.filters,
            created_at: value.created_at,
        }
    }
}
