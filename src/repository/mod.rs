use crate::db::{DbConnection, DbPool};
use crate::domain::material::{Material, NewMaterial};
use crate::domain::saved_search::{NewSavedSearch, SavedSearch};
use crate::domain::sync::{NewSyncStatus, SyncMetadata, SyncState, SyncStatus};
use crate::domain::system_event::NewSystemEvent;
use crate::domain::types::{Availability, MaterialId, MaterialsCount, SyncId, UserId};
use crate::pagination::Pagination;
use crate::repository::errors::RepositoryResult;

pub mod errors;
pub mod material;
pub mod saved_search;
pub mod sync;
pub mod system_event;
#[cfg(test)]
pub mod test;

/// Repository implementation backed by Diesel and SQLite.
///
/// The underlying `r2d2::Pool` is cheap to clone, allowing the repository to
/// be passed around freely between handlers and background tasks.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository from an established database pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a pooled database connection.
    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Query parameters used when listing or searching materials.
#[derive(Debug, Clone, Default)]
pub struct MaterialListQuery {
    /// Restrict to a single category.
    pub category: Option<String>,
    /// Restrict to a single vendor.
    pub vendor: Option<String>,
    /// Restrict to an availability state.
    pub availability: Option<Availability>,
    /// Lower price bound, inclusive. Materials without a price never match.
    pub min_price: Option<f64>,
    /// Upper price bound, inclusive. Materials without a price never match.
    pub max_price: Option<f64>,
    /// Case-insensitive substring match against name and description.
    pub search: Option<String>,
    /// Pagination parameters.
    pub pagination: Option<Pagination>,
}

impl MaterialListQuery {
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
    pub fn vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = Some(vendor.into());
        self
    }
    pub fn availability(mut self, availability: Availability) -> Self {
        self.availability = Some(availability);
        self
    }
    pub fn min_price(mut self, min_price: f64) -> Self {
        self.min_price = Some(min_price);
        self
    }
    pub fn max_price(mut self, max_price: f64) -> Self {
        self.max_price = Some(max_price);
        self
    }
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }
    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

/// Read-only operations for material entities.
pub trait MaterialReader {
    /// List materials matching the supplied query parameters together with
    /// the total match count before pagination.
    fn list_materials(&self, query: MaterialListQuery) -> RepositoryResult<(usize, Vec<Material>)>;
    /// Retrieve a material by its identifier.
    fn get_material_by_id(&self, id: MaterialId) -> RepositoryResult<Option<Material>>;
    /// List distinct categories that currently have materials.
    fn list_categories(&self) -> RepositoryResult<Vec<String>>;
    /// List distinct vendors that currently have materials.
    fn list_vendors(&self) -> RepositoryResult<Vec<String>>;
}

/// Write operations for material entities.
pub trait MaterialWriter {
    /// Insert new materials or update existing rows matched by SKU.
    /// Returns the number of affected rows.
    fn upsert_materials(&self, materials: &[NewMaterial]) -> RepositoryResult<usize>;
}

/// Read-only operations for sync status records.
pub trait SyncStatusReader {
    /// Retrieve a sync record by its public identifier.
    fn get_sync_by_id(&self, sync_id: SyncId) -> RepositoryResult<Option<SyncStatus>>;
    /// Retrieve the most recently started sync, if any exists.
    fn latest_sync(&self) -> RepositoryResult<Option<SyncStatus>>;
}

/// State transitions for sync status records.
///
/// Every transition is guarded by the record's current state; attempting an
/// illegal transition yields [`errors::RepositoryError::InvalidState`] and
/// leaves the row untouched.
pub trait SyncStatusWriter {
    /// Persist a new sync record in the `pending` state.
    fn create_sync(&self, sync: &NewSyncStatus) -> RepositoryResult<SyncStatus>;
    /// Move a pending sync to `in_progress`.
    fn mark_in_progress(&self, sync_id: SyncId) -> RepositoryResult<SyncStatus>;
    /// Merge a metadata patch into an active sync's metadata.
    fn advance_sync(&self, sync_id: SyncId, patch: &SyncMetadata) -> RepositoryResult<SyncStatus>;
    /// Finish an active sync with a successful terminal outcome.
    fn complete_sync(
        &self,
        sync_id: SyncId,
        outcome: SyncState,
        materials_count: MaterialsCount,
    ) -> RepositoryResult<SyncStatus>;
    /// Mark an active sync as failed with an error message.
    fn fail_sync(&self, sync_id: SyncId, error_message: &str) -> RepositoryResult<SyncStatus>;
    /// Cancel a pending or in-progress sync.
    fn cancel_sync(&self, sync_id: SyncId) -> RepositoryResult<SyncStatus>;
}

/// Read-only operations for saved searches.
pub trait SavedSearchReader {
    /// List saved searches belonging to a user, newest first.
    fn list_saved_searches(&self, user_id: &UserId) -> RepositoryResult<Vec<SavedSearch>>;
}

/// Write operations for saved searches.
pub trait SavedSearchWriter {
    /// Persist a new saved search.
    fn create_saved_search(&self, search: &NewSavedSearch) -> RepositoryResult<SavedSearch>;
}

/// Write operations for the system event log.
pub trait SystemEventWriter {
    /// Append an event to the system log. Returns the number of inserted rows.
    fn log_system_event(&self, event: &NewSystemEvent) -> RepositoryResult<usize>;
}
