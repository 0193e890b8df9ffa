use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::material::{Material, NewMaterial};
use crate::domain::saved_search::{NewSavedSearch, SavedSearch};
use crate::domain::sync::{NewSyncStatus, SyncMetadata, SyncState, SyncStatus};
use crate::domain::system_event::{NewSystemEvent, SystemEvent};
use crate::domain::types::{MaterialId, MaterialsCount, SavedSearchId, SyncId, UserId};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    MaterialListQuery, MaterialReader, MaterialWriter, SavedSearchReader, SavedSearchWriter,
    SyncStatusReader, SyncStatusWriter, SystemEventWriter,
};

/// Simple in-memory repository used for unit tests.
///
/// Clones share state through an `Arc`, so a handle moved into a spawned sync
/// task observes the same records as the test body. Transition guards mirror
/// the Diesel implementation.
#[derive(Clone, Default)]
pub struct TestRepository {
    inner: Arc<Mutex<TestState>>,
}

#[derive(Default)]
struct TestState {
    materials: BTreeMap<String, Material>,
    next_material_id: i32,
    syncs: Vec<SyncStatus>,
    status_log: Vec<SyncStatus>,
    events: Vec<SystemEvent>,
    saved_searches: Vec<SavedSearch>,
    next_saved_search_id: i32,
    fail_upsert_categories: HashSet<String>,
    fail_advance: bool,
}

impl TestRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the repository with existing materials.
    pub fn with_materials(materials: Vec<Material>) -> Self {
        let repo = Self::default();
        {
            let mut state = repo.state();
            for material in materials {
                state.next_material_id = state.next_material_id.max(material.id.get());
                state.materials.insert(material.sku.to_string(), material);
            }
        }
        repo
    }

    /// Make every upsert containing a material of `category` fail.
    pub fn fail_upserts_for(&self, category: &str) {
        self.state()
            .fail_upsert_categories
            .insert(category.to_string());
    }

    /// Make every metadata advance fail with a storage error.
    pub fn fail_advances(&self) {
        self.state().fail_advance = true;
    }

    /// All events logged so far, oldest first.
    pub fn events(&self) -> Vec<SystemEvent> {
        self.state().events.clone()
    }

    /// Stored materials, keyed by SKU.
    pub fn materials(&self) -> Vec<Material> {
        self.state().materials.values().cloned().collect()
    }

    /// Every sync snapshot taken after a creation or transition, in order.
    pub fn status_log(&self) -> Vec<SyncStatus> {
        self.state().status_log.clone()
    }

    fn state(&self) -> MutexGuard<'_, TestState> {
        self.inner.lock().unwrap()
    }

    fn transition<F>(&self, sync_id: SyncId, verb: &str, apply: F) -> RepositoryResult<SyncStatus>
    where
        F: FnOnce(&mut SyncStatus),
    {
        let mut state = self.state();
        let Some(sync) = state.syncs.iter_mut().find(|s| s.sync_id == sync_id) else {
            return Err(RepositoryError::NotFound);
        };
        if sync.is_terminal() {
            return Err(RepositoryError::InvalidState(format!(
                "Cannot {verb} sync in {} state",
                sync.status
            )));
        }
        apply(sync);
        let snapshot = sync.clone();
        state.status_log.push(snapshot.clone());
        Ok(snapshot)
    }
}

fn materialize(id: MaterialId, new: &NewMaterial) -> Material {
    Material {
        id,
        sku: new.sku.clone(),
        name: new.name.clone(),
        description: new.description.clone(),
        price: new.price,
        category: new.category.clone(),
        url: new.url.clone(),
        image_url: new.image_url.clone(),
        vendor: new.vendor.clone(),
        quantity: new.quantity,
        unit: new.unit.clone(),
        specifications: new.specifications.clone(),
        availability: new.availability,
        source: new.source.clone(),
        last_synced: new.last_synced,
    }
}

impl MaterialReader for TestRepository {
    fn list_materials(&self, query: MaterialListQuery) -> RepositoryResult<(usize, Vec<Material>)> {
        let state = self.state();
        let mut items: Vec<Material> = state.materials.values().cloned().collect();

        if let Some(category) = &query.category {
            items.retain(|m| m.category.as_str() == category);
        }
        if let Some(vendor) = &query.vendor {
            items.retain(|m| m.vendor.as_str() == vendor);
        }
        if let Some(availability) = query.availability {
            items.retain(|m| m.availability == availability);
        }
        if let Some(min_price) = query.min_price {
            items.retain(|m| m.price.is_some_and(|p| p.get() >= min_price));
        }
        if let Some(max_price) = query.max_price {
            items.retain(|m| m.price.is_some_and(|p| p.get() <= max_price));
        }
        if let Some(search) = &query.search {
            let needle = search.to_lowercase();
            items.retain(|m| {
                m.name.as_str().to_lowercase().contains(&needle)
                    || m.description
                        .as_ref()
                        .is_some_and(|d| d.as_str().to_lowercase().contains(&needle))
            });
        }

        items.sort_by(|a, b| b.last_synced.cmp(&a.last_synced));
        let total = items.len();

        if let Some(pagination) = &query.pagination {
            let offset = (pagination.page.max(1) - 1) * pagination.per_page;
            items = items
                .into_iter()
                .skip(offset)
                .take(pagination.per_page)
                .collect();
        }

        Ok((total, items))
    }

    fn get_material_by_id(&self, id: MaterialId) -> RepositoryResult<Option<Material>> {
        Ok(self
            .state()
            .materials
            .values()
            .find(|m| m.id == id)
            .cloned())
    }

    fn list_categories(&self) -> RepositoryResult<Vec<String>> {
        let state = self.state();
        let mut categories: Vec<String> = state
            .materials
            .values()
            .map(|m| m.category.to_string())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        categories.sort();
        Ok(categories)
    }

    fn list_vendors(&self) -> RepositoryResult<Vec<String>> {
        let state = self.state();
        let mut vendors: Vec<String> = state
            .materials
            .values()
            .map(|m| m.vendor.to_string())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        vendors.sort();
        Ok(vendors)
    }
}

impl MaterialWriter for TestRepository {
    fn upsert_materials(&self, materials: &[NewMaterial]) -> RepositoryResult<usize> {
        let mut state = self.state();

        if let Some(category) = materials
            .iter()
            .map(|m| m.category.as_str())
            .find(|c| state.fail_upsert_categories.contains(*c))
        {
            return Err(RepositoryError::ValidationError(format!(
                "injected upsert failure for {category}"
            )));
        }

        let mut affected = 0;
        for material in materials {
            affected += 1;
            let id = match state.materials.get(material.sku.as_str()) {
                Some(existing) => existing.id,
                None => {
                    state.next_material_id += 1;
                    MaterialId::new(state.next_material_id).unwrap()
                }
            };
            state
                .materials
                .insert(material.sku.to_string(), materialize(id, material));
        }
        Ok(affected)
    }
}

impl SyncStatusReader for TestRepository {
    fn get_sync_by_id(&self, sync_id: SyncId) -> RepositoryResult<Option<SyncStatus>> {
        Ok(self
            .state()
            .syncs
            .iter()
            .find(|s| s.sync_id == sync_id)
            .cloned())
    }

    fn latest_sync(&self) -> RepositoryResult<Option<SyncStatus>> {
        // Ties on started_at resolve to the most recently created record,
        // like the id tiebreak in the Diesel implementation.
        Ok(self.state().syncs.iter().max_by_key(|s| s.started_at).cloned())
    }
}

impl SyncStatusWriter for TestRepository {
    fn create_sync(&self, sync: &NewSyncStatus) -> RepositoryResult<SyncStatus> {
        let mut state = self.state();
        let created = SyncStatus {
            sync_id: sync.sync_id,
            status: SyncState::Pending,
            source: sync.source.clone(),
            category: sync.category.clone(),
            started_at: sync.started_at,
            completed_at: None,
            materials_count: None,
            error_message: None,
            metadata: SyncMetadata::default(),
        };
        state.syncs.push(created.clone());
        state.status_log.push(created.clone());
        Ok(created)
    }

    fn mark_in_progress(&self, sync_id: SyncId) -> RepositoryResult<SyncStatus> {
        let mut state = self.state();
        let Some(sync) = state.syncs.iter_mut().find(|s| s.sync_id == sync_id) else {
            return Err(RepositoryError::NotFound);
        };
        if sync.status != SyncState::Pending {
            return Err(RepositoryError::InvalidState(format!(
                "Cannot start sync in {} state",
                sync.status
            )));
        }
        sync.status = SyncState::InProgress;
        let snapshot = sync.clone();
        state.status_log.push(snapshot.clone());
        Ok(snapshot)
    }

    fn advance_sync(&self, sync_id: SyncId, patch: &SyncMetadata) -> RepositoryResult<SyncStatus> {
        if self.state().fail_advance {
            return Err(RepositoryError::ValidationError(
                "injected advance failure".to_string(),
            ));
        }
        self.transition(sync_id, "update", |sync| sync.metadata.merge(patch))
    }

    fn complete_sync(
        &self,
        sync_id: SyncId,
        outcome: SyncState,
        materials_count: MaterialsCount,
    ) -> RepositoryResult<SyncStatus> {
        if !matches!(outcome, SyncState::Completed | SyncState::CompletedNoData) {
            return Err(RepositoryError::ValidationError(format!(
                "{outcome} is not a successful terminal state"
            )));
        }
        self.transition(sync_id, "complete", |sync| {
            sync.status = outcome;
            sync.completed_at = Some(chrono::Utc::now().naive_utc());
            sync.materials_count = Some(materials_count);
        })
    }

    fn fail_sync(&self, sync_id: SyncId, error_message: &str) -> RepositoryResult<SyncStatus> {
        self.transition(sync_id, "fail", |sync| {
            sync.status = SyncState::Failed;
            sync.completed_at = Some(chrono::Utc::now().naive_utc());
            sync.error_message = Some(error_message.to_string());
        })
    }

    fn cancel_sync(&self, sync_id: SyncId) -> RepositoryResult<SyncStatus> {
        self.transition(sync_id, "cancel", |sync| {
            sync.status = SyncState::Canceled;
            sync.completed_at = Some(chrono::Utc::now().naive_utc());
        })
    }
}

impl SavedSearchReader for TestRepository {
    fn list_saved_searches(&self, user_id: &UserId) -> RepositoryResult<Vec<SavedSearch>> {
        let state = self.state();
        let mut items: Vec<SavedSearch> = state
            .saved_searches
            .iter()
            .filter(|s| &s.user_id == user_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }
}

impl SavedSearchWriter for TestRepository {
    fn create_saved_search(&self, search: &NewSavedSearch) -> RepositoryResult<SavedSearch> {
        let mut state = self.state();
        state.next_saved_search_id += 1;
        let created = SavedSearch {
            id: SavedSearchId::new(state.next_saved_search_id).unwrap(),
            user_id: search.user_id.clone(),
            search_query: search.search_query.clone(),
            filters: search.filters.clone(),
            created_at: search.created_at,
        };
        state.saved_searches.push(created.clone());
        Ok(created)
    }
}

impl SystemEventWriter for TestRepository {
    fn log_system_event(&self, event: &NewSystemEvent) -> RepositoryResult<usize> {
        let mut state = self.state();
        let id = state.events.len() as i32 + 1;
        state.events.push(SystemEvent {
            id,
            event_type: event.event_type.clone(),
            severity: event.severity,
            message: event.message.clone(),
            metadata: event.metadata.clone(),
            user_id: event.user_id.clone(),
            created_at: event.created_at,
        });
        Ok(1)
    }
}
