use crate::auth::AuthenticatedUser;
use crate::domain::saved_search::NewSavedSearch;
use crate::domain::types::{MaterialId, UserId};
use crate::dto::material::MaterialDto;
use crate::dto::search::{MaterialSearchResponse, SavedSearchDto};
use crate::forms::search::{BrowseFormPayload, SaveSearchFormPayload, SearchFormPayload};
use crate::pagination::Paginated;
use crate::repository::{MaterialListQuery, MaterialReader, SavedSearchReader, SavedSearchWriter};

use super::{ServiceError, ServiceResult};

/// Core business logic for the material search endpoint.
///
/// Runs a case-insensitive substring match against names and descriptions and
/// wraps the page in the search response envelope. Repository errors are
/// converted into `ServiceError` variants so that the HTTP route can remain a
/// thin wrapper.
pub fn search_materials<R>(
    payload: SearchFormPayload,
    repo: &R,
) -> ServiceResult<MaterialSearchResponse>
where
    R: MaterialReader,
{
    let query = MaterialListQuery::default()
        .search(payload.query.as_str())
        .paginate(payload.page, payload.limit);

    match repo.list_materials(query) {
        Ok((total, materials)) => {
            let results = materials.into_iter().map(MaterialDto::from).collect();
            Ok(MaterialSearchResponse::new(
                results,
                total,
                payload.page,
                payload.limit,
            ))
        }
        Err(e) => {
            log::error!("Failed to search materials: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Lists materials filtered by category, vendor, availability and price.
pub fn browse_materials<R>(
    payload: BrowseFormPayload,
    repo: &R,
) -> ServiceResult<Paginated<MaterialDto>>
where
    R: MaterialReader,
{
    let mut query = MaterialListQuery::default().paginate(payload.page, payload.per_page);
    if let Some(category) = payload.category {
        query = query.category(category);
    }
    if let Some(vendor) = payload.vendor {
        query = query.vendor(vendor);
    }
    if let Some(availability) = payload.availability {
        query = query.availability(availability);
    }
    if let Some(min_price) = payload.min_price {
        query = query.min_price(min_price);
    }
    if let Some(max_price) = payload.max_price {
        query = query.max_price(max_price);
    }

    match repo.list_materials(query) {
        Ok((total, materials)) => {
            let items: Vec<MaterialDto> = materials.into_iter().map(MaterialDto::from).collect();
            Ok(Paginated::new(
                items,
                payload.page,
                total.div_ceil(payload.per_page),
            ))
        }
        Err(e) => {
            log::error!("Failed to browse materials: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Fetches a single material by its identifier.
pub fn get_material<R>(material_id: i32, repo: &R) -> ServiceResult<MaterialDto>
where
    R: MaterialReader,
{
    let material_id = match MaterialId::new(material_id) {
        Ok(material_id) => material_id,
        Err(_) => return Err(ServiceError::NotFound),
    };

    match repo.get_material_by_id(material_id) {
        Ok(Some(material)) => Ok(MaterialDto::from(material)),
        Ok(None) => Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get material: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Lists the distinct categories that currently have materials.
pub fn list_categories<R>(repo: &R) -> ServiceResult<Vec<String>>
where
    R: MaterialReader,
{
    match repo.list_categories() {
        Ok(categories) => Ok(categories),
        Err(e) => {
            log::error!("Failed to list categories: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Lists the distinct vendors that currently have materials.
pub fn list_vendors<R>(repo: &R) -> ServiceResult<Vec<String>>
where
    R: MaterialReader,
{
    match repo.list_vendors() {
        Ok(vendors) => Ok(vendors),
        Err(e) => {
            log::error!("Failed to list vendors: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Stores a search for the logged-in user so it can be replayed later.
pub fn save_search<R>(
    payload: SaveSearchFormPayload,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<SavedSearchDto>
where
    R: SavedSearchWriter,
{
    let user_id = match UserId::new(user.sub.clone()) {
        Ok(user_id) => user_id,
        Err(e) => {
            log::error!("Invalid user id in session claims: {e}");
            return Err(ServiceError::Internal);
        }
    };

    let new_search = NewSavedSearch {
        user_id,
        search_query: payload.query,
        filters: payload.filters,
        created_at: chrono::Utc::now().naive_utc(),
    };

    match repo.create_saved_search(&new_search) {
        Ok(search) => Ok(SavedSearchDto::from(search)),
        Err(e) => {
            log::error!("Failed to save search: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Lists the logged-in user's saved searches, newest first.
pub fn list_saved_searches<R>(
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<Vec<SavedSearchDto>>
where
    R: SavedSearchReader,
{
    let user_id = match UserId::new(user.sub.clone()) {
        Ok(user_id) => user_id,
        Err(e) => {
            log::error!("Invalid user id in session claims: {e}");
            return Err(ServiceError::Internal);
        }
    };

    match repo.list_saved_searches(&user_id) {
        Ok(searches) => Ok(searches.into_iter().map(SavedSearchDto::from).collect()),
        Err(e) => {
            log::error!("Failed to list saved searches: {e}");
            Err(ServiceError::Internal)
        }
    }
}
