use actix_web::{HttpResponse, Responder, get, post, web};

use crate::auth::AuthenticatedUser;
use crate::forms::search::{
    BrowseForm, BrowseFormPayload, SaveSearchForm, SaveSearchFormPayload, SearchForm,
    SearchFormPayload,
};
use crate::repository::DieselRepository;
use crate::routes::error_response;
use crate::services::ServiceError;
use crate::services::search::{
    browse_materials as browse_materials_service, get_material as get_material_service,
    list_categories as list_categories_service, list_saved_searches as list_saved_searches_service,
    list_vendors as list_vendors_service, save_search as save_search_service,
    search_materials as search_materials_service,
};

#[get("/v1/materials/search")]
pub async fn api_v1_search_materials(
    params: web::Query<SearchForm>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let payload: SearchFormPayload = match params.into_inner().try_into() {
        Ok(payload) => payload,
        Err(e) => return error_response(&ServiceError::from(e)),
    };

    match search_materials_service(payload, repo.get_ref()) {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => error_response(&e),
    }
}

#[get("/v1/materials")]
pub async fn api_v1_browse_materials(
    params: web::Query<BrowseForm>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let payload: BrowseFormPayload = match params.into_inner().try_into() {
        Ok(payload) => payload,
        Err(e) => return error_response(&ServiceError::from(e)),
    };

    match browse_materials_service(payload, repo.get_ref()) {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(e) => error_response(&e),
    }
}

#[get("/v1/materials/categories")]
pub async fn api_v1_material_categories(repo: web::Data<DieselRepository>) -> impl Responder {
    match list_categories_service(repo.get_ref()) {
        Ok(categories) => HttpResponse::Ok().json(categories),
        Err(e) => error_response(&e),
    }
}

#[get("/v1/materials/vendors")]
pub async fn api_v1_material_vendors(repo: web::Data<DieselRepository>) -> impl Responder {
    match list_vendors_service(repo.get_ref()) {
        Ok(vendors) => HttpResponse::Ok().json(vendors),
        Err(e) => error_response(&e),
    }
}

#[get("/v1/materials/{material_id}")]
pub async fn api_v1_get_material(
    material_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match get_material_service(material_id.into_inner(), repo.get_ref()) {
        Ok(material) => HttpResponse::Ok().json(material),
        Err(e) => error_response(&e),
    }
}

#[get("/v1/searches")]
pub async fn api_v1_list_saved_searches(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match list_saved_searches_service(&user, repo.get_ref()) {
        Ok(searches) => HttpResponse::Ok().json(searches),
        Err(e) => error_response(&e),
    }
}

#[post("/v1/searches")]
pub async fn api_v1_save_search(
    form: web::Json<SaveSearchForm>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let payload: SaveSearchFormPayload = match form.into_inner().try_into() {
        Ok(payload) => payload,
        Err(e) => return error_response(&ServiceError::from(e)),
    };

    match save_search_service(payload, &user, repo.get_ref()) {
        Ok(saved) => HttpResponse::Created().json(saved),
        Err(e) => error_response(&e),
    }
}
