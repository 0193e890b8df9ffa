use actix_web::{HttpResponse, Responder, get, post, web};
use serde_json::Value;

use crate::auth::AuthenticatedUser;
use crate::extraction::ExtractionClient;
use crate::forms::sync::{TriggerSyncForm, TriggerSyncFormPayload};
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::error_response;
use crate::services::ServiceError;
use crate::services::sync::{
    SyncRegistry, cancel_sync as cancel_sync_service,
    check_sync_status as check_sync_status_service, latest_sync as latest_sync_service,
    trigger_sync as trigger_sync_service,
};

#[post("/v1/sync")]
pub async fn api_v1_trigger_sync(
    form: Option<web::Json<TriggerSyncForm>>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    client: web::Data<dyn ExtractionClient>,
    registry: web::Data<SyncRegistry>,
    config: web::Data<ServerConfig>,
) -> impl Responder {
    // An absent or empty body requests a full sync over every category.
    let form = form.map(web::Json::into_inner).unwrap_or_default();
    let payload: TriggerSyncFormPayload = match form.try_into() {
        Ok(payload) => payload,
        Err(e) => return error_response(&ServiceError::from(e)),
    };

    let client = client.into_inner();
    match trigger_sync_service(
        payload,
        &user,
        repo.get_ref(),
        &client,
        &config.sync,
        registry.get_ref(),
    ) {
        Ok(triggered) => HttpResponse::Accepted().json(triggered),
        Err(e) => error_response(&e),
    }
}

#[get("/v1/sync/latest")]
pub async fn api_v1_latest_sync(repo: web::Data<DieselRepository>) -> impl Responder {
    match latest_sync_service(repo.get_ref()) {
        Ok(Some(status)) => HttpResponse::Ok().json(status),
        Ok(None) => HttpResponse::Ok().json(Value::Null),
        Err(e) => error_response(&e),
    }
}

#[get("/v1/sync/{sync_id}")]
pub async fn api_v1_sync_status(
    sync_id: web::Path<String>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match check_sync_status_service(&sync_id, repo.get_ref()) {
        Ok(status) => HttpResponse::Ok().json(status),
        Err(e) => error_response(&e),
    }
}

#[post("/v1/sync/{sync_id}/cancel")]
pub async fn api_v1_cancel_sync(
    sync_id: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match cancel_sync_service(&sync_id, &user, repo.get_ref()) {
        Ok(outcome) => HttpResponse::Ok().json(outcome),
        Err(e) => error_response(&e),
    }
}
