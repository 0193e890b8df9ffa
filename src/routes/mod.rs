use actix_web::HttpResponse;
use serde_json::json;

use crate::services::ServiceError;

pub mod auth;
pub mod materials;
pub mod sync;

/// Maps a service error onto the JSON error response the API exposes.
pub(crate) fn error_response(err: &ServiceError) -> HttpResponse {
    let body = json!({ "error": err.to_string() });
    match err {
        ServiceError::Validation(_) => HttpResponse::BadRequest().json(body),
        ServiceError::Unauthorized => HttpResponse::Unauthorized().json(body),
        ServiceError::NotFound => HttpResponse::NotFound().json(body),
        ServiceError::InvalidState(_) => HttpResponse::Conflict().json(body),
        ServiceError::Internal => HttpResponse::InternalServerError().json(body),
    }
}
