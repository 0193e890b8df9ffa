use actix_identity::Identity;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, Responder, delete, post, web};

use crate::auth::{AuthError, IdentityProvider};
use crate::forms::auth::{LoginForm, LoginFormPayload};
use crate::routes::error_response;
use crate::services::ServiceError;

#[post("/auth/session")]
pub async fn login(
    request: HttpRequest,
    form: web::Json<LoginForm>,
    provider: web::Data<dyn IdentityProvider>,
) -> impl Responder {
    let payload: LoginFormPayload = match form.into_inner().try_into() {
        Ok(payload) => payload,
        Err(e) => return error_response(&ServiceError::from(e)),
    };

    let user = match provider.verify_token(payload.token.as_str()).await {
        Ok(user) => user,
        Err(AuthError::InvalidToken) => return error_response(&ServiceError::Unauthorized),
        Err(e) => {
            log::error!("Token verification failed: {e}");
            return error_response(&ServiceError::Internal);
        }
    };

    let claims = match serde_json::to_string(&user) {
        Ok(claims) => claims,
        Err(e) => {
            log::error!("Failed to serialize session claims: {e}");
            return error_response(&ServiceError::Internal);
        }
    };
    if let Err(e) = Identity::login(&request.extensions(), claims) {
        log::error!("Failed to establish session: {e}");
        return error_response(&ServiceError::Internal);
    }

    HttpResponse::Ok().json(user)
}

#[delete("/auth/session")]
pub async fn logout(identity: Identity) -> impl Responder {
    identity.logout();
    HttpResponse::NoContent().finish()
}
