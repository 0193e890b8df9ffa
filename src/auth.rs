//! Session identity for API callers.
//!
//! Login exchanges a bearer token for claims at an external identity service;
//! the claims are then stored in the session cookie by `actix-identity` and
//! rehydrated per request through the [`AuthenticatedUser`] extractor.

use std::future::{Ready, ready};
use std::time::Duration;

use actix_identity::Identity;
use actix_web::dev::Payload;
use actix_web::error::ErrorUnauthorized;
use actix_web::{Error, FromRequest, HttpRequest};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Claims stored in the session cookie after a successful login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthenticatedUser {
    /// Stable identifier of the user at the identity service.
    pub sub: String,
    pub email: String,
    pub name: String,
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let result = match Identity::from_request(req, payload).into_inner() {
            Ok(identity) => identity
                .id()
                .map_err(|_| ErrorUnauthorized("session expired"))
                .and_then(|claims| {
                    serde_json::from_str(&claims).map_err(|_| ErrorUnauthorized("invalid session"))
                }),
            Err(_) => Err(ErrorUnauthorized("login required")),
        };
        ready(result)
    }
}

/// Errors verifying a login token with the identity service.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The identity service rejected the token.
    #[error("invalid token")]
    InvalidToken,
    /// The identity service could not be reached.
    #[error("identity service error: {0}")]
    Upstream(#[from] reqwest::Error),
    /// The identity service answered with an unexpected status.
    #[error("identity service returned status {0}")]
    Status(u16),
    /// The identity service answered with claims we cannot read.
    #[error("malformed claims: {0}")]
    MalformedClaims(String),
}

/// Exchange of a bearer token for verified user claims.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify_token(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}

/// Identity provider backed by an external HTTP verification endpoint.
pub struct HttpIdentityProvider {
    http: reqwest::Client,
    base_url: String,
}

impl HttpIdentityProvider {
    pub fn new(base_url: &str) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn verify_token(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let response = self
            .http
            .post(format!("{}/v1/verify", self.base_url))
            .json(&serde_json::json!({ "token": token }))
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(AuthError::InvalidToken);
        }
        if !status.is_success() {
            return Err(AuthError::Status(status.as_u16()));
        }

        response
            .json::<AuthenticatedUser>()
            .await
            .map_err(|e| AuthError::MalformedClaims(e.to_string()))
    }
}
