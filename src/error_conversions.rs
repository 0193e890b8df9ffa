//! Error conversion glue.
//!
//! The domain layer must not depend on service/repository error types, so the
//! conversions from [`TypeConstraintError`] and the per-form errors live here
//! instead of next to the types themselves.

use crate::domain::types::TypeConstraintError;
use crate::forms::auth::LoginFormError;
use crate::forms::search::{BrowseFormError, SaveSearchFormError, SearchFormError};
use crate::forms::sync::TriggerSyncFormError;
use crate::repository::errors::RepositoryError;
use crate::services::errors::ServiceError;

impl From<TypeConstraintError> for ServiceError {
    fn from(val: TypeConstraintError) -> Self {
        ServiceError::Validation(val.to_string())
    }
}

impl From<TypeConstraintError> for RepositoryError {
    fn from(val: TypeConstraintError) -> Self {
        RepositoryError::ValidationError(val.to_string())
    }
}

impl From<SearchFormError> for ServiceError {
    fn from(val: SearchFormError) -> Self {
        ServiceError::Validation(val.to_string())
    }
}

impl From<BrowseFormError> for ServiceError {
    fn from(val: BrowseFormError) -> Self {
        ServiceError::Validation(val.to_string())
    }
}

impl From<SaveSearchFormError> for ServiceError {
    fn from(val: SaveSearchFormError) -> Self {
        ServiceError::Validation(val.to_string())
    }
}

impl From<TriggerSyncFormError> for ServiceError {
    fn from(val: TriggerSyncFormError) -> Self {
        ServiceError::Validation(val.to_string())
    }
}

impl From<LoginFormError> for ServiceError {
    fn from(val: LoginFormError) -> Self {
        ServiceError::Validation(val.to_string())
    }
}
