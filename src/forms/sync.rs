use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::types::{CategoryName, TypeConstraintError};

/// Body of a sync trigger request. An absent or empty body syncs everything.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct TriggerSyncForm {
    #[validate(length(min = 1))]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriggerSyncFormPayload {
    /// Restrict the run to one category instead of the configured list.
    pub category: Option<CategoryName>,
}

#[derive(Debug, Error)]
pub enum TriggerSyncFormError {
    #[error("Sync form validation failed: {0}")]
    Validation(String),
    #[error("Sync form contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for TriggerSyncFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for TriggerSyncFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl TryFrom<TriggerSyncForm> for TriggerSyncFormPayload {
    type Error = TriggerSyncFormError;

    fn try_from(value: TriggerSyncForm) -> Result<Self, Self::Error> {
        value.validate()?;
        let category = value.category.map(CategoryName::new).transpose()?;
        Ok(Self { category })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_form_means_full_sync() {
        let payload: TriggerSyncFormPayload = TriggerSyncForm::default().try_into().unwrap();
        assert!(payload.category.is_none());
    }

    #[test]
    fn category_is_trimmed() {
        let form = TriggerSyncForm {
            category: Some(" roofing ".to_string()),
        };
        let payload: TriggerSyncFormPayload = form.try_into().unwrap();
        assert_eq!(payload.category.unwrap().as_str(), "roofing");
    }

    #[test]
    fn blank_category_is_rejected() {
        let form = TriggerSyncForm {
            category: Some(String::new()),
        };
        assert!(TriggerSyncFormPayload::try_from(form).is_err());
    }
}
