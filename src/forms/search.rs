use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::types::{Availability, SearchText, TypeConstraintError};
use crate::pagination::DEFAULT_ITEMS_PER_PAGE;

/// Results per page when a search request does not ask for a count.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Largest page size a request may ask for.
pub const MAX_PAGE_LIMIT: usize = 100;

#[derive(Debug, Deserialize, Validate)]
pub struct SearchForm {
    #[validate(length(min = 1))]
    pub query: String,
    #[validate(range(min = 1))]
    pub page: Option<usize>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchFormPayload {
    pub query: SearchText,
    pub page: usize,
    pub limit: usize,
}

#[derive(Debug, Error)]
pub enum SearchFormError {
    #[error("Search form validation failed: {0}")]
    Validation(String),
    #[error("Search form contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for SearchFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for SearchFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl TryFrom<SearchForm> for SearchFormPayload {
    type Error = SearchFormError;

    fn try_from(value: SearchForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            query: SearchText::new(value.query)?,
            page: value.page.unwrap_or(1),
            limit: value.limit.unwrap_or(DEFAULT_SEARCH_LIMIT),
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct BrowseForm {
    pub category: Option<String>,
    pub vendor: Option<String>,
    pub availability: Option<String>,
    #[validate(range(min = 0.0))]
    pub min_price: Option<f64>,
    #[validate(range(min = 0.0))]
    pub max_price: Option<f64>,
    #[validate(range(min = 1))]
    pub page: Option<usize>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BrowseFormPayload {
    pub category: Option<String>,
    pub vendor: Option<String>,
    pub availability: Option<Availability>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub page: usize,
    pub per_page: usize,
}

#[derive(Debug, Error)]
pub enum BrowseFormError {
    #[error("Browse form validation failed: {0}")]
    Validation(String),
    #[error("Browse form contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for BrowseFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for BrowseFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl TryFrom<BrowseForm> for BrowseFormPayload {
    type Error = BrowseFormError;

    fn try_from(value: BrowseForm) -> Result<Self, Self::Error> {
        value.validate()?;

        if let (Some(min), Some(max)) = (value.min_price, value.max_price) {
            if min > max {
                return Err(BrowseFormError::Validation(
                    "min_price cannot exceed max_price".to_string(),
                ));
            }
        }

        let availability = value
            .availability
            .as_deref()
            .map(Availability::try_from)
            .transpose()?;

        Ok(Self {
            category: trimmed(value.category),
            vendor: trimmed(value.vendor),
            availability,
            min_price: value.min_price,
            max_price: value.max_price,
            page: value.page.unwrap_or(1),
            per_page: value.limit.unwrap_or(DEFAULT_ITEMS_PER_PAGE),
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct SaveSearchForm {
    #[validate(length(min = 1))]
    pub query: String,
    pub filters: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaveSearchFormPayload {
    pub query: SearchText,
    pub filters: Option<Value>,
}

#[derive(Debug, Error)]
pub enum SaveSearchFormError {
    #[error("Save search form validation failed: {0}")]
    Validation(String),
    #[error("Save search form contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for SaveSearchFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for SaveSearchFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl TryFrom<SaveSearchForm> for SaveSearchFormPayload {
    type Error = SaveSearchFormError;

    fn try_from(value: SaveSearchForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            query: SearchText::new(value.query)?,
            filters: value.filters,
        })
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_form_applies_defaults() {
        let form = SearchForm {
            query: "  rebar  ".to_string(),
            page: None,
            limit: None,
        };

        let payload: SearchFormPayload = form.try_into().unwrap();
        assert_eq!(payload.query.as_str(), "rebar");
        assert_eq!(payload.page, 1);
        assert_eq!(payload.limit, DEFAULT_SEARCH_LIMIT);
    }

    #[test]
    fn search_form_rejects_blank_query() {
        let form = SearchForm {
            query: String::new(),
            page: None,
            limit: None,
        };

        assert!(SearchFormPayload::try_from(form).is_err());
    }

    #[test]
    fn search_form_rejects_oversized_limit() {
        let form = SearchForm {
            query: "pipe".to_string(),
            page: Some(1),
            limit: Some(MAX_PAGE_LIMIT + 1),
        };

        assert!(SearchFormPayload::try_from(form).is_err());
    }

    #[test]
    fn browse_form_parses_availability() {
        let form = BrowseForm {
            category: Some(" lumber ".to_string()),
            vendor: None,
            availability: Some("special_order".to_string()),
            min_price: None,
            max_price: None,
            page: None,
            limit: None,
        };

        let payload: BrowseFormPayload = form.try_into().unwrap();
        assert_eq!(payload.category.as_deref(), Some("lumber"));
        assert_eq!(payload.availability, Some(Availability::SpecialOrder));
        assert_eq!(payload.per_page, DEFAULT_ITEMS_PER_PAGE);
    }

    #[test]
    fn browse_form_rejects_inverted_price_range() {
        let form = BrowseForm {
            category: None,
            vendor: None,
            availability: None,
            min_price: Some(50.0),
            max_price: Some(10.0),
            page: None,
            limit: None,
        };

        assert!(BrowseFormPayload::try_from(form).is_err());
    }

    #[test]
    fn browse_form_rejects_unknown_availability() {
        let form = BrowseForm {
            category: None,
            vendor: None,
            availability: Some("maybe".to_string()),
            min_price: None,
            max_price: None,
            page: None,
            limit: None,
        };

        assert!(BrowseFormPayload::try_from(form).is_err());
    }
}
