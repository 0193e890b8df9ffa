//! Diesel rows for the `materials` table.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::material::{Material as DomainMaterial, NewMaterial as DomainNewMaterial};
use crate::domain::types::{
    Availability, CategoryName, MaterialName, MaterialSku, SourceName, TypeConstraintError,
    UnitOfSale, VendorName,
};

/// Diesel representation of a material row.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::materials)]
pub struct Material {
    pub id: i32,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: String,
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub vendor_name: String,
    pub quantity: Option<i32>,
    pub unit: String,
    pub specifications: Option<String>,
    pub availability: String,
    pub source: String,
    pub last_synced: NaiveDateTime,
}

/// Insertable/patchable form of [`Material`].
///
/// `treat_none_as_null` matters for the sku upsert: a re-synced listing with
/// no price must overwrite a previously known price with NULL instead of
/// leaving the stale value behind.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::materials)]
#[diesel(treat_none_as_null = true)]
pub struct NewMaterial {
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: String,
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub vendor_name: String,
    pub quantity: Option<i32>,
    pub unit: String,
    pub specifications: Option<String>,
    pub availability: String,
    pub source: String,
    pub last_synced: NaiveDateTime,
}

fn parse_specifications(
    raw: Option<String>,
) -> Result<Option<BTreeMap<String, String>>, TypeConstraintError> {
    match raw {
        None => Ok(None),
        Some(text) => serde_json::from_str(&text).map(Some).map_err(|e| {
            TypeConstraintError::InvalidValue(format!("material specifications: {e}"))
        }),
    }
}

impl TryFrom<Material> for DomainMaterial {
    type Error = TypeConstraintError;

    fn try_from(material: Material) -> Result<Self, Self::Error> {
        Ok(Self {
            id: material.id.try_into()?,
            sku: MaterialSku::new(material.sku)?,
            name: MaterialName::new(material.name)?,
            description: material.description.map(TryInto::try_into).transpose()?,
            price: material.price.map(TryInto::try_into).transpose()?,
            category: CategoryName::new(material.category)?,
            url: material.url.map(TryInto::try_into).transpose()?,
            image_url: material.image_url.map(TryInto::try_into).transpose()?,
            vendor: VendorName::new(material.vendor_name)?,
            quantity: material.quantity.map(TryInto::try_into).transpose()?,
            unit: UnitOfSale::new(material.unit)?,
            specifications: parse_specifications(material.specifications)?,
            availability: Availability::try_from(material.availability)?,
            source: SourceName::new(material.source)?,
            last_synced: material.last_synced,
        })
    }
}

impl TryFrom<&DomainNewMaterial> for NewMaterial {
    type Error = serde_json::Error;

    fn try_from(material: &DomainNewMaterial) -> Result<Self, Self::Error> {
        let specifications = material
            .specifications
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        Ok(Self {
            sku: material.sku.as_str().to_string(),
            name: material.name.as_str().to_string(),
            description: material
                .description
                .as_ref()
                .map(|value| value.as_str().to_string()),
            price: material.price.map(|value| value.get()),
            category: material.category.as_str().to_string(),
            url: material.url.as_ref().map(|value| value.as_str().to_string()),
            image_url: material
                .image_url
                .as_ref()
                .map(|value| value.as_str().to_string()),
            vendor_name: material.vendor.as_str().to_string(),
            quantity: material.quantity.map(|value| value.get()),
            unit: material.unit.as_str().to_string(),
            specifications,
            availability: material.availability.as_str().to_string(),
            source: material.source.as_str().to_string(),
            last_synced: material.last_synced,
        })
    }
}
