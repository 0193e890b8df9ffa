use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::material::Material;

/// Material as rendered in API responses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialDto {
    pub id: i32,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: String,
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub vendor: String,
    pub quantity: Option<i32>,
    pub unit: String,
    pub specifications: Option<BTreeMap<String, String>>,
    pub availability: String,
    pub source: String,
    pub last_synced: NaiveDateTime,
}

impl From<Material> for MaterialDto {
    fn from(value: Material) -> Self {
        Self {
            id: value.id.get(),
            sku: value.sku.into_inner(),
            name: value.name.into_inner(),
            description: value.description.map(|d| d.into_inner()),
            price: value.price.map(|p| p.get()),
            category: value.category.into_inner(),
            url: value.url.map(|u| u.into_inner()),
            image_url: value.image_url.map(|u| u.into_inner()),
            vendor: value.vendor.into_inner(),
            quantity: value.quantity.map(|q| q.get()),
            unit: value.unit.into_inner(),
            specifications: value.specifications,
            availability: value.availability.as_str().to_string(),
            source: value.source.into_inner(),
            last_synced: value.last_synced,
        }
    }
}
