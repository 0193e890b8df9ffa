//! Catalog entries synchronized from external listing sources.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    Availability, CategoryName, ImageUrl, MaterialDescription, MaterialId, MaterialName,
    MaterialPrice, MaterialSku, MaterialUrl, SourceName, StockQuantity, UnitOfSale, VendorName,
};

/// Categories the sync pipeline pulls, in the order they are processed.
pub const MATERIAL_CATEGORIES: [&str; 10] = [
    "lumber",
    "drywall",
    "roofing",
    "insulation",
    "concrete",
    "flooring",
    "plumbing",
    "electrical",
    "hardware",
    "paint",
];

/// A construction material listing.
///
/// Rows are keyed by `sku` per source: re-syncing the same SKU replaces the
/// stored listing rather than duplicating it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Material {
    pub id: MaterialId,
    pub sku: MaterialSku,
    pub name: MaterialName,
    pub description: Option<MaterialDescription>,
    /// `None` means the price is unknown, never zero.
    pub price: Option<MaterialPrice>,
    pub category: CategoryName,
    pub url: Option<MaterialUrl>,
    pub image_url: Option<ImageUrl>,
    pub vendor: VendorName,
    pub quantity: Option<StockQuantity>,
    pub unit: UnitOfSale,
    pub specifications: Option<BTreeMap<String, String>>,
    pub availability: Availability,
    pub source: SourceName,
    pub last_synced: NaiveDateTime,
}

/// Information required to create or replace a [`Material`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewMaterial {
    pub sku: MaterialSku,
    pub name: MaterialName,
    pub description: Option<MaterialDescription>,
    pub price: Option<MaterialPrice>,
    pub category: CategoryName,
    pub url: Option<MaterialUrl>,
    pub image_url: Option<ImageUrl>,
    pub vendor: VendorName,
    pub quantity: Option<StockQuantity>,
    pub unit: UnitOfSale,
    pub specifications: Option<BTreeMap<String, String>>,
    pub availability: Availability,
    pub source: SourceName,
    pub last_synced: NaiveDateTime,
}
