//! Turns raw extraction payloads into domain material records.

use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::domain::material::NewMaterial;
use crate::domain::types::{
    Availability, CategoryName, ImageUrl, MaterialDescription, MaterialName, MaterialPrice,
    MaterialSku, MaterialUrl, SourceName, StockQuantity, UnitOfSale, VendorName,
};
use crate::extraction::RawProduct;

/// Price unit assumed for listings that do not state one.
pub fn default_unit(category: &str) -> &'static str {
    match category {
        "lumber" => "per board foot",
        "drywall" => "per sheet",
        "concrete" => "per cubic yard",
        "roofing" => "per square",
        "insulation" => "per sq ft",
        "flooring" => "per sq ft",
        "paint" => "per gallon",
        _ => "each",
    }
}

/// Extracts a leading integer from a free-text stock note.
///
/// `"24 in stock"` yields `Some(24)`; notes without leading digits yield
/// `None`.
pub fn parse_stock(stock: Option<&str>) -> Option<i32> {
    let text = stock?.trim_start();
    let digits: String = text.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        None
    } else {
        digits.parse().ok()
    }
}

/// Builds a domain record from one raw listing.
///
/// Returns `None` when the listing has no identity: without a SKU, or a URL
/// to derive one from, a later sync could never match the row again. A SKU
/// derived from a URL is a v5 UUID, so the same URL always maps to the same
/// record. Optional fields that fail validation are dropped individually
/// while the record survives.
pub fn normalize(
    raw: RawProduct,
    category: &str,
    vendor: &str,
    source: &str,
    synced_at: NaiveDateTime,
) -> Option<NewMaterial> {
    let sku = raw
        .sku
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| {
            raw.url
                .as_deref()
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .map(|u| Uuid::new_v5(&Uuid::NAMESPACE_URL, u.as_bytes()).to_string())
        })?;

    let name = raw
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(&sku)
        .to_string();

    let unit = raw
        .unit
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| default_unit(category))
        .to_string();

    let availability = raw
        .availability
        .as_deref()
        .and_then(|a| Availability::try_from(a).ok())
        .unwrap_or(Availability::InStock);

    let vendor = raw
        .vendor
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(vendor);

    Some(NewMaterial {
        sku: MaterialSku::new(sku).ok()?,
        name: MaterialName::new(name).ok()?,
        description: raw
            .description
            .and_then(|d| MaterialDescription::new(d).ok()),
        price: raw.price.and_then(|p| MaterialPrice::new(p).ok()),
        category: CategoryName::new(category).ok()?,
        url: raw.url.and_then(|u| MaterialUrl::new(u).ok()),
        image_url: raw.image_url.and_then(|u| ImageUrl::new(u).ok()),
        vendor: VendorName::new(vendor).ok()?,
        quantity: parse_stock(raw.stock.as_deref()).and_then(|q| StockQuantity::new(q).ok()),
        unit: UnitOfSale::new(unit).ok()?,
        specifications: raw.specifications.filter(|s| !s.is_empty()),
        availability,
        source: SourceName::new(source).ok()?,
        last_synced: synced_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn raw_listing(sku: Option<&str>, name: Option<&str>, url: Option<&str>) -> RawProduct {
        RawProduct {
            sku: sku.map(Into::into),
            name: name.map(Into::into),
            url: url.map(Into::into),
            ..RawProduct::default()
        }
    }

    fn normalize_lumber(raw: RawProduct) -> Option<NewMaterial> {
        normalize(
            raw,
            "lumber",
            "Home Depot",
            "home_depot",
            Utc::now().naive_utc(),
        )
    }

    #[test]
    fn keeps_explicit_sku() {
        let record =
            normalize_lumber(raw_listing(Some(" HD-100 "), Some("2x4 Stud"), None)).unwrap();
        assert_eq!(record.sku.as_str(), "HD-100");
        assert_eq!(record.name.as_str(), "2x4 Stud");
    }

    #[test]
    fn derives_stable_sku_from_url() {
        let url = "https://www.homedepot.com/p/2x4-stud";
        let first = normalize_lumber(raw_listing(None, Some("2x4 Stud"), Some(url))).unwrap();
        let second = normalize_lumber(raw_listing(None, Some("2x4 Stud"), Some(url))).unwrap();
        assert_eq!(first.sku, second.sku);

        let other = normalize_lumber(raw_listing(
            None,
            Some("2x6 Stud"),
            Some("https://www.homedepot.com/p/2x6-stud"),
        ))
        .unwrap();
        assert_ne!(first.sku, other.sku);
    }

    #[test]
    fn drops_listing_without_identity() {
        assert!(normalize_lumber(raw_listing(None, Some("Nameless"), None)).is_none());
        assert!(normalize_lumber(raw_listing(Some("   "), Some("Blank"), Some("  "))).is_none());
    }

    #[test]
    fn name_falls_back_to_sku() {
        let record = normalize_lumber(raw_listing(Some("HD-7"), None, None)).unwrap();
        assert_eq!(record.name.as_str(), "HD-7");
    }

    #[test]
    fn missing_price_stays_unknown() {
        let record = normalize_lumber(raw_listing(Some("HD-1"), Some("Stud"), None)).unwrap();
        assert!(record.price.is_none());

        let negative = RawProduct {
            price: Some(-4.0),
            ..raw_listing(Some("HD-2"), Some("Stud"), None)
        };
        assert!(normalize_lumber(negative).unwrap().price.is_none());
    }

    #[test]
    fn unknown_availability_defaults_to_in_stock() {
        let odd = RawProduct {
            availability: Some("back in two weeks".to_string()),
            ..raw_listing(Some("HD-3"), Some("Stud"), None)
        };
        assert_eq!(
            normalize_lumber(odd).unwrap().availability,
            Availability::InStock
        );

        let explicit = RawProduct {
            availability: Some("special_order".to_string()),
            ..raw_listing(Some("HD-4"), Some("Stud"), None)
        };
        assert_eq!(
            normalize_lumber(explicit).unwrap().availability,
            Availability::SpecialOrder
        );
    }

    #[test]
    fn unit_defaults_depend_on_category() {
        let now = Utc::now().naive_utc();
        let record = normalize(
            raw_listing(Some("HD-5"), Some("Stud"), None),
            "lumber",
            "Home Depot",
            "home_depot",
            now,
        )
        .unwrap();
        assert_eq!(record.unit.as_str(), "per board foot");

        let record = normalize(
            raw_listing(Some("HD-6"), Some("Hinge"), None),
            "hardware",
            "Home Depot",
            "home_depot",
            now,
        )
        .unwrap();
        assert_eq!(record.unit.as_str(), "each");

        let explicit = RawProduct {
            unit: Some("per box".to_string()),
            ..raw_listing(Some("HD-8"), Some("Screws"), None)
        };
        let record = normalize(explicit, "hardware", "Home Depot", "home_depot", now).unwrap();
        assert_eq!(record.unit.as_str(), "per box");
    }

    #[test]
    fn stock_note_parsing() {
        assert_eq!(parse_stock(Some("24 in stock")), Some(24));
        assert_eq!(parse_stock(Some("  8 left")), Some(8));
        assert_eq!(parse_stock(Some("Out of stock")), None);
        assert_eq!(parse_stock(Some("")), None);
        assert_eq!(parse_stock(None), None);
    }

    #[test]
    fn invalid_optional_urls_are_dropped_not_fatal() {
        let listing = RawProduct {
            image_url: Some("not a url".to_string()),
            ..raw_listing(Some("HD-9"), Some("Stud"), None)
        };
        let record = normalize_lumber(listing).unwrap();
        assert!(record.image_url.is_none());
    }

    #[test]
    fn vendor_falls_back_to_pipeline_default() {
        let record = normalize_lumber(raw_listing(Some("HD-10"), Some("Stud"), None)).unwrap();
        assert_eq!(record.vendor.as_str(), "Home Depot");

        let named = RawProduct {
            vendor: Some("Ace Hardware".to_string()),
            ..raw_listing(Some("HD-11"), Some("Stud"), None)
        };
        assert_eq!(
            normalize_lumber(named).unwrap().vendor.as_str(),
            "Ace Hardware"
        );
    }
}
