//! Deterministic placeholder listings for development and fallback.

use crate::extraction::RawProduct;

const AVAILABILITY_CYCLE: [&str; 4] = ["in_stock", "in_stock", "available_soon", "special_order"];

/// Deterministic sample listings for a category.
///
/// The same `(category, index)` pair always produces the same SKU and URL, so
/// repeated fallback runs upsert the same rows instead of multiplying them.
/// Vendor and unit are left empty to exercise the normalizer defaults.
pub fn sample_products(category: &str, limit: u32) -> Vec<RawProduct> {
    (0..limit as usize)
        .map(|index| {
            let sku = format!("{category}-sample-{index:03}");
            let url = format!("https://www.homedepot.com/p/{sku}");
            RawProduct {
                sku: Some(sku),
                name: Some(format!(
                    "Sample {category} material {number}",
                    number = index + 1
                )),
                description: Some(format!(
                    "Placeholder {category} listing served while extraction is unavailable."
                )),
                price: Some(5.0 + index as f64 * 1.25),
                category: Some(category.to_string()),
                url: Some(url),
                image_url: None,
                vendor: None,
                stock: Some(format!("{} in stock", 8 + index * 3)),
                unit: None,
                specifications: None,
                availability: Some(AVAILABILITY_CYCLE[index % AVAILABILITY_CYCLE.len()].to_string()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn respects_limit() {
        assert_eq!(sample_products("lumber", 0).len(), 0);
        assert_eq!(sample_products("lumber", 3).len(), 3);
        assert_eq!(sample_products("lumber", 10).len(), 10);
    }

    #[test]
    fn output_is_deterministic() {
        let first = sample_products("drywall", 5);
        let second = sample_products("drywall", 5);
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.sku, b.sku);
            assert_eq!(a.url, b.url);
            assert_eq!(a.price, b.price);
        }
        assert_eq!(first[0].sku.as_deref(), Some("drywall-sample-000"));
    }

    #[test]
    fn availability_cycles_through_known_states() {
        let products = sample_products("paint", 4);
        let states: Vec<_> = products
            .iter()
            .map(|p| p.availability.as_deref().unwrap())
            .collect();
        assert_eq!(
            states,
            ["in_stock", "in_stock", "available_soon", "special_order"]
        );
    }
}
