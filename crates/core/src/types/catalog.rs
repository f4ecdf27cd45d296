//! Catalog records: products, categories and brands.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{BrandId, CategoryId, ProductId, VariantId};

// =============================================================================
// Product Types
// =============================================================================

/// Brand reference embedded in a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandSummary {
    pub slug: String,
    pub name: String,
}

/// A purchasable variant (size, pack count, colour).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductVariant {
    pub id: VariantId,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub stock: i64,
}

/// A product as listed in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub id: Option<ProductId>,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub brand: Option<BrandSummary>,
    pub price: Decimal,
    /// Price before the current discount, if any.
    #[serde(default)]
    pub previous_price: Option<Decimal>,
    #[serde(default)]
    pub discount_percent: Option<Decimal>,
    #[serde(default)]
    pub stock: i64,
    /// Average review rating.
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub variants: Vec<ProductVariant>,
}

impl Product {
    /// Whether at least one unit can be ordered.
    #[must_use]
    pub fn in_stock(&self) -> bool {
        self.stock > 0 || self.variants.iter().any(|v| v.stock > 0)
    }

    /// Whether the product is currently discounted.
    #[must_use]
    pub fn is_discounted(&self) -> bool {
        self.previous_price.is_some_and(|previous| previous > self.price)
    }
}

// =============================================================================
// Reference Lists
// =============================================================================

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub id: Option<CategoryId>,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// A brand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    #[serde(default)]
    pub id: Option<BrandId>,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(json: &str) -> Product {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_product_accepts_string_and_number_prices() {
        let p = product(r#"{"slug":"wipes","name":"Wipes","price":"120.50","previous_price":150}"#);
        assert_eq!(p.price, Decimal::new(12050, 2));
        assert!(p.is_discounted());
    }

    #[test]
    fn test_in_stock_considers_variants() {
        let p = product(
            r#"{"slug":"d","name":"Diapers","price":10,"stock":0,
                "variants":[{"id":3,"name":"M","price":10,"stock":4}]}"#,
        );
        assert!(p.in_stock());

        let p = product(r#"{"slug":"d","name":"Diapers","price":10}"#);
        assert!(!p.in_stock());
    }
}
