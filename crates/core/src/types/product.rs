//! Catalog records, stock levels, and cart line items.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// A product as served by the catalog, before it has a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    /// Image URL.
    pub image: String,
}

/// A product inside the cart.
///
/// `amount` is the quantity the shopper has selected and is always at least 1
/// for entries held by a [`Cart`](super::Cart).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    /// Image URL.
    pub image: String,
    pub amount: u32,
}

impl Product {
    /// Build a cart entry from a catalog record.
    #[must_use]
    pub fn from_catalog(product: CatalogProduct, amount: u32) -> Self {
        Self {
            id: product.id,
            title: product.title,
            price: product.price,
            image: product.image,
            amount,
        }
    }

    /// Copy of this entry with a different quantity.
    #[must_use]
    pub fn with_amount(&self, amount: u32) -> Self {
        Self {
            amount,
            ..self.clone()
        }
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.amount)
    }
}

/// Available quantity for a product, as reported by the stock service.
///
/// Stock is remote-authoritative and never changed locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    pub id: ProductId,
    pub amount: i64,
}

impl Stock {
    /// Whether `requested` units fit within the available quantity.
    #[must_use]
    pub const fn covers(&self, requested: i64) -> bool {
        requested <= self.amount
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sneaker() -> CatalogProduct {
        CatalogProduct {
            id: ProductId::new(1),
            title: "Tênis de Caminhada Leve Confortável".to_string(),
            price: Price::from_cents(17_990),
            image: "https://example.com/sneaker.jpg".to_string(),
        }
    }

    #[test]
    fn test_from_catalog_keeps_fields() {
        let product = Product::from_catalog(sneaker(), 1);
        assert_eq!(product.id, ProductId::new(1));
        assert_eq!(product.price, Price::from_cents(17_990));
        assert_eq!(product.amount, 1);
    }

    #[test]
    fn test_line_total() {
        let product = Product::from_catalog(sneaker(), 2);
        assert_eq!(product.line_total(), Price::from_cents(35_980));
    }

    #[test]
    fn test_product_json_shape() {
        let json = r#"{"id":3,"title":"Tênis","price":139.9,"image":"a.jpg","amount":4}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, ProductId::new(3));
        assert_eq!(product.amount, 4);
        assert_eq!(product.price, Price::from_cents(13_990));
    }

    #[test]
    fn test_stock_covers() {
        let stock = Stock {
            id: ProductId::new(1),
            amount: 3,
        };
        assert!(stock.covers(3));
        assert!(!stock.covers(4));

        let empty = Stock {
            id: ProductId::new(2),
            amount: 0,
        };
        assert!(!empty.covers(1));
    }
}
