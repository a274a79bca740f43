//! The shopping cart: an ordered, id-unique list of products.
//!
//! A [`Cart`] is never edited in place. Each change (`with_appended`,
//! `with_amount`, `without`) returns a new cart and leaves the original
//! untouched, so a caller holding a snapshot can never observe a half-applied
//! update.

use std::collections::HashSet;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;
use super::product::Product;

/// Errors raised when a list of products would break the cart invariants.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartInvariantError {
    /// Two entries share the same product id.
    #[error("product {0} appears more than once")]
    DuplicateProduct(ProductId),
    /// An entry has a quantity of zero.
    #[error("product {0} has a zero amount")]
    ZeroAmount(ProductId),
}

/// Ordered sequence of products, unique by id.
///
/// Insertion order is display order. Serializes as a JSON array of
/// [`Product`]; deserialization rejects duplicate ids and zero amounts.
///
/// ```
/// use std::num::NonZeroU32;
/// use rocket_cart_core::{Cart, CatalogProduct, Price, Product, ProductId};
///
/// let shoe = CatalogProduct {
///     id: ProductId::new(1),
///     title: "Running shoe".to_string(),
///     price: Price::from_cents(9_990),
///     image: "shoe.jpg".to_string(),
/// };
///
/// let cart = Cart::new().with_appended(Product::from_catalog(shoe, 1)).unwrap();
/// let two = NonZeroU32::new(2).unwrap();
/// let updated = cart.with_amount(ProductId::new(1), two).unwrap();
///
/// assert_eq!(cart.item_count(), 1);
/// assert_eq!(updated.item_count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Product>", into = "Vec<Product>")]
pub struct Cart {
    products: Vec<Product>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            products: Vec::new(),
        }
    }

    /// Entries in display order.
    pub fn iter(&self) -> std::slice::Iter<'_, Product> {
        self.products.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Find the entry for a product.
    #[must_use]
    pub fn find(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.find(id).is_some()
    }

    /// New cart with `product` added at the end.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart already holds this product or if the
    /// product's amount is zero.
    pub fn with_appended(&self, product: Product) -> Result<Self, CartInvariantError> {
        if product.amount == 0 {
            return Err(CartInvariantError::ZeroAmount(product.id));
        }
        if self.contains(product.id) {
            return Err(CartInvariantError::DuplicateProduct(product.id));
        }

        let mut products = Vec::with_capacity(self.products.len() + 1);
        products.extend(self.products.iter().cloned());
        products.push(product);
        Ok(Self { products })
    }

    /// New cart with the quantity of `id` set to `amount`, position unchanged.
    ///
    /// Returns `None` if the product is not in the cart.
    #[must_use]
    pub fn with_amount(&self, id: ProductId, amount: NonZeroU32) -> Option<Self> {
        if !self.contains(id) {
            return None;
        }

        let products = self
            .products
            .iter()
            .map(|p| {
                if p.id == id {
                    p.with_amount(amount.get())
                } else {
                    p.clone()
                }
            })
            .collect();
        Some(Self { products })
    }

    /// New cart without `id`, order of remaining entries preserved.
    ///
    /// Returns `None` if the product is not in the cart.
    #[must_use]
    pub fn without(&self, id: ProductId) -> Option<Self> {
        if !self.contains(id) {
            return None;
        }

        let products = self
            .products
            .iter()
            .filter(|p| p.id != id)
            .cloned()
            .collect();
        Some(Self { products })
    }

    /// Total number of units across all entries.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.products.iter().map(|p| u64::from(p.amount)).sum()
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.products.iter().map(Product::line_total).sum()
    }
}

impl TryFrom<Vec<Product>> for Cart {
    type Error = CartInvariantError;

    fn try_from(products: Vec<Product>) -> Result<Self, Self::Error> {
        let mut seen = HashSet::with_capacity(products.len());
        for product in &products {
            if product.amount == 0 {
                return Err(CartInvariantError::ZeroAmount(product.id));
            }
            if !seen.insert(product.id) {
                return Err(CartInvariantError::DuplicateProduct(product.id));
            }
        }
        Ok(Self { products })
    }
}

impl From<Cart> for Vec<Product> {
    fn from(cart: Cart) -> Self {
        cart.products
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a Product;
    type IntoIter = std::slice::Iter<'a, Product>;

    fn into_iter(self) -> Self::IntoIter {
        self.products.iter()
    }
}
