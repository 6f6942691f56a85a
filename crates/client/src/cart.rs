//! The locally persisted shopping cart.
//!
//! The cart is client-owned and ephemeral: a sequence of product
//! snapshots with derived totals, recomputed on every mutation and
//! persisted through the [`Storage`] collaborator so it survives a page
//! reload. It is never reconciled against live stock until an order is
//! submitted.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use voltline_core::ProductId;

use crate::api::Product;
use crate::error::ClientError;
use crate::storage::Storage;

/// Storage key for the cart snapshot.
const CART_KEY: &str = "cart";

/// One cart line: a snapshot of the product at the time it was added,
/// plus a quantity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    pub slug: String,
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_price: Option<Decimal>,
    pub image: String,
    pub stock: i32,
    pub quantity: i32,
}

/// The persisted cart snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartState {
    items: Vec<CartItem>,
    total_quantity: i32,
    total_price: Decimal,
}

/// The shopping cart.
///
/// Invariant: after every mutation, `total_quantity` equals the sum of
/// line quantities and `total_price` equals the sum of `price × quantity`
/// across lines, and the snapshot in storage matches the in-memory state.
pub struct Cart {
    storage: Arc<dyn Storage>,
    state: CartState,
}

impl Cart {
    /// Load the cart from storage, or start empty if no snapshot exists.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Storage` if storage cannot be read and
    /// `ClientError::CorruptState` if the snapshot fails to decode.
    pub fn load(storage: Arc<dyn Storage>) -> Result<Self, ClientError> {
        let state = match storage.get(CART_KEY)? {
            Some(snapshot) => serde_json::from_str(&snapshot)?,
            None => CartState::default(),
        };
        Ok(Self { storage, state })
    }

    /// Add a product to the cart, merging into an existing line by
    /// product id (quantities sum).
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Storage` if the snapshot cannot be persisted.
    pub fn add_item(&mut self, product: &Product, quantity: i32) -> Result<(), ClientError> {
        if let Some(line) = self
            .state
            .items
            .iter_mut()
            .find(|item| item.product_id == product.id)
        {
            line.quantity += quantity;
        } else {
            self.state.items.push(CartItem {
                product_id: product.id,
                name: product.name.clone(),
                slug: product.slug.clone(),
                price: product.price,
                old_price: product.old_price,
                image: product.image.clone(),
                stock: product.stock,
                quantity,
            });
        }
        self.recompute_and_persist()
    }

    /// Remove a line entirely. Removing an absent product id is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Storage` if the snapshot cannot be persisted.
    pub fn remove_item(&mut self, product_id: ProductId) -> Result<(), ClientError> {
        self.state.items.retain(|item| item.product_id != product_id);
        self.recompute_and_persist()
    }

    /// Overwrite a line's quantity.
    ///
    /// No lower bound is enforced here beyond what the UI hints at; the
    /// order service is the authority at submission time.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Storage` if the snapshot cannot be persisted.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: i32) -> Result<(), ClientError> {
        if let Some(line) = self
            .state
            .items
            .iter_mut()
            .find(|item| item.product_id == product_id)
        {
            line.quantity = quantity;
        }
        self.recompute_and_persist()
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Storage` if the snapshot cannot be persisted.
    pub fn clear(&mut self) -> Result<(), ClientError> {
        self.state.items.clear();
        self.recompute_and_persist()
    }

    /// The current lines.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.state.items
    }

    /// Sum of line quantities.
    #[must_use]
    pub const fn total_quantity(&self) -> i32 {
        self.state.total_quantity
    }

    /// Sum of `price × quantity` across lines.
    #[must_use]
    pub const fn total_price(&self) -> Decimal {
        self.state.total_price
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.items.is_empty()
    }

    fn recompute_and_persist(&mut self) -> Result<(), ClientError> {
        self.state.total_quantity = self.state.items.iter().map(|item| item.quantity).sum();
        self.state.total_price = self
            .state
            .items
            .iter()
            .map(|item| item.price * Decimal::from(item.quantity))
            .sum();

        let snapshot = serde_json::to_string(&self.state)?;
        self.storage.set(CART_KEY, &snapshot)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use voltline_core::Category;

    fn product(id: i32, price: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            slug: format!("product-{id}"),
            category: Category::Accessories,
            price: Decimal::new(price, 0),
            old_price: None,
            rating: Decimal::ZERO,
            stock: 10,
            image: "/uploads/x.jpg".to_owned(),
            tag: None,
            description: "desc".to_owned(),
            created_at: chrono::Utc::now(),
        }
    }

    fn assert_invariant(cart: &Cart) {
        let quantity: i32 = cart.items().iter().map(|i| i.quantity).sum();
        let price: Decimal = cart
            .items()
            .iter()
            .map(|i| i.price * Decimal::from(i.quantity))
            .sum();
        assert_eq!(cart.total_quantity(), quantity);
        assert_eq!(cart.total_price(), price);
    }

    #[test]
    fn test_add_merges_by_product_id() {
        let storage = Arc::new(MemoryStorage::new());
        let mut cart = Cart::load(storage).unwrap();

        cart.add_item(&product(1, 100), 1).unwrap();
        cart.add_item(&product(1, 100), 2).unwrap();

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items().first().unwrap().quantity, 3);
        assert_eq!(cart.total_quantity(), 3);
        assert_eq!(cart.total_price(), Decimal::new(300, 0));
        assert_invariant(&cart);
    }

    #[test]
    fn test_remove_drops_line() {
        let storage = Arc::new(MemoryStorage::new());
        let mut cart = Cart::load(storage).unwrap();

        cart.add_item(&product(1, 100), 1).unwrap();
        cart.add_item(&product(2, 50), 2).unwrap();
        cart.remove_item(ProductId::new(1)).unwrap();

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.total_price(), Decimal::new(100, 0));
        assert_invariant(&cart);
    }

    #[test]
    fn test_set_quantity_overwrites() {
        let storage = Arc::new(MemoryStorage::new());
        let mut cart = Cart::load(storage).unwrap();

        cart.add_item(&product(1, 100), 5).unwrap();
        cart.set_quantity(ProductId::new(1), 2).unwrap();

        assert_eq!(cart.total_quantity(), 2);
        assert_eq!(cart.total_price(), Decimal::new(200, 0));
        assert_invariant(&cart);
    }

    #[test]
    fn test_clear_empties_everything() {
        let storage = Arc::new(MemoryStorage::new());
        let mut cart = Cart::load(storage).unwrap();

        cart.add_item(&product(1, 100), 5).unwrap();
        cart.clear().unwrap();

        assert!(cart.is_empty());
        assert_eq!(cart.total_quantity(), 0);
        assert_eq!(cart.total_price(), Decimal::ZERO);
    }

    #[test]
    fn test_invariant_over_mutation_sequences() {
        let storage = Arc::new(MemoryStorage::new());
        let mut cart = Cart::load(storage).unwrap();

        cart.add_item(&product(1, 999), 1).unwrap();
        assert_invariant(&cart);
        cart.add_item(&product(2, 49), 4).unwrap();
        assert_invariant(&cart);
        cart.set_quantity(ProductId::new(2), 1).unwrap();
        assert_invariant(&cart);
        cart.remove_item(ProductId::new(1)).unwrap();
        assert_invariant(&cart);
        cart.add_item(&product(3, 25), 2).unwrap();
        assert_invariant(&cart);
    }

    #[test]
    fn test_cart_survives_reload() {
        let storage = Arc::new(MemoryStorage::new());

        let mut cart = Cart::load(storage.clone()).unwrap();
        cart.add_item(&product(1, 100), 2).unwrap();
        drop(cart);

        let reloaded = Cart::load(storage).unwrap();
        assert_eq!(reloaded.total_quantity(), 2);
        assert_eq!(reloaded.total_price(), Decimal::new(200, 0));
    }
}
