//! In-memory store backend.
//!
//! A process-local document store with the same observable semantics as
//! the `PostgreSQL` backend: unique slug/email indexes reported as
//! `Conflict`, last-writer-wins updates, newest-first listings. Used by
//! the integration tests, the client-flow tests, and local development
//! without a database.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;

use voltline_core::{Category, Email, OrderId, OrderStatus, ProductId, Role, UserId};

use super::{OrderStore, ProductStore, StoreError, UserStore};
use crate::models::{NewOrder, NewProduct, Order, Product, ProductPatch, User};

#[derive(Default)]
struct Inner {
    products: HashMap<i32, Product>,
    orders: HashMap<i32, Order>,
    users: HashMap<i32, (User, String)>,
    next_product_id: i32,
    next_order_id: i32,
    next_user_id: i32,
}

impl Inner {
    fn slug_taken(&self, slug: &str, except: Option<ProductId>) -> bool {
        self.products
            .values()
            .any(|p| p.slug.as_str() == slug && Some(p.id) != except)
    }

    fn email_taken(&self, email: &Email) -> bool {
        self.users.values().any(|(u, _)| &u.email == email)
    }
}

/// In-process document store.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Newest first, matching the `PostgreSQL` backend's ordering.
fn sort_newest_first<T, K: Fn(&T) -> (chrono::DateTime<Utc>, i32)>(items: &mut [T], key: K) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn insert_product(&self, new: NewProduct) -> Result<Product, StoreError> {
        let mut inner = self.lock();

        if inner.slug_taken(new.slug.as_str(), None) {
            return Err(StoreError::Conflict("slug already exists".to_owned()));
        }

        inner.next_product_id += 1;
        let product = Product {
            id: ProductId::new(inner.next_product_id),
            name: new.name,
            slug: new.slug,
            category: new.category,
            price: new.price,
            old_price: new.old_price,
            rating: Decimal::ZERO,
            stock: new.stock,
            image: new.image,
            tag: new.tag,
            description: new.description,
            created_at: Utc::now(),
        };

        inner.products.insert(product.id.as_i32(), product.clone());
        Ok(product)
    }

    async fn update_product(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Product, StoreError> {
        let mut inner = self.lock();

        if let Some(slug) = &patch.slug
            && inner.slug_taken(slug.as_str(), Some(id))
        {
            return Err(StoreError::Conflict("slug already exists".to_owned()));
        }

        let product = inner
            .products
            .get_mut(&id.as_i32())
            .ok_or(StoreError::NotFound)?;

        if let Some(name) = patch.name {
            product.name = name;
        }
        if let Some(slug) = patch.slug {
            product.slug = slug;
        }
        if let Some(category) = patch.category {
            product.category = category;
        }
        if let Some(price) = patch.price {
            product.price = price;
        }
        if let Some(old_price) = patch.old_price {
            product.old_price = old_price;
        }
        if let Some(stock) = patch.stock {
            product.stock = stock;
        }
        if let Some(image) = patch.image {
            product.image = image;
        }
        if let Some(tag) = patch.tag {
            product.tag = tag;
        }
        if let Some(description) = patch.description {
            product.description = description;
        }

        Ok(product.clone())
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), StoreError> {
        self.lock()
            .products
            .remove(&id.as_i32())
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn product_by_slug(&self, slug: &str) -> Result<Option<Product>, StoreError> {
        Ok(self
            .lock()
            .products
            .values()
            .find(|p| p.slug.as_str() == slug)
            .cloned())
    }

    async fn product_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.lock().products.get(&id.as_i32()).cloned())
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let mut products: Vec<Product> = self.lock().products.values().cloned().collect();
        sort_newest_first(&mut products, |p| (p.created_at, p.id.as_i32()));
        Ok(products)
    }

    async fn list_products_by_category(
        &self,
        category: Category,
    ) -> Result<Vec<Product>, StoreError> {
        let mut products: Vec<Product> = self
            .lock()
            .products
            .values()
            .filter(|p| p.category == category)
            .cloned()
            .collect();
        sort_newest_first(&mut products, |p| (p.created_at, p.id.as_i32()));
        Ok(products)
    }

    async fn search_products(&self, query: &str) -> Result<Vec<Product>, StoreError> {
        let needle = query.to_lowercase();
        let mut products: Vec<Product> = self
            .lock()
            .products
            .values()
            .filter(|p| {
                p.name.to_lowercase().contains(&needle)
                    || p.description.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        sort_newest_first(&mut products, |p| (p.created_at, p.id.as_i32()));
        Ok(products)
    }

    async fn decrement_stock(&self, id: ProductId, quantity: i32) -> Result<bool, StoreError> {
        let mut inner = self.lock();
        let product = inner
            .products
            .get_mut(&id.as_i32())
            .ok_or(StoreError::NotFound)?;

        if product.stock < quantity {
            return Ok(false);
        }
        product.stock -= quantity;
        Ok(true)
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn insert_order(&self, new: NewOrder) -> Result<Order, StoreError> {
        let mut inner = self.lock();

        inner.next_order_id += 1;
        let order = Order {
            id: OrderId::new(inner.next_order_id),
            user_id: new.user_id,
            products: new.products,
            total_price: new.total_price,
            status: OrderStatus::Pending,
            address: new.address,
            email: new.email,
            phone: new.phone,
            created_at: Utc::now(),
        };

        inner.orders.insert(order.id.as_i32(), order.clone());
        Ok(order)
    }

    async fn order_by_id(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self.lock().orders.get(&id.as_i32()).cloned())
    }

    async fn list_orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError> {
        let mut orders: Vec<Order> = self
            .lock()
            .orders
            .values()
            .filter(|o| o.user_id == Some(user_id))
            .cloned()
            .collect();
        sort_newest_first(&mut orders, |o| (o.created_at, o.id.as_i32()));
        Ok(orders)
    }

    async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        let mut orders: Vec<Order> = self.lock().orders.values().cloned().collect();
        sort_newest_first(&mut orders, |o| (o.created_at, o.id.as_i32()));
        Ok(orders)
    }

    async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, StoreError> {
        let mut inner = self.lock();
        let order = inner
            .orders
            .get_mut(&id.as_i32())
            .ok_or(StoreError::NotFound)?;
        order.status = status;
        Ok(order.clone())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(
        &self,
        name: &str,
        email: &Email,
        password_hash: &str,
        role: Role,
    ) -> Result<User, StoreError> {
        let mut inner = self.lock();

        if inner.email_taken(email) {
            return Err(StoreError::Conflict("email already exists".to_owned()));
        }

        inner.next_user_id += 1;
        let user = User {
            id: UserId::new(inner.next_user_id),
            name: name.to_owned(),
            email: email.clone(),
            role,
        };

        inner
            .users
            .insert(user.id.as_i32(), (user.clone(), password_hash.to_owned()));
        Ok(user)
    }

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.lock().users.get(&id.as_i32()).map(|(u, _)| u.clone()))
    }

    async fn user_with_password(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, StoreError> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|(u, _)| &u.email == email)
            .cloned())
    }

    async fn set_role(&self, id: UserId, role: Role) -> Result<User, StoreError> {
        let mut inner = self.lock();
        let (user, _) = inner
            .users
            .get_mut(&id.as_i32())
            .ok_or(StoreError::NotFound)?;
        user.role = role;
        Ok(user.clone())
    }
}
