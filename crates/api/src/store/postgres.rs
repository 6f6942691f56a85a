//! `PostgreSQL` store backend.
//!
//! Queries are runtime-checked (`query_as` + `FromRow`): the store is an
//! external collaborator, so the crate must build without a live database.
//! Order lines live in a child table written in the same transaction as
//! the order row; everything else is one document per row.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use voltline_core::{
    Category, Email, OrderId, OrderStatus, Phone, ProductId, ProductTag, Role, Slug, UserId,
};

use super::{OrderStore, ProductStore, StoreError, UserStore};
use crate::models::{NewOrder, NewProduct, Order, OrderLine, Product, ProductPatch, User};

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Embedded migrations, run explicitly via the CLI (`vl-cli migrate`).
#[must_use]
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// `PostgreSQL`-backed document store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a store over an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn lines_for_orders(
        &self,
        order_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<OrderLine>>, StoreError> {
        let rows = sqlx::query_as::<_, OrderLineRow>(
            r"
            SELECT order_id, product_id, quantity
            FROM order_lines
            WHERE order_id = ANY($1)
            ORDER BY order_id, position
            ",
        )
        .bind(order_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<i32, Vec<OrderLine>> = HashMap::new();
        for row in rows {
            grouped.entry(row.order_id).or_default().push(OrderLine {
                product_id: row.product_id,
                quantity: row.quantity,
            });
        }
        Ok(grouped)
    }

    async fn order_with_lines(&self, row: OrderRow) -> Result<Order, StoreError> {
        let mut lines = self.lines_for_orders(&[row.id.as_i32()]).await?;
        let products = lines.remove(&row.id.as_i32()).unwrap_or_default();
        Ok(row.into_order(products))
    }

    async fn orders_with_lines(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>, StoreError> {
        let ids: Vec<i32> = rows.iter().map(|r| r.id.as_i32()).collect();
        let mut lines = self.lines_for_orders(&ids).await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let products = lines.remove(&row.id.as_i32()).unwrap_or_default();
                row.into_order(products)
            })
            .collect())
    }
}

/// Map a unique-index violation to `Conflict`, everything else to `Database`.
fn conflict_on_unique(e: sqlx::Error, what: &str) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return StoreError::Conflict(format!("{what} already exists"));
    }
    StoreError::Database(e)
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    slug: Slug,
    category: Category,
    price: Decimal,
    old_price: Option<Decimal>,
    rating: Decimal,
    stock: i32,
    image: String,
    tag: Option<ProductTag>,
    description: String,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
            category: row.category,
            price: row.price,
            old_price: row.old_price,
            rating: row.rating,
            stock: row.stock,
            image: row.image,
            tag: row.tag,
            description: row.description,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: Option<UserId>,
    total_price: Decimal,
    status: OrderStatus,
    address: String,
    email: Email,
    phone: Phone,
    created_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, products: Vec<OrderLine>) -> Order {
        Order {
            id: self.id,
            user_id: self.user_id,
            products,
            total_price: self.total_price,
            status: self.status,
            address: self.address,
            email: self.email,
            phone: self.phone,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OrderLineRow {
    order_id: i32,
    product_id: ProductId,
    quantity: i32,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    name: String,
    email: Email,
    role: Role,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            role: row.role,
        }
    }
}

#[derive(sqlx::FromRow)]
struct UserWithPasswordRow {
    id: UserId,
    name: String,
    email: Email,
    role: Role,
    password_hash: String,
}

#[async_trait]
impl ProductStore for PgStore {
    async fn insert_product(&self, new: NewProduct) -> Result<Product, StoreError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            INSERT INTO products (name, slug, category, price, old_price, rating, stock, image, tag, description)
            VALUES ($1, $2, $3, $4, $5, 0, $6, $7, $8, $9)
            RETURNING id, name, slug, category, price, old_price, rating, stock, image, tag, description, created_at
            ",
        )
        .bind(&new.name)
        .bind(&new.slug)
        .bind(new.category)
        .bind(new.price)
        .bind(new.old_price)
        .bind(new.stock)
        .bind(&new.image)
        .bind(new.tag)
        .bind(&new.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "slug"))?;

        Ok(row.into())
    }

    async fn update_product(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Product, StoreError> {
        // Read-modify-write: concurrent updates resolve last-writer-wins,
        // which is the store's documented semantics.
        let current = self
            .product_by_id(id)
            .await?
            .ok_or(StoreError::NotFound)?;

        let name = patch.name.unwrap_or(current.name);
        let slug = patch.slug.unwrap_or(current.slug);
        let category = patch.category.unwrap_or(current.category);
        let price = patch.price.unwrap_or(current.price);
        let old_price = patch.old_price.unwrap_or(current.old_price);
        let stock = patch.stock.unwrap_or(current.stock);
        let image = patch.image.unwrap_or(current.image);
        let tag = patch.tag.unwrap_or(current.tag);
        let description = patch.description.unwrap_or(current.description);

        let row = sqlx::query_as::<_, ProductRow>(
            r"
            UPDATE products
            SET name = $2, slug = $3, category = $4, price = $5, old_price = $6,
                stock = $7, image = $8, tag = $9, description = $10
            WHERE id = $1
            RETURNING id, name, slug, category, price, old_price, rating, stock, image, tag, description, created_at
            ",
        )
        .bind(id)
        .bind(&name)
        .bind(&slug)
        .bind(category)
        .bind(price)
        .bind(old_price)
        .bind(stock)
        .bind(&image)
        .bind(tag)
        .bind(&description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "slug"))?
        .ok_or(StoreError::NotFound)?;

        Ok(row.into())
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn product_by_slug(&self, slug: &str) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, slug, category, price, old_price, rating, stock, image, tag, description, created_at
            FROM products
            WHERE slug = $1
            ",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn product_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, slug, category, price, old_price, rating, stock, image, tag, description, created_at
            FROM products
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, slug, category, price, old_price, rating, stock, image, tag, description, created_at
            FROM products
            ORDER BY created_at DESC, id DESC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_products_by_category(
        &self,
        category: Category,
    ) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, slug, category, price, old_price, rating, stock, image, tag, description, created_at
            FROM products
            WHERE category = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn search_products(&self, query: &str) -> Result<Vec<Product>, StoreError> {
        // ILIKE special characters in user input are escaped so a query
        // like "100%" matches literally.
        let escaped = query
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");

        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, slug, category, price, old_price, rating, stock, image, tag, description, created_at
            FROM products
            WHERE name ILIKE '%' || $1 || '%' OR description ILIKE '%' || $1 || '%'
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(escaped)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn decrement_stock(&self, id: ProductId, quantity: i32) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r"
            UPDATE products
            SET stock = stock - $2
            WHERE id = $1 AND stock >= $2
            ",
        )
        .bind(id)
        .bind(quantity)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }

        // Distinguish "missing" from "insufficient stock"
        match self.product_by_id(id).await? {
            Some(_) => Ok(false),
            None => Err(StoreError::NotFound),
        }
    }
}

#[async_trait]
impl OrderStore for PgStore {
    async fn insert_order(&self, new: NewOrder) -> Result<Order, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, OrderRow>(
            r"
            INSERT INTO orders (user_id, total_price, status, address, email, phone)
            VALUES ($1, $2, 'pending', $3, $4, $5)
            RETURNING id, user_id, total_price, status, address, email, phone, created_at
            ",
        )
        .bind(new.user_id)
        .bind(new.total_price)
        .bind(&new.address)
        .bind(&new.email)
        .bind(&new.phone)
        .fetch_one(&mut *tx)
        .await?;

        for (position, line) in new.products.iter().enumerate() {
            sqlx::query(
                r"
                INSERT INTO order_lines (order_id, position, product_id, quantity)
                VALUES ($1, $2, $3, $4)
                ",
            )
            .bind(row.id)
            .bind(i32::try_from(position).unwrap_or(i32::MAX))
            .bind(line.product_id)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(row.into_order(new.products))
    }

    async fn order_by_id(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, total_price, status, address, email, phone, created_at
            FROM orders
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.order_with_lines(row).await?)),
            None => Ok(None),
        }
    }

    async fn list_orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, total_price, status, address, email, phone, created_at
            FROM orders
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        self.orders_with_lines(rows).await
    }

    async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, total_price, status, address, email, phone, created_at
            FROM orders
            ORDER BY created_at DESC, id DESC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        self.orders_with_lines(rows).await
    }

    async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, StoreError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            UPDATE orders
            SET status = $2
            WHERE id = $1
            RETURNING id, user_id, total_price, status, address, email, phone, created_at
            ",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;

        self.order_with_lines(row).await
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(
        &self,
        name: &str,
        email: &Email,
        password_hash: &str,
        role: Role,
    ) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO users (name, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, role
            ",
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "email"))?;

        Ok(row.into())
    }

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, name, email, role
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn user_with_password(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, StoreError> {
        let row = sqlx::query_as::<_, UserWithPasswordRow>(
            r"
            SELECT id, name, email, role, password_hash
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| {
            (
                User {
                    id: r.id,
                    name: r.name,
                    email: r.email,
                    role: r.role,
                },
                r.password_hash,
            )
        }))
    }

    async fn set_role(&self, id: UserId, role: Role) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            UPDATE users
            SET role = $2
            WHERE id = $1
            RETURNING id, name, email, role
            ",
        )
        .bind(id)
        .bind(role)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;

        Ok(row.into())
    }
}
