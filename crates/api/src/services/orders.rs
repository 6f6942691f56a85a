//! Order service: creation, listing, and the status lifecycle.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use voltline_core::{Email, OrderId, OrderStatus, Phone};

use crate::config::OrderPolicy;
use crate::error::FieldError;
use crate::models::{NewOrder, Order, OrderLine};
use crate::services::auth::{AuthContext, AuthError};
use crate::store::{Store, StoreError};

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Malformed or missing fields.
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    /// Referenced order does not exist.
    #[error("order not found")]
    NotFound,

    /// Caller lacks the required capability.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Checkout submission as it arrives from the client.
///
/// `total_price` stays a raw JSON value so a non-numeric submission
/// surfaces as a field-level validation error rather than a body-decode
/// failure.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    #[serde(default)]
    pub products: Vec<OrderLine>,
    #[serde(default)]
    pub total_price: serde_json::Value,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

/// Order service.
pub struct OrderService {
    store: Arc<dyn Store>,
    policy: OrderPolicy,
}

impl OrderService {
    /// Create a new order service.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, policy: OrderPolicy) -> Self {
        Self { store, policy }
    }

    /// Create an order from a checkout submission.
    ///
    /// Guests may order; an authenticated context stamps the order's
    /// owner. With the stock-decrement policy enabled, each line reduces
    /// stock and over-stock orders are rejected before anything is
    /// written.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Validation` for an empty products sequence,
    /// non-numeric total, or malformed address/email/phone.
    pub async fn create(
        &self,
        ctx: Option<&AuthContext>,
        req: OrderRequest,
    ) -> Result<Order, OrderError> {
        let mut errors = Vec::new();

        if req.products.is_empty() {
            errors.push(FieldError::new("products", "products must not be empty"));
        }
        for line in &req.products {
            if line.quantity < 1 {
                errors.push(FieldError::new(
                    "products",
                    format!("quantity for product {} must be at least 1", line.product_id),
                ));
            }
        }

        let total_price = match parse_total(&req.total_price) {
            Some(total) => Some(total),
            None => {
                errors.push(FieldError::new("totalPrice", "totalPrice must be numeric"));
                None
            }
        };

        if req.address.trim().is_empty() {
            errors.push(FieldError::new("address", "address is required"));
        }
        let email = match Email::parse(&req.email) {
            Ok(email) => Some(email),
            Err(e) => {
                errors.push(FieldError::new("email", e.to_string()));
                None
            }
        };
        let phone = match Phone::parse(&req.phone) {
            Ok(phone) => Some(phone),
            Err(e) => {
                errors.push(FieldError::new("phone", e.to_string()));
                None
            }
        };

        let (Some(total_price), Some(email), Some(phone), true) =
            (total_price, email, phone, errors.is_empty())
        else {
            return Err(OrderError::Validation(errors));
        };

        if self.policy.decrement_stock {
            self.reserve_stock(&req.products).await?;
        }

        let order = self
            .store
            .insert_order(NewOrder {
                user_id: ctx.map(|c| c.user_id),
                products: req.products,
                total_price,
                address: req.address.trim().to_owned(),
                email,
                phone,
            })
            .await?;

        tracing::info!(order_id = %order.id, lines = order.products.len(), "order placed");
        Ok(order)
    }

    /// List the calling user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Store` if the query fails.
    pub async fn list_for_user(&self, ctx: &AuthContext) -> Result<Vec<Order>, OrderError> {
        Ok(self.store.list_orders_for_user(ctx.user_id).await?)
    }

    /// List every order, newest first. Admin only.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Auth` for non-admin callers.
    pub async fn list_all(&self, ctx: &AuthContext) -> Result<Vec<Order>, OrderError> {
        ctx.require_admin().map_err(OrderError::Auth)?;
        Ok(self.store.list_orders().await?)
    }

    /// Overwrite an order's status. Admin only.
    ///
    /// The status value is parsed here so an unknown value is a
    /// validation error, not a decode failure. With the forward-only
    /// policy enabled, transitions may not regress.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Auth` for non-admin callers,
    /// `OrderError::Validation` for an unknown or regressing status, and
    /// `OrderError::NotFound` if the order is absent.
    pub async fn update_status(
        &self,
        ctx: &AuthContext,
        id: OrderId,
        status: &str,
    ) -> Result<Order, OrderError> {
        ctx.require_admin().map_err(OrderError::Auth)?;

        let status: OrderStatus = status.parse().map_err(|_| {
            OrderError::Validation(vec![FieldError::new(
                "status",
                "status must be one of \"pending\", \"shipped\", \"delivered\"",
            )])
        })?;

        if self.policy.enforce_status_flow {
            let current = self
                .store
                .order_by_id(id)
                .await?
                .ok_or(OrderError::NotFound)?;
            if status.rank() < current.status.rank() {
                return Err(OrderError::Validation(vec![FieldError::new(
                    "status",
                    format!("status cannot move back from {} to {status}", current.status),
                )]));
            }
        }

        let order = self
            .store
            .update_order_status(id, status)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => OrderError::NotFound,
                other => OrderError::Store(other),
            })?;

        tracing::info!(order_id = %order.id, status = %order.status, "order status updated");
        Ok(order)
    }

    /// Decrement stock for every line, failing the whole order if any
    /// product has too few units.
    async fn reserve_stock(&self, lines: &[OrderLine]) -> Result<(), OrderError> {
        for line in lines {
            let ok = match self.store.decrement_stock(line.product_id, line.quantity).await {
                Ok(ok) => ok,
                // Orders reference products without existence enforcement,
                // so a vanished product fails like an out-of-stock one
                Err(StoreError::NotFound) => false,
                Err(other) => return Err(OrderError::Store(other)),
            };
            if !ok {
                return Err(OrderError::Validation(vec![FieldError::new(
                    "products",
                    format!("insufficient stock for product {}", line.product_id),
                )]));
            }
        }
        Ok(())
    }
}

/// Accept a JSON number or a numeric string as the order total.
fn parse_total(value: &serde_json::Value) -> Option<Decimal> {
    let total = match value {
        serde_json::Value::Number(n) => n.to_string().parse::<Decimal>().ok()?,
        serde_json::Value::String(s) => s.parse::<Decimal>().ok()?,
        _ => return None,
    };
    (total >= Decimal::ZERO).then_some(total)
}
