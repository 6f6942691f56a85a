//! Order domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use voltline_core::{Email, OrderId, OrderStatus, Phone, ProductId, UserId};

/// One line of an order: a product reference and a quantity.
///
/// The product id is not checked for existence at write time; the order
/// keeps whatever snapshot of the catalog the client checked out against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    /// Referenced product.
    pub product_id: ProductId,
    /// Units ordered.
    pub quantity: i32,
}

/// A customer order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Owning user, absent for guest checkouts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    /// Ordered sequence of product lines.
    pub products: Vec<OrderLine>,
    /// Total as computed by the client at checkout.
    pub total_price: Decimal,
    /// Fulfillment status; new orders start as `pending`.
    pub status: OrderStatus,
    /// Shipping address.
    pub address: String,
    /// Contact email.
    pub email: Email,
    /// Contact phone.
    pub phone: Phone,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
}

/// Fields required to create an order.
///
/// Produced by the order service after validation; status is always
/// `pending` for new orders, so it is not carried here.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: Option<UserId>,
    pub products: Vec<OrderLine>,
    pub total_price: Decimal,
    pub address: String,
    pub email: Email,
    pub phone: Phone,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_serializes_camel_case() {
        let order = Order {
            id: OrderId::new(1),
            user_id: None,
            products: vec![OrderLine {
                product_id: ProductId::new(2),
                quantity: 3,
            }],
            total_price: Decimal::new(2997, 0),
            status: OrderStatus::Pending,
            address: "1 Main St".to_owned(),
            email: Email::parse("buyer@example.com").unwrap(),
            phone: Phone::parse("5551234567").unwrap(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["products"][0]["productId"], 2);
        assert!(json.get("totalPrice").is_some());
        assert!(json.get("userId").is_none());
    }
}
