//! The checkout flow.
//!
//! Minimal client-side validation (presence, email shape) blocks
//! submission with inline field errors; a successful submission clears the
//! cart and yields a confirmation carrying the new order id; a failed one
//! leaves the cart intact. There is no retry policy and no cancellation of
//! an in-flight submission.

use voltline_core::{Email, OrderId};

use crate::api::{ApiClient, OrderLine, OrderSubmission};
use crate::cart::Cart;
use crate::error::{ClientError, FieldError};
use crate::session::AuthSession;

/// User-entered checkout fields.
#[derive(Debug, Clone, Default)]
pub struct CheckoutForm {
    pub address: String,
    pub email: String,
    pub phone: String,
}

impl CheckoutForm {
    /// Client-side validation: presence of every field, email shape.
    ///
    /// The server remains the authority; this only catches what the form
    /// can fix before a round trip.
    #[must_use]
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.address.trim().is_empty() {
            errors.push(FieldError::new("address", "address is required"));
        }
        if Email::parse(&self.email).is_err() {
            errors.push(FieldError::new("email", "enter a valid email address"));
        }
        if self.phone.trim().is_empty() {
            errors.push(FieldError::new("phone", "phone is required"));
        }
        errors
    }
}

/// The order-confirmation view state after a successful checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutConfirmation {
    /// The id of the newly placed order.
    pub order_id: OrderId,
}

/// Submit the current cart as an order.
///
/// The session's token, when present, makes it an authenticated order;
/// otherwise it is a guest checkout. On success the cart is cleared; on
/// any failure it is left intact for the user to retry manually.
///
/// # Errors
///
/// Returns `ClientError::Validation` if the cart is empty or the form
/// fails client-side checks (no request is sent), and `ClientError::Api`
/// or `ClientError::Http` when the submission itself fails.
pub async fn submit(
    api: &ApiClient,
    session: &AuthSession,
    cart: &mut Cart,
    form: &CheckoutForm,
) -> Result<CheckoutConfirmation, ClientError> {
    let mut errors = form.validate();
    if cart.is_empty() {
        errors.push(FieldError::new("products", "your cart is empty"));
    }
    if !errors.is_empty() {
        return Err(ClientError::Validation(errors));
    }

    let submission = OrderSubmission {
        products: cart
            .items()
            .iter()
            .map(|item| OrderLine {
                product_id: item.product_id,
                quantity: item.quantity,
            })
            .collect(),
        total_price: cart.total_price(),
        address: form.address.trim().to_owned(),
        email: form.email.clone(),
        phone: form.phone.clone(),
    };

    let order = api.submit_order(session.token(), &submission).await?;

    cart.clear()?;
    tracing::info!(order_id = %order.id, "checkout complete");

    Ok(CheckoutConfirmation { order_id: order.id })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_collects_all_problems() {
        let errors = CheckoutForm::default().validate();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["address", "email", "phone"]);
    }

    #[test]
    fn test_validate_accepts_complete_form() {
        let form = CheckoutForm {
            address: "1 Main St".to_owned(),
            email: "buyer@example.com".to_owned(),
            phone: "5551234567".to_owned(),
        };
        assert!(form.validate().is_empty());
    }

    #[test]
    fn test_validate_rejects_bad_email_shape() {
        let form = CheckoutForm {
            address: "1 Main St".to_owned(),
            email: "not-an-email".to_owned(),
            phone: "5551234567".to_owned(),
        };
        let errors = form.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.first().unwrap().field, "email");
    }
}
