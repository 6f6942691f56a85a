//! The admin console.
//!
//! Thin typed wrappers over the API's administrative surface: product
//! CRUD, order management, and user role toggling. No business rules live
//! here; the services behind the API enforce everything.

use voltline_core::{OrderId, ProductId, Role, UserId};

use crate::api::{ApiClient, Order, Product, ProductFormData, User};
use crate::error::ClientError;
use crate::session::AuthSession;

/// The admin back-office, bound to a signed-in admin session's token.
pub struct AdminConsole {
    api: ApiClient,
    token: String,
}

impl AdminConsole {
    /// Open the console for the current session.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` if the session is not signed in
    /// as an admin; the API would reject every call anyway, this just
    /// fails fast at the view boundary.
    pub fn open(api: ApiClient, session: &AuthSession) -> Result<Self, ClientError> {
        let token = match (session.is_admin(), session.token()) {
            (true, Some(token)) => token.to_owned(),
            _ => {
                return Err(ClientError::Validation(vec![crate::error::FieldError::new(
                    "session",
                    "admin access required",
                )]));
            }
        };
        Ok(Self { api, token })
    }

    /// List the full catalog.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` on an error status.
    pub async fn products(&self) -> Result<Vec<Product>, ClientError> {
        self.api.list_products().await
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with field detail for invalid input.
    pub async fn create_product(&self, form: ProductFormData) -> Result<Product, ClientError> {
        self.api.create_product(&self.token, form).await
    }

    /// Update a product.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 404 for an unknown id.
    pub async fn update_product(
        &self,
        id: ProductId,
        form: ProductFormData,
    ) -> Result<Product, ClientError> {
        self.api.update_product(&self.token, id, form).await
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 404 for an unknown id.
    pub async fn delete_product(&self, id: ProductId) -> Result<(), ClientError> {
        self.api.delete_product(&self.token, id).await
    }

    /// List every order.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` on an error status.
    pub async fn orders(&self) -> Result<Vec<Order>, ClientError> {
        self.api.all_orders(&self.token).await
    }

    /// Overwrite an order's status.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with field detail for an unknown status.
    pub async fn set_order_status(
        &self,
        order_id: OrderId,
        status: &str,
    ) -> Result<Order, ClientError> {
        self.api
            .update_order_status(&self.token, order_id, status)
            .await
    }

    /// Set a user's role.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` on an error status.
    pub async fn toggle_role(&self, user_id: UserId, role: Role) -> Result<User, ClientError> {
        self.api.toggle_role(&self.token, user_id, role).await
    }

    /// Register another admin account.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with field detail for invalid input.
    pub async fn register_admin(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, ClientError> {
        let response = self
            .api
            .register_admin(&self.token, name, email, password)
            .await?;
        Ok(response.user)
    }
}
