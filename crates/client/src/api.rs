//! Typed HTTP client for the Voltline REST API.
//!
//! The DTOs here mirror the API's wire contract (camelCase JSON); they are
//! what the rest of the client library trades in.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use voltline_core::{Category, Email, OrderId, OrderStatus, Phone, ProductId, Role, UserId};

use crate::error::{ClientError, FieldError};

/// A catalog product as served by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub category: Category,
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_price: Option<Decimal>,
    pub rating: Decimal,
    pub stock: i32,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub description: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// One order line on the wire.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// An order as served by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    pub products: Vec<OrderLine>,
    pub total_price: Decimal,
    pub status: OrderStatus,
    pub address: String,
    pub email: Email,
    pub phone: Phone,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A user account as served by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: Role,
}

/// Login/registration response: the user plus a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

/// Checkout submission body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSubmission {
    pub products: Vec<OrderLine>,
    pub total_price: Decimal,
    pub address: String,
    pub email: String,
    pub phone: String,
}

/// Product create/update form data for the admin console.
///
/// All fields optional: create requires what the server requires, update
/// sends only what changed.
#[derive(Debug, Clone, Default)]
pub struct ProductFormData {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<String>,
    pub old_price: Option<String>,
    pub stock: Option<String>,
    pub tag: Option<String>,
    pub description: Option<String>,
    /// Image attachment as (filename, bytes).
    pub image: Option<(String, Vec<u8>)>,
}

impl ProductFormData {
    fn into_multipart(self) -> reqwest::multipart::Form {
        let mut form = reqwest::multipart::Form::new();
        for (key, value) in [
            ("name", self.name),
            ("category", self.category),
            ("price", self.price),
            ("oldPrice", self.old_price),
            ("stock", self.stock),
            ("tag", self.tag),
            ("description", self.description),
        ] {
            if let Some(value) = value {
                form = form.text(key, value);
            }
        }
        if let Some((filename, bytes)) = self.image {
            form = form.part(
                "image",
                reqwest::multipart::Part::bytes(bytes).file_name(filename),
            );
        }
        form
    }
}

/// Typed client for the REST API.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client against a base URL (no trailing slash).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    // =========================================================================
    // Catalog (public)
    // =========================================================================

    /// Fetch the whole catalog.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Http` on transport failure and
    /// `ClientError::Api` on an error status.
    pub async fn list_products(&self) -> Result<Vec<Product>, ClientError> {
        into_result(self.http.get(self.url("/products")).send().await?).await
    }

    /// Fetch one product by slug.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 404 if the slug is unknown.
    pub async fn product_by_slug(&self, slug: &str) -> Result<Product, ClientError> {
        into_result(
            self.http
                .get(self.url(&format!("/products/{slug}")))
                .send()
                .await?,
        )
        .await
    }

    /// Fetch the products in one category.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` on an error status.
    pub async fn products_by_category(
        &self,
        category: Category,
    ) -> Result<Vec<Product>, ClientError> {
        into_result(
            self.http
                .get(self.url(&format!("/products/categories/{category}")))
                .send()
                .await?,
        )
        .await
    }

    /// Substring search over the catalog.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` on an error status.
    pub async fn search(&self, query: &str) -> Result<Vec<Product>, ClientError> {
        into_result(
            self.http
                .get(self.url("/search"))
                .query(&[("q", query)])
                .send()
                .await?,
        )
        .await
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Register a user account.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with field detail for invalid input.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ClientError> {
        into_result(
            self.http
                .post(self.url("/auth/register"))
                .json(&serde_json::json!({
                    "name": name,
                    "email": email,
                    "password": password,
                }))
                .send()
                .await?,
        )
        .await
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 401 for bad credentials.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        into_result(
            self.http
                .post(self.url("/auth/login"))
                .json(&serde_json::json!({ "email": email, "password": password }))
                .send()
                .await?,
        )
        .await
    }

    /// Register an admin account. Admin only.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 403 for non-admin callers.
    pub async fn register_admin(
        &self,
        token: &str,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ClientError> {
        into_result(
            self.http
                .post(self.url("/auth/admin/register"))
                .bearer_auth(token)
                .json(&serde_json::json!({
                    "name": name,
                    "email": email,
                    "password": password,
                }))
                .send()
                .await?,
        )
        .await
    }

    /// Set a user's role. Admin only.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` on an error status.
    pub async fn toggle_role(
        &self,
        token: &str,
        user_id: UserId,
        role: Role,
    ) -> Result<User, ClientError> {
        into_result(
            self.http
                .put(self.url("/auth/toggle-role"))
                .bearer_auth(token)
                .json(&serde_json::json!({ "userId": user_id, "role": role }))
                .send()
                .await?,
        )
        .await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Submit an order, optionally authenticated.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with field detail for invalid input.
    pub async fn submit_order(
        &self,
        token: Option<&str>,
        submission: &OrderSubmission,
    ) -> Result<Order, ClientError> {
        let mut request = self.http.post(self.url("/orders")).json(submission);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        into_result(request.send().await?).await
    }

    /// Fetch the calling user's orders.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 401 without a valid token.
    pub async fn my_orders(&self, token: &str) -> Result<Vec<Order>, ClientError> {
        into_result(
            self.http
                .get(self.url("/orders"))
                .bearer_auth(token)
                .send()
                .await?,
        )
        .await
    }

    /// Fetch every order. Admin only.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 403 for non-admin callers.
    pub async fn all_orders(&self, token: &str) -> Result<Vec<Order>, ClientError> {
        into_result(
            self.http
                .get(self.url("/orders/all"))
                .bearer_auth(token)
                .send()
                .await?,
        )
        .await
    }

    /// Overwrite an order's status. Admin only.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` on an error status.
    pub async fn update_order_status(
        &self,
        token: &str,
        order_id: OrderId,
        status: &str,
    ) -> Result<Order, ClientError> {
        into_result(
            self.http
                .put(self.url(&format!("/orders/{order_id}")))
                .bearer_auth(token)
                .json(&serde_json::json!({ "status": status }))
                .send()
                .await?,
        )
        .await
    }

    // =========================================================================
    // Admin catalog
    // =========================================================================

    /// Create a product (multipart). Admin only.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with field detail for invalid input.
    pub async fn create_product(
        &self,
        token: &str,
        form: ProductFormData,
    ) -> Result<Product, ClientError> {
        into_result(
            self.http
                .post(self.url("/products"))
                .bearer_auth(token)
                .multipart(form.into_multipart())
                .send()
                .await?,
        )
        .await
    }

    /// Update a product (multipart). Admin only.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 404 for an unknown id.
    pub async fn update_product(
        &self,
        token: &str,
        id: ProductId,
        form: ProductFormData,
    ) -> Result<Product, ClientError> {
        into_result(
            self.http
                .put(self.url(&format!("/products/{id}")))
                .bearer_auth(token)
                .multipart(form.into_multipart())
                .send()
                .await?,
        )
        .await
    }

    /// Delete a product. Admin only.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 404 for an unknown id.
    pub async fn delete_product(&self, token: &str, id: ProductId) -> Result<(), ClientError> {
        let _: serde_json::Value = into_result(
            self.http
                .delete(self.url(&format!("/products/{id}")))
                .bearer_auth(token)
                .send()
                .await?,
        )
        .await?;
        Ok(())
    }
}

/// Error body shape shared by all API error responses.
#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    #[serde(default)]
    errors: Vec<FieldError>,
}

/// Turn a response into a typed value or a `ClientError::Api`.
async fn into_result<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let text = response.text().await.unwrap_or_default();
    let body: Option<ErrorBody> = serde_json::from_str(&text).ok();
    let (message, errors) = body.map_or_else(
        || (text.clone(), Vec::new()),
        |b| (b.message.unwrap_or_else(|| text.clone()), b.errors),
    );

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
        errors,
    })
}
