//! Order surface: creation, listings, status lifecycle, policy knobs.

#![allow(clippy::unwrap_used)]

use serde_json::json;
use voltline_client::ClientError;
use voltline_client::api::{OrderLine, OrderSubmission};
use voltline_core::{OrderStatus, ProductId};
use voltline_integration_tests::{TestContext, product_form};

fn submission() -> OrderSubmission {
    OrderSubmission {
        products: vec![OrderLine {
            product_id: ProductId::new(1),
            quantity: 2,
        }],
        total_price: rust_decimal::Decimal::new(1998, 0),
        address: "1 Main St, Springfield".to_owned(),
        email: "buyer@voltline.test".to_owned(),
        phone: "+1 (555) 123-4567".to_owned(),
    }
}

#[tokio::test]
async fn guest_order_starts_pending_and_unowned() {
    let ctx = TestContext::new().await;

    let order = ctx.api.submit_order(None, &submission()).await.unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert!(order.user_id.is_none());
    assert_eq!(order.products.len(), 1);
}

#[tokio::test]
async fn authenticated_order_is_stamped_with_owner() {
    let ctx = TestContext::new().await;
    let account = ctx
        .api
        .register("Buyer", "buyer@voltline.test", "hunter22")
        .await
        .unwrap();

    let order = ctx
        .api
        .submit_order(Some(&account.token), &submission())
        .await
        .unwrap();
    assert_eq!(order.user_id, Some(account.user.id));
}

#[tokio::test]
async fn empty_products_rejected_and_nothing_persisted() {
    let ctx = TestContext::new().await;

    let response = ctx
        .http
        .post(ctx.url("/orders"))
        .json(&json!({
            "products": [],
            "totalPrice": 0,
            "address": "1 Main St",
            "email": "buyer@voltline.test",
            "phone": "5551234567",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let token = ctx.admin_token().await;
    assert!(ctx.api.all_orders(&token).await.unwrap().is_empty());
}

#[tokio::test]
async fn non_numeric_total_price_rejected_with_field_detail() {
    let ctx = TestContext::new().await;

    let response = ctx
        .http
        .post(ctx.url("/orders"))
        .json(&json!({
            "products": [{"productId": 1, "quantity": 1}],
            "totalPrice": "not a number",
            "address": "1 Main St",
            "email": "buyer@voltline.test",
            "phone": "5551234567",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["errors"][0]["field"], "totalPrice");
}

#[tokio::test]
async fn malformed_bearer_token_is_rejected_not_treated_as_guest() {
    let ctx = TestContext::new().await;

    let err = ctx
        .api
        .submit_order(Some("garbage-token"), &submission())
        .await
        .unwrap_err();
    let ClientError::Api { status, .. } = err else {
        panic!("expected api error");
    };
    assert_eq!(status, 401);
}

#[tokio::test]
async fn listings_split_own_and_all() {
    let ctx = TestContext::new().await;
    let account = ctx
        .api
        .register("Buyer", "buyer@voltline.test", "hunter22")
        .await
        .unwrap();

    ctx.api
        .submit_order(Some(&account.token), &submission())
        .await
        .unwrap();
    ctx.api.submit_order(None, &submission()).await.unwrap();

    let mine = ctx.api.my_orders(&account.token).await.unwrap();
    assert_eq!(mine.len(), 1);

    let admin_token = ctx.admin_token().await;
    let all = ctx.api.all_orders(&admin_token).await.unwrap();
    assert_eq!(all.len(), 2);

    // the shopper's token does not open the admin listing
    let err = ctx.api.all_orders(&account.token).await.unwrap_err();
    let ClientError::Api { status, .. } = err else {
        panic!("expected api error");
    };
    assert_eq!(status, 403);

    // and no token at all is unauthorized
    let response = ctx.http.get(ctx.url("/orders")).send().await.unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn status_update_is_visible_to_the_owner() {
    let ctx = TestContext::new().await;
    let account = ctx
        .api
        .register("Buyer", "buyer@voltline.test", "hunter22")
        .await
        .unwrap();
    let order = ctx
        .api
        .submit_order(Some(&account.token), &submission())
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Pending);

    let admin_token = ctx.admin_token().await;
    let updated = ctx
        .api
        .update_order_status(&admin_token, order.id, "shipped")
        .await
        .unwrap();
    assert_eq!(updated.status, OrderStatus::Shipped);

    let mine = ctx.api.my_orders(&account.token).await.unwrap();
    assert_eq!(mine.first().unwrap().status, OrderStatus::Shipped);
}

#[tokio::test]
async fn unknown_status_and_unknown_order() {
    let ctx = TestContext::new().await;
    let admin_token = ctx.admin_token().await;
    let order = ctx.api.submit_order(None, &submission()).await.unwrap();

    let err = ctx
        .api
        .update_order_status(&admin_token, order.id, "cancelled")
        .await
        .unwrap_err();
    let ClientError::Api { status, .. } = err else {
        panic!("expected api error");
    };
    assert_eq!(status, 400);

    let err = ctx
        .api
        .update_order_status(&admin_token, voltline_core::OrderId::new(9999), "shipped")
        .await
        .unwrap_err();
    let ClientError::Api { status, .. } = err else {
        panic!("expected api error");
    };
    assert_eq!(status, 404);
}

#[tokio::test]
async fn status_can_regress_by_default() {
    let ctx = TestContext::new().await;
    let admin_token = ctx.admin_token().await;
    let order = ctx.api.submit_order(None, &submission()).await.unwrap();

    ctx.api
        .update_order_status(&admin_token, order.id, "delivered")
        .await
        .unwrap();
    let back = ctx
        .api
        .update_order_status(&admin_token, order.id, "pending")
        .await
        .unwrap();
    assert_eq!(back.status, OrderStatus::Pending);
}

#[tokio::test]
async fn forward_only_policy_blocks_regression() {
    let policy = voltline_api::config::OrderPolicy {
        enforce_status_flow: true,
        ..Default::default()
    };
    let ctx = TestContext::with_policy(policy).await;
    let admin_token = ctx.admin_token().await;
    let order = ctx.api.submit_order(None, &submission()).await.unwrap();

    ctx.api
        .update_order_status(&admin_token, order.id, "delivered")
        .await
        .unwrap();
    let err = ctx
        .api
        .update_order_status(&admin_token, order.id, "pending")
        .await
        .unwrap_err();
    let ClientError::Api { status, .. } = err else {
        panic!("expected api error");
    };
    assert_eq!(status, 400);
}

#[tokio::test]
async fn stock_decrement_policy_reserves_and_rejects() {
    let policy = voltline_api::config::OrderPolicy {
        decrement_stock: true,
        ..Default::default()
    };
    let ctx = TestContext::with_policy(policy).await;
    let admin_token = ctx.admin_token().await;

    // stock of 5 from the standard form
    let product = ctx
        .api
        .create_product(&admin_token, product_form("Limited Run"))
        .await
        .unwrap();

    let order = OrderSubmission {
        products: vec![OrderLine {
            product_id: product.id,
            quantity: 3,
        }],
        ..submission()
    };
    ctx.api.submit_order(None, &order).await.unwrap();

    let remaining = ctx.api.product_by_slug("limited-run").await.unwrap().stock;
    assert_eq!(remaining, 2);

    let err = ctx.api.submit_order(None, &order).await.unwrap_err();
    let ClientError::Api { status, .. } = err else {
        panic!("expected api error");
    };
    assert_eq!(status, 400);
}
