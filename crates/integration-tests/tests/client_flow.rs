//! Browser-flow scenarios driven through the `voltline-client` crate:
//! browse, cart, checkout, and the admin console.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use voltline_client::storage::MemoryStorage;
use voltline_client::{AuthSession, Cart, CheckoutForm, ClientError, checkout};
use voltline_client::admin::AdminConsole;
use voltline_core::OrderStatus;
use voltline_integration_tests::{ADMIN_EMAIL, ADMIN_PASSWORD, TestContext, product_form};

#[tokio::test]
async fn browse_cart_checkout_confirmation() {
    let ctx = TestContext::new().await;
    let admin_token = ctx.admin_token().await;
    ctx.api
        .create_product(&admin_token, product_form("Pixel 9"))
        .await
        .unwrap();
    ctx.api
        .create_product(&admin_token, product_form("Pixel Buds"))
        .await
        .unwrap();

    // browse the catalog, pick a product
    let catalog = ctx.api.list_products().await.unwrap();
    assert_eq!(catalog.len(), 2);
    let pixel = ctx.api.product_by_slug("pixel-9").await.unwrap();

    // a guest session with a locally persisted cart
    let storage = Arc::new(MemoryStorage::new());
    let mut session = AuthSession::new(storage.clone());
    session.initialize().unwrap();

    let mut cart = Cart::load(storage.clone()).unwrap();
    cart.add_item(&pixel, 1).unwrap();
    cart.add_item(&pixel, 1).unwrap();
    assert_eq!(cart.total_quantity(), 2);

    // the cart survives a "reload"
    let mut cart = Cart::load(storage).unwrap();
    assert_eq!(cart.total_quantity(), 2);

    // checkout
    let form = CheckoutForm {
        address: "1 Main St, Springfield".to_owned(),
        email: "buyer@voltline.test".to_owned(),
        phone: "5551234567".to_owned(),
    };
    let confirmation = checkout::submit(&ctx.api, &session, &mut cart, &form)
        .await
        .unwrap();

    // success clears the cart and the order exists, pending
    assert!(cart.is_empty());
    let all = ctx.api.all_orders(&admin_token).await.unwrap();
    assert_eq!(all.len(), 1);
    let placed = all.first().unwrap();
    assert_eq!(placed.id, confirmation.order_id);
    assert_eq!(placed.status, OrderStatus::Pending);
    assert_eq!(placed.total_price, pixel.price * rust_decimal::Decimal::from(2));
}

#[tokio::test]
async fn client_side_validation_blocks_without_a_request() {
    let ctx = TestContext::new().await;
    let admin_token = ctx.admin_token().await;
    let product = ctx
        .api
        .create_product(&admin_token, product_form("Pixel 9"))
        .await
        .unwrap();

    let storage = Arc::new(MemoryStorage::new());
    let mut session = AuthSession::new(storage.clone());
    session.initialize().unwrap();
    let mut cart = Cart::load(storage).unwrap();
    cart.add_item(&product, 1).unwrap();

    // missing contact fields fail client-side
    let err = checkout::submit(&ctx.api, &session, &mut cart, &CheckoutForm::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));

    // cart untouched, nothing persisted
    assert_eq!(cart.total_quantity(), 1);
    assert!(ctx.api.all_orders(&admin_token).await.unwrap().is_empty());
}

#[tokio::test]
async fn server_rejection_leaves_cart_intact() {
    let ctx = TestContext::new().await;
    let admin_token = ctx.admin_token().await;
    let product = ctx
        .api
        .create_product(&admin_token, product_form("Pixel 9"))
        .await
        .unwrap();

    let storage = Arc::new(MemoryStorage::new());
    let mut session = AuthSession::new(storage.clone());
    session.initialize().unwrap();
    let mut cart = Cart::load(storage).unwrap();
    cart.add_item(&product, 1).unwrap();

    // passes the client's presence check but fails the server's phone
    // format validation
    let form = CheckoutForm {
        address: "1 Main St".to_owned(),
        email: "buyer@voltline.test".to_owned(),
        phone: "call me maybe".to_owned(),
    };
    let err = checkout::submit(&ctx.api, &session, &mut cart, &form)
        .await
        .unwrap_err();
    let ClientError::Api { status, .. } = err else {
        panic!("expected api error");
    };
    assert_eq!(status, 400);

    assert_eq!(cart.total_quantity(), 1);
}

#[tokio::test]
async fn authenticated_checkout_shows_up_in_order_history() {
    let ctx = TestContext::new().await;
    let admin_token = ctx.admin_token().await;
    let product = ctx
        .api
        .create_product(&admin_token, product_form("Pixel 9"))
        .await
        .unwrap();

    let storage = Arc::new(MemoryStorage::new());
    let mut session = AuthSession::new(storage.clone());
    session.initialize().unwrap();
    session
        .register(&ctx.api, "Buyer", "buyer@voltline.test", "hunter22")
        .await
        .unwrap();
    assert!(session.is_authenticated());

    let mut cart = Cart::load(storage.clone()).unwrap();
    cart.add_item(&product, 3).unwrap();

    let form = CheckoutForm {
        address: "1 Main St".to_owned(),
        email: "buyer@voltline.test".to_owned(),
        phone: "5551234567".to_owned(),
    };
    checkout::submit(&ctx.api, &session, &mut cart, &form)
        .await
        .unwrap();

    let token = session.token().unwrap().to_owned();
    let mine = ctx.api.my_orders(&token).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine.first().unwrap().products.first().unwrap().quantity, 3);

    // the persisted session survives a "reload" too
    let mut restored = AuthSession::new(storage);
    restored.initialize().unwrap();
    assert!(restored.is_authenticated());
}

#[tokio::test]
async fn admin_console_manages_catalog_orders_and_roles() {
    let ctx = TestContext::new().await;

    // sign in as the seeded admin through the session object
    let storage = Arc::new(MemoryStorage::new());
    let mut session = AuthSession::new(storage);
    session.initialize().unwrap();
    session
        .login(&ctx.api, ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .unwrap();
    assert!(session.is_admin());

    let console = AdminConsole::open(ctx.api.clone(), &session).unwrap();

    // product management
    let product = console.create_product(product_form("Pixel 9")).await.unwrap();
    let listed = console.products().await.unwrap();
    assert_eq!(listed.len(), 1);

    // a customer places an order
    let buyer = ctx
        .api
        .register("Buyer", "buyer@voltline.test", "hunter22")
        .await
        .unwrap();
    let order = ctx
        .api
        .submit_order(
            Some(&buyer.token),
            &voltline_client::api::OrderSubmission {
                products: vec![voltline_client::api::OrderLine {
                    product_id: product.id,
                    quantity: 1,
                }],
                total_price: product.price,
                address: "1 Main St".to_owned(),
                email: "buyer@voltline.test".to_owned(),
                phone: "5551234567".to_owned(),
            },
        )
        .await
        .unwrap();

    // order management
    let shipped = console.set_order_status(order.id, "shipped").await.unwrap();
    assert_eq!(shipped.status, OrderStatus::Shipped);

    // role management
    let promoted = console
        .toggle_role(buyer.user.id, voltline_core::Role::Admin)
        .await
        .unwrap();
    assert_eq!(promoted.role, voltline_core::Role::Admin);

    // catalog cleanup
    console.delete_product(product.id).await.unwrap();
    assert!(console.products().await.unwrap().is_empty());
}

#[tokio::test]
async fn admin_console_refuses_plain_users() {
    let ctx = TestContext::new().await;

    let storage = Arc::new(MemoryStorage::new());
    let mut session = AuthSession::new(storage);
    session.initialize().unwrap();
    session
        .register(&ctx.api, "Shopper", "shopper@voltline.test", "hunter22")
        .await
        .unwrap();

    assert!(AdminConsole::open(ctx.api.clone(), &session).is_err());
}
