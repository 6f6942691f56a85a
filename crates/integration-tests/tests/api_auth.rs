//! Auth surface: registration, login, admin registration, role toggling.

#![allow(clippy::unwrap_used)]

use voltline_client::ClientError;
use voltline_core::Role;
use voltline_integration_tests::{ADMIN_EMAIL, ADMIN_PASSWORD, TestContext};

#[tokio::test]
async fn register_then_login() {
    let ctx = TestContext::new().await;

    let registered = ctx
        .api
        .register("Ada", "ada@voltline.test", "hunter22")
        .await
        .unwrap();
    assert_eq!(registered.user.role, Role::User);
    assert!(!registered.token.is_empty());

    let logged_in = ctx.api.login("ada@voltline.test", "hunter22").await.unwrap();
    assert_eq!(logged_in.user.id, registered.user.id);
}

#[tokio::test]
async fn register_duplicate_email_conflicts() {
    let ctx = TestContext::new().await;
    ctx.api
        .register("Ada", "ada@voltline.test", "hunter22")
        .await
        .unwrap();

    let err = ctx
        .api
        .register("Imposter", "ada@voltline.test", "hunter22")
        .await
        .unwrap_err();
    let ClientError::Api { status, .. } = err else {
        panic!("expected api error");
    };
    assert_eq!(status, 409);
}

#[tokio::test]
async fn register_invalid_input_reports_fields() {
    let ctx = TestContext::new().await;

    let err = ctx.api.register(" ", "not-an-email", "pw").await.unwrap_err();
    let ClientError::Api { status, errors, .. } = err else {
        panic!("expected api error");
    };
    assert_eq!(status, 400);

    let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
    assert!(fields.contains(&"name"));
    assert!(fields.contains(&"email"));
    assert!(fields.contains(&"password"));
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let ctx = TestContext::new().await;
    let err = ctx
        .api
        .login(ADMIN_EMAIL, "definitely-wrong")
        .await
        .unwrap_err();
    let ClientError::Api { status, .. } = err else {
        panic!("expected api error");
    };
    assert_eq!(status, 401);
}

#[tokio::test]
async fn admin_register_creates_admin_account() {
    let ctx = TestContext::new().await;
    let admin_token = ctx.admin_token().await;

    let second = ctx
        .api
        .register_admin(&admin_token, "Second Admin", "second@voltline.test", "hunter22")
        .await
        .unwrap();
    assert_eq!(second.user.role, Role::Admin);

    // a plain user cannot mint admins
    let shopper = ctx
        .api
        .register("Shopper", "shopper@voltline.test", "hunter22")
        .await
        .unwrap();
    let err = ctx
        .api
        .register_admin(&shopper.token, "Nope", "nope@voltline.test", "hunter22")
        .await
        .unwrap_err();
    let ClientError::Api { status, .. } = err else {
        panic!("expected api error");
    };
    assert_eq!(status, 403);
}

#[tokio::test]
async fn toggle_role_twice_restores_original() {
    let ctx = TestContext::new().await;
    let admin_token = ctx.admin_token().await;
    let account = ctx
        .api
        .register("Ada", "ada@voltline.test", "hunter22")
        .await
        .unwrap();

    let promoted = ctx
        .api
        .toggle_role(&admin_token, account.user.id, Role::Admin)
        .await
        .unwrap();
    assert_eq!(promoted.role, Role::Admin);

    let restored = ctx
        .api
        .toggle_role(&admin_token, account.user.id, Role::User)
        .await
        .unwrap();
    assert_eq!(restored.role, account.user.role);
}

#[tokio::test]
async fn toggle_role_requires_admin() {
    let ctx = TestContext::new().await;
    let account = ctx
        .api
        .register("Ada", "ada@voltline.test", "hunter22")
        .await
        .unwrap();

    let err = ctx
        .api
        .toggle_role(&account.token, account.user.id, Role::Admin)
        .await
        .unwrap_err();
    let ClientError::Api { status, .. } = err else {
        panic!("expected api error");
    };
    assert_eq!(status, 403);
}

#[tokio::test]
async fn admin_can_demote_themselves() {
    let ctx = TestContext::new().await;
    let admin_token = ctx.admin_token().await;
    let admin = ctx.api.login(ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();

    // no transition restriction: self-demotion is allowed
    let demoted = ctx
        .api
        .toggle_role(&admin_token, admin.user.id, Role::User)
        .await
        .unwrap();
    assert_eq!(demoted.role, Role::User);
}
