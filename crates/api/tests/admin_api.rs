//! Integration tests for the `/admin` endpoints: user management, platform
//! statistics, and the audit trail.

mod common;

use axum::http::StatusCode;
use axum::Router;
use serde_json::json;
use sqlx::PgPool;

/// Register an account, promote it to admin, and log in again so the access
/// token carries the admin role claim.
async fn register_admin(app: Router, pool: &PgPool, email: &str) -> (String, i64) {
    let (_, user_id) = common::register_user(app.clone(), email).await;

    sqlx::query("UPDATE users SET role = 'admin' WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await
        .unwrap();

    let response = common::post_json(
        app,
        "/api/v1/auth/login",
        json!({"email": email, "password": "test_password_123!"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    (
        body["access_token"].as_str().unwrap().to_string(),
        user_id,
    )
}

#[sqlx::test(migrations = "../db/migrations")]
async fn admin_endpoints_reject_regular_users(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (token, _) = common::register_user(app.clone(), "ada@example.com").await;

    for path in [
        "/api/v1/admin/users",
        "/api/v1/admin/statistics",
        "/api/v1/admin/audit",
    ] {
        let response = common::get_auth(app.clone(), path, &token).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = common::body_json(response).await;
        assert_eq!(body["code"], "FORBIDDEN");
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn list_users_returns_all_accounts(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    common::register_user(app.clone(), "ada@example.com").await;
    common::register_user(app.clone(), "bob@example.com").await;
    let (admin_token, _) = register_admin(app.clone(), &pool, "root@example.com").await;

    let response = common::get_auth(app, "/api/v1/admin/users", &admin_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["data"]["total"], 3);
    let users = body["data"]["users"].as_array().unwrap();
    assert_eq!(users.len(), 3);
    // Password hashes never leave the API.
    assert!(users[0].get("password_hash").is_none());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn deactivate_locks_the_account_out(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, target_id) = common::register_user(app.clone(), "ada@example.com").await;
    let (admin_token, _) = register_admin(app.clone(), &pool, "root@example.com").await;

    let response = common::put_auth(
        app.clone(),
        &format!("/api/v1/admin/users/{target_id}/deactivate"),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["data"]["is_active"], false);

    // The deactivated user can no longer log in.
    let response = common::post_json(
        app,
        "/api/v1/auth/login",
        json!({"email": "ada@example.com", "password": "test_password_123!"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn admins_cannot_deactivate_themselves(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (admin_token, admin_id) = register_admin(app.clone(), &pool, "root@example.com").await;

    let response = common::put_auth(
        app,
        &format!("/api/v1/admin/users/{admin_id}/deactivate"),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn deactivating_an_unknown_user_is_not_found(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (admin_token, _) = register_admin(app.clone(), &pool, "root@example.com").await;

    let response = common::put_auth(
        app,
        "/api/v1/admin/users/999999/deactivate",
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn platform_statistics_count_across_tenants(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (ada, _) = common::register_user(app.clone(), "ada@example.com").await;
    let (bob, _) = common::register_user(app.clone(), "bob@example.com").await;
    let id = common::create_template(app.clone(), &ada, "Doc").await;
    common::create_template(app.clone(), &bob, "Other").await;
    common::put_json_auth(
        app.clone(),
        &format!("/api/v1/templates/{id}"),
        &ada,
        json!({"html_content": "<html><body><p>v2</p></body></html>"}),
    )
    .await;

    let (admin_token, _) = register_admin(app.clone(), &pool, "root@example.com").await;
    let response = common::get_auth(app, "/api/v1/admin/statistics", &admin_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["data"]["total_users"], 3);
    assert_eq!(body["data"]["total_templates"], 2);
    assert_eq!(body["data"]["total_versions"], 3);
    assert_eq!(body["data"]["total_validations"], 3);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn audit_trail_is_filterable_by_action(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (ada, _) = common::register_user(app.clone(), "ada@example.com").await;
    common::create_template(app.clone(), &ada, "Doc").await;
    let (admin_token, _) = register_admin(app.clone(), &pool, "root@example.com").await;

    // Audit writes are detached from their requests.
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;

    let response = common::get_auth(
        app.clone(),
        "/api/v1/admin/audit?action=template.created",
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["entries"][0]["action"], "template.created");
    assert_eq!(body["data"]["entries"][0]["entity_type"], "template");

    // Unfiltered, the trail covers registrations and logins too.
    let response = common::get_auth(app, "/api/v1/admin/audit", &admin_token).await;
    let body = common::body_json(response).await;
    assert!(body["data"]["total"].as_i64().unwrap() >= 4);
}
