//! Integration tests for the `/auth` endpoints: register, login, refresh
//! rotation, logout, profile, and rate limiting.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../db/migrations")]
async fn register_creates_account_and_returns_tokens(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = common::post_json(
        app,
        "/api/v1/auth/register",
        json!({
            "email": "ada@example.com",
            "password": "correct_horse_17",
            "display_name": "Ada",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = common::body_json(response).await;
    assert!(body["access_token"].is_string());
    assert!(body["refresh_token"].is_string());
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert_eq!(body["user"]["display_name"], "Ada");
    assert_eq!(body["user"]["role"], "user");
    // The password hash must never appear in responses.
    assert!(body["user"].get("password_hash").is_none());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn register_normalizes_email_case(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = common::post_json(
        app.clone(),
        "/api/v1/auth/register",
        json!({
            "email": "  Ada@Example.COM ",
            "password": "correct_horse_17",
            "display_name": "Ada",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = common::body_json(response).await;
    assert_eq!(body["user"]["email"], "ada@example.com");

    // Login with different casing still matches.
    let response = common::post_json(
        app,
        "/api/v1/auth/login",
        json!({"email": "ADA@example.com", "password": "correct_horse_17"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn register_rejects_duplicate_email(pool: PgPool) {
    let app = common::build_test_app(pool);

    let payload = json!({
        "email": "ada@example.com",
        "password": "correct_horse_17",
        "display_name": "Ada",
    });
    let response = common::post_json(app.clone(), "/api/v1/auth/register", payload.clone()).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = common::post_json(app, "/api/v1/auth/register", payload).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = common::body_json(response).await;
    assert_eq!(body["code"], "CONFLICT");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn register_rejects_weak_password(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = common::post_json(
        app,
        "/api/v1/auth/register",
        json!({
            "email": "ada@example.com",
            "password": "short",
            "display_name": "Ada",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = common::body_json(response).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn register_rejects_invalid_email_and_blank_name(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = common::post_json(
        app.clone(),
        "/api/v1/auth/register",
        json!({
            "email": "not-an-email",
            "password": "correct_horse_17",
            "display_name": "Ada",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = common::post_json(
        app,
        "/api/v1/auth/register",
        json!({
            "email": "ada@example.com",
            "password": "correct_horse_17",
            "display_name": "   ",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn login_rejects_wrong_password(pool: PgPool) {
    let app = common::build_test_app(pool);
    common::register_user(app.clone(), "ada@example.com").await;

    let response = common::post_json(
        app,
        "/api/v1/auth/login",
        json!({"email": "ada@example.com", "password": "wrong_password_99"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = common::body_json(response).await;
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn login_rejects_unknown_email(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = common::post_json(
        app,
        "/api/v1/auth/login",
        json!({"email": "ghost@example.com", "password": "whatever_password"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn login_rejects_deactivated_account(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, user_id) = common::register_user(app.clone(), "ada@example.com").await;

    sqlx::query("UPDATE users SET is_active = FALSE WHERE id = $1")
        .bind(user_id)
        .execute(&pool)
        .await
        .unwrap();

    let response = common::post_json(
        app,
        "/api/v1/auth/login",
        json!({"email": "ada@example.com", "password": "test_password_123!"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn refresh_rotates_the_token(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = common::post_json(
        app.clone(),
        "/api/v1/auth/register",
        json!({
            "email": "ada@example.com",
            "password": "correct_horse_17",
            "display_name": "Ada",
        }),
    )
    .await;
    let body = common::body_json(response).await;
    let refresh_token = body["refresh_token"].as_str().unwrap().to_string();

    // First exchange succeeds and yields a fresh pair.
    let response = common::post_json(
        app.clone(),
        "/api/v1/auth/refresh",
        json!({"refresh_token": refresh_token}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let rotated = common::body_json(response).await;
    assert_ne!(rotated["refresh_token"].as_str().unwrap(), refresh_token);

    // The presented token is single-use.
    let response = common::post_json(
        app,
        "/api/v1/auth/refresh",
        json!({"refresh_token": refresh_token}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn refresh_rejects_garbage_token(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = common::post_json(
        app,
        "/api/v1/auth/refresh",
        json!({"refresh_token": "definitely-not-a-real-token"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn logout_revokes_all_sessions(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = common::post_json(
        app.clone(),
        "/api/v1/auth/register",
        json!({
            "email": "ada@example.com",
            "password": "correct_horse_17",
            "display_name": "Ada",
        }),
    )
    .await;
    let body = common::body_json(response).await;
    let access_token = body["access_token"].as_str().unwrap().to_string();
    let refresh_token = body["refresh_token"].as_str().unwrap().to_string();

    let response = common::post_auth(app.clone(), "/api/v1/auth/logout", &access_token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // The refresh token from before logout no longer works.
    let response = common::post_json(
        app,
        "/api/v1/auth/refresh",
        json!({"refresh_token": refresh_token}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn me_returns_profile_for_valid_token(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (token, user_id) = common::register_user(app.clone(), "ada@example.com").await;

    let response = common::get_auth(app, "/api/v1/auth/me", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["id"].as_i64().unwrap(), user_id);
    assert_eq!(body["email"], "ada@example.com");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn me_rejects_missing_and_malformed_tokens(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = common::get(app.clone(), "/api/v1/auth/me").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = common::get_auth(app, "/api/v1/auth/me", "not.a.jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn login_is_rate_limited_per_client(pool: PgPool) {
    // Two attempts allowed, effectively no refill within the test.
    let app = common::build_rate_limited_app(pool, 2, 0.0001);
    common::register_user(app.clone(), "ada@example.com").await;

    let payload = json!({"email": "ada@example.com", "password": "wrong_password_99"});
    for _ in 0..2 {
        let response = common::post_json(app.clone(), "/api/v1/auth/login", payload.clone()).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let response = common::post_json(app, "/api/v1/auth/login", payload).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let body = common::body_json(response).await;
    assert_eq!(body["code"], "RATE_LIMITED");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn register_writes_an_audit_row(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, user_id) = common::register_user(app, "ada@example.com").await;

    // The audit write is detached from the request.
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;

    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM activity_logs WHERE user_id = $1 AND action = 'auth.register'",
    )
    .bind(user_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(count, 1);
}
