//! Integration tests for the stateless `/validation` endpoints.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../db/migrations")]
async fn validate_is_a_pure_dry_run(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (token, _) = common::register_user(app.clone(), "ada@example.com").await;

    let response = common::post_json_auth(
        app,
        "/api/v1/validation/validate",
        &token,
        json!({
            "html_content": "<body><script>alert(1)</script></body>",
            "css_content": "a { behavior: url(x.htc); }",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["data"]["is_valid"], false);
    assert_eq!(body["data"]["html_valid"], false);
    assert_eq!(body["data"]["css_valid"], false);
    assert!(body["data"]["error_count"].as_u64().unwrap() >= 2);

    // Nothing was persisted.
    let templates: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM templates")
        .fetch_one(&pool)
        .await
        .unwrap();
    let records: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM validation_records")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(templates, 0);
    assert_eq!(records, 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn validate_flags_domains_independently(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (token, _) = common::register_user(app.clone(), "ada@example.com").await;

    let response = common::post_json_auth(
        app,
        "/api/v1/validation/validate",
        &token,
        json!({
            "html_content": "<html><body><p>fine</p></body></html>",
            "css_content": "a { width: expression(evil()); }",
        }),
    )
    .await;
    let body = common::body_json(response).await;
    assert_eq!(body["data"]["html_valid"], true);
    assert_eq!(body["data"]["css_valid"], false);
    assert_eq!(body["data"]["is_valid"], false);
    assert_eq!(body["data"]["errors"][0]["domain"], "css");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn validate_reports_sizes(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (token, _) = common::register_user(app.clone(), "ada@example.com").await;

    let response = common::post_json_auth(
        app,
        "/api/v1/validation/validate",
        &token,
        json!({"html_content": "<body>ok</body>", "css_content": "a{}"}),
    )
    .await;
    let body = common::body_json(response).await;
    assert_eq!(body["data"]["html_size"], "<body>ok</body>".len());
    assert_eq!(body["data"]["css_size"], 3);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn sanitize_strips_dangerous_constructs(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (token, _) = common::register_user(app.clone(), "ada@example.com").await;

    let response = common::post_json_auth(
        app,
        "/api/v1/validation/sanitize",
        &token,
        json!({
            "html_content": "<p>a</p><script>alert(1)</script><div onclick=\"x()\">b</div>",
            "css_content": "div { width: expression(w()); color: red; }",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    let html = body["data"]["html_content"].as_str().unwrap();
    assert!(!html.contains("<script"));
    assert!(!html.contains("onclick"));
    assert!(html.contains("<p>a</p>"));
    let css = body["data"]["css_content"].as_str().unwrap();
    assert!(!css.contains("expression"));
    assert!(css.contains("color: red"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn auto_fix_scaffolds_and_reports_changes(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (token, _) = common::register_user(app.clone(), "ada@example.com").await;

    let response = common::post_json_auth(
        app,
        "/api/v1/validation/auto-fix",
        &token,
        json!({
            "html_content": "<p>hello<script>bad()</script></p>",
            "css_content": "",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    let html = body["data"]["html_content"].as_str().unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(!html.contains("<script"));

    let changes: Vec<&str> = body["data"]["changes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c.as_str().unwrap())
        .collect();
    assert!(changes.contains(&"Removed dangerous HTML constructs"));
    assert!(changes.contains(&"Added missing doctype"));

    // The response validates the fixed content, not the input.
    assert_eq!(body["data"]["validation"]["html_valid"], true);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn validation_endpoints_require_authentication(pool: PgPool) {
    let app = common::build_test_app(pool);

    for path in [
        "/api/v1/validation/validate",
        "/api/v1/validation/sanitize",
        "/api/v1/validation/auto-fix",
    ] {
        let response =
            common::post_json(app.clone(), path, json!({"html_content": "<p>x</p>"})).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
