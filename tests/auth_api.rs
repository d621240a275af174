//! 회원가입, 로그인, 토큰 갱신, 계정 관리의 HTTP 수준 테스트

mod common;

use axum::http::{Method, StatusCode};
use common::{call, register, PASSWORD};
use serde_json::json;

async fn login(app: &axum::Router, email: &str, password: &str) -> (StatusCode, serde_json::Value) {
    call(
        app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await
}

#[tokio::test]
async fn register_then_login_and_me() {
    let (app, _pool) = common::build_test_app().await;
    register(&app, "Person@Example.com").await;

    let (status, json) = login(&app, "person@example.com", PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["user"]["email"], "person@example.com");
    assert!(json["user"].get("password_hash").is_none());

    let token = json["access_token"].as_str().unwrap();
    let (status, me) = call(&app, Method::GET, "/api/v1/auth/me", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "person@example.com");
}

#[tokio::test]
async fn register_validates_and_rejects_duplicates() {
    let (app, _pool) = common::build_test_app().await;
    let cases = [
        json!({ "email": "no-at-sign", "password": PASSWORD, "password_confirm": PASSWORD }),
        json!({ "email": "a@b.c", "password": "short", "password_confirm": "short" }),
        json!({ "email": "a@b.c", "password": PASSWORD, "password_confirm": "different password" }),
    ];
    for body in cases {
        let (status, _) = call(&app, Method::POST, "/api/v1/auth/register", None, Some(body)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    register(&app, "dup@example.com").await;
    let (status, _) = call(
        &app,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({ "email": "dup@example.com", "password": PASSWORD, "password_confirm": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn bad_credentials_share_one_message() {
    let (app, _pool) = common::build_test_app().await;
    register(&app, "known@example.com").await;

    let (s1, wrong_password) = login(&app, "known@example.com", "wrong password!").await;
    let (s2, unknown_user) = login(&app, "unknown@example.com", PASSWORD).await;
    assert_eq!(s1, StatusCode::UNAUTHORIZED);
    assert_eq!(s2, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password["error"]["message"], unknown_user["error"]["message"]);
}

#[tokio::test]
async fn refresh_rotates_and_token_kinds_do_not_mix() {
    let (app, _pool) = common::build_test_app().await;
    register(&app, "rotate@example.com").await;
    let (_, session) = login(&app, "rotate@example.com", PASSWORD).await;
    let refresh_token = session["refresh_token"].as_str().unwrap();
    let access_token = session["access_token"].as_str().unwrap();

    // 리프레시 토큰으로는 인증할 수 없다
    let (status, _) = call(&app, Method::GET, "/api/v1/auth/me", Some(refresh_token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // 액세스 토큰으로는 갱신할 수 없다
    let (status, _) = call(
        &app,
        Method::POST,
        "/api/v1/auth/refresh",
        None,
        Some(json!({ "refresh_token": access_token })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, rotated) = call(
        &app,
        Method::POST,
        "/api/v1/auth/refresh",
        None,
        Some(json!({ "refresh_token": refresh_token })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(rotated["refresh_token"], session["refresh_token"]);

    // 이전 리프레시 토큰은 폐기됐다
    let (status, _) = call(
        &app,
        Method::POST,
        "/api/v1/auth/refresh",
        None,
        Some(json!({ "refresh_token": refresh_token })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_revokes_refresh_tokens() {
    let (app, _pool) = common::build_test_app().await;
    register(&app, "bye@example.com").await;
    let (_, session) = login(&app, "bye@example.com", PASSWORD).await;
    let access_token = session["access_token"].as_str().unwrap();

    let (status, _) = call(&app, Method::POST, "/api/v1/auth/logout", Some(access_token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/v1/auth/refresh",
        None,
        Some(json!({ "refresh_token": session["refresh_token"] })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn change_password_requires_current_password() {
    let (app, _pool) = common::build_test_app().await;
    let token = register(&app, "pw@example.com").await;

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/v1/auth/password",
        Some(&token),
        Some(json!({ "current_password": "not it at all", "new_password": "brand new secret" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/v1/auth/password",
        Some(&token),
        Some(json!({ "current_password": PASSWORD, "new_password": "brand new secret" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(login(&app, "pw@example.com", PASSWORD).await.0, StatusCode::UNAUTHORIZED);
    assert_eq!(login(&app, "pw@example.com", "brand new secret").await.0, StatusCode::OK);
}

#[tokio::test]
async fn delete_account_cascades() {
    let (app, pool) = common::build_test_app().await;
    let token = register(&app, "gone@example.com").await;
    call(
        &app,
        Method::POST,
        "/api/v1/flashcards",
        Some(&token),
        Some(json!({ "flashcards": [{ "front": "Q", "back": "A", "source": "manual", "generation_id": null }] })),
    )
    .await;

    let (status, _) = call(
        &app,
        Method::DELETE,
        "/api/v1/auth/me",
        Some(&token),
        Some(json!({ "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let cards: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM flashcards")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(cards, 0);
    assert_eq!(login(&app, "gone@example.com", PASSWORD).await.0, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_reports_database() {
    let (app, _pool) = common::build_test_app().await;
    let (status, json) = call(&app, Method::GET, "/api/v1/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({ "status": "ok", "database": "ok" }));
}
