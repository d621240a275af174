//! # 통합 테스트 공용 준비 코드
//!
//! 테스트마다 마이그레이션을 적용한 인메모리 SQLite를 새로 만들고,
//! `main.rs`가 띄우는 것과 같은 라우터(CORS, 트레이싱 포함)를 사용합니다.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tower::ServiceExt;

use flashdeck::config::AiConfig;
use flashdeck::services::completion::{CompletionProvider, MockCompletionProvider};
use flashdeck::{app_state, routes::app_router};

pub const JWT_SECRET: &str = "integration-test-secret";
pub const PASSWORD: &str = "correct horse battery";

pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory database should open");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations should apply");
    pool
}

pub fn build_app_with(pool: SqlitePool, provider: Arc<dyn CompletionProvider>) -> Router {
    app_router(app_state(pool, JWT_SECRET, provider, "test-model"))
}

/// 카드 세 장을 돌려주는 목 프로바이더를 쓰는 라우터
pub async fn build_test_app() -> (Router, SqlitePool) {
    let pool = memory_pool().await;
    let app = build_app_with(pool.clone(), Arc::new(MockCompletionProvider));
    (app, pool)
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request should build");

    app.clone().oneshot(request).await.expect("router is infallible")
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

/// 요청을 보내고 상태 코드와 JSON 본문을 돌려줍니다.
pub async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let response = send(app, method, uri, token, body).await;
    let status = response.status();
    (status, body_json(response).await)
}

/// API로 회원가입하고 액세스 토큰을 돌려줍니다.
pub async fn register(app: &Router, email: &str) -> String {
    let (status, json) = call(
        app,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({ "email": email, "password": PASSWORD, "password_confirm": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {json}");
    json["access_token"]
        .as_str()
        .expect("access_token should be a string")
        .to_string()
}

pub fn source_text(len: usize) -> String {
    "Photosynthesis converts light into chemical energy. "
        .chars()
        .cycle()
        .take(len)
        .collect()
}

/// 채팅 완성 엔드포인트를 대신하는 로컬 서버.
///
/// 모든 요청에 `delay`만큼 기다렸다가 `status`와 `body`로 응답하고,
/// 도착한 요청 수를 셉니다.
pub struct MockCompletionServer {
    pub url: String,
    hits: Arc<AtomicUsize>,
}

impl MockCompletionServer {
    pub async fn start(status: StatusCode, body: Value) -> Self {
        Self::start_with_delay(status, body, Duration::ZERO).await
    }

    pub async fn start_with_delay(status: StatusCode, body: Value, delay: Duration) -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let app = Router::new().route(
            "/chat/completions",
            post(move || {
                let counter = counter.clone();
                let body = body.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    (status, axum::Json(body)).into_response()
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("should bind an ephemeral port");
        let addr = listener.local_addr().expect("listener has an address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            url: format!("http://{addr}/chat/completions"),
            hits,
        }
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// 이 서버를 가리키는 클라이언트 설정. 백오프는 밀리초 단위.
    pub fn ai_config(&self) -> AiConfig {
        AiConfig {
            api_key: Some("sk-test".to_string()),
            endpoint: self.url.clone(),
            timeout: Duration::from_secs(5),
            base_backoff: Duration::from_millis(5),
            ..AiConfig::default()
        }
    }
}

/// `content`를 담은 정상 응답 본문
pub fn completion_body(content: &str) -> Value {
    json!({
        "id": "gen-test",
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }],
        "usage": { "prompt_tokens": 10, "completion_tokens": 20, "total_tokens": 30 }
    })
}
