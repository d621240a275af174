//! # 라우트 핸들러 모듈
//!
//! HTTP 요청을 처리하는 핸들러 함수들과 라우터 조립 함수입니다.
//!
//! 각 하위 모듈:
//! - `auth`: 인증 관련 (회원가입, 로그인, 토큰 갱신, 로그아웃, 계정 관리)
//! - `flashcards`: 플래시카드 CRUD와 목록
//! - `generations`: AI 생성 시작과 생성 기록 조회
//! - `health`: 서버 상태 확인 (헬스체크)

pub mod auth;
pub mod flashcards;
pub mod generations;
pub mod health;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use sqlx::SqlitePool;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::services::{FlashcardGateway, GenerationService};

/// 애플리케이션 공유 상태
///
/// 모든 요청 핸들러가 `State(state): State<AppState>`로 접근합니다.
#[derive(Clone)]
pub struct AppState {
    /// SQLite 연결 풀 (내부적으로 Arc로 공유)
    pub pool: SqlitePool,
    /// JWT 토큰 서명용 비밀키
    pub jwt_secret: String,
    pub generations: Arc<GenerationService>,
    pub flashcards: FlashcardGateway,
}

/// `/api/v1` 아래에 모든 라우트를 붙이고 CORS와 요청 로깅을 씌운 라우터.
pub fn app_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/password", post(auth::change_password))
        .route("/auth/me", get(auth::me).delete(auth::delete_account));

    let api_routes = Router::new()
        .merge(auth_routes)
        .route("/generations", post(generations::create_generation))
        .route("/generations/{id}", get(generations::get_generation))
        .route("/generation-logs", get(generations::list_generation_logs))
        .route(
            "/flashcards",
            get(flashcards::list_flashcards).post(flashcards::create_flashcards),
        )
        .route(
            "/flashcards/{id}",
            get(flashcards::get_flashcard)
                .put(flashcards::update_flashcard)
                .delete(flashcards::delete_flashcard),
        )
        .route("/health", get(health::health_check))
        .with_state(state);

    // 개발 환경 기준으로 모든 출처를 허용합니다
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
