//! # flashdeck
//!
//! 원문 텍스트에서 AI로 플래시카드 후보를 만들고, 사용자가 검토한 카드만
//! 저장하는 학습 서비스의 API 서버 라이브러리입니다.
//!
//! - `config`: 환경변수 설정
//! - `db`: SQLite 쿼리
//! - `error`: HTTP로 나가는 에러 타입
//! - `middleware`: JWT 인증
//! - `models`: 데이터 구조체
//! - `routes`: HTTP 핸들러와 라우터
//! - `services`: 생성-검토 파이프라인

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::AiConfig;
use crate::services::completion::{ApiError, CompletionProvider, MockCompletionProvider, OpenRouterClient};

/// 설정에 맞는 완성 API 제공자를 고릅니다 (`AI_MOCK=true`이면 고정 응답).
pub fn completion_provider(config: &AiConfig) -> Result<Arc<dyn CompletionProvider>, ApiError> {
    if config.mock {
        tracing::warn!("AI_MOCK is enabled, using canned completions");
        return Ok(Arc::new(MockCompletionProvider));
    }
    Ok(Arc::new(OpenRouterClient::new(config)?))
}

/// 풀과 제공자로 공유 상태를 만듭니다.
pub fn app_state(
    pool: SqlitePool,
    jwt_secret: impl Into<String>,
    provider: Arc<dyn CompletionProvider>,
    model: impl Into<String>,
) -> routes::AppState {
    routes::AppState {
        generations: Arc::new(services::GenerationService::new(pool.clone(), provider, model)),
        flashcards: services::FlashcardGateway::new(pool.clone()),
        jwt_secret: jwt_secret.into(),
        pool,
    }
}
