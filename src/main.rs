//! # flashdeck 웹 서버 진입점
//!
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화
//! 3. SQLite 연결 풀 생성과 마이그레이션
//! 4. 완성 API 제공자 선택 (실제 / mock)
//! 5. 라우터 설정과 HTTP 서버 시작

use anyhow::{Context, Result};
use flashdeck::{app_state, completion_provider, config::Config, routes::app_router};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flashdeck=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()
        .context("DATABASE_URL, JWT_SECRET and OPENROUTER_API_KEY (unless AI_MOCK=true) must be set")?;
    tracing::info!("Starting flashdeck server on {}:{}", config.host, config.port);

    // 외래 키(ON DELETE CASCADE)는 sqlx 기본값으로 켜져 있습니다
    let options = SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;

    let provider = completion_provider(&config.ai).context("Failed to build completion client")?;
    let state = app_state(pool, config.jwt_secret.clone(), provider, config.ai.model.clone());
    let app = app_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
