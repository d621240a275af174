//! # 애플리케이션 설정(Configuration) 모듈
//!
//! 환경변수(.env 포함)에서 서버 설정값을 읽어옵니다.
//!
//! 필수 항목:
//! - `DATABASE_URL`: SQLite 데이터베이스 경로
//! - `JWT_SECRET`: JWT 토큰 서명 비밀키
//! - `OPENROUTER_API_KEY`: 채팅 완성 API 키 (`AI_MOCK=true`이면 생략 가능)
//!
//! 선택 항목 (기본값 있음): `HOST`, `PORT`, `OPENROUTER_URL`, `AI_MODEL`,
//! `AI_TIMEOUT_SECS`, `AI_MAX_RETRIES`, `AI_BACKOFF_MS`, `AI_MOCK`

use std::env;
use std::time::Duration;

pub const DEFAULT_COMPLETION_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_AI_MODEL: &str = "openai/gpt-4o-mini";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    pub ai: AiConfig,
}

/// 채팅 완성 API 관련 설정
#[derive(Debug, Clone)]
pub struct AiConfig {
    /// None이면 `mock`이 true여야 합니다 (`from_env`가 보장)
    pub api_key: Option<String>,
    pub endpoint: String,
    pub model: String,
    /// 네트워크 호출 한 번의 제한 시간 (기본 30초)
    pub timeout: Duration,
    /// 첫 시도 이후 추가 재시도 횟수 (기본 1 → 총 2회)
    pub max_retries: usize,
    /// 첫 재시도 전 대기 시간. 이후 두 배씩 늘어납니다 (기본 1초)
    pub base_backoff: Duration,
    /// true면 네트워크 대신 고정 응답을 쓰는 mock 제공자를 사용
    pub mock: bool,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_COMPLETION_URL.to_string(),
            model: DEFAULT_AI_MODEL.to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 1,
            base_backoff: Duration::from_millis(1000),
            mock: false,
        }
    }
}

impl Config {
    /// 환경변수에서 설정값을 읽어 Config 인스턴스를 생성합니다.
    ///
    /// # 에러
    /// `DATABASE_URL`, `JWT_SECRET`이 없으면 에러입니다.
    /// `OPENROUTER_API_KEY`는 `AI_MOCK=true`가 아닐 때 필수입니다.
    /// 숫자 항목은 파싱에 실패하면 기본값을 씁니다.
    pub fn from_env() -> Result<Self, env::VarError> {
        let defaults = AiConfig::default();
        let mock = env::var("AI_MOCK")
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(false);

        let api_key = match env::var("OPENROUTER_API_KEY") {
            Ok(key) if !key.trim().is_empty() => Some(key),
            _ if mock => None,
            Ok(_) => return Err(env::VarError::NotPresent),
            Err(e) => return Err(e),
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL")?,
            jwt_secret: env::var("JWT_SECRET")?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_or("PORT", 3000),
            ai: AiConfig {
                api_key,
                endpoint: env::var("OPENROUTER_URL").unwrap_or(defaults.endpoint),
                model: env::var("AI_MODEL").unwrap_or(defaults.model),
                timeout: Duration::from_secs(parse_or("AI_TIMEOUT_SECS", 30)),
                max_retries: parse_or("AI_MAX_RETRIES", defaults.max_retries),
                base_backoff: Duration::from_millis(parse_or("AI_BACKOFF_MS", 1000)),
                mock,
            },
        })
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
