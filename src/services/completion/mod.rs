//! # 채팅 완성(Completion) API 클라이언트
//!
//! 외부 LLM 채팅 완성 API를 한 번 호출하는 계층입니다.
//!
//! ```text
//! CompletionRequest ─▶ CompletionProvider::complete() ─▶ CompletionOutput
//!                          │
//!                          ├─ OpenRouterClient   (실제 네트워크 호출 + 타임아웃 + 재시도)
//!                          └─ MockCompletionProvider (AI_MOCK=true, 고정 응답)
//! ```
//!
//! - `client`: reqwest 기반 구현
//! - `retry`: backon 기반 지수 백오프 조합기
//! - `sanitize`: 로그 컨텍스트에서 민감한 키를 가리는 함수
//! - `mock`: 개발용 고정 응답 제공자

pub mod client;
pub mod mock;
pub mod retry;
pub mod sanitize;

pub use client::OpenRouterClient;
pub use mock::MockCompletionProvider;
pub use retry::{retry_with_backoff, RetryPolicy};

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// 대화 메시지 한 건
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

/// 샘플링 파라미터
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelParameters {
    pub temperature: f64,
    pub top_p: f64,
    pub max_tokens: u32,
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 1.0,
            max_tokens: 2000,
        }
    }
}

/// 구조화 출력(JSON schema) 제약.
/// 직렬화 결과: `{ "type": "json_schema", "json_schema": { name, strict, schema } }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub json_schema: Value,
}

impl ResponseFormat {
    pub fn json_schema(name: &str, schema: Value) -> Self {
        Self {
            kind: "json_schema",
            json_schema: serde_json::json!({
                "name": name,
                "strict": true,
                "schema": schema,
            }),
        }
    }
}

/// 한 번의 완성 요청에 필요한 모든 것.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system_prompt: Option<String>,
    pub user_prompt: String,
    pub model: String,
    pub parameters: ModelParameters,
    pub response_format: Option<ResponseFormat>,
}

impl CompletionRequest {
    /// 시스템 메시지(있다면)가 먼저, 그 다음 사용자 메시지.
    pub fn messages(&self) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &self.system_prompt {
            messages.push(ChatMessage::system(system.clone()));
        }
        messages.push(ChatMessage::user(self.user_prompt.clone()));
        messages
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionOutput {
    pub content: String,
    pub total_tokens: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCode {
    /// 2xx가 아닌 HTTP 응답
    Api,
    /// 응답에 choices[0].message.content가 없음
    ApiResponse,
    Timeout,
    Network,
    Config,
}

impl ApiErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Api => "API_ERROR",
            Self::ApiResponse => "API_RESPONSE_ERROR",
            Self::Timeout => "TIMEOUT_ERROR",
            Self::Network => "NETWORK_ERROR",
            Self::Config => "CONFIG_ERROR",
        }
    }
}

impl fmt::Display for ApiErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
#[error("{code}: {message}")]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
    /// HTTP 응답 상태 (Api 코드일 때만)
    pub status: Option<u16>,
    pub details: Value,
}

impl ApiError {
    pub fn http(status: u16, reason: Option<&str>, body: Value) -> Self {
        Self {
            code: ApiErrorCode::Api,
            message: format!(
                "Completion API error: {} {}",
                status,
                reason.unwrap_or_default()
            )
            .trim_end()
            .to_string(),
            status: Some(status),
            details: body,
        }
    }

    pub fn invalid_response(details: Value) -> Self {
        Self {
            code: ApiErrorCode::ApiResponse,
            message: "Invalid API response format".to_string(),
            status: None,
            details,
        }
    }

    pub fn timeout(after: Duration) -> Self {
        Self {
            code: ApiErrorCode::Timeout,
            message: format!("Request timed out after {}ms", after.as_millis()),
            status: None,
            details: Value::Null,
        }
    }

    pub fn network(err: impl fmt::Display) -> Self {
        Self {
            code: ApiErrorCode::Network,
            message: format!("Network error: {}", err),
            status: None,
            details: Value::Null,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self {
            code: ApiErrorCode::Config,
            message: message.into(),
            status: None,
            details: Value::Null,
        }
    }

    /// 429와 5xx, 타임아웃, 네트워크 오류만 재시도합니다.
    /// 그 외 4xx와 응답 형식 오류는 즉시 실패.
    pub fn is_retryable(&self) -> bool {
        match self.code {
            ApiErrorCode::Api => self.status.is_some_and(|s| s == 429 || s >= 500),
            ApiErrorCode::Timeout | ApiErrorCode::Network => true,
            ApiErrorCode::ApiResponse | ApiErrorCode::Config => false,
        }
    }
}

/// 채팅 완성 API의 추상화. 파이프라인은 이 트레이트만 압니다.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionOutput, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_classification() {
        for status in [429, 500, 502, 503] {
            assert!(ApiError::http(status, None, Value::Null).is_retryable(), "{status}");
        }
        for status in [400, 401, 403, 404, 422] {
            assert!(!ApiError::http(status, None, Value::Null).is_retryable(), "{status}");
        }
        assert!(!ApiError::invalid_response(Value::Null).is_retryable());
        assert!(ApiError::timeout(Duration::from_secs(30)).is_retryable());
    }

    #[test]
    fn system_message_comes_first() {
        let request = CompletionRequest {
            system_prompt: Some("sys".into()),
            user_prompt: "hi".into(),
            model: "m".into(),
            parameters: ModelParameters::default(),
            response_format: None,
        };
        let roles: Vec<_> = request.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, ["system", "user"]);
    }

    #[test]
    fn user_only_when_no_system_prompt() {
        let request = CompletionRequest {
            system_prompt: None,
            user_prompt: "hi".into(),
            model: "m".into(),
            parameters: ModelParameters::default(),
            response_format: None,
        };
        assert_eq!(request.messages(), vec![ChatMessage::user("hi")]);
    }
}
