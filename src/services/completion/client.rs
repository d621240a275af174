//! # OpenRouter 채팅 완성 클라이언트
//!
//! 시도마다 시간 제한을 걸고, 재시도 가능한 실패만 백오프로 다시 보냅니다.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use super::{
    retry_with_backoff, sanitize::sanitize, ApiError, ChatMessage, CompletionOutput,
    CompletionProvider, CompletionRequest, ResponseFormat, RetryPolicy,
};
use crate::config::AiConfig;

/// 채팅 완성 엔드포인트로 보내는 요청 본문
#[derive(Debug, Serialize)]
struct ChatPayload<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f64,
    top_p: f64,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<&'a ResponseFormat>,
}

impl<'a> ChatPayload<'a> {
    fn from_request(request: &'a CompletionRequest) -> Self {
        Self {
            model: &request.model,
            messages: request.messages(),
            temperature: request.parameters.temperature,
            top_p: request.parameters.top_p,
            max_tokens: request.parameters.max_tokens,
            response_format: request.response_format.as_ref(),
        }
    }
}

/// OpenRouter 호환 클라이언트
#[derive(Debug, Clone)]
pub struct OpenRouterClient {
    http: Client,
    api_key: String,
    endpoint: String,
    timeout: Duration,
    retry: RetryPolicy,
}

impl OpenRouterClient {
    pub fn new(config: &AiConfig) -> Result<Self, ApiError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ApiError::config("OPENROUTER_API_KEY is not set"))?;

        let http = Client::builder()
            .user_agent(concat!("flashdeck/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ApiError::network)?;

        info!(endpoint = %config.endpoint, model = %config.model, "Completion client initialized");

        Ok(Self {
            http,
            api_key,
            endpoint: config.endpoint.clone(),
            timeout: config.timeout,
            retry: RetryPolicy {
                max_retries: config.max_retries,
                base_delay: config.base_backoff,
            },
        })
    }

    /// 네트워크 왕복 한 번. `timeout`이 지나면 취소됩니다.
    async fn attempt(&self, payload: &ChatPayload<'_>) -> Result<CompletionOutput, ApiError> {
        match tokio::time::timeout(self.timeout, self.exchange(payload)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(timeout_ms = self.timeout.as_millis() as u64, "Completion request timed out");
                Err(ApiError::timeout(self.timeout))
            }
        }
    }

    async fn exchange(&self, payload: &ChatPayload<'_>) -> Result<CompletionOutput, ApiError> {
        debug!(model = payload.model, "Executing completion request");

        let res = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(payload)
            .send()
            .await
            .map_err(ApiError::network)?;

        let status = res.status();
        if !status.is_success() {
            let data = res.json::<Value>().await.unwrap_or(Value::Null);
            let err = ApiError::http(status.as_u16(), status.canonical_reason(), data);
            warn!(
                context = %sanitize(&json!({ "status": status.as_u16(), "data": &err.details })),
                "Completion API request failed"
            );
            return Err(err);
        }

        let body = res
            .json::<Value>()
            .await
            .map_err(|e| ApiError::invalid_response(json!({ "decode_error": e.to_string() })))?;

        parse_completion_body(body)
    }
}

#[async_trait]
impl CompletionProvider for OpenRouterClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionOutput, ApiError> {
        let payload = ChatPayload::from_request(request);
        debug!(
            context = %sanitize(&json!({
                "model": payload.model,
                "messages": payload.messages.len(),
                "temperature": payload.temperature,
                "top_p": payload.top_p,
                "max_tokens": payload.max_tokens,
                "structured": payload.response_format.is_some(),
            })),
            "Request payload built"
        );

        let result = retry_with_backoff(&self.retry, ApiError::is_retryable, || {
            self.attempt(&payload)
        })
        .await;

        match &result {
            Ok(output) => info!(tokens = output.total_tokens, "Chat request completed successfully"),
            Err(e) => error!(
                code = e.code.as_str(),
                context = %sanitize(&e.details),
                "Completion request failed: {}",
                e.message
            ),
        }
        result
    }
}

/// `choices[0].message.content`와 `usage.total_tokens`를 꺼냅니다.
///
/// 내용이 없거나 비어 있으면 재시도하지 않는 `API_RESPONSE_ERROR`입니다.
pub fn parse_completion_body(body: Value) -> Result<CompletionOutput, ApiError> {
    let content = body
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string);

    match content {
        Some(content) => Ok(CompletionOutput {
            content,
            total_tokens: body
                .pointer("/usage/total_tokens")
                .and_then(Value::as_u64)
                .unwrap_or(0),
        }),
        None => {
            error!("Invalid API response format");
            Err(ApiError::invalid_response(body))
        }
    }
}
