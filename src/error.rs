//! # 에러 처리 모듈
//!
//! HTTP 계층까지 올라오는 모든 에러를 `AppError` 하나로 통합합니다.
//! 하위 모듈은 각자의 에러 타입(`LengthError`, `ApiError`,
//! `ProposalParseError`, ...)을 쓰고, `From` 구현으로 `?` 한 번에 변환됩니다.
//!
//! 응답 형식: `{ "error": { "code": "...", "message": "..." } }`
//! 내부 에러(DB, AI, 내부 오류)는 상세 내용을 로그에만 남기고
//! 클라이언트에는 사람이 읽을 수 있는 일반 메시지만 돌려줍니다.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::{
    completion::ApiError,
    extractor::ProposalParseError,
    review::TransitionError,
    validation::{FieldValidationError, LengthError},
};

/// 애플리케이션에서 발생할 수 있는 모든 에러 종류
#[derive(Debug, Error)]
pub enum AppError {
    /// 요청한 리소스를 찾을 수 없음 (HTTP 404)
    /// 다른 사용자의 리소스도 같은 응답을 받습니다.
    #[error("Resource not found")]
    NotFound,

    /// 잘못된 요청 (HTTP 400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// 필드 단위 검증 실패 (HTTP 422)
    #[error("Validation failed on {field}: {message}")]
    Validation { field: String, message: String },

    /// 인증 실패 (HTTP 401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 다른 사용자의 생성 기록을 참조함 (HTTP 403)
    #[error("Generation {0} does not belong to the user")]
    UnauthorizedGenerationAccess(String),

    /// 리소스 충돌 (HTTP 409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 채팅 완성 API 실패 (HTTP 502)
    #[error("Completion API error: {0}")]
    Ai(#[from] ApiError),

    /// AI 응답이 플래시카드 형식이 아님 (HTTP 502)
    #[error("Failed to parse AI response: {0}")]
    Parse(#[from] ProposalParseError),

    /// 서버 내부 오류 (HTTP 500)
    #[error("Internal error: {0}")]
    Internal(String),

    /// 데이터베이스 오류 (HTTP 500)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AppError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// 감사 로그(`generation_logs.error_code`)에 남길 코드.
    pub fn audit_code(&self) -> &'static str {
        match self {
            Self::UnauthorizedGenerationAccess(_) => "UNAUTHORIZED_GENERATION_ACCESS",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Ai(e) => e.code.as_str(),
            Self::Parse(_) => "PARSE_ERROR",
            Self::Validation { .. } | Self::BadRequest(_) => "VALIDATION_ERROR",
            _ => "UNKNOWN_ERROR",
        }
    }
}

impl From<LengthError> for AppError {
    fn from(err: LengthError) -> Self {
        Self::validation("source_text", err.to_string())
    }
}

impl From<FieldValidationError> for AppError {
    fn from(err: FieldValidationError) -> Self {
        Self::validation(err.field, err.message)
    }
}

impl From<TransitionError> for AppError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::Invalid(field) => field.into(),
            other => Self::Conflict(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "not_found", self.to_string()),
            AppError::BadRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", msg.clone())
            }
            AppError::Validation { ref field, ref message } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                format!("{}: {}", field, message),
            ),
            AppError::Unauthorized(ref msg) => {
                (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone())
            }
            AppError::UnauthorizedGenerationAccess(_) => (
                StatusCode::FORBIDDEN,
                "unauthorized_generation_access",
                "One of the flashcards refers to a generation you do not own".to_string(),
            ),
            AppError::Conflict(ref msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            AppError::Ai(ref e) => {
                tracing::error!(code = e.code.as_str(), status = ?e.status, "Completion API error: {}", e.message);
                (
                    StatusCode::BAD_GATEWAY,
                    "generation_failed",
                    "The AI service could not generate flashcards right now. Please try again later."
                        .to_string(),
                )
            }
            AppError::Parse(ref e) => {
                tracing::error!("AI response parse error: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "generation_failed",
                    "The AI service returned flashcards in an unexpected format. Please try again."
                        .to_string(),
                )
            }
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "A database error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
