//! # AI 생성 기록 모델
//!
//! 한 번의 AI 생성(Generation)을 추적하는 레코드와 감사 로그,
//! `POST /generations`의 요청/응답을 정의합니다.
//!
//! ## 생성 기록 라이프사이클
//! ```text
//! open() → 외부 API 호출 중 (end_time = NULL, 카운트 0) → close() → [완료, 이후 불변]
//! ```
//! 클라이언트가 중간에 끊기면 `end_time`이 NULL인 채로 남습니다.

use serde::{Deserialize, Serialize};

use super::FlashcardSource;

/// 생성 기록 엔티티 — DB의 `generations` 테이블 한 행에 대응합니다.
///
/// 원문 텍스트 자체는 저장하지 않고, SHA-256 해시와 글자 수만 남깁니다.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct GenerationRecord {
    pub id: String,
    #[serde(skip_serializing)]
    pub user_id: String,
    pub model: String,
    pub source_text_hash: String,
    pub source_text_length: i64,
    pub start_time: String,
    /// 완료 시각 — None이면 아직 진행 중이거나 중단된 생성
    pub end_time: Option<String>,
    /// start_time ~ end_time 사이 밀리초. 완료 전에는 0
    pub duration_ms: i64,
    pub ai_complete_count: i64,
    pub ai_with_updates_count: i64,
    pub all_count: i64,
    pub created_at: String,
}

impl GenerationRecord {
    pub fn is_finished(&self) -> bool {
        self.end_time.is_some()
    }
}

/// 감사 로그 한 건 — `generation_logs` 테이블에 추가만 됩니다.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct GenerationLog {
    pub id: String,
    pub user_id: String,
    /// 관련 생성 기록이 없으면 None
    pub generation_id: Option<String>,
    pub error_code: String,
    pub error_message: String,
    pub model: String,
    pub source_text_hash: String,
    pub source_text_length: i64,
    pub created_at: String,
}

/// 감사 로그를 쓸 때 넘기는 값 묶음.
#[derive(Debug, Clone)]
pub struct NewGenerationLog<'a> {
    pub user_id: &'a str,
    pub generation_id: Option<&'a str>,
    pub error_code: &'a str,
    pub error_message: &'a str,
    pub model: &'a str,
    pub source_text_hash: &'a str,
    pub source_text_length: i64,
}

/// `POST /api/v1/generations`의 요청 본문.
#[derive(Debug, Deserialize)]
pub struct InitiateGenerationRequest {
    pub source_text: String,
}

/// AI가 제안한 카드 한 장 (아직 저장되지 않음).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashcardProposal {
    pub front: String,
    pub back: String,
    pub source: FlashcardSource,
}

/// `POST /api/v1/generations`의 응답 본문.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitiateGenerationResponse {
    pub generation_id: String,
    pub flashcard_proposals: Vec<FlashcardProposal>,
    pub ai_complete_count: i64,
}
