//! # 생성 파이프라인
//!
//! ```text
//! validate_source_text ─▶ open() ─▶ CompletionProvider::complete()
//!                                      ─▶ extract_proposals() ─▶ close()
//! ```
//! `open()` 이후의 단계가 실패하면 `AI_PROCESSING_ERROR` 감사 로그를 한 건
//! 남기고 원래 에러를 그대로 돌려줍니다. 로그 쓰기 실패는 경고만 남깁니다.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::db;
use crate::error::AppError;
use crate::models::{FlashcardProposal, GenerationRecord, InitiateGenerationResponse, NewGenerationLog};
use crate::services::completion::{CompletionProvider, CompletionRequest, ModelParameters};
use crate::services::extractor::{extract_proposals, flashcards_response_format};
use crate::services::validation::validate_source_text;

pub const AI_PROCESSING_ERROR: &str = "AI_PROCESSING_ERROR";

/// 원문의 SHA-256 hex 다이제스트.
pub fn source_text_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn user_prompt(source_text: &str) -> String {
    format!(
        "Generate flashcards from the following text. Your response must be a valid JSON object with a \"flashcards\" array.

Text to process:
{source_text}

Remember:
1. Response must be a valid JSON object with a \"flashcards\" array
2. Each flashcard object must have \"front\" and \"back\" properties
3. Front side must be max 200 characters
4. Back side must be max 500 characters
5. Focus on key concepts and facts
6. Make questions clear and unambiguous"
    )
}

pub struct GenerationService {
    pool: SqlitePool,
    provider: Arc<dyn CompletionProvider>,
    model: String,
}

impl GenerationService {
    pub fn new(pool: SqlitePool, provider: Arc<dyn CompletionProvider>, model: impl Into<String>) -> Self {
        Self {
            pool,
            provider,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// 외부 호출 직전에 생성 기록을 엽니다. 카운트는 0, `end_time`은 NULL.
    pub async fn open(&self, owner: &str, source_text: &str) -> Result<GenerationRecord, AppError> {
        let start_time = db::timestamp(Utc::now());
        db::insert_generation(
            &self.pool,
            owner,
            &self.model,
            &source_text_hash(source_text),
            source_text.chars().count() as i64,
            &start_time,
        )
        .await
    }

    /// 완료 시각과 소요 시간, 제안 개수를 기록합니다.
    pub async fn close(
        &self,
        record: &GenerationRecord,
        proposals: &[FlashcardProposal],
    ) -> Result<(), AppError> {
        let end = Utc::now();
        let duration_ms = DateTime::parse_from_rfc3339(&record.start_time)
            .map(|start| (end - start.with_timezone(&Utc)).num_milliseconds().max(0))
            .map_err(|e| AppError::Internal(format!("Corrupt generation start_time: {}", e)))?;

        let updated = db::finish_generation(
            &self.pool,
            &record.id,
            &db::timestamp(end),
            duration_ms,
            proposals.len() as i64,
        )
        .await?;
        if !updated {
            return Err(AppError::Internal(format!(
                "Generation {} is missing or already finalized",
                record.id
            )));
        }
        Ok(())
    }

    /// 원문 하나로 제안 목록을 만듭니다.
    pub async fn initiate(
        &self,
        owner: &str,
        source_text: &str,
    ) -> Result<InitiateGenerationResponse, AppError> {
        validate_source_text(source_text)?;

        let record = self.open(owner, source_text).await?;
        info!(generation_id = %record.id, model = %self.model, length = record.source_text_length, "Generation opened");

        match self.run(&record, source_text).await {
            Ok(proposals) => {
                info!(generation_id = %record.id, count = proposals.len(), "Generation finished");
                Ok(InitiateGenerationResponse {
                    generation_id: record.id,
                    ai_complete_count: proposals.len() as i64,
                    flashcard_proposals: proposals,
                })
            }
            Err(err) => {
                self.log_failure(&record, &err).await;
                Err(err)
            }
        }
    }

    async fn run(
        &self,
        record: &GenerationRecord,
        source_text: &str,
    ) -> Result<Vec<FlashcardProposal>, AppError> {
        let request = CompletionRequest {
            system_prompt: None,
            user_prompt: user_prompt(source_text),
            model: self.model.clone(),
            parameters: ModelParameters::default(),
            response_format: Some(flashcards_response_format()),
        };

        let output = self.provider.complete(&request).await?;
        let proposals = extract_proposals(&output.content)?;
        self.close(record, &proposals).await?;
        Ok(proposals)
    }

    async fn log_failure(&self, record: &GenerationRecord, err: &AppError) {
        let message = err.to_string();
        let log = NewGenerationLog {
            user_id: &record.user_id,
            generation_id: Some(&record.id),
            error_code: AI_PROCESSING_ERROR,
            error_message: &message,
            model: &record.model,
            source_text_hash: &record.source_text_hash,
            source_text_length: record.source_text_length,
        };
        if let Err(log_err) = db::insert_generation_log(&self.pool, &log).await {
            warn!(generation_id = %record.id, "Failed to write generation log: {}", log_err);
        }
    }
}
