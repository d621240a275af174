//! # 플래시카드 저장 게이트웨이
//!
//! DB 쿼리(`db::flashcards`) 앞에서 입력 검증과 소유권 확인을 맡습니다.
//!
//! - AI 출처 카드가 참조하는 생성 기록은 요청자 소유여야 합니다.
//!   하나라도 어긋나면 어긋난 카드마다 감사 로그를 남기고 묶음 전체를 거부합니다.
//! - 저장 자체가 실패하면 묶음의 AI 카드마다 감사 로그를 남기고 에러를 전파합니다.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::db::{self, FlashcardListFilter};
use crate::error::AppError;
use crate::models::{
    Flashcard, FlashcardPage, FlashcardSource, ListFlashcardsQuery, NewFlashcard, NewGenerationLog,
    Pagination, UpdateFlashcardRequest, MAX_BATCH_SIZE,
};
use crate::services::review::FlashcardSink;
use crate::services::validation::{validate_back, validate_front, validate_new_flashcard};

pub const DEFAULT_PAGE_LIMIT: u32 = 10;
pub const MAX_PAGE_LIMIT: u32 = 100;

#[derive(Debug, Clone)]
pub struct FlashcardGateway {
    pool: SqlitePool,
}

impl FlashcardGateway {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_batch(
        &self,
        owner: &str,
        cards: Vec<NewFlashcard>,
    ) -> Result<Vec<Flashcard>, AppError> {
        if cards.is_empty() || cards.len() > MAX_BATCH_SIZE {
            return Err(AppError::validation(
                "flashcards",
                format!("must contain between 1 and {} items", MAX_BATCH_SIZE),
            ));
        }
        for card in &cards {
            validate_new_flashcard(card)?;
        }

        let mut offending = Vec::new();
        for card in cards.iter().filter(|c| c.source.is_ai()) {
            if let Some(generation_id) = &card.generation_id {
                if !self.owns_generation(owner, generation_id).await? {
                    offending.push(generation_id.as_str());
                }
            }
        }
        if let Some(first) = offending.first() {
            let err = AppError::UnauthorizedGenerationAccess(first.to_string());
            warn!(count = offending.len(), "Batch references generations the user does not own");
            for generation_id in offending.iter().copied() {
                self.log_card_failure(owner, Some(generation_id), &err).await;
            }
            return Err(err);
        }

        match db::insert_flashcards(&self.pool, owner, &cards).await {
            Ok(saved) => {
                info!(count = saved.len(), "Flashcards created");
                Ok(saved)
            }
            Err(err) => {
                for card in cards.iter().filter(|c| c.source.is_ai()) {
                    self.log_card_failure(owner, card.generation_id.as_deref(), &err).await;
                }
                Err(err)
            }
        }
    }

    pub async fn get(&self, owner: &str, id: &str) -> Result<Flashcard, AppError> {
        db::get_flashcard(&self.pool, owner, id)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn update(
        &self,
        owner: &str,
        id: &str,
        patch: UpdateFlashcardRequest,
    ) -> Result<Flashcard, AppError> {
        if patch.is_empty() {
            return Err(AppError::BadRequest(
                "At least one field must be provided".to_string(),
            ));
        }
        if let Some(front) = &patch.front {
            validate_front(front)?;
        }
        if let Some(back) = &patch.back {
            validate_back(back)?;
        }
        if patch.source == Some(FlashcardSource::AiComplete) {
            return Err(AppError::validation(
                "source",
                "must be either 'manual' or 'ai-with-updates'",
            ));
        }

        let existing = self.get(owner, id).await?;

        let source = patch.source.unwrap_or(existing.source);
        let generation_id = match &patch.generation_id {
            Some(next) => next.as_deref(),
            None => existing.generation_id.as_deref(),
        };
        match (source, generation_id) {
            (FlashcardSource::Manual, Some(_)) => {
                return Err(AppError::validation(
                    "generation_id",
                    "Manual flashcards cannot reference a generation",
                ))
            }
            (s, None) if s.is_ai() => {
                return Err(AppError::validation(
                    "generation_id",
                    "AI flashcards must reference a generation",
                ))
            }
            _ => {}
        }

        if let Some(Some(generation_id)) = &patch.generation_id {
            if !self.owns_generation(owner, generation_id).await? {
                return Err(AppError::UnauthorizedGenerationAccess(generation_id.clone()));
            }
        }

        db::update_flashcard(&self.pool, owner, id, &patch)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn delete(&self, owner: &str, id: &str) -> Result<(), AppError> {
        if db::delete_flashcard(&self.pool, owner, id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound)
        }
    }

    pub async fn list(&self, owner: &str, query: ListFlashcardsQuery) -> Result<FlashcardPage, AppError> {
        let page = query.page.unwrap_or(1);
        if page == 0 {
            return Err(AppError::validation("page", "must be at least 1"));
        }
        let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
            return Err(AppError::validation(
                "limit",
                format!("must be between 1 and {}", MAX_PAGE_LIMIT),
            ));
        }

        let filter = FlashcardListFilter {
            text: query
                .filter
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty()),
            source: query.source,
            created_after: query
                .created_after
                .as_deref()
                .map(|v| normalize_timestamp("created_after", v))
                .transpose()?,
            created_before: query
                .created_before
                .as_deref()
                .map(|v| normalize_timestamp("created_before", v))
                .transpose()?,
            has_generation: query.has_generation,
        };

        let offset = u64::from(page - 1) * u64::from(limit);
        let (data, total) = db::list_flashcards(
            &self.pool,
            owner,
            &filter,
            query.sort.unwrap_or_default(),
            query.order.unwrap_or_default(),
            limit,
            offset,
        )
        .await?;

        Ok(FlashcardPage {
            data,
            pagination: Pagination { page, limit, total },
        })
    }

    async fn owns_generation(&self, owner: &str, generation_id: &str) -> Result<bool, AppError> {
        let found = db::generation_owner(&self.pool, generation_id).await?;
        Ok(found.as_deref() == Some(owner))
    }

    /// 실패를 감사 로그에 남깁니다. 로그 쓰기 실패는 경고로만 남깁니다.
    async fn log_card_failure(&self, owner: &str, generation_id: Option<&str>, err: &AppError) {
        let generation = match generation_id {
            Some(id) => db::get_generation(&self.pool, owner, id).await.ok().flatten(),
            None => None,
        };
        let message = err.to_string();
        let log = NewGenerationLog {
            user_id: owner,
            generation_id,
            error_code: err.audit_code(),
            error_message: &message,
            model: generation.as_ref().map_or("unknown", |g| g.model.as_str()),
            source_text_hash: generation.as_ref().map_or("", |g| g.source_text_hash.as_str()),
            source_text_length: generation.as_ref().map_or(0, |g| g.source_text_length),
        };
        if let Err(log_err) = db::insert_generation_log(&self.pool, &log).await {
            warn!("Failed to write generation log: {}", log_err);
        }
    }
}

#[async_trait]
impl FlashcardSink for FlashcardGateway {
    async fn create_batch(
        &self,
        owner: &str,
        cards: Vec<NewFlashcard>,
    ) -> Result<Vec<Flashcard>, AppError> {
        FlashcardGateway::create_batch(self, owner, cards).await
    }
}

/// RFC 3339 타임스탬프를 DB 저장 형식(UTC, 밀리초)으로 바꿉니다.
fn normalize_timestamp(field: &str, value: &str) -> Result<String, AppError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| db::timestamp(dt.with_timezone(&Utc)))
        .map_err(|_| AppError::validation(field, "must be an RFC 3339 timestamp"))
}
