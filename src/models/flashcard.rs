//! # 플래시카드 모델 정의
//!
//! 저장된 플래시카드와, 플래시카드를 만들고/고치고/조회할 때 쓰는
//! 요청 구조체들을 정의합니다.
//!
//! ## 출처(source) 규칙
//! - `manual`: 사용자가 직접 작성 → `generation_id`는 반드시 `null`
//! - `ai-complete`: AI 제안을 그대로 수락 → `generation_id` 필수
//! - `ai-with-updates`: AI 제안을 수정 후 수락 → `generation_id` 필수

use serde::{Deserialize, Serialize};

/// 앞면 최대 글자 수 (유니코드 문자 기준)
pub const FRONT_MAX_CHARS: usize = 200;
/// 뒷면 최대 글자 수 (유니코드 문자 기준)
pub const BACK_MAX_CHARS: usize = 500;
/// 한 번의 일괄 생성 요청에 담을 수 있는 최대 카드 수
pub const MAX_BATCH_SIZE: usize = 50;

/// 플래시카드의 출처.
///
/// JSON과 DB 모두 `kebab-case` 문자열(`"ai-complete"` 등)로 저장됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "kebab-case")]
#[sqlx(rename_all = "kebab-case")]
pub enum FlashcardSource {
    Manual,
    AiComplete,
    AiWithUpdates,
}

impl FlashcardSource {
    /// AI 파이프라인에서 나온 카드인지 여부 (`generation_id`가 필요한지).
    pub fn is_ai(self) -> bool {
        !matches!(self, Self::Manual)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::AiComplete => "ai-complete",
            Self::AiWithUpdates => "ai-with-updates",
        }
    }
}

/// 플래시카드 엔티티 — DB의 `flashcards` 테이블 한 행에 대응합니다.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Flashcard {
    pub id: String,
    /// 소유자 ID. 응답 JSON에는 포함하지 않습니다.
    #[serde(skip_serializing)]
    pub user_id: String,
    pub front: String,
    pub back: String,
    pub source: FlashcardSource,
    pub generation_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// 새 플래시카드 한 장 — `POST /flashcards`의 배열 원소.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFlashcard {
    pub front: String,
    pub back: String,
    pub source: FlashcardSource,
    pub generation_id: Option<String>,
}

/// `POST /api/v1/flashcards`의 요청 본문.
#[derive(Debug, Deserialize)]
pub struct CreateFlashcardsRequest {
    pub flashcards: Vec<NewFlashcard>,
}

/// `PUT /api/v1/flashcards/{id}`의 요청 본문 (부분 업데이트).
#[derive(Debug, Default, Deserialize)]
pub struct UpdateFlashcardRequest {
    pub front: Option<String>,
    pub back: Option<String>,
    pub source: Option<FlashcardSource>,
    /// None = 필드 누락 (변경 안 함), Some(None) = null로 설정, Some(Some(id)) = 생성 기록 지정
    #[serde(default, deserialize_with = "super::deserialize_some")]
    pub generation_id: Option<Option<String>>,
}

impl UpdateFlashcardRequest {
    pub fn is_empty(&self) -> bool {
        self.front.is_none()
            && self.back.is_none()
            && self.source.is_none()
            && self.generation_id.is_none()
    }
}

/// 목록 정렬 기준 컬럼. SQL에 그대로 들어가므로 허용 목록으로만 받습니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Id,
    #[default]
    CreatedAt,
    UpdatedAt,
    Front,
    Back,
}

impl SortField {
    pub fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
            Self::Front => "front",
            Self::Back => "back",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// `GET /api/v1/flashcards`의 쿼리 파라미터.
#[derive(Debug, Default, Deserialize)]
pub struct ListFlashcardsQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort: Option<SortField>,
    pub order: Option<SortOrder>,
    pub filter: Option<String>,
    pub source: Option<FlashcardSource>,
    pub created_after: Option<String>,
    pub created_before: Option<String>,
    pub has_generation: Option<bool>,
}

/// 한 페이지의 플래시카드와 전체 개수.
#[derive(Debug, Serialize)]
pub struct FlashcardPage {
    pub data: Vec<Flashcard>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
}
