//! 입력 길이 검증.
//!
//! 모든 길이는 바이트가 아닌 유니코드 문자(`chars()`) 기준입니다.

use thiserror::Error;

use crate::models::{FlashcardSource, NewFlashcard, BACK_MAX_CHARS, FRONT_MAX_CHARS};

pub const SOURCE_TEXT_MIN_CHARS: usize = 1000;
pub const SOURCE_TEXT_MAX_CHARS: usize = 10000;

/// 원문 텍스트 길이가 허용 범위를 벗어남.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LengthError {
    #[error("Source text must be at least {min} characters long (got {actual})")]
    TooShort { min: usize, actual: usize },
    #[error("Source text cannot exceed {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },
}

/// 어느 필드가 왜 잘못됐는지.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct FieldValidationError {
    pub field: &'static str,
    pub message: String,
}

impl FieldValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// 원문 텍스트가 `1000 ≤ len ≤ 10000`인지 확인합니다. 부수 효과 없음.
pub fn validate_source_text(text: &str) -> Result<(), LengthError> {
    let actual = text.chars().count();
    if actual < SOURCE_TEXT_MIN_CHARS {
        return Err(LengthError::TooShort {
            min: SOURCE_TEXT_MIN_CHARS,
            actual,
        });
    }
    if actual > SOURCE_TEXT_MAX_CHARS {
        return Err(LengthError::TooLong {
            max: SOURCE_TEXT_MAX_CHARS,
            actual,
        });
    }
    Ok(())
}

pub fn validate_front(front: &str) -> Result<(), FieldValidationError> {
    bounded("front", front, FRONT_MAX_CHARS)
}

pub fn validate_back(back: &str) -> Result<(), FieldValidationError> {
    bounded("back", back, BACK_MAX_CHARS)
}

/// 카드 한 장의 앞/뒷면 길이와 출처-생성기록 짝을 확인합니다.
pub fn validate_new_flashcard(card: &NewFlashcard) -> Result<(), FieldValidationError> {
    validate_front(&card.front)?;
    validate_back(&card.back)?;
    match (card.source, &card.generation_id) {
        (FlashcardSource::Manual, Some(_)) => Err(FieldValidationError::new(
            "generation_id",
            "Manual flashcards cannot reference a generation",
        )),
        (source, None) if source.is_ai() => Err(FieldValidationError::new(
            "generation_id",
            "AI flashcards must reference a generation",
        )),
        _ => Ok(()),
    }
}

fn bounded(field: &'static str, value: &str, max: usize) -> Result<(), FieldValidationError> {
    let len = value.chars().count();
    if len == 0 || value.trim().is_empty() {
        return Err(FieldValidationError::new(field, "cannot be empty"));
    }
    if len > max {
        return Err(FieldValidationError::new(
            field,
            format!("cannot exceed {} characters", max),
        ));
    }
    Ok(())
}
