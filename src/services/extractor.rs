//! # AI 응답 → 플래시카드 후보 변환
//!
//! 완성 API가 돌려준 JSON 텍스트에서 `flashcards` 배열을 꺼내
//! 앞/뒷면 쌍 목록으로 정규화합니다.
//!
//! - `flashcards`가 없거나, 배열이 아니거나, 비어 있으면 `ProposalParseError`
//! - 앞면은 200자, 뒷면은 500자로 잘라냅니다 (에러 아님)
//! - 모든 후보의 출처는 `ai-complete`

use serde_json::{json, Value};
use thiserror::Error;

use crate::models::{FlashcardProposal, FlashcardSource, BACK_MAX_CHARS, FRONT_MAX_CHARS};
use crate::services::completion::ResponseFormat;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProposalParseError {
    #[error("response is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("response has no \"flashcards\" array")]
    MissingFlashcards,
    #[error("\"flashcards\" is not an array")]
    NotAnArray,
    #[error("no flashcards found in response")]
    Empty,
}

/// 완성 API에 요청할 구조화 출력 스키마.
pub fn flashcards_response_format() -> ResponseFormat {
    ResponseFormat::json_schema(
        "flashcards",
        json!({
            "type": "object",
            "properties": {
                "flashcards": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "front": { "type": "string", "maxLength": FRONT_MAX_CHARS },
                            "back": { "type": "string", "maxLength": BACK_MAX_CHARS }
                        },
                        "required": ["front", "back"]
                    }
                }
            },
            "required": ["flashcards"]
        }),
    )
}

pub fn extract_proposals(raw: &str) -> Result<Vec<FlashcardProposal>, ProposalParseError> {
    let data: Value =
        serde_json::from_str(raw).map_err(|e| ProposalParseError::InvalidJson(e.to_string()))?;

    let cards = match data.get("flashcards") {
        None | Some(Value::Null) => return Err(ProposalParseError::MissingFlashcards),
        Some(Value::Array(cards)) => cards,
        Some(_) => return Err(ProposalParseError::NotAnArray),
    };
    if cards.is_empty() {
        return Err(ProposalParseError::Empty);
    }

    let mut clamped = 0usize;
    let proposals = cards
        .iter()
        .map(|card| {
            let (front, cut_front) = clamp(&coerce(card.get("front")), FRONT_MAX_CHARS);
            let (back, cut_back) = clamp(&coerce(card.get("back")), BACK_MAX_CHARS);
            clamped += usize::from(cut_front) + usize::from(cut_back);
            FlashcardProposal {
                front,
                back,
                source: FlashcardSource::AiComplete,
            }
        })
        .collect();

    if clamped > 0 {
        tracing::warn!(clamped_fields = clamped, "AI output exceeded field limits and was truncated");
    }
    Ok(proposals)
}

/// 문자열은 그대로, null/누락은 빈 문자열, 그 밖의 값은 JSON 표기로.
fn coerce(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// 문자 단위로 `max`자까지 자르고, 잘렸는지 여부를 함께 돌려줍니다.
fn clamp(text: &str, max: usize) -> (String, bool) {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => (text[..byte_idx].to_string(), true),
        None => (text.to_string(), false),
    }
}
