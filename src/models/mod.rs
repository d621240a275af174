//! # 데이터 모델 모듈
//!
//! 애플리케이션에서 사용하는 데이터 구조체들을 정의합니다.
//! - `flashcard`: 저장된 플래시카드와 생성/수정/목록 요청
//! - `generation`: AI 생성 기록(GenerationRecord), 감사 로그, 생성 요청/응답
//! - `user`: 사용자와 인증 요청/응답
//!
//! `pub use X::*;`로 재공개하여 `crate::models::Flashcard`처럼 짧게 접근합니다.

pub mod flashcard;
pub mod generation;
pub mod user;

pub use flashcard::*;
pub use generation::*;
pub use user::*;

use serde::{Deserialize, Deserializer};

/// `Option<Option<T>>` 필드용 역직렬화 헬퍼.
///
/// 필드 누락 → `None` (변경 안 함), `null` → `Some(None)`, 값 → `Some(Some(v))`.
/// `#[serde(default, deserialize_with = "deserialize_some")]`와 함께 사용합니다.
pub(crate) fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}
