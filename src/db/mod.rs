//! # 데이터베이스 접근 계층 (Data Access Layer)
//!
//! 데이터베이스와 직접 상호작용하는 함수들을 모아둔 모듈입니다.
//! 서비스 계층(services/)과 라우트 핸들러(routes/)에서 호출합니다.
//!
//! 각 하위 모듈:
//! - `flashcards`: 플래시카드 CRUD와 목록(필터/정렬/페이지) 쿼리
//! - `generations`: AI 생성 기록과 감사 로그 쿼리
//! - `users`: 사용자 인증 관련 쿼리

pub mod flashcards;
pub mod generations;
pub mod users;

pub use flashcards::*;
pub use generations::*;

use chrono::{DateTime, SecondsFormat, Utc};

/// DB에 저장하는 타임스탬프 형식 (`strftime('%Y-%m-%dT%H:%M:%fZ')`와 동일).
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
