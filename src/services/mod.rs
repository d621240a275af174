//! # 서비스 계층
//!
//! 생성-검토 파이프라인의 핵심 로직입니다.
//! - `validation`: 원문/카드 길이 검증
//! - `completion`: 채팅 완성 API 클라이언트 (타임아웃, 재시도, 로그 정제)
//! - `extractor`: AI 응답 → 플래시카드 후보
//! - `generations`: 생성 기록을 열고 닫는 파이프라인
//! - `review`: 제안 검토 세션 (상태 전이표)
//! - `flashcards`: 소유권을 확인하는 저장 게이트웨이

pub mod completion;
pub mod extractor;
pub mod flashcards;
pub mod generations;
pub mod review;
pub mod validation;

pub use flashcards::FlashcardGateway;
pub use generations::GenerationService;
pub use review::{FlashcardSink, ReviewSession};
