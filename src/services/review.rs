//! # 제안 검토 세션
//!
//! 한 번의 생성 결과(제안 목록)를 사용자가 수락/수정/거절하는 동안의
//! 상태를 담습니다. 전역 상태 없이, 세션 객체를 호출자가 소유합니다.
//!
//! ## 상태 전이표
//! ```text
//!              accept   edit    reject
//! pending   →  accepted edited  rejected
//! accepted  →  ✗        edited  rejected
//! edited    →  accepted edited  rejected
//! rejected  →  ✗        ✗       ✗        (종료 상태)
//! ```
//! 허용되지 않는 전이는 `TransitionError`로 거부됩니다.
//!
//! 저장(`save_approved` / `save_all`)에 성공하면 세션 전체가 초기화되므로
//! 한 세션에서 성공하는 저장은 한 번뿐입니다.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Flashcard, FlashcardSource, InitiateGenerationResponse, NewFlashcard};
use crate::services::validation::{validate_back, validate_front, FieldValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    Pending,
    Accepted,
    Rejected,
    Edited,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAction {
    Accept,
    Reject,
    Edit,
}

impl ProposalStatus {
    /// 전이표 조회. `None`이면 허용되지 않는 전이.
    pub fn apply(self, action: ReviewAction) -> Option<Self> {
        use ProposalStatus::*;
        use ReviewAction::*;
        match (self, action) {
            (Rejected, _) => None,
            (Accepted, Accept) => None,
            (_, Accept) => Some(Accepted),
            (_, Reject) => Some(Rejected),
            (_, Edit) => Some(Edited),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Proposal {0} is not part of this review session")]
    UnknownProposal(String),
    #[error("Cannot {action:?} a proposal that is {from:?}")]
    Illegal {
        from: ProposalStatus,
        action: ReviewAction,
    },
    #[error(transparent)]
    Invalid(#[from] FieldValidationError),
}

/// 메모리에만 존재하는 제안 한 장.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProposalViewModel {
    pub id: String,
    pub front: String,
    pub back: String,
    pub status: ProposalStatus,
    pub original_front: String,
    pub original_back: String,
    pub source: FlashcardSource,
    pub generation_id: String,
}

impl ProposalViewModel {
    fn to_new_flashcard(&self) -> NewFlashcard {
        NewFlashcard {
            front: self.front.clone(),
            back: self.back.clone(),
            source: self.source,
            generation_id: Some(self.generation_id.clone()),
        }
    }
}

/// 검토를 마친 카드를 어디에 저장할지. 보통은 `FlashcardGateway`.
#[async_trait]
pub trait FlashcardSink: Send + Sync {
    async fn create_batch(
        &self,
        owner: &str,
        cards: Vec<NewFlashcard>,
    ) -> Result<Vec<Flashcard>, AppError>;
}

#[derive(Debug, Default)]
pub struct ReviewSession {
    generation_id: Option<String>,
    proposals: Vec<ProposalViewModel>,
    error: Option<String>,
}

impl ReviewSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// 생성 응답 하나로 세션을 채웁니다. 모든 제안은 `pending`으로 시작.
    pub fn from_generation(response: InitiateGenerationResponse) -> Self {
        let generation_id = response.generation_id;
        let proposals = response
            .flashcard_proposals
            .into_iter()
            .map(|p| ProposalViewModel {
                id: Uuid::now_v7().to_string(),
                original_front: p.front.clone(),
                original_back: p.back.clone(),
                front: p.front,
                back: p.back,
                status: ProposalStatus::Pending,
                source: p.source,
                generation_id: generation_id.clone(),
            })
            .collect();

        Self {
            generation_id: Some(generation_id),
            proposals,
            error: None,
        }
    }

    pub fn generation_id(&self) -> Option<&str> {
        self.generation_id.as_deref()
    }

    pub fn proposals(&self) -> &[ProposalViewModel] {
        &self.proposals
    }

    /// 마지막 저장 실패 메시지
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn accept(&mut self, id: &str) -> Result<(), TransitionError> {
        self.transition(id, ReviewAction::Accept).map(|_| ())
    }

    pub fn reject(&mut self, id: &str) -> Result<(), TransitionError> {
        self.transition(id, ReviewAction::Reject).map(|_| ())
    }

    /// 앞/뒷면을 검증한 뒤에만 반영합니다. 원본 텍스트는 그대로 둡니다.
    pub fn edit(&mut self, id: &str, front: &str, back: &str) -> Result<(), TransitionError> {
        let proposal = self.find(id)?;
        let next = proposal
            .status
            .apply(ReviewAction::Edit)
            .ok_or(TransitionError::Illegal {
                from: proposal.status,
                action: ReviewAction::Edit,
            })?;
        validate_front(front)?;
        validate_back(back)?;

        let proposal = self.find_mut(id)?;
        proposal.front = front.to_string();
        proposal.back = back.to_string();
        proposal.source = FlashcardSource::AiWithUpdates;
        proposal.status = next;
        Ok(())
    }

    pub fn approved_or_edited(&self) -> Vec<&ProposalViewModel> {
        self.proposals
            .iter()
            .filter(|p| matches!(p.status, ProposalStatus::Accepted | ProposalStatus::Edited))
            .collect()
    }

    pub fn not_rejected(&self) -> Vec<&ProposalViewModel> {
        self.proposals
            .iter()
            .filter(|p| p.status != ProposalStatus::Rejected)
            .collect()
    }

    /// 수락/수정된 제안만 저장합니다. 대상이 없으면 아무것도 하지 않고 빈 목록.
    pub async fn save_approved(
        &mut self,
        sink: &dyn FlashcardSink,
        owner: &str,
    ) -> Result<Vec<Flashcard>, AppError> {
        let cards = self.approved_or_edited().into_iter().map(ProposalViewModel::to_new_flashcard).collect();
        self.save(sink, owner, cards).await
    }

    /// 거절되지 않은 제안(대기 중 포함)을 모두 저장합니다.
    pub async fn save_all(
        &mut self,
        sink: &dyn FlashcardSink,
        owner: &str,
    ) -> Result<Vec<Flashcard>, AppError> {
        let cards = self.not_rejected().into_iter().map(ProposalViewModel::to_new_flashcard).collect();
        self.save(sink, owner, cards).await
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    async fn save(
        &mut self,
        sink: &dyn FlashcardSink,
        owner: &str,
        cards: Vec<NewFlashcard>,
    ) -> Result<Vec<Flashcard>, AppError> {
        if cards.is_empty() {
            return Ok(Vec::new());
        }

        match sink.create_batch(owner, cards).await {
            Ok(saved) => {
                tracing::info!(count = saved.len(), "Review session saved");
                self.reset();
                Ok(saved)
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    fn transition(&mut self, id: &str, action: ReviewAction) -> Result<ProposalStatus, TransitionError> {
        let proposal = self.find_mut(id)?;
        let next = proposal.status.apply(action).ok_or(TransitionError::Illegal {
            from: proposal.status,
            action,
        })?;
        proposal.status = next;
        Ok(next)
    }

    fn find(&self, id: &str) -> Result<&ProposalViewModel, TransitionError> {
        self.proposals
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| TransitionError::UnknownProposal(id.to_string()))
    }

    fn find_mut(&mut self, id: &str) -> Result<&mut ProposalViewModel, TransitionError> {
        self.proposals
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| TransitionError::UnknownProposal(id.to_string()))
    }
}
