//! # 플래시카드 핸들러
//!
//! 검증과 소유권 확인은 `FlashcardGateway`가 하고, 핸들러는 HTTP 형태만 맞춥니다.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::{
    error::AppError,
    middleware::auth::AuthUser,
    models::{CreateFlashcardsRequest, Flashcard, FlashcardPage, ListFlashcardsQuery, UpdateFlashcardRequest},
    routes::AppState,
};

/// `GET /flashcards` — 쿼리 파라미터는 모두 선택.
pub async fn list_flashcards(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<ListFlashcardsQuery>,
) -> Result<Json<FlashcardPage>, AppError> {
    let page = state.flashcards.list(&auth_user.user_id, query).await?;
    Ok(Json(page))
}

/// `POST /flashcards` — 1~50장을 한 번에 저장합니다. 전부 저장되거나 하나도 저장되지 않습니다.
pub async fn create_flashcards(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<CreateFlashcardsRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let saved = state
        .flashcards
        .create_batch(&auth_user.user_id, req.flashcards)
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "data": saved }))))
}

pub async fn get_flashcard(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Flashcard>, AppError> {
    let card = state.flashcards.get(&auth_user.user_id, &id).await?;
    Ok(Json(card))
}

pub async fn update_flashcard(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateFlashcardRequest>,
) -> Result<Json<Flashcard>, AppError> {
    let card = state.flashcards.update(&auth_user.user_id, &id, req).await?;
    Ok(Json(card))
}

pub async fn delete_flashcard(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.flashcards.delete(&auth_user.user_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
