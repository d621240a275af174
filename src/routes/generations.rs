//! # 생성 핸들러
//!
//! - `POST /generations` → 201, 제안 목록 + 생성 기록 ID
//! - `GET /generations/{id}` → 생성 기록 (카운트, 소요 시간)
//! - `GET /generation-logs` → 감사 로그 (최신순)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    db,
    error::AppError,
    middleware::auth::AuthUser,
    models::{GenerationLog, GenerationRecord, InitiateGenerationRequest, InitiateGenerationResponse},
    routes::AppState,
};

pub async fn create_generation(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<InitiateGenerationRequest>,
) -> Result<(StatusCode, Json<InitiateGenerationResponse>), AppError> {
    let response = state
        .generations
        .initiate(&auth_user.user_id, &req.source_text)
        .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn get_generation(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<GenerationRecord>, AppError> {
    let record = db::get_generation(&state.pool, &auth_user.user_id, &id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(record))
}

pub async fn list_generation_logs(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<GenerationLog>>, AppError> {
    let logs = db::list_generation_logs(&state.pool, &auth_user.user_id).await?;
    Ok(Json(logs))
}
