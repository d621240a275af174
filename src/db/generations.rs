//! # 생성 기록 / 감사 로그 쿼리 모듈
//!
//! ## 생성 기록 라이프사이클
//! ```text
//! insert_generation() → 진행 중(end_time = NULL) → finish_generation() → [완료]
//! ```
//! `finish_generation()`은 `end_time IS NULL`인 행만 갱신하므로
//! 완료된 기록의 카운트는 다시 바뀌지 않습니다.

use crate::error::AppError;
use crate::models::{GenerationLog, GenerationRecord, NewGenerationLog};
use sqlx::SqlitePool;

const GENERATION_COLUMNS: &str = "id, user_id, model, source_text_hash, source_text_length, \
     start_time, end_time, duration_ms, ai_complete_count, ai_with_updates_count, all_count, created_at";

pub async fn insert_generation(
    pool: &SqlitePool,
    user_id: &str,
    model: &str,
    source_text_hash: &str,
    source_text_length: i64,
    start_time: &str,
) -> Result<GenerationRecord, AppError> {
    let id = uuid::Uuid::now_v7().to_string();

    sqlx::query(
        r#"
        INSERT INTO generations (id, user_id, model, source_text_hash, source_text_length, start_time)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(user_id)
    .bind(model)
    .bind(source_text_hash)
    .bind(source_text_length)
    .bind(start_time)
    .execute(pool)
    .await?;

    get_generation(pool, user_id, &id)
        .await?
        .ok_or(AppError::Internal(
            "Failed to retrieve created generation".to_string(),
        ))
}

/// 소유자 범위로 생성 기록 하나를 조회합니다. 다른 사용자의 기록은 `None`.
pub async fn get_generation(
    pool: &SqlitePool,
    user_id: &str,
    id: &str,
) -> Result<Option<GenerationRecord>, AppError> {
    let generation = sqlx::query_as::<_, GenerationRecord>(&format!(
        "SELECT {GENERATION_COLUMNS} FROM generations WHERE id = ? AND user_id = ?"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(generation)
}

/// 생성 기록의 소유자 ID만 조회합니다. 기록이 없으면 `None`.
pub async fn generation_owner(pool: &SqlitePool, id: &str) -> Result<Option<String>, AppError> {
    let owner = sqlx::query_scalar::<_, String>("SELECT user_id FROM generations WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(owner)
}

/// 완료 시각, 소요 시간, 카운트를 한 번에 기록합니다.
///
/// ## 반환값
/// - `Ok(true)`: 갱신됨
/// - `Ok(false)`: 없는 기록이거나 이미 완료된 기록
pub async fn finish_generation(
    pool: &SqlitePool,
    id: &str,
    end_time: &str,
    duration_ms: i64,
    ai_complete_count: i64,
) -> Result<bool, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE generations
        SET end_time = ?,
            duration_ms = ?,
            ai_complete_count = ?,
            ai_with_updates_count = 0,
            all_count = ?
        WHERE id = ? AND end_time IS NULL
        "#,
    )
    .bind(end_time)
    .bind(duration_ms)
    .bind(ai_complete_count)
    .bind(ai_complete_count)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn insert_generation_log(
    pool: &SqlitePool,
    log: &NewGenerationLog<'_>,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO generation_logs
            (id, user_id, generation_id, error_code, error_message, model,
             source_text_hash, source_text_length)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(uuid::Uuid::now_v7().to_string())
    .bind(log.user_id)
    .bind(log.generation_id)
    .bind(log.error_code)
    .bind(log.error_message)
    .bind(log.model)
    .bind(log.source_text_hash)
    .bind(log.source_text_length)
    .execute(pool)
    .await?;

    Ok(())
}

/// 사용자의 감사 로그를 최신순으로 조회합니다.
pub async fn list_generation_logs(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<Vec<GenerationLog>, AppError> {
    let logs = sqlx::query_as::<_, GenerationLog>(
        r#"
        SELECT id, user_id, generation_id, error_code, error_message, model,
               source_text_hash, source_text_length, created_at
        FROM generation_logs
        WHERE user_id = ?
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(logs)
}
