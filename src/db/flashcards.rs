//! # 플래시카드 쿼리 모듈
//!
//! 모든 쿼리는 `user_id`로 범위가 제한됩니다. 다른 사용자의 카드는
//! 존재하지 않는 카드와 똑같이 보입니다.

use crate::error::AppError;
use crate::models::{Flashcard, FlashcardSource, NewFlashcard, SortField, SortOrder, UpdateFlashcardRequest};
use sqlx::SqlitePool;

const FLASHCARD_COLUMNS: &str =
    "id, user_id, front, back, source, generation_id, created_at, updated_at";

/// 목록 조회 조건. 값 검증과 기본값 적용은 호출자가 끝낸 상태입니다.
#[derive(Debug, Clone, Default)]
pub struct FlashcardListFilter {
    /// 앞면 또는 뒷면에 포함될 부분 문자열
    pub text: Option<String>,
    pub source: Option<FlashcardSource>,
    /// `created_at >= created_after` (정규화된 타임스탬프)
    pub created_after: Option<String>,
    /// `created_at <= created_before` (정규화된 타임스탬프)
    pub created_before: Option<String>,
    pub has_generation: Option<bool>,
}

/// 카드 묶음을 하나의 트랜잭션으로 저장합니다. 하나라도 실패하면 아무것도 남지 않습니다.
pub async fn insert_flashcards(
    pool: &SqlitePool,
    user_id: &str,
    cards: &[NewFlashcard],
) -> Result<Vec<Flashcard>, AppError> {
    let mut tx = pool.begin().await?;
    let mut ids = Vec::with_capacity(cards.len());

    for card in cards {
        let id = uuid::Uuid::now_v7().to_string();
        sqlx::query(
            r#"
            INSERT INTO flashcards (id, user_id, front, back, source, generation_id, front_search, back_search)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(&card.front)
        .bind(&card.back)
        .bind(card.source)
        .bind(card.generation_id.as_deref())
        .bind(search_key(&card.front))
        .bind(search_key(&card.back))
        .execute(&mut *tx)
        .await?;
        ids.push(id);
    }

    tx.commit().await?;

    let mut saved = Vec::with_capacity(ids.len());
    for id in &ids {
        let card = get_flashcard(pool, user_id, id).await?.ok_or(AppError::Internal(
            "Failed to retrieve created flashcard".to_string(),
        ))?;
        saved.push(card);
    }
    Ok(saved)
}

pub async fn get_flashcard(
    pool: &SqlitePool,
    user_id: &str,
    id: &str,
) -> Result<Option<Flashcard>, AppError> {
    let card = sqlx::query_as::<_, Flashcard>(&format!(
        "SELECT {FLASHCARD_COLUMNS} FROM flashcards WHERE id = ? AND user_id = ?"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(card)
}

/// 요청에 포함된 필드만 갱신합니다.
///
/// ## 반환값
/// - `Ok(Some(Flashcard))`: 갱신 후의 카드
/// - `Ok(None)`: 해당 사용자의 카드가 아님
pub async fn update_flashcard(
    pool: &SqlitePool,
    user_id: &str,
    id: &str,
    req: &UpdateFlashcardRequest,
) -> Result<Option<Flashcard>, AppError> {
    if get_flashcard(pool, user_id, id).await?.is_none() {
        return Ok(None);
    }

    let front_search = req.front.as_deref().map(search_key);
    let back_search = req.back.as_deref().map(search_key);

    let mut query =
        String::from("UPDATE flashcards SET updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')");
    let mut bindings: Vec<Option<&str>> = Vec::new();

    if let Some(front) = &req.front {
        query.push_str(", front = ?, front_search = ?");
        bindings.push(Some(front.as_str()));
        bindings.push(front_search.as_deref());
    }
    if let Some(back) = &req.back {
        query.push_str(", back = ?, back_search = ?");
        bindings.push(Some(back.as_str()));
        bindings.push(back_search.as_deref());
    }
    if let Some(source) = req.source {
        query.push_str(", source = ?");
        bindings.push(Some(source.as_str()));
    }
    if let Some(generation_id) = &req.generation_id {
        query.push_str(", generation_id = ?");
        bindings.push(generation_id.as_deref());
    }

    query.push_str(" WHERE id = ? AND user_id = ?");
    bindings.push(Some(id));
    bindings.push(Some(user_id));

    let mut query_builder = sqlx::query(&query);
    for binding in bindings {
        query_builder = query_builder.bind(binding);
    }
    query_builder.execute(pool).await?;

    get_flashcard(pool, user_id, id).await
}

pub async fn delete_flashcard(pool: &SqlitePool, user_id: &str, id: &str) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM flashcards WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// 한 페이지의 카드와, 페이지와 무관한 전체 개수를 돌려줍니다.
pub async fn list_flashcards(
    pool: &SqlitePool,
    user_id: &str,
    filter: &FlashcardListFilter,
    sort: SortField,
    order: SortOrder,
    limit: u32,
    offset: u64,
) -> Result<(Vec<Flashcard>, i64), AppError> {
    let mut where_clause = String::from(" WHERE user_id = ?");
    let mut bindings: Vec<String> = vec![user_id.to_string()];

    if let Some(text) = &filter.text {
        // 양쪽 모두 소문자로 접은 값끼리 비교합니다
        where_clause.push_str(r" AND (front_search LIKE ? ESCAPE '\' OR back_search LIKE ? ESCAPE '\')");
        let pattern = format!("%{}%", escape_like(&search_key(text)));
        bindings.push(pattern.clone());
        bindings.push(pattern);
    }
    if let Some(source) = filter.source {
        where_clause.push_str(" AND source = ?");
        bindings.push(source.as_str().to_string());
    }
    if let Some(after) = &filter.created_after {
        where_clause.push_str(" AND created_at >= ?");
        bindings.push(after.clone());
    }
    if let Some(before) = &filter.created_before {
        where_clause.push_str(" AND created_at <= ?");
        bindings.push(before.clone());
    }
    match filter.has_generation {
        Some(true) => where_clause.push_str(" AND generation_id IS NOT NULL"),
        Some(false) => where_clause.push_str(" AND generation_id IS NULL"),
        None => {}
    }

    let count_sql = format!("SELECT COUNT(*) FROM flashcards{where_clause}");
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for binding in &bindings {
        count_query = count_query.bind(binding);
    }
    let total = count_query.fetch_one(pool).await?;

    // 정렬 컬럼과 방향은 허용 목록의 상수 문자열입니다. 같은 값이면 id로 순서를 고정
    let page_sql = format!(
        "SELECT {FLASHCARD_COLUMNS} FROM flashcards{where_clause} ORDER BY {} {}, id {} LIMIT ? OFFSET ?",
        sort.column(),
        order.keyword(),
        order.keyword(),
    );
    let mut page_query = sqlx::query_as::<_, Flashcard>(&page_sql);
    for binding in &bindings {
        page_query = page_query.bind(binding);
    }
    let cards = page_query
        .bind(i64::from(limit))
        .bind(offset as i64)
        .fetch_all(pool)
        .await?;

    Ok((cards, total))
}

/// 검색 컬럼에 저장하는 형태. 비 ASCII 문자까지 유니코드 규칙으로 소문자화합니다.
fn search_key(text: &str) -> String {
    text.to_lowercase()
}

fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
