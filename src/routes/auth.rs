//! # 인증 핸들러
//!
//! ## 엔드포인트
//! - `POST /auth/register` → 201, 사용자 + access/refresh 토큰
//! - `POST /auth/login` → 사용자 + 토큰
//! - `POST /auth/refresh` → refresh 토큰 교체(rotation)
//! - `POST /auth/logout` → 모든 refresh 토큰 폐기
//! - `GET /auth/me` → 현재 사용자
//! - `POST /auth/password` → 비밀번호 변경 (refresh 토큰 폐기)
//! - `DELETE /auth/me` → 계정 삭제 (카드, 생성 기록, 로그도 함께)

use crate::{
    db::{self, users as db_users},
    error::AppError,
    middleware::auth::{hash_token, issue_token, verify_token, AuthUser, TokenKind, REFRESH_TOKEN_DAYS},
    models::{
        AuthResponse, ChangePasswordRequest, DeleteAccountRequest, LoginRequest, RefreshRequest,
        RegisterRequest, User, UserResponse,
    },
    routes::AppState,
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};

const MIN_PASSWORD_CHARS: usize = 8;
const INVALID_CREDENTIALS: &str = "Invalid email or password";

fn validate_password(field: &str, password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(AppError::validation(
            field,
            format!("must be at least {} characters", MIN_PASSWORD_CHARS),
        ));
    }
    Ok(())
}

fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

fn check_password(user: &User, password: &str) -> Result<(), AppError> {
    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|e| AppError::Internal(format!("Password hash parse error: {}", e)))?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))
}

/// access/refresh 토큰 한 쌍을 발급하고 refresh 토큰의 해시를 저장합니다.
async fn issue_session(state: &AppState, user: User) -> Result<AuthResponse, AppError> {
    let token_error = |e: jsonwebtoken::errors::Error| AppError::Internal(format!("Token generation failed: {}", e));
    let access_token = issue_token(&user.id, &state.jwt_secret, TokenKind::Access).map_err(token_error)?;
    let refresh_token = issue_token(&user.id, &state.jwt_secret, TokenKind::Refresh).map_err(token_error)?;

    let expires_at = db::timestamp(Utc::now() + Duration::days(REFRESH_TOKEN_DAYS));
    db_users::store_refresh_token(
        &state.pool,
        &uuid::Uuid::now_v7().to_string(),
        &user.id,
        &hash_token(&refresh_token),
        &expires_at,
    )
    .await?;

    Ok(AuthResponse {
        user: user.into(),
        access_token,
        refresh_token,
    })
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let email = req.email.trim().to_lowercase();
    if !email.contains('@') {
        return Err(AppError::validation("email", "Invalid email address"));
    }
    validate_password("password", &req.password)?;
    if req.password != req.password_confirm {
        return Err(AppError::validation("password_confirm", "Passwords do not match"));
    }

    if db_users::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(AppError::Conflict("Email already exists".to_string()));
    }

    let password_hash = hash_password(&req.password)?;
    let user_id = uuid::Uuid::now_v7().to_string();
    let user = db_users::create_user(&state.pool, &user_id, &email, &password_hash).await?;
    tracing::info!(user_id = %user.id, "User registered");

    Ok((StatusCode::CREATED, Json(issue_session(&state, user).await?)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let email = req.email.trim().to_lowercase();
    let user = db_users::find_by_email(&state.pool, &email)
        .await?
        .ok_or(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    check_password(&user, &req.password)?;

    Ok(Json(issue_session(&state, user).await?))
}

pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    verify_token(&req.refresh_token, &state.jwt_secret, TokenKind::Refresh)
        .map_err(|_| AppError::Unauthorized("Invalid refresh token".to_string()))?;

    let token_hash = hash_token(&req.refresh_token);
    let (_token_id, user_id, expires_at) = db_users::find_refresh_token(&state.pool, &token_hash)
        .await?
        .ok_or(AppError::Unauthorized("Refresh token not found or revoked".to_string()))?;

    let expires = DateTime::parse_from_rfc3339(&expires_at)
        .map_err(|e| AppError::Internal(format!("Date parse error: {}", e)))?;
    if expires < Utc::now() {
        db_users::delete_refresh_token(&state.pool, &token_hash).await?;
        return Err(AppError::Unauthorized("Refresh token expired".to_string()));
    }

    let user = db_users::find_by_id(&state.pool, &user_id)
        .await?
        .ok_or(AppError::Unauthorized("User not found".to_string()))?;

    db_users::delete_refresh_token(&state.pool, &token_hash).await?;

    Ok(Json(issue_session(&state, user).await?))
}

pub async fn logout(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Value>, AppError> {
    db_users::delete_user_refresh_tokens(&state.pool, &auth_user.user_id).await?;

    Ok(Json(json!({ "message": "Logged out successfully" })))
}

pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<UserResponse>, AppError> {
    let user = db_users::find_by_id(&state.pool, &auth_user.user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(user.into()))
}

pub async fn change_password(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<Value>, AppError> {
    let user = db_users::find_by_id(&state.pool, &auth_user.user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    check_password(&user, &req.current_password)?;
    validate_password("new_password", &req.new_password)?;

    db_users::update_password(&state.pool, &user.id, &hash_password(&req.new_password)?).await?;
    db_users::delete_user_refresh_tokens(&state.pool, &user.id).await?;

    Ok(Json(json!({ "message": "Password changed" })))
}

pub async fn delete_account(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<DeleteAccountRequest>,
) -> Result<StatusCode, AppError> {
    let user = db_users::find_by_id(&state.pool, &auth_user.user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    check_password(&user, &req.password)?;
    db_users::delete_user(&state.pool, &user.id).await?;
    tracing::info!(user_id = %user.id, "Account deleted");

    Ok(StatusCode::NO_CONTENT)
}
