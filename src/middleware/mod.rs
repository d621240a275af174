//! # 미들웨어 / Extractor
//!
//! - `auth`: JWT 발급/검증과 `AuthUser` extractor

pub mod auth;
