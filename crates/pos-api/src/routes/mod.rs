//! API 라우트.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/api/v1/login` - 이메일/비밀번호 로그인
//! - `/api/v1/refresh` - Access Token 재발급
//! - `/api/v1/profile` - 현재 사용자 프로필
//! - `/api/v1/users` - 가맹점 사용자 목록/등록
//! - `/api/v1/users/{id}` - 가맹점 사용자 조회/수정/삭제

pub mod auth;
pub mod health;
pub mod users;

use axum::Router;

pub use auth::{auth_router, LoginRequest, RefreshRequest};
pub use health::{health_router, HealthResponse};
pub use users::{users_router, EditUserRequest, ListUsersQuery, RegisterUserRequest};

use crate::state::AppState;

/// 전체 API 라우터 생성.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/health", health_router())
        .nest("/api/v1", auth_router().merge(users_router()))
}
