//! POS 백오피스 인증 API.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Argon2id 비밀번호 해싱
//! - JWT 발급/검증 (Access/Refresh, fresh 플래그)
//! - 로그인 및 토큰 재발급
//! - 역할/fresh 기반 접근 제어 추출기
//! - 가맹점 단위 사용자 관리 API (조회/등록/수정/삭제)
//!
//! # 모듈 구성
//!
//! - [`auth`]: 토큰 코덱, 세션 관리자, 접근 제어
//! - [`repository`]: 자격증명 저장소 (PostgreSQL, 인메모리)
//! - [`routes`]: REST API 엔드포인트
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`error`]: API 에러 응답

use std::time::Duration;

use axum::{http::StatusCode, Router};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod error;
pub mod repository;
pub mod routes;
pub mod state;

pub use auth::{
    AccessGate, AuthError, CallerAuth, ClaimSet, FreshOwnerAuth, OwnerAuth, SessionManager,
    TokenCodec, TokenKind,
};
pub use error::{ApiError, ApiErrorResponse, ApiResult, ErrorClass};
pub use routes::create_api_router;
pub use state::AppState;

/// 상태와 공통 레이어가 적용된 라우터 생성.
///
/// CORS는 배포 환경에 따라 달라지므로 바이너리에서 추가합니다.
pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    create_api_router()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .with_state(state)
}
