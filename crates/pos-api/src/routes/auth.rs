//! 로그인, 토큰 재발급, 프로필 endpoint.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use pos_core::{StoreError, UserProfile};
use serde::Deserialize;

use crate::auth::{AuthError, CallerAuth, LoginSession, RefreshedSession};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// 로그인 요청.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// 토큰 재발급 요청.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: String,
}

/// 이메일/비밀번호 로그인.
///
/// POST /api/v1/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginSession>> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::InvalidInput(
            "email and password are required".to_string(),
        ));
    }

    let session = state.sessions.login(&req.email, &req.password).await?;
    Ok(Json(session))
}

/// Refresh Token으로 Access Token 재발급.
///
/// POST /api/v1/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshedSession>> {
    let token = req.refresh_token.trim();
    if token.is_empty() {
        return Err(AuthError::MissingToken.into());
    }

    let session = state.sessions.refresh(token).await?;
    Ok(Json(session))
}

/// 현재 사용자 프로필.
///
/// 토큰의 클레임이 아닌 저장소의 현재 레코드를 반환합니다.
///
/// GET /api/v1/profile
pub async fn profile(
    State(state): State<AppState>,
    CallerAuth(claims): CallerAuth,
) -> ApiResult<Json<UserProfile>> {
    let record = state
        .store
        .find_by_identity(claims.identity)
        .await
        .map_err(|e| match e {
            StoreError::NotFound => ApiError::Auth(AuthError::UnknownIdentity),
            other => other.into(),
        })?;

    Ok(Json(record.profile()))
}

/// 인증 라우터 생성.
pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/profile", get(profile))
}
