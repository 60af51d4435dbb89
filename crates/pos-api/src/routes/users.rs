//! 가맹점 사용자 관리 endpoint.
//!
//! 모든 조회/생성/수정/삭제는 호출자 토큰의 가맹점 범위 안에서만 이루어집니다.
//! 요청 본문의 가맹점 값은 받지 않으며, 다른 가맹점의 사용자는 404로 응답합니다.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use pos_core::{CredentialChanges, NewCredential, Role, StoreError, UserFilter, UserProfile};
use serde::Deserialize;
use tracing::info;

use crate::auth::{
    hash_password, validate_password_strength, CallerAuth, FreshOwnerAuth, OwnerAuth,
};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// 사용자 등록 요청.
#[derive(Debug, Deserialize)]
pub struct RegisterUserRequest {
    pub email: String,
    pub name: String,
    pub role: String,
    pub password: String,
    /// 기본 매장 ID (0 또는 생략 = 미지정)
    #[serde(default)]
    pub def_outlet: i64,
}

impl RegisterUserRequest {
    fn validate(&self) -> Result<Role, ApiError> {
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(ApiError::InvalidInput("a valid email is required".to_string()));
        }
        if self.name.trim().is_empty() {
            return Err(ApiError::InvalidInput("name is required".to_string()));
        }
        if self.def_outlet < 0 {
            return Err(ApiError::InvalidInput("def_outlet must not be negative".to_string()));
        }
        validate_password_strength(&self.password).map_err(ApiError::InvalidInput)?;

        Role::parse(&self.role)
            .ok_or_else(|| ApiError::InvalidInput(format!("unknown role '{}'", self.role)))
    }
}

/// 사용자 수정 요청. 로그인 식별자와 비밀번호는 바꿀 수 없습니다.
#[derive(Debug, Deserialize)]
pub struct EditUserRequest {
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub def_outlet: i64,
}

impl EditUserRequest {
    fn validate(&self) -> Result<CredentialChanges, ApiError> {
        if self.name.trim().is_empty() {
            return Err(ApiError::InvalidInput("name is required".to_string()));
        }
        if self.def_outlet < 0 {
            return Err(ApiError::InvalidInput("def_outlet must not be negative".to_string()));
        }
        let role = Role::parse(&self.role)
            .ok_or_else(|| ApiError::InvalidInput(format!("unknown role '{}'", self.role)))?;

        Ok(CredentialChanges::new(&self.name, self.def_outlet, role))
    }
}

/// 사용자 목록 쿼리 (`?search=&limit=&offset=`).
#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListUsersQuery {
    fn into_filter(self) -> Result<UserFilter, ApiError> {
        let limit = self.limit.unwrap_or(UserFilter::DEFAULT_LIMIT);
        if !(1..=UserFilter::MAX_LIMIT).contains(&limit) {
            return Err(ApiError::InvalidInput(format!(
                "limit must be between 1 and {}",
                UserFilter::MAX_LIMIT
            )));
        }
        let offset = self.offset.unwrap_or(0);
        if offset < 0 {
            return Err(ApiError::InvalidInput("offset must not be negative".to_string()));
        }

        Ok(UserFilter {
            search: self
                .search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            limit,
            offset,
        })
    }
}

fn user_lookup(identity: i64) -> impl FnOnce(StoreError) -> ApiError {
    move |err| match err {
        StoreError::NotFound => ApiError::UserNotFound(identity),
        other => other.into(),
    }
}

/// 호출자 가맹점의 사용자 목록 (이름순).
///
/// GET /api/v1/users
pub async fn list_users(
    State(state): State<AppState>,
    CallerAuth(claims): CallerAuth,
    Query(query): Query<ListUsersQuery>,
) -> ApiResult<Json<Vec<UserProfile>>> {
    let filter = query.into_filter()?;
    let scope = claims.tenant_scope();
    let records = state.store.list_by_tenant(scope.merchant_id, &filter).await?;

    Ok(Json(records.iter().map(|r| r.profile()).collect()))
}

/// 호출자 가맹점 소속 사용자 조회.
///
/// GET /api/v1/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    CallerAuth(claims): CallerAuth,
    Path(id): Path<i64>,
) -> ApiResult<Json<UserProfile>> {
    let record = state
        .store
        .find_by_identity_in_tenant(id, &claims.tenant_scope())
        .await
        .map_err(user_lookup(id))?;

    Ok(Json(record.profile()))
}

/// 호출자 가맹점 소속 사용자의 이름, 역할, 기본 매장 수정.
///
/// 변경된 역할은 대상 사용자의 다음 토큰 재발급부터 반영됩니다.
///
/// PUT /api/v1/users/{id}
pub async fn edit_user(
    State(state): State<AppState>,
    OwnerAuth(claims): OwnerAuth,
    Path(id): Path<i64>,
    Json(req): Json<EditUserRequest>,
) -> ApiResult<Json<UserProfile>> {
    let changes = req.validate()?;

    let record = state
        .store
        .update(id, &claims.tenant_scope(), changes)
        .await
        .map_err(user_lookup(id))?;

    info!(
        identity = record.identity,
        tenant = record.tenant,
        role = %record.role,
        edited_by = claims.identity,
        "User updated"
    );

    Ok(Json(record.profile()))
}

/// 호출자 가맹점 소속 사용자 삭제.
///
/// DELETE /api/v1/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    OwnerAuth(claims): OwnerAuth,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state
        .store
        .delete(id, &claims.tenant_scope())
        .await
        .map_err(user_lookup(id))?;

    info!(
        identity = id,
        tenant = claims.tenant,
        deleted_by = claims.identity,
        "User deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}

/// 호출자 가맹점에 사용자 등록.
///
/// 비밀번호 로그인 직후의 owner만 호출할 수 있습니다.
///
/// POST /api/v1/users
pub async fn register_user(
    State(state): State<AppState>,
    FreshOwnerAuth(claims): FreshOwnerAuth,
    Json(req): Json<RegisterUserRequest>,
) -> ApiResult<(StatusCode, Json<UserProfile>)> {
    let role = req.validate()?;
    let scope = claims.tenant_scope();

    let password = req.password.clone();
    let digest = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let record = state
        .store
        .insert(NewCredential::new(
            scope.merchant_id,
            req.def_outlet,
            &req.name,
            &req.email,
            digest,
            role,
        ))
        .await?;

    info!(
        identity = record.identity,
        tenant = record.tenant,
        role = %record.role,
        created_by = claims.identity,
        "User registered"
    );

    Ok((StatusCode::CREATED, Json(record.profile())))
}

/// 사용자 라우터 생성.
pub fn users_router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(register_user))
        .route(
            "/users/{id}",
            get(get_user).put(edit_user).delete(delete_user),
        )
}
