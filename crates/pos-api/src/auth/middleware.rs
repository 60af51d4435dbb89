//! Axum용 접근 제어.
//!
//! 보호된 핸들러는 인자로 추출기를 선언하는 것만으로 접근 요구사항을 표현합니다:
//!
//! - [`CallerAuth`]: 유효한 Access Token을 가진 모든 호출자
//! - [`OwnerAuth`]: `owner` 역할
//! - [`FreshOwnerAuth`]: `owner` 역할 + 비밀번호 로그인 직후 발급된 토큰
//!
//! ```rust,ignore
//! async fn register_user(FreshOwnerAuth(claims): FreshOwnerAuth) -> impl IntoResponse {
//!     format!("merchant {}", claims.tenant)
//! }
//! ```
//!
//! 검증된 [`ClaimSet`]은 요청 extension에도 저장되어 이후 레이어에서 조회할 수 있습니다.

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use pos_core::Role;
use tracing::debug;

use super::{AuthError, ClaimSet, TokenCodec, TokenKind};

/// 접근 제어 게이트.
pub struct AccessGate;

impl AccessGate {
    /// 토큰을 검증하고 접근 요구사항을 확인합니다.
    ///
    /// 검사 순서:
    /// 1. 토큰 없음 → `MissingToken`
    /// 2. 디코딩 실패 → `InvalidToken`
    /// 3. Access Token 아님 → `WrongTokenKind`
    /// 4. 역할 불일치 → `InsufficientRole`
    /// 5. fresh 요구 시 non-fresh → `FreshLoginRequired`
    pub fn authenticate(
        codec: &TokenCodec,
        token: Option<&str>,
        required_role: Option<Role>,
        require_fresh: bool,
    ) -> Result<ClaimSet, AuthError> {
        let token = token.ok_or(AuthError::MissingToken)?;

        let claims = codec.decode_and_verify(token).map_err(|e| {
            debug!(reason = %e, "Access denied: token did not verify");
            AuthError::from(e)
        })?;

        if claims.token_kind != TokenKind::Access {
            debug!(identity = claims.identity, "Access denied: refresh token presented");
            return Err(AuthError::WrongTokenKind);
        }

        if let Some(required) = required_role {
            if claims.role != required {
                debug!(
                    identity = claims.identity,
                    role = %claims.role,
                    required = %required,
                    "Access denied: role mismatch"
                );
                return Err(AuthError::InsufficientRole { required });
            }
        }

        if require_fresh && !claims.fresh {
            debug!(identity = claims.identity, "Access denied: fresh login required");
            return Err(AuthError::FreshLoginRequired);
        }

        Ok(claims)
    }
}

/// `Authorization: Bearer <token>` 헤더에서 토큰 추출.
///
/// 헤더가 없거나 Bearer 스킴이 아니면 `None`.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

fn authorize<S>(
    parts: &mut Parts,
    state: &S,
    required_role: Option<Role>,
    require_fresh: bool,
) -> Result<ClaimSet, AuthError>
where
    Arc<TokenCodec>: FromRef<S>,
{
    let codec = Arc::<TokenCodec>::from_ref(state);
    let token = extract_bearer_token(&parts.headers);
    let claims = AccessGate::authenticate(&codec, token, required_role, require_fresh)?;

    parts.extensions.insert(claims.clone());
    Ok(claims)
}

/// 인증된 모든 호출자.
#[derive(Debug, Clone)]
pub struct CallerAuth(pub ClaimSet);

/// `owner` 역할 호출자.
#[derive(Debug, Clone)]
pub struct OwnerAuth(pub ClaimSet);

/// 비밀번호 로그인 직후의 `owner` 역할 호출자.
#[derive(Debug, Clone)]
pub struct FreshOwnerAuth(pub ClaimSet);

impl<S> FromRequestParts<S> for CallerAuth
where
    Arc<TokenCodec>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        authorize(parts, state, None, false).map(Self)
    }
}

impl<S> FromRequestParts<S> for OwnerAuth
where
    Arc<TokenCodec>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        authorize(parts, state, Some(Role::Owner), false).map(Self)
    }
}

impl<S> FromRequestParts<S> for FreshOwnerAuth
where
    Arc<TokenCodec>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        authorize(parts, state, Some(Role::Owner), true).map(Self)
    }
}
