//! 인증 에러.

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use pos_core::{Role, StoreError};

use super::TokenError;
use crate::error::{ApiErrorResponse, ErrorClass};

/// 인증/권한 에러.
///
/// 로그인 실패는 원인(계정 없음, 비밀번호 불일치)과 관계없이 같은 응답을,
/// 토큰 디코딩 실패는 원인(만료, 서명 불일치, 형식)과 관계없이 같은 응답을 냅니다.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("missing authorization token")]
    MissingToken,

    #[error("invalid token")]
    InvalidToken(#[source] TokenError),

    #[error("access token required")]
    WrongTokenKind,

    #[error("refresh token required")]
    NotRefreshToken,

    #[error("user no longer exists")]
    UnknownIdentity,

    #[error("{required} role required")]
    InsufficientRole { required: Role },

    #[error("fresh login required")]
    FreshLoginRequired,

    #[error("credential store failure")]
    Store(#[source] StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// 에러 분류.
    pub fn class(&self) -> ErrorClass {
        match self {
            AuthError::InvalidCredentials
            | AuthError::MissingToken
            | AuthError::WrongTokenKind
            | AuthError::NotRefreshToken
            | AuthError::UnknownIdentity => ErrorClass::Unauthorized,
            AuthError::InvalidToken(TokenError::Signing(_)) => ErrorClass::InternalError,
            AuthError::InvalidToken(_) => ErrorClass::Unauthorized,
            AuthError::InsufficientRole { .. } | AuthError::FreshLoginRequired => {
                ErrorClass::Forbidden
            }
            AuthError::Store(_) | AuthError::Internal(_) => ErrorClass::InternalError,
        }
    }

    /// 응답 에러 코드.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::MissingToken => "MISSING_TOKEN",
            AuthError::InvalidToken(TokenError::Signing(_)) => "INTERNAL_ERROR",
            AuthError::InvalidToken(_) => "INVALID_TOKEN",
            AuthError::WrongTokenKind => "ACCESS_TOKEN_REQUIRED",
            AuthError::NotRefreshToken => "REFRESH_TOKEN_REQUIRED",
            AuthError::UnknownIdentity => "UNKNOWN_USER",
            AuthError::InsufficientRole { .. } => "INSUFFICIENT_ROLE",
            AuthError::FreshLoginRequired => "FRESH_LOGIN_REQUIRED",
            AuthError::Store(_) | AuthError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 응답 본문. 내부 에러의 상세 내용은 포함하지 않습니다.
    pub fn to_response_body(&self) -> ApiErrorResponse {
        let message = match self.class() {
            ErrorClass::InternalError => "internal server error".to_string(),
            _ => self.to_string(),
        };
        ApiErrorResponse::new(self.code(), message)
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        AuthError::InvalidToken(err)
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if self.class() == ErrorClass::InternalError {
            tracing::error!(error = ?self, "Authentication failed with internal error");
        }
        (self.class().status(), Json(self.to_response_body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_failures_share_one_message() {
        let errors = [
            AuthError::from(TokenError::Expired),
            AuthError::from(TokenError::Invalid),
            AuthError::from(TokenError::ClaimMapping),
        ];
        for err in &errors {
            assert_eq!(err.class(), ErrorClass::Unauthorized);
            let body = err.to_response_body();
            assert_eq!(body.code, "INVALID_TOKEN");
            assert_eq!(body.message, "invalid token");
        }
    }

    #[test]
    fn test_signing_failure_is_internal() {
        let err = AuthError::from(TokenError::Signing("key rejected".into()));
        assert_eq!(err.class(), ErrorClass::InternalError);
        assert!(!err.to_response_body().message.contains("key rejected"));
    }

    #[test]
    fn test_forbidden_names_required_role() {
        let err = AuthError::InsufficientRole {
            required: Role::Owner,
        };
        assert_eq!(err.class(), ErrorClass::Forbidden);
        assert_eq!(err.to_response_body().message, "owner role required");

        assert_eq!(AuthError::FreshLoginRequired.class(), ErrorClass::Forbidden);
    }

    #[test]
    fn test_store_failure_hides_detail() {
        let err = AuthError::Store(StoreError::Backend("db down".into()));
        assert_eq!(err.class(), ErrorClass::InternalError);
        assert_eq!(err.to_response_body().message, "internal server error");
    }
}
