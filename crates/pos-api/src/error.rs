//! 통합 API 에러 응답 타입.
//!
//! 모든 API 엔드포인트에서 일관된 에러 형식을 제공합니다.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pos_core::StoreError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::AuthError;

/// 통합 API 에러 응답.
///
/// # 예시
///
/// ```json
/// {
///   "code": "INVALID_TOKEN",
///   "message": "invalid token",
///   "timestamp": 1738300800
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "INVALID_TOKEN", "FORBIDDEN")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 추가 에러 상세 정보 (선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// 에러 발생 타임스탬프 (Unix timestamp, 선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ApiErrorResponse {
    /// 기본 에러 생성 (타임스탬프 포함).
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            timestamp: Some(chrono::Utc::now().timestamp()),
        }
    }

    /// 상세 정보 포함 에러 생성.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Value,
    ) -> Self {
        Self {
            details: Some(details),
            ..Self::new(code, message)
        }
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiErrorResponse {}

/// 에러 분류.
///
/// 인증 코어의 에러는 `NotFound`를 제외한 네 가지 중 하나입니다.
/// `NotFound`는 사용자 관리 라우트의 대상 조회 실패에만 쓰입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    InternalError,
}

impl ErrorClass {
    /// HTTP 상태 코드.
    pub fn status(self) -> StatusCode {
        match self {
            ErrorClass::BadRequest => StatusCode::BAD_REQUEST,
            ErrorClass::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorClass::Forbidden => StatusCode::FORBIDDEN,
            ErrorClass::NotFound => StatusCode::NOT_FOUND,
            ErrorClass::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// 라우트 핸들러 에러.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 인증/권한 실패
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// 잘못된 요청 본문
    #[error("{0}")]
    InvalidInput(String),

    /// 이미 등록된 로그인 식별자
    #[error("email is already registered")]
    EmailTaken,

    /// 호출자 가맹점에 없는 사용자
    #[error("user not found")]
    UserNotFound(i64),

    /// 내부 에러
    #[error("internal server error")]
    Internal(String),
}

impl ApiError {
    /// 에러 분류.
    pub fn class(&self) -> ErrorClass {
        match self {
            ApiError::Auth(e) => e.class(),
            ApiError::InvalidInput(_) | ApiError::EmailTaken => ErrorClass::BadRequest,
            ApiError::UserNotFound(_) => ErrorClass::NotFound,
            ApiError::Internal(_) => ErrorClass::InternalError,
        }
    }

    /// 응답 본문.
    pub fn to_response_body(&self) -> ApiErrorResponse {
        match self {
            ApiError::Auth(e) => e.to_response_body(),
            ApiError::InvalidInput(msg) => ApiErrorResponse::new("INVALID_INPUT", msg.clone()),
            ApiError::EmailTaken => ApiErrorResponse::new("EMAIL_TAKEN", self.to_string()),
            ApiError::UserNotFound(id) => ApiErrorResponse::with_details(
                "USER_NOT_FOUND",
                self.to_string(),
                serde_json::json!({ "id": id }),
            ),
            ApiError::Internal(_) => ApiErrorResponse::new("INTERNAL_ERROR", self.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(_) => ApiError::EmailTaken,
            other => ApiError::Auth(AuthError::Store(other)),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            tracing::error!(error = %detail, "Request failed with internal error");
        }
        (self.class().status(), Json(self.to_response_body())).into_response()
    }
}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_response_new() {
        let error = ApiErrorResponse::new("TEST_ERROR", "Test message");
        assert_eq!(error.code, "TEST_ERROR");
        assert_eq!(error.message, "Test message");
        assert!(error.timestamp.is_some());
        assert!(error.details.is_none());
    }

    #[test]
    fn test_json_omits_empty_details() {
        let json = serde_json::to_string(&ApiErrorResponse::new("NOT_FOUND", "gone")).unwrap();
        assert!(!json.contains("details"));
        assert!(json.contains(r#""code":"NOT_FOUND""#));

        let error = ApiError::UserNotFound(12).to_response_body();
        assert_eq!(error.code, "USER_NOT_FOUND");
        assert_eq!(error.details.unwrap()["id"], 12);
    }

    #[test]
    fn test_error_class_status() {
        assert_eq!(ErrorClass::BadRequest.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorClass::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorClass::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorClass::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorClass::InternalError.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_store_conflict_is_bad_request() {
        let err: ApiError = StoreError::Conflict("owner@shop.test".into()).into();
        assert_eq!(err.class(), ErrorClass::BadRequest);
        assert_eq!(err.to_response_body().code, "EMAIL_TAKEN");

        let err: ApiError = StoreError::Backend("connection reset".into()).into();
        assert_eq!(err.class(), ErrorClass::InternalError);
    }

    #[test]
    fn test_internal_detail_not_exposed() {
        let err = ApiError::Internal("pool timed out".into());
        let body = err.to_response_body();
        assert!(!body.message.contains("pool"));
    }
}
