//! 인증 및 권한 부여.
//!
//! JWT 기반 인증과 단일 역할 기반 접근 제어를 제공합니다.
//!
//! # 구성 요소
//!
//! - [`password`]: Argon2id 비밀번호 해싱
//! - [`TokenCodec`]: 클레임 세트 ↔ 서명된 JWT
//! - [`SessionManager`]: 로그인, 토큰 재발급
//! - [`AccessGate`]: 역할/fresh 요구사항 검사 및 Axum 추출기
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! async fn list_users(CallerAuth(claims): CallerAuth) -> impl IntoResponse {
//!     format!("merchant {}", claims.tenant_scope().merchant_id)
//! }
//! ```

mod error;
mod jwt;
mod middleware;
pub mod password;
mod session;

pub use error::AuthError;
pub use jwt::{ClaimDraft, ClaimSet, IssuedToken, TokenCodec, TokenError, TokenKind};
pub use middleware::{extract_bearer_token, AccessGate, CallerAuth, FreshOwnerAuth, OwnerAuth};
pub use password::{hash_password, validate_password_strength, verify_password, PasswordError};
pub use session::{LoginSession, RefreshedSession, SessionLifetimes, SessionManager};
