//! 로그인 및 토큰 재발급.
//!
//! 비밀번호 로그인은 fresh Access Token과 Refresh Token 쌍을 발급하고,
//! 재발급은 저장소의 현재 레코드에서 클레임을 다시 파생하여 non-fresh Access Token을 발급합니다.

use std::sync::Arc;

use chrono::Duration;
use pos_core::{
    normalize_login_identifier, AuthConfig, CredentialRecord, CredentialStore, StoreError,
    UserProfile,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{
    password::{verify_dummy, verify_password},
    AuthError, ClaimDraft, TokenCodec, TokenKind,
};

/// 토큰 수명.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLifetimes {
    /// Access Token 수명 (기본 60분)
    pub access: Duration,
    /// Refresh Token 수명 (기본 15일)
    pub refresh: Duration,
}

impl Default for SessionLifetimes {
    fn default() -> Self {
        Self {
            access: Duration::minutes(60),
            refresh: Duration::days(15),
        }
    }
}

impl From<&AuthConfig> for SessionLifetimes {
    fn from(config: &AuthConfig) -> Self {
        Self {
            access: Duration::minutes(config.access_token_minutes),
            refresh: Duration::days(config.refresh_token_days),
        }
    }
}

/// 로그인 결과.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginSession {
    pub profile: UserProfile,
    pub access_token: String,
    pub refresh_token: String,
    /// Access Token 만료 시각 (Unix timestamp)
    pub expires_at: i64,
}

/// 재발급 결과.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshedSession {
    pub access_token: String,
    /// Access Token 만료 시각 (Unix timestamp)
    pub expires_at: i64,
}

/// 세션 관리자.
pub struct SessionManager {
    store: Arc<dyn CredentialStore>,
    codec: Arc<TokenCodec>,
    lifetimes: SessionLifetimes,
}

impl SessionManager {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        codec: Arc<TokenCodec>,
        lifetimes: SessionLifetimes,
    ) -> Self {
        Self {
            store,
            codec,
            lifetimes,
        }
    }

    pub fn lifetimes(&self) -> SessionLifetimes {
        self.lifetimes
    }

    /// 비밀번호 로그인.
    ///
    /// 계정이 없거나 비밀번호가 틀리면 모두 [`AuthError::InvalidCredentials`]를 반환합니다.
    /// 계정이 없어도 더미 해시로 검증을 수행하여 응답 시간을 맞춥니다.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<LoginSession, AuthError> {
        let identifier = normalize_login_identifier(identifier);

        let record = match self.store.find_by_login_identifier(&identifier).await {
            Ok(record) => Some(record),
            Err(StoreError::NotFound) => None,
            Err(e) => return Err(AuthError::Store(e)),
        };

        let digest = record.as_ref().map(|r| r.password_digest.clone());
        let password = password.to_owned();
        let verified = tokio::task::spawn_blocking(move || match digest {
            Some(digest) => verify_password(&password, &digest),
            None => {
                verify_dummy(&password);
                false
            }
        })
        .await
        .map_err(|e| AuthError::Internal(e.to_string()))?;

        let record = match record {
            Some(record) if verified => record,
            Some(record) => {
                debug!(identity = record.identity, "Login rejected: password mismatch");
                return Err(AuthError::InvalidCredentials);
            }
            None => {
                debug!("Login rejected: unknown identifier");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let access = self
            .codec
            .issue(self.claims_for(&record, TokenKind::Access, true))?;
        let refresh = self
            .codec
            .issue(self.claims_for(&record, TokenKind::Refresh, false))?;

        info!(
            identity = record.identity,
            tenant = record.tenant,
            role = %record.role,
            "User logged in"
        );

        Ok(LoginSession {
            profile: record.profile(),
            access_token: access.token,
            refresh_token: refresh.token,
            expires_at: access.claims.expires_at,
        })
    }

    /// Refresh Token으로 Access Token 재발급.
    ///
    /// 토큰의 클레임을 복사하지 않고 저장소의 현재 레코드에서 다시 파생하므로
    /// 역할/가맹점 변경이 즉시 반영됩니다. 재발급된 토큰은 항상 non-fresh입니다.
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshedSession, AuthError> {
        let claims = self.codec.decode_and_verify(refresh_token).map_err(|e| {
            debug!(reason = %e, "Refresh rejected: token did not verify");
            AuthError::from(e)
        })?;

        if claims.token_kind != TokenKind::Refresh {
            debug!(identity = claims.identity, "Refresh rejected: not a refresh token");
            return Err(AuthError::NotRefreshToken);
        }

        let record = match self.store.find_by_identity(claims.identity).await {
            Ok(record) => record,
            Err(StoreError::NotFound) => {
                debug!(identity = claims.identity, "Refresh rejected: identity no longer exists");
                return Err(AuthError::UnknownIdentity);
            }
            Err(e) => return Err(AuthError::Store(e)),
        };

        let access = self
            .codec
            .issue(self.claims_for(&record, TokenKind::Access, false))?;

        info!(
            identity = record.identity,
            tenant = record.tenant,
            role = %record.role,
            "Access token refreshed"
        );

        Ok(RefreshedSession {
            access_token: access.token,
            expires_at: access.claims.expires_at,
        })
    }

    /// 레코드에서 클레임 초안 생성. 수명은 토큰 종류에 따라 결정됩니다.
    pub fn claims_for(&self, record: &CredentialRecord, kind: TokenKind, fresh: bool) -> ClaimDraft {
        let lifetime = match kind {
            TokenKind::Access => self.lifetimes.access,
            TokenKind::Refresh => self.lifetimes.refresh,
        };

        ClaimDraft {
            identity: record.identity,
            name: record.name.clone(),
            role: record.role,
            tenant: record.tenant,
            location: record.location,
            token_kind: kind,
            fresh,
            lifetime,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{hash_password, ClaimSet, TokenError};
    use crate::repository::InMemoryCredentialStore;
    use chrono::Utc;
    use pos_core::{CredentialChanges, NewCredential, Role, SigningSecret, TenantScope};

    const TEST_SECRET: &str = "session-test-secret-key-minimum-32-chars";

    struct Fixture {
        store: Arc<InMemoryCredentialStore>,
        codec: Arc<TokenCodec>,
        sessions: SessionManager,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(InMemoryCredentialStore::new());
        store
            .insert(NewCredential::new(
                7,
                0,
                "budi",
                "owner@shop.test",
                hash_password("secret123").unwrap(),
                Role::Owner,
            ))
            .await
            .unwrap();

        let codec = Arc::new(TokenCodec::new(&SigningSecret::new(TEST_SECRET).unwrap()));
        let sessions = SessionManager::new(
            store.clone(),
            codec.clone(),
            SessionLifetimes::default(),
        );

        Fixture {
            store,
            codec,
            sessions,
        }
    }

    fn decode(codec: &TokenCodec, token: &str) -> ClaimSet {
        codec.decode_and_verify(token).unwrap()
    }

    #[tokio::test]
    async fn test_login_issues_fresh_access_and_refresh_pair() {
        let f = fixture().await;
        let session = f.sessions.login("owner@shop.test", "secret123").await.unwrap();

        let access = decode(&f.codec, &session.access_token);
        assert_eq!(access.token_kind, TokenKind::Access);
        assert!(access.fresh);
        assert_eq!(access.role, Role::Owner);
        assert_eq!(access.tenant, 7);
        assert_eq!(access.location, 0);
        assert_eq!(access.name, "BUDI");
        assert_eq!(session.expires_at, access.expires_at);

        let now = Utc::now().timestamp();
        assert!((access.expires_at - (now + 3600)).abs() <= 2);

        let refresh = decode(&f.codec, &session.refresh_token);
        assert_eq!(refresh.token_kind, TokenKind::Refresh);
        assert!(!refresh.fresh);
        assert_eq!(refresh.identity, access.identity);
        assert!((refresh.expires_at - (now + 15 * 86400)).abs() <= 2);

        assert_eq!(session.profile.email, "owner@shop.test");
        assert_eq!(session.profile.merchant_id, 7);
    }

    #[tokio::test]
    async fn test_login_identifier_is_case_insensitive() {
        let f = fixture().await;
        assert!(f.sessions.login("  Owner@Shop.TEST ", "secret123").await.is_ok());
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_are_indistinguishable() {
        let f = fixture().await;
        let wrong_password = f
            .sessions
            .login("owner@shop.test", "secret124")
            .await
            .unwrap_err();
        let unknown = f
            .sessions
            .login("nobody@shop.test", "secret123")
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert_eq!(
            wrong_password.to_response_body().message,
            unknown.to_response_body().message
        );
    }

    #[tokio::test]
    async fn test_refresh_issues_non_fresh_access() {
        let f = fixture().await;
        let session = f.sessions.login("owner@shop.test", "secret123").await.unwrap();

        let refreshed = f.sessions.refresh(&session.refresh_token).await.unwrap();
        let access = decode(&f.codec, &refreshed.access_token);
        assert_eq!(access.token_kind, TokenKind::Access);
        assert!(!access.fresh);
        assert_eq!(access.tenant, 7);
        assert_eq!(refreshed.expires_at, access.expires_at);
    }

    #[tokio::test]
    async fn test_refresh_rejects_access_token() {
        let f = fixture().await;
        let session = f.sessions.login("owner@shop.test", "secret123").await.unwrap();

        let err = f.sessions.refresh(&session.access_token).await.unwrap_err();
        assert!(matches!(err, AuthError::NotRefreshToken));
    }

    #[tokio::test]
    async fn test_refresh_picks_up_role_change() {
        let f = fixture().await;
        f.store
            .put(CredentialRecord {
                identity: 42,
                tenant: 7,
                location: 3,
                name: "SITI".to_string(),
                login_identifier: "siti@shop.test".to_string(),
                password_digest: hash_password("kasir42").unwrap(),
                role: Role::Employee,
                created_at: 0,
                updated_at: 0,
            })
            .await;

        let session = f.sessions.login("siti@shop.test", "kasir42").await.unwrap();
        assert_eq!(decode(&f.codec, &session.access_token).role, Role::Employee);

        f.store
            .update(
                42,
                &TenantScope::new(7, 3),
                CredentialChanges::new("siti", 3, Role::Owner),
            )
            .await
            .unwrap();

        let refreshed = f.sessions.refresh(&session.refresh_token).await.unwrap();
        let access = decode(&f.codec, &refreshed.access_token);
        assert_eq!(access.identity, 42);
        assert_eq!(access.role, Role::Owner);
        assert!(!access.fresh);
    }

    #[tokio::test]
    async fn test_refresh_for_deleted_user() {
        let f = fixture().await;
        let session = f.sessions.login("owner@shop.test", "secret123").await.unwrap();
        let identity = session.profile.id;
        f.store
            .delete(identity, &TenantScope::new(7, 0))
            .await
            .unwrap();

        let err = f.sessions.refresh(&session.refresh_token).await.unwrap_err();
        assert!(matches!(err, AuthError::UnknownIdentity));
    }

    #[tokio::test]
    async fn test_refresh_rejects_expired_token() {
        let f = fixture().await;
        let record = f.store.find_by_identity(1).await.unwrap();
        let mut draft = f.sessions.claims_for(&record, TokenKind::Refresh, false);
        draft.lifetime = Duration::seconds(-10);
        let expired = f.codec.issue(draft).unwrap();

        let err = f.sessions.refresh(&expired.token).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(TokenError::Expired)));
    }

    #[test]
    fn test_lifetimes_from_config() {
        let lifetimes = SessionLifetimes::from(&AuthConfig {
            access_token_minutes: 5,
            refresh_token_days: 1,
        });
        assert_eq!(lifetimes.access, Duration::minutes(5));
        assert_eq!(lifetimes.refresh, Duration::days(1));
        assert_eq!(
            SessionLifetimes::default(),
            SessionLifetimes::from(&AuthConfig::default())
        );
    }
}
