//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! 모든 필드가 `Arc` 또는 저렴하게 복제되는 핸들이므로 `AppState` 자체를
//! 라우터 상태로 사용합니다.

use std::sync::Arc;

use axum::extract::FromRef;
use chrono::{DateTime, Utc};
use pos_core::{CredentialStore, SigningSecret};
use sqlx::PgPool;

use crate::auth::{SessionLifetimes, SessionManager, TokenCodec};

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 토큰 코덱 - 접근 제어 추출기가 사용
    pub codec: Arc<TokenCodec>,

    /// 세션 관리자 - 로그인, 토큰 재발급
    pub sessions: Arc<SessionManager>,

    /// 자격증명 저장소
    pub store: Arc<dyn CredentialStore>,

    /// 데이터베이스 연결 풀 (인메모리 저장소 사용 시 None)
    pub db_pool: Option<PgPool>,

    /// 서버 시작 시간
    pub started_at: DateTime<Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 새 AppState 생성.
    ///
    /// 서명 키는 여기서 한 번 코덱에 주입되며 이후 변경되지 않습니다.
    pub fn new(
        secret: &SigningSecret,
        store: Arc<dyn CredentialStore>,
        lifetimes: SessionLifetimes,
    ) -> Self {
        let codec = Arc::new(TokenCodec::new(secret));
        let sessions = Arc::new(SessionManager::new(store.clone(), codec.clone(), lifetimes));

        Self {
            codec,
            sessions,
            store,
            db_pool: None,
            started_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 데이터베이스 연결 풀 설정 (readiness 체크용).
    pub fn with_db_pool(mut self, pool: PgPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// 서버 업타임(초).
    pub fn uptime_secs(&self) -> i64 {
        Utc::now().signed_duration_since(self.started_at).num_seconds()
    }

    /// 데이터베이스 연결 상태 확인.
    pub async fn is_db_healthy(&self) -> bool {
        match &self.db_pool {
            Some(pool) => sqlx::query("SELECT 1").fetch_one(pool).await.is_ok(),
            None => false,
        }
    }
}

impl FromRef<AppState> for Arc<TokenCodec> {
    fn from_ref(state: &AppState) -> Self {
        state.codec.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryCredentialStore;

    #[tokio::test]
    async fn test_new_state_without_database() {
        let secret = SigningSecret::new("state-test-secret").unwrap();
        let state = AppState::new(
            &secret,
            Arc::new(InMemoryCredentialStore::new()),
            SessionLifetimes::default(),
        );

        assert!(state.db_pool.is_none());
        assert!(!state.is_db_healthy().await);
        assert!(state.uptime_secs() >= 0);
        assert!(!state.version.is_empty());

        let codec = Arc::<TokenCodec>::from_ref(&state);
        assert!(Arc::ptr_eq(&codec, &state.codec));
    }
}
