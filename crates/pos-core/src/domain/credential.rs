//! 자격증명 레코드 및 저장소 추상화.
//!
//! 인증 코어는 영속성 계층을 [`CredentialStore`] trait을 통해서만 사용합니다.
//! 로그인 식별자(이메일)는 저장 시점에 소문자로 정규화되며,
//! 저장소는 정확히 일치하는 값으로 조회합니다.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Role, TenantScope};

/// 저장소에 보관된 사용자 자격증명.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// 사용자 ID (primary key)
    pub identity: i64,
    /// 소속 가맹점 ID
    pub tenant: i64,
    /// 기본 매장 ID (0 = 특정 매장에 묶이지 않음)
    pub location: i64,
    /// 표시 이름
    pub name: String,
    /// 로그인 식별자 (소문자 이메일)
    pub login_identifier: String,
    /// PHC 형식 비밀번호 해시
    #[serde(skip_serializing, default)]
    pub password_digest: String,
    /// 사용자 역할
    pub role: Role,
    /// 생성 시각 (Unix timestamp, 초)
    pub created_at: i64,
    /// 마지막 수정 시각 (Unix timestamp, 초)
    pub updated_at: i64,
}

impl CredentialRecord {
    /// 클라이언트에 노출 가능한 프로필로 변환.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.identity,
            email: self.login_identifier.clone(),
            name: self.name.clone(),
            merchant_id: self.tenant,
            def_outlet: self.location,
            role: self.role,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// 변경 사항을 적용합니다. 로그인 식별자와 비밀번호는 바뀌지 않습니다.
    pub fn apply(&mut self, changes: CredentialChanges, now: i64) {
        self.name = changes.name;
        self.location = changes.location;
        self.role = changes.role;
        self.updated_at = now;
    }
}

/// 사용자 프로필 (비밀번호 해시 제외).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub merchant_id: i64,
    pub def_outlet: i64,
    pub role: Role,
    pub created_at: i64,
    pub updated_at: i64,
}

/// 새 자격증명 입력.
#[derive(Debug, Clone)]
pub struct NewCredential {
    pub tenant: i64,
    pub location: i64,
    pub name: String,
    pub login_identifier: String,
    pub password_digest: String,
    pub role: Role,
}

impl NewCredential {
    /// 새 자격증명 생성.
    ///
    /// 로그인 식별자는 소문자로, 이름은 대문자로 정규화됩니다.
    pub fn new(
        tenant: i64,
        location: i64,
        name: &str,
        login_identifier: &str,
        password_digest: String,
        role: Role,
    ) -> Self {
        Self {
            tenant,
            location,
            name: name.trim().to_uppercase(),
            login_identifier: normalize_login_identifier(login_identifier),
            password_digest,
            role,
        }
    }
}

/// 기존 사용자 수정 입력.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialChanges {
    pub name: String,
    pub location: i64,
    pub role: Role,
}

impl CredentialChanges {
    /// 이름은 대문자로 정규화됩니다.
    pub fn new(name: &str, location: i64, role: Role) -> Self {
        Self {
            name: name.trim().to_uppercase(),
            location,
            role,
        }
    }
}

/// 사용자 목록 조회 조건.
///
/// 이름 오름차순으로 정렬한 뒤 `offset`만큼 건너뛰고 최대 `limit`개를 반환합니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFilter {
    /// 이름 부분 일치 검색어 (대소문자 무시)
    pub search: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

impl UserFilter {
    pub const DEFAULT_LIMIT: i64 = 10;
    pub const MAX_LIMIT: i64 = 100;

    /// 이름이 검색어를 포함하는지 확인.
    pub fn matches_name(&self, name: &str) -> bool {
        match &self.search {
            Some(search) => name.to_lowercase().contains(&search.to_lowercase()),
            None => true,
        }
    }
}

impl Default for UserFilter {
    fn default() -> Self {
        Self {
            search: None,
            limit: Self::DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

/// 로그인 식별자 정규화 (공백 제거 + 소문자).
pub fn normalize_login_identifier(identifier: &str) -> String {
    identifier.trim().to_lowercase()
}

/// 자격증명 저장소 에러.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("자격증명을 찾을 수 없습니다")]
    NotFound,
    #[error("이미 존재하는 자격증명: {0}")]
    Conflict(String),
    #[error("저장소 에러: {0}")]
    Backend(String),
    #[error("손상된 자격증명 레코드: {0}")]
    Corrupt(String),
}

/// 자격증명 저장소.
///
/// 각 메서드는 정확히 한 번의 저장소 읽기/쓰기를 수행합니다.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// 로그인 식별자로 조회. 식별자는 이미 정규화된 값이어야 합니다.
    async fn find_by_login_identifier(&self, identifier: &str)
        -> Result<CredentialRecord, StoreError>;

    /// 사용자 ID로 현재 레코드 조회.
    async fn find_by_identity(&self, identity: i64) -> Result<CredentialRecord, StoreError>;

    /// 새 자격증명 저장.
    async fn insert(&self, credential: NewCredential) -> Result<CredentialRecord, StoreError>;

    /// 가맹점 소속 사용자 목록.
    async fn list_by_tenant(
        &self,
        tenant: i64,
        filter: &UserFilter,
    ) -> Result<Vec<CredentialRecord>, StoreError>;

    /// 호출자 가맹점 소속 사용자 조회.
    ///
    /// 다른 가맹점의 사용자는 존재하지 않는 것과 같이 `NotFound`입니다.
    async fn find_by_identity_in_tenant(
        &self,
        identity: i64,
        scope: &TenantScope,
    ) -> Result<CredentialRecord, StoreError> {
        let record = self.find_by_identity(identity).await?;
        if scope.owns(record.tenant) {
            Ok(record)
        } else {
            Err(StoreError::NotFound)
        }
    }

    /// 호출자 가맹점 소속 사용자 수정. 대상이 없거나 다른 가맹점이면 `NotFound`.
    async fn update(
        &self,
        identity: i64,
        scope: &TenantScope,
        changes: CredentialChanges,
    ) -> Result<CredentialRecord, StoreError>;

    /// 호출자 가맹점 소속 사용자 삭제. 대상이 없거나 다른 가맹점이면 `NotFound`.
    async fn delete(&self, identity: i64, scope: &TenantScope) -> Result<(), StoreError>;
}
