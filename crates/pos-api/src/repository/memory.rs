//! 인메모리 자격증명 저장소.
//!
//! 데이터베이스 없이 서버를 실행하거나 테스트할 때 사용합니다.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use pos_core::{
    CredentialChanges, CredentialRecord, CredentialStore, NewCredential, StoreError, TenantScope,
    UserFilter,
};
use tokio::sync::RwLock;

#[derive(Default)]
struct Inner {
    records: BTreeMap<i64, CredentialRecord>,
    next_id: i64,
}

/// `RwLock<BTreeMap>` 기반 저장소.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    inner: RwLock<Inner>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 레코드를 그대로 저장합니다 (같은 ID가 있으면 교체).
    #[cfg(test)]
    pub(crate) async fn put(&self, record: CredentialRecord) {
        let mut inner = self.inner.write().await;
        inner.next_id = inner.next_id.max(record.identity);
        inner.records.insert(record.identity, record);
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_login_identifier(
        &self,
        identifier: &str,
    ) -> Result<CredentialRecord, StoreError> {
        self.inner
            .read()
            .await
            .records
            .values()
            .find(|r| r.login_identifier == identifier)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn find_by_identity(&self, identity: i64) -> Result<CredentialRecord, StoreError> {
        self.inner
            .read()
            .await
            .records
            .get(&identity)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn insert(&self, credential: NewCredential) -> Result<CredentialRecord, StoreError> {
        let mut inner = self.inner.write().await;
        if inner
            .records
            .values()
            .any(|r| r.login_identifier == credential.login_identifier)
        {
            return Err(StoreError::Conflict(credential.login_identifier));
        }

        let now = Utc::now().timestamp();
        inner.next_id += 1;
        let record = CredentialRecord {
            identity: inner.next_id,
            tenant: credential.tenant,
            location: credential.location,
            name: credential.name,
            login_identifier: credential.login_identifier,
            password_digest: credential.password_digest,
            role: credential.role,
            created_at: now,
            updated_at: now,
        };
        inner.records.insert(record.identity, record.clone());
        Ok(record)
    }

    async fn list_by_tenant(
        &self,
        tenant: i64,
        filter: &UserFilter,
    ) -> Result<Vec<CredentialRecord>, StoreError> {
        let inner = self.inner.read().await;
        let mut records: Vec<_> = inner
            .records
            .values()
            .filter(|r| r.tenant == tenant && filter.matches_name(&r.name))
            .cloned()
            .collect();
        records.sort_by(|a, b| a.name.cmp(&b.name).then(a.identity.cmp(&b.identity)));

        Ok(records
            .into_iter()
            .skip(usize::try_from(filter.offset).unwrap_or(0))
            .take(usize::try_from(filter.limit).unwrap_or(0))
            .collect())
    }

    async fn update(
        &self,
        identity: i64,
        scope: &TenantScope,
        changes: CredentialChanges,
    ) -> Result<CredentialRecord, StoreError> {
        let mut inner = self.inner.write().await;
        let record = inner
            .records
            .get_mut(&identity)
            .filter(|r| scope.owns(r.tenant))
            .ok_or(StoreError::NotFound)?;

        record.apply(changes, Utc::now().timestamp());
        Ok(record.clone())
    }

    async fn delete(&self, identity: i64, scope: &TenantScope) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        match inner.records.get(&identity) {
            Some(record) if scope.owns(record.tenant) => {
                inner.records.remove(&identity);
                Ok(())
            }
            _ => Err(StoreError::NotFound),
        }
    }
}
