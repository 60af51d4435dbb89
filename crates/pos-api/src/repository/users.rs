//! 사용자 자격증명 저장소 (PostgreSQL).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pos_core::{
    CredentialChanges, CredentialRecord, CredentialStore, NewCredential, Role, StoreError,
    TenantScope, UserFilter,
};
use sqlx::PgPool;

/// `users` 테이블 row.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    merchant_id: i64,
    def_outlet: i64,
    name: String,
    email: String,
    password: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for CredentialRecord {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = Role::parse(&row.role).ok_or_else(|| {
            StoreError::Corrupt(format!("user {} has unknown role '{}'", row.id, row.role))
        })?;

        Ok(CredentialRecord {
            identity: row.id,
            tenant: row.merchant_id,
            location: row.def_outlet,
            name: row.name,
            login_identifier: row.email,
            password_digest: row.password,
            role,
            created_at: row.created_at.timestamp(),
            updated_at: row.updated_at.timestamp(),
        })
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

/// PostgreSQL 기반 자격증명 저장소.
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str =
    "id, merchant_id, def_outlet, name, email, password, role, created_at, updated_at";

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_login_identifier(
        &self,
        identifier: &str,
    ) -> Result<CredentialRecord, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(identifier)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?
            .ok_or(StoreError::NotFound)?;

        row.try_into()
    }

    async fn find_by_identity(&self, identity: i64) -> Result<CredentialRecord, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(identity)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?
            .ok_or(StoreError::NotFound)?;

        row.try_into()
    }

    async fn insert(&self, credential: NewCredential) -> Result<CredentialRecord, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (merchant_id, def_outlet, name, email, password, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(credential.tenant)
        .bind(credential.location)
        .bind(&credential.name)
        .bind(&credential.login_identifier)
        .bind(&credential.password_digest)
        .bind(credential.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Conflict(credential.login_identifier.clone())
            }
            other => backend(other),
        })?;

        row.try_into()
    }

    async fn list_by_tenant(
        &self,
        tenant: i64,
        filter: &UserFilter,
    ) -> Result<Vec<CredentialRecord>, StoreError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE merchant_id = $1
              AND ($2::TEXT IS NULL OR name ILIKE '%' || $2 || '%')
            ORDER BY name ASC, id ASC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(tenant)
        .bind(filter.search.as_deref())
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        rows.into_iter().map(CredentialRecord::try_from).collect()
    }

    async fn update(
        &self,
        identity: i64,
        scope: &TenantScope,
        changes: CredentialChanges,
    ) -> Result<CredentialRecord, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
            SET name = $3, def_outlet = $4, role = $5, updated_at = NOW()
            WHERE id = $1 AND merchant_id = $2
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(identity)
        .bind(scope.merchant_id)
        .bind(&changes.name)
        .bind(changes.location)
        .bind(changes.role.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?
        .ok_or(StoreError::NotFound)?;

        row.try_into()
    }

    async fn delete(&self, identity: i64, scope: &TenantScope) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1 AND merchant_id = $2")
            .bind(identity)
            .bind(scope.merchant_id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
