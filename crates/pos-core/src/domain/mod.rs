//! POS 도메인 모델.

pub mod credential;
pub mod role;
pub mod tenant;

pub use credential::{
    normalize_login_identifier, CredentialChanges, CredentialRecord, CredentialStore,
    NewCredential, StoreError, UserFilter, UserProfile,
};
pub use role::Role;
pub use tenant::TenantScope;
