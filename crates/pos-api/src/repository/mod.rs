//! 자격증명 저장소 구현.
//!
//! 두 구현 모두 `pos_core::CredentialStore`를 구현합니다.

pub mod memory;
pub mod users;

pub use memory::InMemoryCredentialStore;
pub use users::PgCredentialStore;
