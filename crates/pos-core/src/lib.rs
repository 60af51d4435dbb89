//! # POS Core
//!
//! POS 백오피스의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 시스템 전반에서 사용되는 기본 타입을 제공합니다:
//! - 사용자 역할 ([`Role`])
//! - 자격증명 레코드 및 저장소 추상화 ([`CredentialStore`])
//! - 테넌트(merchant) 격리 범위 ([`TenantScope`])
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;

pub use self::config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
