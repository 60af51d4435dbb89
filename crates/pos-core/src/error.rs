//! POS 시스템의 에러 타입.
//!
//! 계층별 에러(`StoreError`, API 에러 등)는 각 모듈에 정의되며,
//! 여기에는 크레이트 경계를 넘는 시작 단계 에러만 둡니다.

use thiserror::Error;

/// 핵심 POS 에러.
#[derive(Debug, Error)]
pub enum PosError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// POS 작업을 위한 Result 타입.
pub type PosResult<T> = Result<T, PosError>;

impl PosError {
    /// 프로세스를 시작할 수 없는 치명적인 에러인지 확인합니다.
    pub fn is_fatal(&self) -> bool {
        matches!(self, PosError::Config(_))
    }
}

impl From<config::ConfigError> for PosError {
    fn from(err: config::ConfigError) -> Self {
        PosError::Config(err.to_string())
    }
}
