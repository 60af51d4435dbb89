//! 설정 관리.
//!
//! 이 모듈은 애플리케이션 설정을 정의하고 관리합니다.
//! 서명 키는 설정 파일이 아닌 `POS_SECRET_KEY` 환경 변수에서만 로드됩니다.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{PosError, PosResult};

/// 서명 키 환경 변수 이름.
pub const SECRET_KEY_ENV: &str = "POS_SECRET_KEY";

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// 서버 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// 데이터베이스 설정
    #[serde(default)]
    pub database: DatabaseConfig,
    /// 인증 설정
    #[serde(default)]
    pub auth: AuthConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
    /// 요청 타임아웃 (초)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// 데이터베이스 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// 연결 URL (없으면 인메모리 저장소 사용)
    #[serde(default)]
    pub url: Option<String>,
    /// 최대 연결 수
    pub max_connections: u32,
    /// 연결 타임아웃 (초)
    pub connection_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            connection_timeout_secs: 10,
        }
    }
}

/// 인증 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Access Token 수명 (분)
    pub access_token_minutes: i64,
    /// Refresh Token 수명 (일)
    pub refresh_token_days: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_minutes: 60,
            refresh_token_days: 15,
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값과 `POS__*` 환경 변수만 사용합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> PosResult<Self> {
        let builder = config::Config::builder()
            // 기본값으로 시작
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("database.max_connections", 10)?
            .set_default("database.connection_timeout_secs", 10)?
            .set_default("auth.access_token_minutes", 60)?
            .set_default("auth.refresh_token_days", 15)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()).required(false))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("POS")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> PosResult<Self> {
        Self::load("config/default.toml")
    }
}

/// 토큰 서명 키.
///
/// 프로세스 시작 시 한 번 생성되어 토큰 코덱에 주입됩니다.
/// 비어 있는 값으로는 생성할 수 없습니다.
#[derive(Clone)]
pub struct SigningSecret(SecretString);

impl SigningSecret {
    /// 주어진 값으로 서명 키 생성.
    pub fn new(value: impl Into<String>) -> Result<Self, PosError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(PosError::Config(format!(
                "서명 키는 비어 있을 수 없습니다. {} 환경 변수를 설정하세요",
                SECRET_KEY_ENV
            )));
        }
        Ok(Self(SecretString::new(value.into())))
    }

    /// `POS_SECRET_KEY` 환경 변수에서 로드.
    pub fn from_env() -> Result<Self, PosError> {
        let value = std::env::var(SECRET_KEY_ENV).map_err(|_| {
            PosError::Config(format!("{} 환경 변수가 설정되지 않았습니다", SECRET_KEY_ENV))
        })?;
        Self::new(value)
    }

    /// 서명에 사용할 원시 바이트.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.expose_secret().as_bytes()
    }
}

impl std::fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningSecret([REDACTED])")
    }
}
