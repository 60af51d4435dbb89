//! JWT 토큰 처리.
//!
//! 클레임 세트를 서명된 compact JWT로 인코딩하고, 검증 후 다시 디코딩합니다.
//!
//! 페이로드 키는 고정되어 있습니다:
//! `identity`, `name`, `roles`, `exp`, `type`, `fresh`, `merchant`, `outlet`.
//! `roles`는 복수형 키이지만 단일 역할 값을 담습니다.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, decode_header, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header,
    Validation,
};
use pos_core::{Role, SigningSecret, TenantScope};
use serde::{Deserialize, Deserializer, Serialize};

/// 토큰 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    /// 비즈니스 API 호출용
    Access,
    /// Access Token 재발급 전용
    Refresh,
}

/// JWT 페이로드이자 요청 단위 호출자 컨텍스트.
///
/// 서명 이후에는 변경되지 않습니다. 새 값은 저장소에서 다시 파생(refresh)하거나
/// 재로그인해야만 얻을 수 있습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSet {
    /// 사용자 ID
    #[serde(deserialize_with = "whole_number")]
    pub identity: i64,
    /// 표시 이름
    pub name: String,
    /// 사용자 역할 (단일 값)
    #[serde(rename = "roles")]
    pub role: Role,
    /// 가맹점 ID
    #[serde(rename = "merchant", deserialize_with = "whole_number")]
    pub tenant: i64,
    /// 기본 매장 ID (0 = 미지정)
    #[serde(rename = "outlet", deserialize_with = "whole_number")]
    pub location: i64,
    /// 토큰 종류
    #[serde(rename = "type")]
    pub token_kind: TokenKind,
    /// 비밀번호 로그인 직후 발급 여부
    pub fresh: bool,
    /// 만료 시각 (Unix timestamp, 초)
    #[serde(rename = "exp", deserialize_with = "whole_number")]
    pub expires_at: i64,
}

impl ClaimSet {
    /// 클레임에서 테넌트 격리 범위를 파생합니다.
    pub fn tenant_scope(&self) -> TenantScope {
        TenantScope::new(self.tenant, self.location)
    }

    /// 만료 여부 확인.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.expires_at
    }
}

/// 만료 시각이 정해지기 전의 클레임.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimDraft {
    pub identity: i64,
    pub name: String,
    pub role: Role,
    pub tenant: i64,
    pub location: i64,
    pub token_kind: TokenKind,
    pub fresh: bool,
    /// 인코딩 시점부터의 수명
    pub lifetime: Duration,
}

impl ClaimDraft {
    fn stamp(self, now: chrono::DateTime<Utc>) -> ClaimSet {
        ClaimSet {
            identity: self.identity,
            name: self.name,
            role: self.role,
            tenant: self.tenant,
            location: self.location,
            token_kind: self.token_kind,
            fresh: self.fresh,
            expires_at: (now + self.lifetime).timestamp(),
        }
    }
}

/// 발급된 토큰과 그 클레임.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: ClaimSet,
}

/// JWT 처리 에러.
///
/// `Signing`을 제외한 모든 변형은 호출자에게 동일한 "invalid token"으로 보고됩니다.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,
    #[error("invalid token")]
    Invalid,
    #[error("claim mapping failed")]
    ClaimMapping,
    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// 토큰 코덱.
///
/// 서명 키는 생성 시 주입되며 프로세스 수명 동안 변경되지 않습니다.
/// 검증은 상태를 갖지 않으므로 `Arc`로 공유하여 동시에 사용할 수 있습니다.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    /// 서명 알고리즘.
    pub const ALGORITHM: Algorithm = Algorithm::HS256;

    /// 서명 키로 코덱 생성.
    pub fn new(secret: &SigningSecret) -> Self {
        // HMAC 계열만 허용하고, 만료 판정에 여유 시간을 두지 않는다.
        let mut validation = Validation::new(Self::ALGORITHM);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// 만료 시각을 찍고 서명합니다 (`exp = now + lifetime`).
    pub fn issue(&self, draft: ClaimDraft) -> Result<IssuedToken, TokenError> {
        let claims = draft.stamp(Utc::now());
        let token = self.encode(&claims)?;
        Ok(IssuedToken { token, claims })
    }

    /// 클레임 세트를 그대로 서명합니다.
    pub fn encode(&self, claims: &ClaimSet) -> Result<String, TokenError> {
        encode(&Header::new(Self::ALGORITHM), claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// 서명, 알고리즘, 만료를 검증한 뒤 전체 클레임을 한 번에 디코딩합니다.
    ///
    /// 필드가 하나라도 없거나 타입이 다르면 [`TokenError::ClaimMapping`]을 반환하며,
    /// 부분적인 클레임은 반환하지 않습니다.
    pub fn decode_and_verify(&self, token: &str) -> Result<ClaimSet, TokenError> {
        decode_header(token).map_err(|_| TokenError::Invalid)?;

        let data = decode::<ClaimSet>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::Json(_) | ErrorKind::MissingRequiredClaim(_) => {
                    TokenError::ClaimMapping
                }
                _ => TokenError::Invalid,
            },
        )?;

        // leeway 0에서도 exp == now는 통과하므로 한 번 더 확인한다.
        if data.claims.is_expired() {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithms", &self.validation.algorithms)
            .finish_non_exhaustive()
    }
}

/// 정수 또는 소수부가 0인 실수를 `i64`로 읽습니다.
///
/// 일부 JWT 라이브러리는 모든 숫자를 실수로 기록하므로 `7.0`도 허용합니다.
fn whole_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    struct WholeNumber;

    impl serde::de::Visitor<'_> for WholeNumber {
        type Value = i64;

        fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("a whole number")
        }

        fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<i64, E> {
            Ok(v)
        }

        fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<i64, E> {
            i64::try_from(v).map_err(|_| E::custom("number out of range"))
        }

        fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<i64, E> {
            if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
                Ok(v as i64)
            } else {
                Err(E::custom("expected a whole number"))
            }
        }
    }

    deserializer.deserialize_any(WholeNumber)
}
