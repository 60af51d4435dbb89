//! 비밀번호 해싱 유틸리티.
//!
//! Argon2id 기반 비밀번호 해싱 및 검증.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use once_cell::sync::Lazy;

/// 비밀번호 최소 길이.
pub const MIN_PASSWORD_LEN: usize = 3;
/// 비밀번호 최대 길이.
pub const MAX_PASSWORD_LEN: usize = 20;

/// 비밀번호 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("비밀번호 해싱 실패")]
    HashingFailed,
}

/// 존재하지 않는 계정 로그인 시 검증에 사용하는 해시.
///
/// 계정 존재 여부와 관계없이 Argon2 검증 비용을 동일하게 지불하기 위함입니다.
static DUMMY_DIGEST: Lazy<String> =
    Lazy::new(|| hash_password("pos-dummy-password").unwrap_or_default());

/// 비밀번호 해싱.
///
/// 호출마다 새 솔트를 생성하며, 솔트는 PHC 문자열에 포함됩니다.
///
/// # Returns
///
/// PHC 형식의 해시 문자열 (`$argon2id$v=19$...`)
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| PasswordError::HashingFailed)?;

    Ok(hash.to_string())
}

/// 비밀번호 검증.
///
/// 비교는 argon2 크레이트의 상수 시간 비교로 수행됩니다.
/// 불일치하거나 해시 형식이 잘못된 경우 `false`를 반환하며 에러를 내지 않습니다.
pub fn verify_password(password: &str, digest: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(digest) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// 결과를 버리는 검증을 수행합니다.
pub fn verify_dummy(password: &str) {
    let _ = verify_password(password, &DUMMY_DIGEST);
}

/// 비밀번호 길이 검증.
///
/// 등록 시 [`MIN_PASSWORD_LEN`]..=[`MAX_PASSWORD_LEN`] 문자를 요구합니다.
pub fn validate_password_strength(password: &str) -> Result<(), String> {
    let len = password.chars().count();
    if !(MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&len) {
        return Err(format!(
            "password must be {}-{} characters",
            MIN_PASSWORD_LEN, MAX_PASSWORD_LEN
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_password() {
        let password = "secret123";
        let hash = hash_password(password).unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password(password, &hash));
        assert!(!verify_password("secret124", &hash));
    }

    #[test]
    fn test_salt_differs_per_call() {
        let hash1 = hash_password("secret123").unwrap();
        let hash2 = hash_password("secret123").unwrap();

        assert_ne!(hash1, hash2);
        assert!(verify_password("secret123", &hash1));
        assert!(verify_password("secret123", &hash2));
    }

    #[test]
    fn test_malformed_digest_is_false() {
        assert!(!verify_password("password", "not-a-valid-hash"));
        assert!(!verify_password("password", ""));
    }

    #[test]
    fn test_dummy_digest_is_valid_phc() {
        assert!(DUMMY_DIGEST.starts_with("$argon2id$"));
        verify_dummy("anything");
    }

    #[test]
    fn test_password_strength_validation() {
        assert!(validate_password_strength("abc").is_ok());
        assert!(validate_password_strength("secret123").is_ok());
        assert!(validate_password_strength("ab").is_err());
        assert!(validate_password_strength("").is_err());
        assert!(validate_password_strength("this-password-is-way-too-long").is_err());
    }

    #[test]
    fn test_unicode_password() {
        let password = "kata sandi 123";
        let hash = hash_password(password).unwrap();
        assert!(verify_password(password, &hash));
    }
}
