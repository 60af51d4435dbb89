//! 사용자 역할.
//!
//! 권한 판정은 단일 역할의 일치 여부로 이루어집니다 (역할 집합이 아님).

use serde::{Deserialize, Serialize};

/// 사용자 역할.
///
/// 고정된 닫힌 집합입니다. 문자열 비교 대신 열거형을 사용하여
/// 오타로 인한 권한 우회를 막습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// 가맹점 소유자 - 사용자/매장/상품 관리
    Owner,
    /// 직원 - 판매 업무
    Employee,
    /// 고객
    Customer,
}

impl Role {
    /// 사용 가능한 모든 역할.
    pub const ALL: [Role; 3] = [Role::Owner, Role::Employee, Role::Customer];

    /// 와이어/DB 표현 문자열.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Employee => "employee",
            Role::Customer => "customer",
        }
    }

    /// 문자열에서 역할 파싱 (대소문자 무시).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "owner" => Some(Role::Owner),
            "employee" => Some(Role::Employee),
            "customer" => Some(Role::Customer),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
