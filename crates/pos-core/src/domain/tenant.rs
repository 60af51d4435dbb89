//! 테넌트 격리 범위.

use serde::{Deserialize, Serialize};

/// 요청 단위 데이터 격리 범위.
///
/// 항상 서버가 서명한 토큰에서 파생되며 클라이언트 입력에서 만들어지지 않습니다.
/// 격리 경계는 `merchant_id`이고, 매장은 참고 정보입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantScope {
    pub merchant_id: i64,
    pub outlet_id: Option<i64>,
}

impl TenantScope {
    /// 가맹점 ID와 기본 매장 ID로 생성. `location == 0`은 매장 미지정입니다.
    pub fn new(merchant_id: i64, location: i64) -> Self {
        Self {
            merchant_id,
            outlet_id: (location != 0).then_some(location),
        }
    }

    /// 주어진 가맹점 소속 데이터인지 확인.
    pub fn owns(&self, merchant_id: i64) -> bool {
        self.merchant_id == merchant_id
    }
}
