use crate::model::text_enum;
use serde::{Deserialize, Serialize};

text_enum! {
    /// 사용자 역할
    pub enum UserType: "user_type" {
        Buyer => "buyer",
        Seller => "seller",
        Mechanic => "mechanic",
        AuctionManager => "auction_manager",
        Admin => "admin",
    }
}

// 사용자 모델 (이 서비스에서는 읽기 전용)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub door_no: Option<String>,
    pub street: Option<String>,
    #[sqlx(try_from = "String")]
    pub user_type: UserType,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn summary(&self) -> SellerSummary {
        SellerSummary {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
        }
    }

    /// 주소 정보가 없으면 None
    pub fn address(&self) -> Option<String> {
        match (&self.door_no, &self.street) {
            (Some(door_no), Some(street)) => Some(format!(
                "{}, {}, {}, {}",
                door_no,
                street,
                self.city.as_deref().unwrap_or_default(),
                self.state.as_deref().unwrap_or_default()
            )),
            _ => None,
        }
    }
}

/// 목록 응답에 붙는 판매자 정보
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerSummary {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}
