use crate::model::text_enum;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

text_enum! {
    /// 결제 상태
    pub enum PaymentStatus: "payment_status" {
        Pending => "pending",
        Completed => "completed",
    }
}

/// 편의 수수료율
pub const CONVENIENCE_FEE_RATE: f64 = 0.01;

// 낙찰 구매 모델
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub id: i64,
    pub auction_id: i64,
    pub buyer_id: i64,
    pub seller_id: i64,
    pub vehicle_name: String,
    pub purchase_price: f64,
    #[sqlx(try_from = "String")]
    pub payment_status: PaymentStatus,
    pub purchase_date: DateTime<Utc>,
}

// 결제 완료 기록 (추가 전용)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AuctionCost {
    pub id: i64,
    pub auction_id: i64,
    pub buyer_id: i64,
    pub seller_id: i64,
    pub amount_paid: f64,
    pub convenience_fee: f64,
    pub total_amount: f64,
    pub payment_date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAuctionCost {
    pub auction_id: i64,
    pub buyer_id: i64,
    pub seller_id: i64,
    pub amount_paid: f64,
    pub convenience_fee: f64,
    pub total_amount: f64,
    pub payment_date: DateTime<Utc>,
}

/// 결제 금액 내역
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentBreakdown {
    pub amount: f64,
    pub convenience_fee: f64,
    pub total_amount: f64,
}

impl PaymentBreakdown {
    /// 낙찰가 기준 수수료 계산
    pub fn for_price(purchase_price: f64) -> Self {
        let convenience_fee = purchase_price * CONVENIENCE_FEE_RATE;
        Self {
            amount: purchase_price,
            convenience_fee,
            total_amount: purchase_price + convenience_fee,
        }
    }
}

/// 결제 확인 팝업 응답
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    pub purchase_id: i64,
    pub auction_id: i64,
    #[serde(flatten)]
    pub breakdown: PaymentBreakdown,
}
