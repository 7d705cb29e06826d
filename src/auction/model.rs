use crate::model::text_enum;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

text_enum! {
    /// 심사 상태
    pub enum AuctionStatus: "auction status" {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

text_enum! {
    /// 경매 진행 여부
    pub enum StartedAuction: "started_auction" {
        No => "no",
        Yes => "yes",
        Ended => "ended",
    }
}

// 경매 출품 모델
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AuctionRequest {
    pub id: i64,
    pub seller_id: i64,
    pub vehicle_name: String,
    pub vehicle_image: Option<String>,
    pub year: Option<i32>,
    pub mileage: Option<i64>,
    pub condition: Option<String>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub description: Option<String>,
    pub starting_bid: f64,
    pub auction_date: DateTime<Utc>,
    #[sqlx(try_from = "String")]
    pub status: AuctionStatus,
    #[sqlx(try_from = "String")]
    #[serde(rename = "started_auction")]
    pub started_auction: StartedAuction,
    #[serde(rename = "auction_stopped")]
    pub auction_stopped: bool,
    pub winner_id: Option<i64>,
    pub final_purchase_price: Option<f64>,
    /// 현재 최고 입찰 포인터
    pub current_bid_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl AuctionRequest {
    /// 입찰 가능한 상태인지
    pub fn is_accepting_bids(&self) -> bool {
        self.started_auction == StartedAuction::Yes && !self.auction_stopped
    }

    /// 경매 목록에 노출되는 상태인지
    pub fn is_open_listing(&self) -> bool {
        self.status == AuctionStatus::Approved && self.started_auction == StartedAuction::Yes
    }

    /// 스케줄러/매니저가 시작시킬 수 있는 상태인지
    pub fn can_start(&self) -> bool {
        self.status == AuctionStatus::Approved
            && self.started_auction == StartedAuction::No
            && !self.auction_stopped
    }
}

/// 낙찰 여부 응답
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WinnerStatus {
    pub is_winner: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bid_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<crate::settlement::model::PaymentStatus>,
}

impl WinnerStatus {
    pub fn not_winner() -> Self {
        Self {
            is_winner: false,
            bid_amount: None,
            payment_status: None,
        }
    }
}
