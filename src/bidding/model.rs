use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// 입찰 모델
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AuctionBid {
    pub id: i64,
    pub auction_id: i64,
    pub seller_id: i64,
    pub buyer_id: i64,
    pub bid_amount: f64,
    pub is_current_bid: bool,
    pub bid_time: DateTime<Utc>,
}

// 저장 전 입찰
#[derive(Debug, Clone)]
pub struct NewBid {
    pub auction_id: i64,
    pub seller_id: i64,
    pub buyer_id: i64,
    pub bid_amount: f64,
    pub bid_time: DateTime<Utc>,
}

/// 입찰 기록 결과
#[derive(Debug)]
pub enum BidWrite {
    Recorded(AuctionBid),
    /// 조회 이후 현재 입찰이 바뀌었거나 경매가 종료됨
    Conflict,
}
