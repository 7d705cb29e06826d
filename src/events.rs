use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 마켓 도메인 이벤트
/// 커밋이 끝난 변경만 발행한다.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum MarketEvent {
    // 입찰 이벤트
    BidPlaced {
        auction_id: i64,
        bid_id: i64,
        buyer_id: i64,
        bid_amount: f64,
        timestamp: DateTime<Utc>,
    },
    // 경매 시작
    AuctionStarted {
        auction_id: i64,
        timestamp: DateTime<Utc>,
    },
    // 경매 종료 (낙찰자 없을 수 있음)
    AuctionStopped {
        auction_id: i64,
        winner_id: Option<i64>,
        final_price: Option<f64>,
        purchase_id: Option<i64>,
        timestamp: DateTime<Utc>,
    },
    // 낙찰 결제 완료
    PaymentCompleted {
        purchase_id: i64,
        auction_id: i64,
        buyer_id: i64,
        total_amount: f64,
        timestamp: DateTime<Utc>,
    },
    // 렌탈 예약
    RentalBooked {
        rental_id: i64,
        buyer_id: i64,
        total_cost: f64,
        timestamp: DateTime<Utc>,
    },
}

impl MarketEvent {
    /// 메시지 키로 쓰는 집계 id
    pub fn aggregate_key(&self) -> String {
        match self {
            MarketEvent::BidPlaced { auction_id, .. }
            | MarketEvent::AuctionStarted { auction_id, .. }
            | MarketEvent::AuctionStopped { auction_id, .. }
            | MarketEvent::PaymentCompleted { auction_id, .. } => format!("auction-{}", auction_id),
            MarketEvent::RentalBooked { rental_id, .. } => format!("rental-{}", rental_id),
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            MarketEvent::BidPlaced { .. } => "BidPlaced",
            MarketEvent::AuctionStarted { .. } => "AuctionStarted",
            MarketEvent::AuctionStopped { .. } => "AuctionStopped",
            MarketEvent::PaymentCompleted { .. } => "PaymentCompleted",
            MarketEvent::RentalBooked { .. } => "RentalBooked",
        }
    }
}
