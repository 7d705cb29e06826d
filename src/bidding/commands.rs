/// 입찰 관련 커맨드 처리
/// 1. 입찰 요청 검증
/// 2. 입찰 기록 (현재 입찰 포인터 조건부 갱신 + 충돌 시 재시도)
// region:    --- Imports
use super::model::{AuctionBid, BidWrite, NewBid};
use crate::auction::model::AuctionRequest;
use crate::error::{AppError, AppResult};
use crate::events::MarketEvent;
use crate::message_broker::{publish_after_commit, EventPublisher};
use crate::model::{is_present, value_as_amount, value_as_id};
use crate::store::MarketStore;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
// endregion: --- Imports

/// 현재 입찰 대비 최소 증가액
pub const BID_INCREMENT: f64 = 2000.0;

// 최대 재시도 횟수
const MAX_RETRIES: u32 = 10;

// region:    --- Commands
/// 입찰 요청 본문
/// 클라이언트는 숫자 또는 숫자 문자열을 보낸다.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceBidRequest {
    pub auction_id: Option<Value>,
    pub bid_amount: Option<Value>,
}

/// 입찰 명령
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlaceBidCommand {
    pub auction_id: i64,
    pub buyer_id: i64,
    pub bid_amount: f64,
}

impl PlaceBidRequest {
    /// 요청 본문 검증 후 명령으로 변환
    pub fn into_command(self, buyer_id: i64) -> AppResult<PlaceBidCommand> {
        let (Some(auction_id), Some(bid_amount)) = (
            self.auction_id.filter(is_present),
            self.bid_amount.filter(is_present),
        ) else {
            return Err(AppError::validation("Auction ID and bid amount are required"));
        };

        let auction_id =
            value_as_id(&auction_id).ok_or_else(|| AppError::validation("Invalid auction ID"))?;
        let bid_amount = value_as_amount(&bid_amount)
            .filter(|amount| amount.is_finite() && *amount > 0.0)
            .ok_or_else(|| AppError::validation("Invalid bid amount"))?;

        Ok(PlaceBidCommand {
            auction_id,
            buyer_id,
            bid_amount,
        })
    }
}

/// 최소 입찰가: 현재 입찰이 있으면 현재가 + 증가액, 없으면 시작가
pub fn minimum_bid(auction: &AuctionRequest, current: Option<&AuctionBid>) -> f64 {
    match current {
        Some(bid) => bid.bid_amount + BID_INCREMENT,
        None => auction.starting_bid,
    }
}

/// 1. 입찰
pub async fn handle_place_bid(
    cmd: PlaceBidCommand,
    store: &dyn MarketStore,
    publisher: &dyn EventPublisher,
) -> AppResult<AuctionBid> {
    info!("{:<12} --> 입찰 요청 처리 시작: {:?}", "Command", cmd);
    let mut retries = 0;

    while retries < MAX_RETRIES {
        // 경매 정보 조회
        let auction = store
            .get_auction(cmd.auction_id)
            .await?
            .ok_or_else(|| AppError::not_found("Auction not found"))?;

        // 경매 상태 검증
        if !auction.is_accepting_bids() {
            return Err(AppError::conflict("Auction is not active or has been stopped"));
        }

        // 현재 입찰 조회
        let current = store.current_bid(cmd.auction_id).await?;

        if let Some(bid) = &current {
            if bid.buyer_id == cmd.buyer_id {
                return Err(AppError::conflict("You already have the current bid"));
            }
        }

        let min_bid = minimum_bid(&auction, current.as_ref());
        if cmd.bid_amount < min_bid {
            return Err(AppError::validation(format!(
                "Your bid must be at least ₹{}",
                format_amount(min_bid)
            )));
        }

        let new_bid = NewBid {
            auction_id: cmd.auction_id,
            seller_id: auction.seller_id,
            buyer_id: cmd.buyer_id,
            bid_amount: cmd.bid_amount,
            bid_time: Utc::now(),
        };

        // 조회한 현재 입찰이 그대로일 때만 기록
        match store.record_bid(new_bid, current.map(|b| b.id)).await? {
            BidWrite::Recorded(bid) => {
                info!(
                    "{:<12} --> 입찰 성공: auction {}, 금액 {}",
                    "Command", bid.auction_id, bid.bid_amount
                );
                publish_after_commit(
                    publisher,
                    MarketEvent::BidPlaced {
                        auction_id: bid.auction_id,
                        bid_id: bid.id,
                        buyer_id: bid.buyer_id,
                        bid_amount: bid.bid_amount,
                        timestamp: bid.bid_time,
                    },
                )
                .await;
                return Ok(bid);
            }
            BidWrite::Conflict => {
                warn!(
                    "{:<12} --> 현재 입찰 변경으로 인한 충돌: 재시도",
                    "Command"
                );
                retries += 1;
                continue;
            }
        }
    }

    Err(AppError::conflict(
        "The auction is receiving too many bids right now, please try again",
    ))
}

// endregion: --- Commands

/// 천 단위 구분 기호 금액 표기 (소수점은 있을 때만)
pub fn format_amount(amount: f64) -> String {
    let rounded = (amount * 100.0).round() / 100.0;
    let whole = rounded.trunc() as i64;
    let fraction = ((rounded - rounded.trunc()).abs() * 100.0).round() as i64;

    let digits = whole.abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if whole < 0 {
        grouped.insert(0, '-');
    }
    if fraction % 10 == 0 && fraction > 0 {
        grouped.push_str(&format!(".{}", fraction / 10));
    } else if fraction > 0 {
        grouped.push_str(&format!(".{:02}", fraction));
    }
    grouped
}
