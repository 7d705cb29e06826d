// region:    --- Imports
use super::views::{auction_listings, AuctionListing};
use crate::auction::model::{AuctionRequest, StartedAuction};
use crate::bidding::model::AuctionBid;
use crate::error::{AppError, AppResult};
use crate::store::{AuctionFilter, MarketStore};
use crate::user::model::SellerSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

// endregion: --- Imports

// region:    --- Listing
/// 경매 목록 검색 조건 (쿼리 스트링)
/// 응답의 `filters` 로 그대로 돌려준다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transmission: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<String>,
}

impl AuctionQuery {
    /// 빈 값은 조건 없음, 숫자로 읽을 수 없는 가격은 무시
    pub fn to_filter(&self) -> AuctionFilter {
        AuctionFilter {
            search: non_empty(&self.search),
            condition: non_empty(&self.condition),
            fuel_type: non_empty(&self.fuel_type),
            transmission: non_empty(&self.transmission),
            min_price: parse_price(&self.min_price),
            max_price: parse_price(&self.max_price),
            ..Default::default()
        }
    }
}

pub(crate) fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub(crate) fn parse_price(value: &Option<String>) -> Option<f64> {
    value
        .as_deref()
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionList {
    pub auctions: Vec<AuctionListing>,
    pub filters: AuctionQuery,
}

/// 진행 중 경매 목록 (경매일 오름차순)
pub async fn list_auctions(query: AuctionQuery, store: &dyn MarketStore) -> AppResult<AuctionList> {
    info!("{:<12} --> 경매 목록 조회 filters: {:?}", "Query", query);
    let auctions = store.find_open_auctions(&query.to_filter()).await?;
    Ok(AuctionList {
        auctions: auction_listings(store, auctions).await?,
        filters: query,
    })
}
// endregion: --- Listing

// region:    --- Detail
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionDetail {
    pub auction: AuctionRequest,
    pub seller: Option<SellerSummary>,
    pub current_bid: Option<AuctionBid>,
    pub is_current_bidder: bool,
}

/// 경매 상세
pub async fn auction_detail(
    auction_id: i64,
    buyer_id: i64,
    store: &dyn MarketStore,
) -> AppResult<AuctionDetail> {
    info!("{:<12} --> 경매 상세 조회 id: {}", "Query", auction_id);
    let auction = store
        .get_auction(auction_id)
        .await?
        .filter(|a| a.started_auction == StartedAuction::Yes)
        .ok_or_else(|| AppError::not_found("Auction not found or has ended"))?;

    let seller = store.get_user(auction.seller_id).await?.map(|u| u.summary());
    let current_bid = store.current_bid(auction_id).await?;
    let is_current_bidder = current_bid.as_ref().map_or(false, |b| b.buyer_id == buyer_id);

    Ok(AuctionDetail {
        auction,
        seller,
        current_bid,
        is_current_bidder,
    })
}
// endregion: --- Detail

// region:    --- My Bids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BidStatus {
    Active,
    Ended,
    Pending,
}

impl BidStatus {
    pub fn of(auction: &AuctionRequest) -> Self {
        if auction.auction_stopped || auction.started_auction == StartedAuction::Ended {
            BidStatus::Ended
        } else if auction.started_auction == StartedAuction::Yes {
            BidStatus::Active
        } else {
            BidStatus::Pending
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MyBid {
    pub auction: AuctionRequest,
    pub my_highest_bid: f64,
    /// 현재 입찰가 (입찰이 없으면 None)
    pub highest_bid: Option<f64>,
    pub total_bids: i64,
    pub bid_status: BidStatus,
    pub last_bid_time: DateTime<Utc>,
}

/// 내가 입찰한 경매 목록 (내 마지막 입찰 시각 내림차순)
pub async fn my_bids(buyer_id: i64, store: &dyn MarketStore) -> AppResult<Vec<MyBid>> {
    info!("{:<12} --> 내 입찰 조회 buyer: {}", "Query", buyer_id);
    let bids = store.bids_by_buyer(buyer_id).await?;
    if bids.is_empty() {
        return Ok(Vec::new());
    }

    // 최신 입찰부터 오므로 처음 본 순서가 곧 정렬 순서
    let mut order: Vec<i64> = Vec::new();
    let mut summary: HashMap<i64, (f64, DateTime<Utc>)> = HashMap::new();
    for bid in &bids {
        let entry = summary.entry(bid.auction_id).or_insert_with(|| {
            order.push(bid.auction_id);
            (bid.bid_amount, bid.bid_time)
        });
        entry.0 = entry.0.max(bid.bid_amount);
    }

    let auctions: HashMap<i64, AuctionRequest> = store
        .get_auctions(&order)
        .await?
        .into_iter()
        .map(|a| (a.id, a))
        .collect();
    let current_bids = store.current_bids(&order).await?;
    let counts = store.count_bids(&order).await?;

    Ok(order
        .into_iter()
        .filter_map(|auction_id| {
            let auction = auctions.get(&auction_id)?.clone();
            let (my_highest_bid, last_bid_time) = summary.get(&auction_id).copied()?;
            Some(MyBid {
                my_highest_bid,
                highest_bid: current_bids.get(&auction_id).map(|b| b.bid_amount),
                total_bids: counts.get(&auction_id).copied().unwrap_or(0),
                bid_status: BidStatus::of(&auction),
                last_bid_time,
                auction,
            })
        })
        .collect())
}
// endregion: --- My Bids

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auction::model::AuctionStatus;
    use crate::auction::lifecycle::stop_auction;
    use crate::bidding::commands::{handle_place_bid, PlaceBidCommand};
    use crate::message_broker::LogEventPublisher;
    use crate::store::InMemoryStore;
    use crate::user::model::{User, UserType};
    use chrono::Duration;

    fn auction(id: i64, name: &str, starting_bid: f64, days_ahead: i64) -> AuctionRequest {
        AuctionRequest {
            id,
            seller_id: 2,
            vehicle_name: name.to_string(),
            vehicle_image: None,
            year: Some(2018),
            mileage: Some(60_000),
            condition: Some("good".to_string()),
            fuel_type: Some("petrol".to_string()),
            transmission: Some("manual".to_string()),
            description: None,
            starting_bid,
            auction_date: Utc::now() + Duration::days(days_ahead),
            status: AuctionStatus::Approved,
            started_auction: StartedAuction::Yes,
            auction_stopped: false,
            winner_id: None,
            final_purchase_price: None,
            current_bid_id: None,
            created_at: Utc::now(),
        }
    }

    fn seller() -> User {
        User {
            id: 2,
            first_name: "Ravi".to_string(),
            last_name: "Kumar".to_string(),
            email: "ravi@example.com".to_string(),
            phone: Some("9876543210".to_string()),
            city: Some("Chennai".to_string()),
            state: Some("Tamil Nadu".to_string()),
            door_no: None,
            street: None,
            user_type: UserType::Seller,
        }
    }

    async fn bid(store: &InMemoryStore, auction_id: i64, buyer_id: i64, bid_amount: f64) {
        let cmd = PlaceBidCommand {
            auction_id,
            buyer_id,
            bid_amount,
        };
        handle_place_bid(cmd, store, &LogEventPublisher).await.unwrap();
    }

    async fn seeded() -> InMemoryStore {
        let store = InMemoryStore::new();
        store.insert_user(seller()).await;
        store.insert_auction(auction(10, "Honda City ZX", 400_000.0, 2)).await;
        store.insert_auction(auction(11, "Honda Amaze", 300_000.0, 1)).await;
        store.insert_auction(auction(12, "Toyota Fortuner", 2_500_000.0, 3)).await;
        let mut pending = auction(13, "Honda Jazz", 250_000.0, 0);
        pending.started_auction = StartedAuction::No;
        store.insert_auction(pending).await;
        store
    }

    #[test]
    fn test_query_to_filter() {
        let query = AuctionQuery {
            search: Some("  ".to_string()),
            min_price: Some("abc".to_string()),
            max_price: Some("500000".to_string()),
            ..Default::default()
        };
        let filter = query.to_filter();
        assert!(filter.search.is_none());
        assert!(filter.min_price.is_none());
        assert_eq!(filter.max_price, Some(500_000.0));
    }

    #[tokio::test]
    async fn test_listing_filters_and_order() {
        let store = seeded().await;
        bid(&store, 10, 7, 410_000.0).await;

        let query = AuctionQuery {
            search: Some("honda".to_string()),
            ..Default::default()
        };
        let list = list_auctions(query, &store).await.unwrap();
        let ids: Vec<i64> = list.auctions.iter().map(|l| l.auction.id).collect();
        // 시작 전 경매 제외, 경매일 오름차순
        assert_eq!(ids, vec![11, 10]);
        assert_eq!(list.auctions[0].current_highest_bid, 300_000.0);
        assert_eq!(list.auctions[1].current_highest_bid, 410_000.0);
        assert_eq!(list.auctions[1].seller.as_ref().unwrap().first_name, "Ravi");
        assert_eq!(list.filters.search.as_deref(), Some("honda"));

        let query = AuctionQuery {
            min_price: Some("350000".to_string()),
            max_price: Some("3000000".to_string()),
            ..Default::default()
        };
        let ids: Vec<i64> = list_auctions(query, &store)
            .await
            .unwrap()
            .auctions
            .iter()
            .map(|l| l.auction.id)
            .collect();
        assert_eq!(ids, vec![10, 12]);
    }

    #[tokio::test]
    async fn test_detail_marks_current_bidder() {
        let store = seeded().await;
        bid(&store, 10, 7, 400_000.0).await;

        let detail = auction_detail(10, 7, &store).await.unwrap();
        assert!(detail.is_current_bidder);
        assert_eq!(detail.current_bid.unwrap().bid_amount, 400_000.0);
        assert!(!auction_detail(10, 8, &store).await.unwrap().is_current_bidder);

        let err = auction_detail(13, 7, &store).await.unwrap_err();
        assert_eq!(err.to_string(), "Auction not found or has ended");
    }

    #[tokio::test]
    async fn test_my_bids_summary() {
        let store = seeded().await;
        bid(&store, 10, 7, 400_000.0).await;
        bid(&store, 10, 8, 402_000.0).await;
        bid(&store, 10, 7, 404_000.0).await;
        bid(&store, 11, 7, 300_000.0).await;
        bid(&store, 11, 8, 310_000.0).await;
        stop_auction(11, &store, &LogEventPublisher).await.unwrap();

        let bids = my_bids(7, &store).await.unwrap();
        assert_eq!(bids.len(), 2);

        // 마지막 입찰이 11번 경매
        assert_eq!(bids[0].auction.id, 11);
        assert_eq!(bids[0].my_highest_bid, 300_000.0);
        assert_eq!(bids[0].highest_bid, Some(310_000.0));
        assert_eq!(bids[0].bid_status, BidStatus::Ended);

        assert_eq!(bids[1].auction.id, 10);
        assert_eq!(bids[1].my_highest_bid, 404_000.0);
        assert_eq!(bids[1].total_bids, 3);
        assert_eq!(bids[1].bid_status, BidStatus::Active);

        assert!(my_bids(99, &store).await.unwrap().is_empty());
    }
}
