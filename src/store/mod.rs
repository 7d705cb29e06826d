/// 영속성 계층
/// 서비스 로직은 `MarketStore` 트레이트에만 의존하고,
/// 운영 환경은 PostgreSQL, 개발/테스트는 메모리 구현을 사용한다.
// region:    --- Imports
use crate::auction::model::AuctionRequest;
use crate::bidding::model::{AuctionBid, BidWrite, NewBid};
use crate::error::StoreError;
use crate::rental::model::{NewRentalBooking, RentalCost, RentalRequest, RentalStatus};
use crate::settlement::model::{AuctionCost, NewAuctionCost, Purchase};
use crate::user::model::User;
use crate::wishlist::model::{Wishlist, WishlistKind};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

// endregion: --- Imports

pub mod memory;
pub mod postgres;
pub mod queries;

pub use memory::InMemoryStore;
pub use postgres::PgMarketStore;

pub type StoreResult<T> = Result<T, StoreError>;

// region:    --- Filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// 진행 중(승인 + 시작) 경매 검색 조건
#[derive(Debug, Clone, Default)]
pub struct AuctionFilter {
    pub search: Option<String>,
    pub condition: Option<String>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub ids: Option<Vec<i64>>,
    /// 경매일 기준 정렬
    pub order: SortOrder,
    pub limit: Option<i64>,
}

impl AuctionFilter {
    pub fn matches(&self, auction: &AuctionRequest) -> bool {
        auction.is_open_listing()
            && contains_ignore_case(&auction.vehicle_name, self.search.as_deref())
            && equals_opt(auction.condition.as_deref(), self.condition.as_deref())
            && equals_opt(auction.fuel_type.as_deref(), self.fuel_type.as_deref())
            && equals_opt(auction.transmission.as_deref(), self.transmission.as_deref())
            && self.min_price.map_or(true, |min| auction.starting_bid >= min)
            && self.max_price.map_or(true, |max| auction.starting_bid <= max)
            && self.ids.as_ref().map_or(true, |ids| ids.contains(&auction.id))
    }
}

/// 렌탈 차량 검색 조건
#[derive(Debug, Clone, Default)]
pub struct RentalFilter {
    /// None 이면 상태 무관
    pub status: Option<RentalStatus>,
    pub search: Option<String>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_capacity: Option<i32>,
    pub ids: Option<Vec<i64>>,
    /// true 면 최신 등록순, 아니면 id 순
    pub newest_first: bool,
    pub limit: Option<i64>,
}

impl RentalFilter {
    pub fn available() -> Self {
        Self {
            status: Some(RentalStatus::Available),
            ..Default::default()
        }
    }

    pub fn matches(&self, rental: &RentalRequest) -> bool {
        self.status.map_or(true, |status| rental.status == status)
            && contains_ignore_case(&rental.vehicle_name, self.search.as_deref())
            && equals_opt(rental.fuel_type.as_deref(), self.fuel_type.as_deref())
            && equals_opt(rental.transmission.as_deref(), self.transmission.as_deref())
            && self.min_price.map_or(true, |min| rental.cost_per_day >= min)
            && self.max_price.map_or(true, |max| rental.cost_per_day <= max)
            && self
                .min_capacity
                .map_or(true, |min| rental.capacity.map_or(false, |c| c >= min))
            && self.ids.as_ref().map_or(true, |ids| ids.contains(&rental.id))
    }
}

fn contains_ignore_case(haystack: &str, needle: Option<&str>) -> bool {
    match needle {
        Some(needle) => haystack.to_lowercase().contains(&needle.to_lowercase()),
        None => true,
    }
}

fn equals_opt(value: Option<&str>, expected: Option<&str>) -> bool {
    match expected {
        Some(expected) => value == Some(expected),
        None => true,
    }
}

/// LIKE 패턴 특수문자 이스케이프
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
// endregion: --- Filters

// region:    --- Write Outcomes
/// 경매 종료 결과
#[derive(Debug, Clone)]
pub struct StopOutcome {
    pub auction: AuctionRequest,
    /// 낙찰자가 있을 때 생성된 구매 기록
    pub purchase: Option<Purchase>,
}
// endregion: --- Write Outcomes

// region:    --- Market Store Trait
/// 마켓 저장소 트레이트
/// 불변식을 지키는 쓰기(입찰, 종료, 결제, 예약)는 조건부 쓰기로 구현하고,
/// 조건이 맞지 않으면 `None` 또는 `BidWrite::Conflict` 를 돌려준다.
#[async_trait]
pub trait MarketStore: Send + Sync {
    // 사용자
    async fn get_user(&self, user_id: i64) -> StoreResult<Option<User>>;
    async fn get_users(&self, user_ids: &[i64]) -> StoreResult<HashMap<i64, User>>;

    // 경매
    async fn get_auction(&self, auction_id: i64) -> StoreResult<Option<AuctionRequest>>;
    async fn find_open_auctions(&self, filter: &AuctionFilter) -> StoreResult<Vec<AuctionRequest>>;
    async fn get_auctions(&self, auction_ids: &[i64]) -> StoreResult<Vec<AuctionRequest>>;
    /// 승인 + 미시작 경매만 시작
    async fn start_auction(&self, auction_id: i64) -> StoreResult<Option<AuctionRequest>>;
    /// 경매일이 지난 승인 경매 일괄 시작, 시작된 id 반환
    async fn start_due_auctions(&self, now: DateTime<Utc>) -> StoreResult<Vec<i64>>;
    /// 종료 + 낙찰자 확정 + 구매 기록 생성을 한 번에 처리
    async fn stop_auction(
        &self,
        auction_id: i64,
        stopped_at: DateTime<Utc>,
    ) -> StoreResult<Option<StopOutcome>>;

    // 입찰
    async fn current_bid(&self, auction_id: i64) -> StoreResult<Option<AuctionBid>>;
    async fn current_bids(&self, auction_ids: &[i64]) -> StoreResult<HashMap<i64, AuctionBid>>;
    /// `expected_current` 가 여전히 현재 입찰일 때만 기록
    async fn record_bid(&self, bid: NewBid, expected_current: Option<i64>) -> StoreResult<BidWrite>;
    async fn bids_by_buyer(&self, buyer_id: i64) -> StoreResult<Vec<AuctionBid>>;
    async fn count_bids(&self, auction_ids: &[i64]) -> StoreResult<HashMap<i64, i64>>;

    // 구매 / 결제
    async fn get_purchase(&self, purchase_id: i64) -> StoreResult<Option<Purchase>>;
    async fn find_purchase(&self, auction_id: i64, buyer_id: i64) -> StoreResult<Option<Purchase>>;
    async fn purchases_by_buyer(&self, buyer_id: i64) -> StoreResult<Vec<Purchase>>;
    /// 결제 대기 상태일 때만 결제 기록 생성 + 완료 처리
    async fn complete_payment(
        &self,
        purchase_id: i64,
        cost: NewAuctionCost,
    ) -> StoreResult<Option<AuctionCost>>;

    // 렌탈
    async fn get_rental(&self, rental_id: i64) -> StoreResult<Option<RentalRequest>>;
    async fn find_rentals(&self, filter: &RentalFilter) -> StoreResult<Vec<RentalRequest>>;
    /// 예약 가능 상태일 때만 예약
    async fn book_rental(
        &self,
        booking: NewRentalBooking,
    ) -> StoreResult<Option<(RentalRequest, RentalCost)>>;
    async fn rental_costs_by_buyer(&self, buyer_id: i64) -> StoreResult<Vec<RentalCost>>;
    async fn rental_cost_for(&self, rental_id: i64) -> StoreResult<Option<RentalCost>>;

    // 위시리스트
    async fn find_wishlist(&self, user_id: i64) -> StoreResult<Option<Wishlist>>;
    async fn ensure_wishlist(&self, user_id: i64) -> StoreResult<Wishlist>;
    async fn add_wishlist_item(&self, user_id: i64, kind: WishlistKind, item_id: i64) -> StoreResult<()>;
    async fn remove_wishlist_item(&self, user_id: i64, kind: WishlistKind, item_id: i64) -> StoreResult<()>;
}
// endregion: --- Market Store Trait
