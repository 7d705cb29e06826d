/// 메모리 저장소
/// DATABASE_URL 없이 실행할 때와 테스트에서 사용한다.
/// 하나의 락 안에서 조건 확인과 쓰기를 함께 하므로 조건부 쓰기 의미가 PostgreSQL 구현과 같다.
// region:    --- Imports
use super::{AuctionFilter, MarketStore, RentalFilter, SortOrder, StopOutcome, StoreResult};
use crate::auction::model::{AuctionRequest, StartedAuction};
use crate::bidding::model::{AuctionBid, BidWrite, NewBid};
use crate::rental::model::{NewRentalBooking, RentalCost, RentalRequest, RentalStatus};
use crate::settlement::model::{AuctionCost, NewAuctionCost, PaymentStatus, Purchase};
use crate::user::model::User;
use crate::wishlist::model::{Wishlist, WishlistKind};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use tracing::debug;

// endregion: --- Imports

#[derive(Default)]
struct MemoryState {
    next_id: i64,
    users: BTreeMap<i64, User>,
    auctions: BTreeMap<i64, AuctionRequest>,
    bids: BTreeMap<i64, AuctionBid>,
    purchases: BTreeMap<i64, Purchase>,
    auction_costs: BTreeMap<i64, AuctionCost>,
    rentals: BTreeMap<i64, RentalRequest>,
    rental_costs: BTreeMap<i64, RentalCost>,
    wishlists: HashMap<i64, Wishlist>,
}

impl MemoryState {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    // 외부에서 지정한 id 보다 항상 큰 id 를 발급하도록 맞춤
    fn observe_id(&mut self, id: i64) {
        self.next_id = self.next_id.max(id);
    }

    /// 현재 입찰 표시가 된 입찰 중 가장 최근 것
    fn latest_flagged_bid(&self, auction_id: i64) -> Option<&AuctionBid> {
        self.bids
            .values()
            .filter(|b| b.auction_id == auction_id && b.is_current_bid)
            .max_by(|a, b| a.bid_time.cmp(&b.bid_time).then(a.id.cmp(&b.id)))
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<MemoryState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // region:    --- Seeding
    pub async fn insert_user(&self, user: User) {
        let mut state = self.state.write().await;
        state.observe_id(user.id);
        state.users.insert(user.id, user);
    }

    pub async fn insert_auction(&self, auction: AuctionRequest) {
        let mut state = self.state.write().await;
        state.observe_id(auction.id);
        state.auctions.insert(auction.id, auction);
    }

    pub async fn insert_rental(&self, rental: RentalRequest) {
        let mut state = self.state.write().await;
        state.observe_id(rental.id);
        state.rentals.insert(rental.id, rental);
    }

    pub async fn insert_purchase(&self, purchase: Purchase) {
        let mut state = self.state.write().await;
        state.observe_id(purchase.id);
        state.purchases.insert(purchase.id, purchase);
    }
    // endregion: --- Seeding

    // region:    --- Inspection
    /// 특정 경매의 전체 입찰 기록 (시간순)
    pub async fn bid_history(&self, auction_id: i64) -> Vec<AuctionBid> {
        let state = self.state.read().await;
        let mut bids: Vec<AuctionBid> = state
            .bids
            .values()
            .filter(|b| b.auction_id == auction_id)
            .cloned()
            .collect();
        bids.sort_by(|a, b| a.bid_time.cmp(&b.bid_time).then(a.id.cmp(&b.id)));
        bids
    }

    pub async fn auction_costs(&self) -> Vec<AuctionCost> {
        self.state.read().await.auction_costs.values().cloned().collect()
    }

    pub async fn rental_cost_count(&self) -> usize {
        self.state.read().await.rental_costs.len()
    }
    // endregion: --- Inspection
}

#[async_trait]
impl MarketStore for InMemoryStore {
    async fn get_user(&self, user_id: i64) -> StoreResult<Option<User>> {
        Ok(self.state.read().await.users.get(&user_id).cloned())
    }

    async fn get_users(&self, user_ids: &[i64]) -> StoreResult<HashMap<i64, User>> {
        let state = self.state.read().await;
        Ok(user_ids
            .iter()
            .filter_map(|id| state.users.get(id).map(|u| (*id, u.clone())))
            .collect())
    }

    async fn get_auction(&self, auction_id: i64) -> StoreResult<Option<AuctionRequest>> {
        Ok(self.state.read().await.auctions.get(&auction_id).cloned())
    }

    async fn find_open_auctions(&self, filter: &AuctionFilter) -> StoreResult<Vec<AuctionRequest>> {
        let state = self.state.read().await;
        let mut auctions: Vec<AuctionRequest> = state
            .auctions
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        match filter.order {
            SortOrder::Ascending => auctions.sort_by(|a, b| a.auction_date.cmp(&b.auction_date)),
            SortOrder::Descending => auctions.sort_by(|a, b| b.auction_date.cmp(&a.auction_date)),
        }
        if let Some(limit) = filter.limit {
            auctions.truncate(limit.max(0) as usize);
        }
        Ok(auctions)
    }

    async fn get_auctions(&self, auction_ids: &[i64]) -> StoreResult<Vec<AuctionRequest>> {
        let state = self.state.read().await;
        Ok(auction_ids
            .iter()
            .filter_map(|id| state.auctions.get(id).cloned())
            .collect())
    }

    async fn start_auction(&self, auction_id: i64) -> StoreResult<Option<AuctionRequest>> {
        let mut state = self.state.write().await;
        match state.auctions.get_mut(&auction_id) {
            Some(auction) if auction.can_start() => {
                auction.started_auction = StartedAuction::Yes;
                Ok(Some(auction.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn start_due_auctions(&self, now: DateTime<Utc>) -> StoreResult<Vec<i64>> {
        let mut state = self.state.write().await;
        let mut started = Vec::new();
        for auction in state.auctions.values_mut() {
            if auction.can_start() && auction.auction_date <= now {
                auction.started_auction = StartedAuction::Yes;
                started.push(auction.id);
            }
        }
        Ok(started)
    }

    async fn stop_auction(
        &self,
        auction_id: i64,
        stopped_at: DateTime<Utc>,
    ) -> StoreResult<Option<StopOutcome>> {
        let mut state = self.state.write().await;
        let (current_bid_id, seller_id, vehicle_name) = match state.auctions.get(&auction_id) {
            Some(a) if !a.auction_stopped => {
                (a.current_bid_id, a.seller_id, a.vehicle_name.clone())
            }
            _ => return Ok(None),
        };
        let winning_bid = current_bid_id.and_then(|id| state.bids.get(&id).cloned());

        let purchase = match &winning_bid {
            Some(bid) => {
                let purchase = Purchase {
                    id: state.allocate_id(),
                    auction_id,
                    buyer_id: bid.buyer_id,
                    seller_id,
                    vehicle_name,
                    purchase_price: bid.bid_amount,
                    payment_status: PaymentStatus::Pending,
                    purchase_date: stopped_at,
                };
                state.purchases.insert(purchase.id, purchase.clone());
                Some(purchase)
            }
            None => None,
        };

        let Some(auction) = state.auctions.get_mut(&auction_id) else {
            return Ok(None);
        };
        auction.auction_stopped = true;
        auction.started_auction = StartedAuction::Ended;
        auction.winner_id = winning_bid.as_ref().map(|b| b.buyer_id);
        auction.final_purchase_price = winning_bid.as_ref().map(|b| b.bid_amount);

        Ok(Some(StopOutcome {
            auction: auction.clone(),
            purchase,
        }))
    }

    async fn current_bid(&self, auction_id: i64) -> StoreResult<Option<AuctionBid>> {
        let state = self.state.read().await;
        Ok(state
            .auctions
            .get(&auction_id)
            .and_then(|a| a.current_bid_id)
            .and_then(|id| state.bids.get(&id).cloned()))
    }

    async fn current_bids(&self, auction_ids: &[i64]) -> StoreResult<HashMap<i64, AuctionBid>> {
        let state = self.state.read().await;
        Ok(auction_ids
            .iter()
            .filter_map(|id| state.latest_flagged_bid(*id).map(|b| (*id, b.clone())))
            .collect())
    }

    async fn record_bid(&self, bid: NewBid, expected_current: Option<i64>) -> StoreResult<BidWrite> {
        let mut state = self.state.write().await;
        match state.auctions.get(&bid.auction_id) {
            Some(a) if a.is_accepting_bids() && a.current_bid_id == expected_current => {}
            _ => {
                debug!(
                    "{:<12} --> 입찰 조건 불일치 auction: {}",
                    "Store", bid.auction_id
                );
                return Ok(BidWrite::Conflict);
            }
        }

        let recorded = AuctionBid {
            id: state.allocate_id(),
            auction_id: bid.auction_id,
            seller_id: bid.seller_id,
            buyer_id: bid.buyer_id,
            bid_amount: bid.bid_amount,
            is_current_bid: true,
            bid_time: bid.bid_time,
        };
        for previous in state
            .bids
            .values_mut()
            .filter(|b| b.auction_id == bid.auction_id)
        {
            previous.is_current_bid = false;
        }
        state.bids.insert(recorded.id, recorded.clone());
        if let Some(auction) = state.auctions.get_mut(&bid.auction_id) {
            auction.current_bid_id = Some(recorded.id);
        }
        Ok(BidWrite::Recorded(recorded))
    }

    async fn bids_by_buyer(&self, buyer_id: i64) -> StoreResult<Vec<AuctionBid>> {
        let state = self.state.read().await;
        let mut bids: Vec<AuctionBid> = state
            .bids
            .values()
            .filter(|b| b.buyer_id == buyer_id)
            .cloned()
            .collect();
        bids.sort_by(|a, b| b.bid_time.cmp(&a.bid_time).then(b.id.cmp(&a.id)));
        Ok(bids)
    }

    async fn count_bids(&self, auction_ids: &[i64]) -> StoreResult<HashMap<i64, i64>> {
        let state = self.state.read().await;
        let mut counts = HashMap::new();
        for bid in state.bids.values() {
            if auction_ids.contains(&bid.auction_id) {
                *counts.entry(bid.auction_id).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }

    async fn get_purchase(&self, purchase_id: i64) -> StoreResult<Option<Purchase>> {
        Ok(self.state.read().await.purchases.get(&purchase_id).cloned())
    }

    async fn find_purchase(&self, auction_id: i64, buyer_id: i64) -> StoreResult<Option<Purchase>> {
        let state = self.state.read().await;
        Ok(state
            .purchases
            .values()
            .find(|p| p.auction_id == auction_id && p.buyer_id == buyer_id)
            .cloned())
    }

    async fn purchases_by_buyer(&self, buyer_id: i64) -> StoreResult<Vec<Purchase>> {
        let state = self.state.read().await;
        Ok(state
            .purchases
            .values()
            .filter(|p| p.buyer_id == buyer_id)
            .cloned()
            .collect())
    }

    async fn complete_payment(
        &self,
        purchase_id: i64,
        cost: NewAuctionCost,
    ) -> StoreResult<Option<AuctionCost>> {
        let mut state = self.state.write().await;
        match state.purchases.get(&purchase_id) {
            Some(p) if p.payment_status == PaymentStatus::Pending => {}
            _ => return Ok(None),
        }

        let recorded = AuctionCost {
            id: state.allocate_id(),
            auction_id: cost.auction_id,
            buyer_id: cost.buyer_id,
            seller_id: cost.seller_id,
            amount_paid: cost.amount_paid,
            convenience_fee: cost.convenience_fee,
            total_amount: cost.total_amount,
            payment_date: cost.payment_date,
        };
        state.auction_costs.insert(recorded.id, recorded.clone());
        if let Some(purchase) = state.purchases.get_mut(&purchase_id) {
            purchase.payment_status = PaymentStatus::Completed;
        }
        Ok(Some(recorded))
    }

    async fn get_rental(&self, rental_id: i64) -> StoreResult<Option<RentalRequest>> {
        Ok(self.state.read().await.rentals.get(&rental_id).cloned())
    }

    async fn find_rentals(&self, filter: &RentalFilter) -> StoreResult<Vec<RentalRequest>> {
        let state = self.state.read().await;
        let mut rentals: Vec<RentalRequest> = state
            .rentals
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        if filter.newest_first {
            rentals.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        }
        if let Some(limit) = filter.limit {
            rentals.truncate(limit.max(0) as usize);
        }
        Ok(rentals)
    }

    async fn book_rental(
        &self,
        booking: NewRentalBooking,
    ) -> StoreResult<Option<(RentalRequest, RentalCost)>> {
        let mut state = self.state.write().await;
        match state.rentals.get(&booking.rental_car_id) {
            Some(r) if r.status == RentalStatus::Available => {}
            _ => return Ok(None),
        }

        let cost = RentalCost {
            id: state.allocate_id(),
            rental_car_id: booking.rental_car_id,
            buyer_id: booking.buyer_id,
            seller_id: booking.seller_id,
            total_cost: booking.total_cost,
            include_driver: booking.include_driver,
            created_at: booking.booked_at,
        };
        state.rental_costs.insert(cost.id, cost.clone());

        let Some(rental) = state.rentals.get_mut(&booking.rental_car_id) else {
            return Ok(None);
        };
        rental.status = RentalStatus::Unavailable;
        rental.buyer_id = Some(booking.buyer_id);
        rental.pickup_date = Some(booking.pickup_date);
        rental.drop_date = Some(booking.drop_date);
        rental.include_driver = booking.include_driver;
        Ok(Some((rental.clone(), cost)))
    }

    async fn rental_costs_by_buyer(&self, buyer_id: i64) -> StoreResult<Vec<RentalCost>> {
        let state = self.state.read().await;
        Ok(state
            .rental_costs
            .values()
            .filter(|c| c.buyer_id == buyer_id)
            .cloned()
            .collect())
    }

    async fn rental_cost_for(&self, rental_id: i64) -> StoreResult<Option<RentalCost>> {
        let state = self.state.read().await;
        Ok(state
            .rental_costs
            .values()
            .find(|c| c.rental_car_id == rental_id)
            .cloned())
    }

    async fn find_wishlist(&self, user_id: i64) -> StoreResult<Option<Wishlist>> {
        Ok(self.state.read().await.wishlists.get(&user_id).cloned())
    }

    async fn ensure_wishlist(&self, user_id: i64) -> StoreResult<Wishlist> {
        let mut state = self.state.write().await;
        Ok(state
            .wishlists
            .entry(user_id)
            .or_insert_with(|| Wishlist::empty(user_id))
            .clone())
    }

    async fn add_wishlist_item(&self, user_id: i64, kind: WishlistKind, item_id: i64) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state
            .wishlists
            .entry(user_id)
            .or_insert_with(|| Wishlist::empty(user_id))
            .add(kind, item_id);
        Ok(())
    }

    async fn remove_wishlist_item(&self, user_id: i64, kind: WishlistKind, item_id: i64) -> StoreResult<()> {
        let mut state = self.state.write().await;
        if let Some(wishlist) = state.wishlists.get_mut(&user_id) {
            wishlist.remove(kind, item_id);
        }
        Ok(())
    }
}
