/// PostgreSQL 저장소
/// 조건부 쓰기는 트랜잭션 안에서 행 잠금(FOR UPDATE) 또는 `UPDATE ... WHERE <조건> RETURNING` 으로 처리한다.
// region:    --- Imports
use super::queries;
use super::{escape_like, AuctionFilter, MarketStore, RentalFilter, SortOrder, StopOutcome, StoreResult};
use crate::auction::model::{AuctionRequest, StartedAuction};
use crate::bidding::model::{AuctionBid, BidWrite, NewBid};
use crate::database::DatabaseManager;
use crate::error::StoreError;
use crate::rental::model::{NewRentalBooking, RentalCost, RentalRequest};
use crate::settlement::model::{AuctionCost, NewAuctionCost, Purchase};
use crate::user::model::User;
use crate::wishlist::model::{Wishlist, WishlistKind};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

// endregion: --- Imports

pub struct PgMarketStore {
    db: Arc<DatabaseManager>,
}

impl PgMarketStore {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    async fn load_wishlist_items(&self, user_id: i64) -> StoreResult<Wishlist> {
        let rows = sqlx::query(queries::WISHLIST_ITEMS)
            .bind(user_id)
            .fetch_all(self.db.pool())
            .await?;

        let mut wishlist = Wishlist::empty(user_id);
        for row in rows {
            let kind: String = row.try_get("kind")?;
            let item_id: i64 = row.try_get("item_id")?;
            let kind = WishlistKind::try_from(kind).map_err(|e| StoreError::Corrupt(e.to_string()))?;
            wishlist.add(kind, item_id);
        }
        Ok(wishlist)
    }
}

#[async_trait]
impl MarketStore for PgMarketStore {
    // region:    --- Users
    async fn get_user(&self, user_id: i64) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(queries::GET_USER)
            .bind(user_id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(user)
    }

    async fn get_users(&self, user_ids: &[i64]) -> StoreResult<HashMap<i64, User>> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let users = sqlx::query_as::<_, User>(queries::GET_USERS)
            .bind(user_ids)
            .fetch_all(self.db.pool())
            .await?;
        Ok(users.into_iter().map(|u| (u.id, u)).collect())
    }
    // endregion: --- Users

    // region:    --- Auctions
    async fn get_auction(&self, auction_id: i64) -> StoreResult<Option<AuctionRequest>> {
        debug!("{:<12} --> 경매 조회 id: {}", "Store", auction_id);
        let auction = sqlx::query_as::<_, AuctionRequest>(queries::GET_AUCTION)
            .bind(auction_id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(auction)
    }

    async fn find_open_auctions(&self, filter: &AuctionFilter) -> StoreResult<Vec<AuctionRequest>> {
        let auctions = sqlx::query_as::<_, AuctionRequest>(queries::FIND_OPEN_AUCTIONS)
            .bind(filter.search.as_deref().map(escape_like))
            .bind(filter.condition.as_deref())
            .bind(filter.fuel_type.as_deref())
            .bind(filter.transmission.as_deref())
            .bind(filter.min_price)
            .bind(filter.max_price)
            .bind(filter.ids.as_deref())
            .bind(filter.order == SortOrder::Descending)
            .bind(filter.limit)
            .fetch_all(self.db.pool())
            .await?;
        Ok(auctions)
    }

    async fn get_auctions(&self, auction_ids: &[i64]) -> StoreResult<Vec<AuctionRequest>> {
        if auction_ids.is_empty() {
            return Ok(Vec::new());
        }
        let auctions = sqlx::query_as::<_, AuctionRequest>(queries::GET_AUCTIONS)
            .bind(auction_ids)
            .fetch_all(self.db.pool())
            .await?;
        Ok(auctions)
    }

    async fn start_auction(&self, auction_id: i64) -> StoreResult<Option<AuctionRequest>> {
        let auction = sqlx::query_as::<_, AuctionRequest>(queries::START_AUCTION)
            .bind(auction_id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(auction)
    }

    async fn start_due_auctions(&self, now: DateTime<Utc>) -> StoreResult<Vec<i64>> {
        let started = sqlx::query_scalar::<_, i64>(queries::START_DUE_AUCTIONS)
            .bind(now)
            .fetch_all(self.db.pool())
            .await?;
        Ok(started)
    }

    async fn stop_auction(
        &self,
        auction_id: i64,
        stopped_at: DateTime<Utc>,
    ) -> StoreResult<Option<StopOutcome>> {
        let mut tx = self.db.pool().begin().await?;

        let Some(row) = sqlx::query(queries::LOCK_AUCTION_FOR_STOP)
            .bind(auction_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            tx.rollback().await?;
            return Ok(None);
        };

        let already_stopped: bool = row.try_get("auction_stopped")?;
        if already_stopped {
            tx.rollback().await?;
            return Ok(None);
        }
        let current_bid_id: Option<i64> = row.try_get("current_bid_id")?;
        let seller_id: i64 = row.try_get("seller_id")?;
        let vehicle_name: String = row.try_get("vehicle_name")?;

        let winning_bid = match current_bid_id {
            Some(bid_id) => {
                sqlx::query_as::<_, AuctionBid>(queries::GET_BID)
                    .bind(bid_id)
                    .fetch_optional(&mut *tx)
                    .await?
            }
            None => None,
        };

        let auction = sqlx::query_as::<_, AuctionRequest>(queries::STOP_AUCTION)
            .bind(auction_id)
            .bind(winning_bid.as_ref().map(|b| b.buyer_id))
            .bind(winning_bid.as_ref().map(|b| b.bid_amount))
            .fetch_one(&mut *tx)
            .await?;

        let purchase = match &winning_bid {
            Some(bid) => Some(
                sqlx::query_as::<_, Purchase>(queries::INSERT_PURCHASE)
                    .bind(auction_id)
                    .bind(bid.buyer_id)
                    .bind(seller_id)
                    .bind(&vehicle_name)
                    .bind(bid.bid_amount)
                    .bind(stopped_at)
                    .fetch_one(&mut *tx)
                    .await?,
            ),
            None => None,
        };

        tx.commit().await?;
        info!(
            "{:<12} --> 경매 종료 id: {}, 낙찰자: {:?}",
            "Store", auction_id, auction.winner_id
        );
        Ok(Some(StopOutcome { auction, purchase }))
    }
    // endregion: --- Auctions

    // region:    --- Bids
    async fn current_bid(&self, auction_id: i64) -> StoreResult<Option<AuctionBid>> {
        let bid = sqlx::query_as::<_, AuctionBid>(queries::CURRENT_BID)
            .bind(auction_id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(bid)
    }

    async fn current_bids(&self, auction_ids: &[i64]) -> StoreResult<HashMap<i64, AuctionBid>> {
        if auction_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let bids = sqlx::query_as::<_, AuctionBid>(queries::CURRENT_BIDS)
            .bind(auction_ids)
            .fetch_all(self.db.pool())
            .await?;
        Ok(bids.into_iter().map(|b| (b.auction_id, b)).collect())
    }

    async fn record_bid(&self, bid: NewBid, expected_current: Option<i64>) -> StoreResult<BidWrite> {
        let mut tx = self.db.pool().begin().await?;

        // 경매 행 잠금 후 조건 확인
        let Some(row) = sqlx::query(queries::LOCK_AUCTION_FOR_BID)
            .bind(bid.auction_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            tx.rollback().await?;
            return Ok(BidWrite::Conflict);
        };

        let current_bid_id: Option<i64> = row.try_get("current_bid_id")?;
        let started_auction: String = row.try_get("started_auction")?;
        let auction_stopped: bool = row.try_get("auction_stopped")?;
        if current_bid_id != expected_current
            || started_auction != StartedAuction::Yes.as_str()
            || auction_stopped
        {
            tx.rollback().await?;
            debug!(
                "{:<12} --> 입찰 조건 불일치 auction: {}, expected: {:?}, actual: {:?}",
                "Store", bid.auction_id, expected_current, current_bid_id
            );
            return Ok(BidWrite::Conflict);
        }

        sqlx::query(queries::CLEAR_CURRENT_BID_FLAG)
            .bind(bid.auction_id)
            .execute(&mut *tx)
            .await?;

        let recorded = sqlx::query_as::<_, AuctionBid>(queries::INSERT_BID)
            .bind(bid.auction_id)
            .bind(bid.seller_id)
            .bind(bid.buyer_id)
            .bind(bid.bid_amount)
            .bind(bid.bid_time)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(queries::SET_CURRENT_BID)
            .bind(bid.auction_id)
            .bind(recorded.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(BidWrite::Recorded(recorded))
    }

    async fn bids_by_buyer(&self, buyer_id: i64) -> StoreResult<Vec<AuctionBid>> {
        let bids = sqlx::query_as::<_, AuctionBid>(queries::BIDS_BY_BUYER)
            .bind(buyer_id)
            .fetch_all(self.db.pool())
            .await?;
        Ok(bids)
    }

    async fn count_bids(&self, auction_ids: &[i64]) -> StoreResult<HashMap<i64, i64>> {
        if auction_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = sqlx::query(queries::COUNT_BIDS)
            .bind(auction_ids)
            .fetch_all(self.db.pool())
            .await?;

        let mut counts = HashMap::with_capacity(rows.len());
        for row in rows {
            counts.insert(row.try_get("auction_id")?, row.try_get("total")?);
        }
        Ok(counts)
    }
    // endregion: --- Bids

    // region:    --- Purchases
    async fn get_purchase(&self, purchase_id: i64) -> StoreResult<Option<Purchase>> {
        let purchase = sqlx::query_as::<_, Purchase>(queries::GET_PURCHASE)
            .bind(purchase_id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(purchase)
    }

    async fn find_purchase(&self, auction_id: i64, buyer_id: i64) -> StoreResult<Option<Purchase>> {
        let purchase = sqlx::query_as::<_, Purchase>(queries::FIND_PURCHASE)
            .bind(auction_id)
            .bind(buyer_id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(purchase)
    }

    async fn purchases_by_buyer(&self, buyer_id: i64) -> StoreResult<Vec<Purchase>> {
        let purchases = sqlx::query_as::<_, Purchase>(queries::PURCHASES_BY_BUYER)
            .bind(buyer_id)
            .fetch_all(self.db.pool())
            .await?;
        Ok(purchases)
    }

    async fn complete_payment(
        &self,
        purchase_id: i64,
        cost: NewAuctionCost,
    ) -> StoreResult<Option<AuctionCost>> {
        self.db
            .transaction(move |tx| {
                Box::pin(async move {
                    // 대기 상태가 아니면 아무것도 기록하지 않음
                    let marked = sqlx::query(queries::MARK_PURCHASE_COMPLETED)
                        .bind(purchase_id)
                        .fetch_optional(&mut **tx)
                        .await?;
                    if marked.is_none() {
                        return Ok::<_, StoreError>(None);
                    }

                    let recorded = sqlx::query_as::<_, AuctionCost>(queries::INSERT_AUCTION_COST)
                        .bind(cost.auction_id)
                        .bind(cost.buyer_id)
                        .bind(cost.seller_id)
                        .bind(cost.amount_paid)
                        .bind(cost.convenience_fee)
                        .bind(cost.total_amount)
                        .bind(cost.payment_date)
                        .fetch_one(&mut **tx)
                        .await?;
                    Ok(Some(recorded))
                })
            })
            .await
    }
    // endregion: --- Purchases

    // region:    --- Rentals
    async fn get_rental(&self, rental_id: i64) -> StoreResult<Option<RentalRequest>> {
        let rental = sqlx::query_as::<_, RentalRequest>(queries::GET_RENTAL)
            .bind(rental_id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(rental)
    }

    async fn find_rentals(&self, filter: &RentalFilter) -> StoreResult<Vec<RentalRequest>> {
        let rentals = sqlx::query_as::<_, RentalRequest>(queries::FIND_RENTALS)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.search.as_deref().map(escape_like))
            .bind(filter.fuel_type.as_deref())
            .bind(filter.transmission.as_deref())
            .bind(filter.min_price)
            .bind(filter.max_price)
            .bind(filter.min_capacity)
            .bind(filter.ids.as_deref())
            .bind(filter.newest_first)
            .bind(filter.limit)
            .fetch_all(self.db.pool())
            .await?;
        Ok(rentals)
    }

    async fn book_rental(
        &self,
        booking: NewRentalBooking,
    ) -> StoreResult<Option<(RentalRequest, RentalCost)>> {
        let mut tx = self.db.pool().begin().await?;

        let Some(rental) = sqlx::query_as::<_, RentalRequest>(queries::BOOK_RENTAL)
            .bind(booking.rental_car_id)
            .bind(booking.buyer_id)
            .bind(booking.pickup_date)
            .bind(booking.drop_date)
            .bind(booking.include_driver)
            .fetch_optional(&mut *tx)
            .await?
        else {
            tx.rollback().await?;
            return Ok(None);
        };

        let cost = sqlx::query_as::<_, RentalCost>(queries::INSERT_RENTAL_COST)
            .bind(booking.rental_car_id)
            .bind(booking.buyer_id)
            .bind(booking.seller_id)
            .bind(booking.total_cost)
            .bind(booking.include_driver)
            .bind(booking.booked_at)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some((rental, cost)))
    }

    async fn rental_costs_by_buyer(&self, buyer_id: i64) -> StoreResult<Vec<RentalCost>> {
        let costs = sqlx::query_as::<_, RentalCost>(queries::RENTAL_COSTS_BY_BUYER)
            .bind(buyer_id)
            .fetch_all(self.db.pool())
            .await?;
        Ok(costs)
    }

    async fn rental_cost_for(&self, rental_id: i64) -> StoreResult<Option<RentalCost>> {
        let cost = sqlx::query_as::<_, RentalCost>(queries::RENTAL_COST_FOR)
            .bind(rental_id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(cost)
    }
    // endregion: --- Rentals

    // region:    --- Wishlists
    async fn find_wishlist(&self, user_id: i64) -> StoreResult<Option<Wishlist>> {
        let exists: bool = sqlx::query_scalar(queries::WISHLIST_EXISTS)
            .bind(user_id)
            .fetch_one(self.db.pool())
            .await?;
        if !exists {
            return Ok(None);
        }
        Ok(Some(self.load_wishlist_items(user_id).await?))
    }

    async fn ensure_wishlist(&self, user_id: i64) -> StoreResult<Wishlist> {
        sqlx::query(queries::ENSURE_WISHLIST)
            .bind(user_id)
            .execute(self.db.pool())
            .await?;
        self.load_wishlist_items(user_id).await
    }

    async fn add_wishlist_item(&self, user_id: i64, kind: WishlistKind, item_id: i64) -> StoreResult<()> {
        self.db
            .transaction(move |tx| {
                Box::pin(async move {
                    sqlx::query(queries::ENSURE_WISHLIST)
                        .bind(user_id)
                        .execute(&mut **tx)
                        .await?;
                    sqlx::query(queries::ADD_WISHLIST_ITEM)
                        .bind(user_id)
                        .bind(kind.as_str())
                        .bind(item_id)
                        .execute(&mut **tx)
                        .await?;
                    Ok::<_, StoreError>(())
                })
            })
            .await
    }

    async fn remove_wishlist_item(&self, user_id: i64, kind: WishlistKind, item_id: i64) -> StoreResult<()> {
        sqlx::query(queries::REMOVE_WISHLIST_ITEM)
            .bind(user_id)
            .bind(kind.as_str())
            .bind(item_id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }
    // endregion: --- Wishlists
}
