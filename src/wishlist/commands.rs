/// 위시리스트 조회/추가/삭제
// region:    --- Imports
use super::model::WishlistKind;
use crate::error::{AppError, AppResult};
use crate::model::{is_present, value_as_id};
use crate::query::views::{auction_listings, rental_listings, AuctionListing, RentalListing};
use crate::store::{MarketStore, RentalFilter};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

// endregion: --- Imports

/// 추가/삭제 요청 본문
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistRequest {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub auction_id: Option<Value>,
    pub rental_id: Option<Value>,
}

impl WishlistRequest {
    /// 종류와 대상 id 추출
    pub fn target(&self) -> AppResult<(WishlistKind, i64)> {
        let missing = || AppError::validation("Missing required fields");

        let kind = self
            .kind
            .clone()
            .and_then(|k| WishlistKind::try_from(k).ok())
            .ok_or_else(missing)?;
        let raw_id = match kind {
            WishlistKind::Auction => self.auction_id.as_ref(),
            WishlistKind::Rental => self.rental_id.as_ref(),
        }
        .filter(|v| is_present(v))
        .ok_or_else(missing)?;

        let item_id = value_as_id(raw_id).ok_or_else(|| match kind {
            WishlistKind::Auction => AppError::validation("Invalid auction ID"),
            WishlistKind::Rental => AppError::validation("Invalid rental ID"),
        })?;
        Ok((kind, item_id))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistView {
    /// 진행 중인 경매만 노출
    pub auction_wishlist: Vec<AuctionListing>,
    pub rental_wishlist: Vec<RentalListing>,
}

/// 위시리스트 조회 (없으면 빈 목록 생성)
pub async fn view_wishlist(user_id: i64, store: &dyn MarketStore) -> AppResult<WishlistView> {
    info!("{:<12} --> 위시리스트 조회 user: {}", "Wishlist", user_id);
    let wishlist = store.ensure_wishlist(user_id).await?;

    let auctions = if wishlist.auctions.is_empty() {
        Vec::new()
    } else {
        store
            .get_auctions(&wishlist.auctions)
            .await?
            .into_iter()
            .filter(|a| a.is_open_listing())
            .collect()
    };
    let rentals = if wishlist.rentals.is_empty() {
        Vec::new()
    } else {
        store
            .find_rentals(&RentalFilter {
                ids: Some(wishlist.rentals.clone()),
                ..Default::default()
            })
            .await?
    };

    Ok(WishlistView {
        auction_wishlist: auction_listings(store, auctions).await?,
        rental_wishlist: rental_listings(store, rentals).await?,
    })
}

/// 위시리스트 추가 (중복 추가는 무시)
pub async fn add_to_wishlist(
    user_id: i64,
    kind: WishlistKind,
    item_id: i64,
    store: &dyn MarketStore,
) -> AppResult<()> {
    match kind {
        WishlistKind::Auction => {
            store
                .get_auction(item_id)
                .await?
                .ok_or_else(|| AppError::not_found("Auction not found"))?;
        }
        WishlistKind::Rental => {
            store
                .get_rental(item_id)
                .await?
                .ok_or_else(|| AppError::not_found("Rental not found"))?;
        }
    }

    store.add_wishlist_item(user_id, kind, item_id).await?;
    info!(
        "{:<12} --> 위시리스트 추가 user: {}, {}: {}",
        "Wishlist", user_id, kind, item_id
    );
    Ok(())
}

/// 위시리스트 삭제 (없는 항목 삭제는 성공 처리)
pub async fn remove_from_wishlist(
    user_id: i64,
    kind: WishlistKind,
    item_id: i64,
    store: &dyn MarketStore,
) -> AppResult<()> {
    if store.find_wishlist(user_id).await?.is_none() {
        return Err(AppError::not_found("Wishlist not found"));
    }
    store.remove_wishlist_item(user_id, kind, item_id).await?;
    info!(
        "{:<12} --> 위시리스트 삭제 user: {}, {}: {}",
        "Wishlist", user_id, kind, item_id
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auction::model::{AuctionRequest, AuctionStatus, StartedAuction};
    use crate::rental::model::{RentalRequest, RentalStatus};
    use crate::store::InMemoryStore;
    use chrono::Utc;
    use serde_json::json;

    fn auction(id: i64, started: StartedAuction) -> AuctionRequest {
        AuctionRequest {
            id,
            seller_id: 1,
            vehicle_name: "Kia Seltos".to_string(),
            vehicle_image: None,
            year: Some(2021),
            mileage: None,
            condition: None,
            fuel_type: None,
            transmission: None,
            description: None,
            starting_bid: 900_000.0,
            auction_date: Utc::now(),
            status: AuctionStatus::Approved,
            started_auction: started,
            auction_stopped: false,
            winner_id: None,
            final_purchase_price: None,
            current_bid_id: None,
            created_at: Utc::now(),
        }
    }

    fn rental(id: i64) -> RentalRequest {
        RentalRequest {
            id,
            seller_id: 1,
            vehicle_name: "Renault Triber".to_string(),
            vehicle_image: None,
            year: None,
            condition: None,
            capacity: Some(7),
            fuel_type: None,
            transmission: None,
            ac: None,
            cost_per_day: 1800.0,
            driver_available: false,
            driver_rate: None,
            status: RentalStatus::Unavailable,
            buyer_id: None,
            pickup_date: None,
            drop_date: None,
            include_driver: false,
            created_at: Utc::now(),
        }
    }

    fn request(body: Value) -> WishlistRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_request_target() {
        assert_eq!(
            request(json!({"type": "auction", "auctionId": "5"})).target().unwrap(),
            (WishlistKind::Auction, 5)
        );
        assert_eq!(
            request(json!({"type": "rental", "rentalId": 8, "auctionId": 5})).target().unwrap(),
            (WishlistKind::Rental, 8)
        );

        for body in [
            json!({"auctionId": 5}),
            json!({"type": "rental", "auctionId": 5}),
            json!({"type": "boat", "auctionId": 5}),
        ] {
            let err = request(body).target().unwrap_err();
            assert_eq!(err.to_string(), "Missing required fields");
        }
    }

    #[tokio::test]
    async fn test_view_creates_and_populates() {
        let store = InMemoryStore::new();
        store.insert_auction(auction(1, StartedAuction::Yes)).await;
        store.insert_auction(auction(2, StartedAuction::No)).await;
        store.insert_rental(rental(3)).await;

        let view = view_wishlist(9, &store).await.unwrap();
        assert!(view.auction_wishlist.is_empty());
        assert!(store.find_wishlist(9).await.unwrap().is_some());

        add_to_wishlist(9, WishlistKind::Auction, 1, &store).await.unwrap();
        add_to_wishlist(9, WishlistKind::Auction, 2, &store).await.unwrap();
        add_to_wishlist(9, WishlistKind::Rental, 3, &store).await.unwrap();

        let view = view_wishlist(9, &store).await.unwrap();
        // 시작 전 경매는 보이지 않는다
        assert_eq!(view.auction_wishlist.len(), 1);
        assert_eq!(view.auction_wishlist[0].current_highest_bid, 900_000.0);
        // 예약된 렌탈도 위시리스트에는 남는다
        assert_eq!(view.rental_wishlist.len(), 1);
    }

    #[tokio::test]
    async fn test_add_is_idempotent_and_checks_item() {
        let store = InMemoryStore::new();
        store.insert_auction(auction(1, StartedAuction::Yes)).await;

        add_to_wishlist(9, WishlistKind::Auction, 1, &store).await.unwrap();
        add_to_wishlist(9, WishlistKind::Auction, 1, &store).await.unwrap();
        let wishlist = store.find_wishlist(9).await.unwrap().unwrap();
        assert_eq!(wishlist.auctions, vec![1]);

        let err = add_to_wishlist(9, WishlistKind::Rental, 1, &store).await.unwrap_err();
        assert_eq!(err.to_string(), "Rental not found");
    }

    #[tokio::test]
    async fn test_remove() {
        let store = InMemoryStore::new();
        store.insert_auction(auction(1, StartedAuction::Yes)).await;

        let err = remove_from_wishlist(9, WishlistKind::Auction, 1, &store).await.unwrap_err();
        assert_eq!(err.to_string(), "Wishlist not found");

        add_to_wishlist(9, WishlistKind::Auction, 1, &store).await.unwrap();
        remove_from_wishlist(9, WishlistKind::Auction, 1, &store).await.unwrap();
        remove_from_wishlist(9, WishlistKind::Auction, 1, &store).await.unwrap();
        assert!(store.find_wishlist(9).await.unwrap().unwrap().auctions.is_empty());
    }
}
