// region:    --- Imports
use super::views::{auction_listings, rental_listings, AuctionListing, RentalListing};
use crate::error::AppResult;
use crate::store::{AuctionFilter, MarketStore, RentalFilter, SortOrder};
use serde::Serialize;
use tracing::info;

// endregion: --- Imports

const FEATURED_LIMIT: i64 = 3;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub featured_rentals: Vec<RentalListing>,
    pub featured_auctions: Vec<AuctionListing>,
}

/// 대시보드 추천 목록
/// 최근 등록된 예약 가능 렌탈 3건, 경매일이 가장 늦은 진행 중 경매 3건
pub async fn dashboard(store: &dyn MarketStore) -> AppResult<Dashboard> {
    info!("{:<12} --> 대시보드 조회", "Query");
    let rentals = store
        .find_rentals(&RentalFilter {
            newest_first: true,
            limit: Some(FEATURED_LIMIT),
            ..RentalFilter::available()
        })
        .await?;
    let auctions = store
        .find_open_auctions(&AuctionFilter {
            order: SortOrder::Descending,
            limit: Some(FEATURED_LIMIT),
            ..Default::default()
        })
        .await?;

    Ok(Dashboard {
        featured_rentals: rental_listings(store, rentals).await?,
        featured_auctions: auction_listings(store, auctions).await?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auction::model::{AuctionRequest, AuctionStatus, StartedAuction};
    use crate::rental::model::{RentalRequest, RentalStatus};
    use crate::store::InMemoryStore;
    use chrono::{Duration, Utc};

    fn auction(id: i64, days_ahead: i64) -> AuctionRequest {
        AuctionRequest {
            id,
            seller_id: 1,
            vehicle_name: format!("Auction car {}", id),
            vehicle_image: None,
            year: None,
            mileage: None,
            condition: None,
            fuel_type: None,
            transmission: None,
            description: None,
            starting_bid: 100_000.0,
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

    fn rental(id: i64, hours_ago: i64, status: RentalStatus) -> RentalRequest {
        RentalRequest {
            id,
            seller_id: 1,
            vehicle_name: format!("Rental car {}", id),
            vehicle_image: None,
            year: None,
            condition: None,
            capacity: Some(5),
            fuel_type: None,
            transmission: None,
            ac: None,
            cost_per_day: 1200.0,
            driver_available: false,
            driver_rate: None,
            status,
            buyer_id: None,
            pickup_date: None,
            drop_date: None,
            include_driver: false,
            created_at: Utc::now() - Duration::hours(hours_ago),
        }
    }

    #[tokio::test]
    async fn test_featured_selection() {
        let store = InMemoryStore::new();
        for (id, days) in [(1, 1), (2, 5), (3, 3), (4, 4)] {
            store.insert_auction(auction(id, days)).await;
        }
        for (id, hours) in [(10, 5), (11, 1), (12, 3), (13, 2)] {
            store.insert_rental(rental(id, hours, RentalStatus::Available)).await;
        }
        store.insert_rental(rental(14, 0, RentalStatus::Unavailable)).await;

        let dashboard = dashboard(&store).await.unwrap();
        let auction_ids: Vec<i64> = dashboard.featured_auctions.iter().map(|a| a.auction.id).collect();
        let rental_ids: Vec<i64> = dashboard.featured_rentals.iter().map(|r| r.rental.id).collect();
        assert_eq!(auction_ids, vec![2, 4, 3]);
        assert_eq!(rental_ids, vec![11, 13, 12]);
        assert_eq!(dashboard.featured_auctions[0].current_highest_bid, 100_000.0);
    }
}
