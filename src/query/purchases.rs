// region:    --- Imports
use super::views::unique;
use crate::auction::model::AuctionRequest;
use crate::error::{AppError, AppResult};
use crate::settlement::model::Purchase;
use crate::store::MarketStore;
use crate::user::model::SellerSummary;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Purchases
/// 구매 내역의 렌탈 항목
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalPurchase {
    pub rental_id: i64,
    pub vehicle_name: String,
    pub vehicle_image: Option<String>,
    pub cost_per_day: f64,
    pub pickup_date: Option<DateTime<Utc>>,
    pub drop_date: Option<DateTime<Utc>>,
    pub total_cost: f64,
    pub seller_name: String,
    pub seller_phone: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOverview {
    pub rentals: Vec<RentalPurchase>,
    pub auction_purchases: Vec<Purchase>,
}

/// 구매자의 렌탈 예약 + 낙찰 구매 목록
/// 렌탈이나 판매자가 사라진 예약은 건너뛴다.
pub async fn purchases(buyer_id: i64, store: &dyn MarketStore) -> AppResult<PurchaseOverview> {
    info!("{:<12} --> 구매 내역 조회 buyer: {}", "Query", buyer_id);
    let costs = store.rental_costs_by_buyer(buyer_id).await?;
    let sellers = store
        .get_users(&unique(costs.iter().map(|c| c.seller_id)))
        .await?;

    let mut rentals = Vec::with_capacity(costs.len());
    for cost in costs {
        let (Some(rental), Some(seller)) = (
            store.get_rental(cost.rental_car_id).await?,
            sellers.get(&cost.seller_id),
        ) else {
            warn!(
                "{:<12} --> 렌탈 또는 판매자 없음 rental: {}",
                "Query", cost.rental_car_id
            );
            continue;
        };
        rentals.push(RentalPurchase {
            rental_id: rental.id,
            vehicle_name: rental.vehicle_name,
            vehicle_image: rental.vehicle_image,
            cost_per_day: rental.cost_per_day,
            pickup_date: rental.pickup_date,
            drop_date: rental.drop_date,
            total_cost: cost.total_cost,
            seller_name: seller.full_name(),
            seller_phone: seller.phone.clone(),
        });
    }

    Ok(PurchaseOverview {
        rentals,
        auction_purchases: store.purchases_by_buyer(buyer_id).await?,
    })
}
// endregion: --- Purchases

// region:    --- Purchase Detail
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseDetail {
    pub purchase: Purchase,
    pub seller: Option<SellerSummary>,
    pub auction: Option<AuctionRequest>,
}

pub async fn purchase_detail(
    purchase_id: i64,
    buyer_id: i64,
    store: &dyn MarketStore,
) -> AppResult<PurchaseDetail> {
    let purchase = store
        .get_purchase(purchase_id)
        .await?
        .ok_or_else(|| AppError::not_found("Purchase not found"))?;

    if purchase.buyer_id != buyer_id {
        return Err(AppError::forbidden("Unauthorized access to purchase details"));
    }

    let seller = store.get_user(purchase.seller_id).await?.map(|u| u.summary());
    let auction = store.get_auction(purchase.auction_id).await?;
    Ok(PurchaseDetail {
        purchase,
        seller,
        auction,
    })
}
// endregion: --- Purchase Detail

// region:    --- Rental Booking Detail
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerContact {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalBookingDetail {
    pub vehicle_name: String,
    pub vehicle_image: Option<String>,
    pub year: Option<i32>,
    #[serde(rename = "AC")]
    pub ac: Option<String>,
    pub capacity: Option<i32>,
    pub condition: Option<String>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub cost_per_day: f64,
    pub driver_available: bool,
    pub driver_rate: Option<f64>,
    pub pickup_date: Option<DateTime<Utc>>,
    pub drop_date: Option<DateTime<Utc>>,
    pub total_cost: f64,
    pub seller: SellerContact,
}

pub async fn rental_booking_detail(
    rental_id: i64,
    store: &dyn MarketStore,
) -> AppResult<RentalBookingDetail> {
    let rental = store
        .get_rental(rental_id)
        .await?
        .ok_or_else(|| AppError::not_found("Rental not found"))?;
    let cost = store
        .rental_cost_for(rental_id)
        .await?
        .ok_or_else(|| AppError::not_found("Rental cost details not found"))?;
    let seller = store
        .get_user(rental.seller_id)
        .await?
        .ok_or_else(|| AppError::not_found("Seller details not found"))?;

    Ok(RentalBookingDetail {
        vehicle_name: rental.vehicle_name,
        vehicle_image: rental.vehicle_image,
        year: rental.year,
        ac: rental.ac,
        capacity: rental.capacity,
        condition: rental.condition,
        fuel_type: rental.fuel_type,
        transmission: rental.transmission,
        cost_per_day: rental.cost_per_day,
        driver_available: rental.driver_available,
        driver_rate: rental.driver_rate,
        pickup_date: rental.pickup_date,
        drop_date: rental.drop_date,
        total_cost: cost.total_cost,
        seller: SellerContact {
            name: seller.full_name(),
            address: seller
                .address()
                .unwrap_or_else(|| "Address not available".to_string()),
            email: seller.email,
            phone: seller.phone,
        },
    })
}
// endregion: --- Rental Booking Detail

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message_broker::LogEventPublisher;
    use crate::rental::commands::{book_rental, parse_date, BookRentalCommand};
    use crate::rental::model::{RentalRequest, RentalStatus};
    use crate::settlement::model::PaymentStatus;
    use crate::store::InMemoryStore;
    use crate::user::model::{User, UserType};

    fn user(id: i64, user_type: UserType) -> User {
        User {
            id,
            first_name: "Anita".to_string(),
            last_name: "Sharma".to_string(),
            email: format!("user{}@example.com", id),
            phone: Some("9000000001".to_string()),
            city: Some("Jaipur".to_string()),
            state: Some("Rajasthan".to_string()),
            door_no: Some("12B".to_string()),
            street: Some("MI Road".to_string()),
            user_type,
        }
    }

    fn rental(id: i64, seller_id: i64) -> RentalRequest {
        RentalRequest {
            id,
            seller_id,
            vehicle_name: "Toyota Innova".to_string(),
            vehicle_image: None,
            year: Some(2019),
            condition: Some("good".to_string()),
            capacity: Some(7),
            fuel_type: Some("diesel".to_string()),
            transmission: Some("manual".to_string()),
            ac: Some("available".to_string()),
            cost_per_day: 2000.0,
            driver_available: false,
            driver_rate: None,
            status: RentalStatus::Available,
            buyer_id: None,
            pickup_date: None,
            drop_date: None,
            include_driver: false,
            created_at: Utc::now(),
        }
    }

    async fn book(store: &InMemoryStore, rental_id: i64, buyer_id: i64, seller_id: i64) {
        let cmd = BookRentalCommand {
            rental_car_id: rental_id,
            buyer_id,
            seller_id,
            pickup_date: parse_date("2025-05-01").unwrap(),
            drop_date: parse_date("2025-05-04").unwrap(),
            include_driver: false,
            client_total_cost: None,
        };
        book_rental(cmd, store, &LogEventPublisher).await.unwrap();
    }

    #[tokio::test]
    async fn test_purchases_overview() {
        let store = InMemoryStore::new();
        store.insert_user(user(1, UserType::Seller)).await;
        store.insert_rental(rental(10, 1)).await;
        store.insert_rental(rental(11, 1)).await;
        store
            .insert_purchase(Purchase {
                id: 30,
                auction_id: 40,
                buyer_id: 5,
                seller_id: 1,
                vehicle_name: "Skoda Slavia".to_string(),
                purchase_price: 1_100_000.0,
                payment_status: PaymentStatus::Pending,
                purchase_date: Utc::now(),
            })
            .await;
        book(&store, 10, 5, 1).await;
        book(&store, 11, 6, 1).await;

        let overview = purchases(5, &store).await.unwrap();
        assert_eq!(overview.rentals.len(), 1);
        assert_eq!(overview.rentals[0].rental_id, 10);
        assert_eq!(overview.rentals[0].total_cost, 6000.0);
        assert_eq!(overview.rentals[0].seller_name, "Anita Sharma");
        assert_eq!(overview.auction_purchases.len(), 1);
    }

    #[tokio::test]
    async fn test_purchase_detail_checks_owner() {
        let store = InMemoryStore::new();
        store.insert_user(user(1, UserType::Seller)).await;
        store
            .insert_purchase(Purchase {
                id: 30,
                auction_id: 40,
                buyer_id: 5,
                seller_id: 1,
                vehicle_name: "Skoda Slavia".to_string(),
                purchase_price: 1_100_000.0,
                payment_status: PaymentStatus::Pending,
                purchase_date: Utc::now(),
            })
            .await;

        let detail = purchase_detail(30, 5, &store).await.unwrap();
        assert_eq!(detail.seller.unwrap().id, 1);
        assert!(detail.auction.is_none());

        assert!(matches!(
            purchase_detail(30, 6, &store).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            purchase_detail(31, 5, &store).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_rental_booking_detail() {
        let store = InMemoryStore::new();
        store.insert_user(user(1, UserType::Seller)).await;
        store.insert_rental(rental(10, 1)).await;

        let err = rental_booking_detail(10, &store).await.unwrap_err();
        assert_eq!(err.to_string(), "Rental cost details not found");

        book(&store, 10, 5, 1).await;
        let detail = rental_booking_detail(10, &store).await.unwrap();
        assert_eq!(detail.total_cost, 6000.0);
        assert_eq!(detail.seller.address, "12B, MI Road, Jaipur, Rajasthan");
        assert_eq!(detail.pickup_date, parse_date("2025-05-01"));
    }
}
