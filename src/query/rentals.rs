// region:    --- Imports
use super::auctions::{non_empty, parse_price};
use super::views::{rental_listings, unique, RentalListing};
use crate::error::{AppError, AppResult};
use crate::rental::model::RentalStatus;
use crate::store::{MarketStore, RentalFilter};
use crate::user::model::SellerSummary;
use serde::{Deserialize, Serialize};
use tracing::info;

// endregion: --- Imports

/// 렌탈 목록 검색 조건
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalQuery {
    #[serde(rename(serialize = "searchQuery"), skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transmission: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

impl RentalQuery {
    pub fn to_filter(&self) -> RentalFilter {
        RentalFilter {
            search: non_empty(&self.search),
            fuel_type: non_empty(&self.fuel_type),
            transmission: non_empty(&self.transmission),
            min_price: parse_price(&self.min_price),
            max_price: parse_price(&self.max_price),
            min_capacity: self
                .capacity
                .as_deref()
                .and_then(|c| c.trim().parse::<i32>().ok()),
            ..RentalFilter::available()
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalList {
    pub rentals: Vec<RentalListing>,
    pub filters: RentalQuery,
    /// 예약 가능한 렌탈이 있는 판매자 도시 (정렬, 중복 제거)
    pub unique_cities: Vec<String>,
}

/// 예약 가능한 렌탈 목록
pub async fn list_rentals(query: RentalQuery, store: &dyn MarketStore) -> AppResult<RentalList> {
    info!("{:<12} --> 렌탈 목록 조회 filters: {:?}", "Query", query);
    let rentals = store.find_rentals(&query.to_filter()).await?;
    let mut rentals = rental_listings(store, rentals).await?;

    if let Some(city) = non_empty(&query.city) {
        let city = city.to_lowercase();
        rentals.retain(|listing| {
            listing
                .seller
                .as_ref()
                .and_then(|s| s.city.as_deref())
                .map_or(false, |c| c.to_lowercase() == city)
        });
    }

    Ok(RentalList {
        rentals,
        filters: query,
        unique_cities: seller_cities(store).await?,
    })
}

async fn seller_cities(store: &dyn MarketStore) -> AppResult<Vec<String>> {
    let available = store.find_rentals(&RentalFilter::available()).await?;
    let seller_ids = unique(available.iter().map(|r| r.seller_id));
    let sellers = store.get_users(&seller_ids).await?;

    let mut cities: Vec<String> = sellers
        .into_values()
        .filter_map(|u| u.city)
        .filter(|c| !c.trim().is_empty())
        .collect();
    cities.sort();
    cities.dedup();
    Ok(cities)
}

/// 렌탈 상세 (공개 필드만)
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalDetail {
    pub rental_id: i64,
    pub vehicle_name: String,
    pub vehicle_image: Option<String>,
    pub year: Option<i32>,
    pub condition: Option<String>,
    pub capacity: Option<i32>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    #[serde(rename = "AC")]
    pub ac: Option<String>,
    pub cost_per_day: f64,
    pub driver_available: bool,
    pub driver_rate: Option<f64>,
    pub status: RentalStatus,
    pub seller: Option<SellerSummary>,
}

pub async fn rental_detail(rental_id: i64, store: &dyn MarketStore) -> AppResult<RentalDetail> {
    info!("{:<12} --> 렌탈 상세 조회 id: {}", "Query", rental_id);
    let rental = store
        .get_rental(rental_id)
        .await?
        .ok_or_else(|| AppError::not_found("Rental not found"))?;
    let seller = store.get_user(rental.seller_id).await?.map(|u| u.summary());

    Ok(RentalDetail {
        rental_id: rental.id,
        vehicle_name: rental.vehicle_name,
        vehicle_image: rental.vehicle_image,
        year: rental.year,
        condition: rental.condition,
        capacity: rental.capacity,
        fuel_type: rental.fuel_type,
        transmission: rental.transmission,
        ac: rental.ac,
        cost_per_day: rental.cost_per_day,
        driver_available: rental.driver_available,
        driver_rate: rental.driver_rate,
        status: rental.status,
        seller,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rental::model::RentalRequest;
    use crate::store::InMemoryStore;
    use crate::user::model::{User, UserType};
    use chrono::Utc;

    fn seller(id: i64, city: &str) -> User {
        User {
            id,
            first_name: "Seller".to_string(),
            last_name: id.to_string(),
            email: format!("seller{}@example.com", id),
            phone: None,
            city: Some(city.to_string()),
            state: None,
            door_no: None,
            street: None,
            user_type: UserType::Seller,
        }
    }

    fn rental(id: i64, seller_id: i64, name: &str, cost_per_day: f64, capacity: i32) -> RentalRequest {
        RentalRequest {
            id,
            seller_id,
            vehicle_name: name.to_string(),
            vehicle_image: None,
            year: Some(2021),
            condition: None,
            capacity: Some(capacity),
            fuel_type: Some("petrol".to_string()),
            transmission: Some("manual".to_string()),
            ac: Some("available".to_string()),
            cost_per_day,
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

    async fn seeded() -> InMemoryStore {
        let store = InMemoryStore::new();
        store.insert_user(seller(1, "Pune")).await;
        store.insert_user(seller(2, "Bengaluru")).await;
        store.insert_user(seller(3, "Delhi")).await;
        store.insert_user(seller(4, "Mündra")).await;
        store.insert_rental(rental(10, 1, "Maruti Ertiga", 2200.0, 7)).await;
        store.insert_rental(rental(11, 2, "Maruti Dzire", 1500.0, 5)).await;
        let mut booked = rental(12, 3, "Kia Carens", 2800.0, 7);
        booked.status = RentalStatus::Unavailable;
        store.insert_rental(booked).await;
        store
    }

    #[tokio::test]
    async fn test_city_filter_folds_non_ascii_case() {
        let store = seeded().await;
        store.insert_rental(rental(13, 4, "Tata Nexon", 1800.0, 5)).await;

        let query = RentalQuery {
            city: Some("MÜNDRA".to_string()),
            ..Default::default()
        };
        let list = list_rentals(query, &store).await.unwrap();
        assert_eq!(list.rentals.len(), 1);
        assert_eq!(list.rentals[0].rental.id, 13);
    }

    #[tokio::test]
    async fn test_list_filters_and_cities() {
        let store = seeded().await;

        let list = list_rentals(RentalQuery::default(), &store).await.unwrap();
        assert_eq!(list.rentals.len(), 2);
        // 예약된 렌탈의 판매자 도시는 제외
        assert_eq!(list.unique_cities, vec!["Bengaluru", "Pune"]);

        let query = RentalQuery {
            search: Some("maruti".to_string()),
            capacity: Some("6".to_string()),
            ..Default::default()
        };
        let list = list_rentals(query, &store).await.unwrap();
        assert_eq!(list.rentals.len(), 1);
        assert_eq!(list.rentals[0].rental.id, 10);

        let query = RentalQuery {
            city: Some("bengaluru".to_string()),
            ..Default::default()
        };
        let list = list_rentals(query, &store).await.unwrap();
        assert_eq!(list.rentals.len(), 1);
        assert_eq!(list.rentals[0].rental.id, 11);
        let filters = serde_json::to_value(&list.filters).unwrap();
        assert_eq!(filters["city"], "bengaluru");
    }

    #[tokio::test]
    async fn test_detail() {
        let store = seeded().await;
        let detail = rental_detail(10, &store).await.unwrap();
        assert_eq!(detail.rental_id, 10);
        assert_eq!(detail.seller.unwrap().city.as_deref(), Some("Pune"));

        let value = serde_json::to_value(rental_detail(11, &store).await.unwrap()).unwrap();
        assert_eq!(value["AC"], "available");
        assert_eq!(value["costPerDay"], 1500.0);

        let err = rental_detail(99, &store).await.unwrap_err();
        assert_eq!(err.to_string(), "Rental not found");
    }
}
