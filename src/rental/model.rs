use crate::model::text_enum;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

text_enum! {
    /// 렌탈 차량 상태
    pub enum RentalStatus: "rental status" {
        Available => "available",
        Unavailable => "unavailable",
    }
}

// 렌탈 차량 모델
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RentalRequest {
    pub id: i64,
    pub seller_id: i64,
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
    #[sqlx(try_from = "String")]
    pub status: RentalStatus,
    pub buyer_id: Option<i64>,
    pub pickup_date: Option<DateTime<Utc>>,
    pub drop_date: Option<DateTime<Utc>>,
    pub include_driver: bool,
    pub created_at: DateTime<Utc>,
}

// 렌탈 비용 모델
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RentalCost {
    pub id: i64,
    pub rental_car_id: i64,
    pub buyer_id: i64,
    pub seller_id: i64,
    pub total_cost: f64,
    pub include_driver: bool,
    pub created_at: DateTime<Utc>,
}

/// 예약 요청 (저장소 전달용)
#[derive(Debug, Clone)]
pub struct NewRentalBooking {
    pub rental_car_id: i64,
    pub buyer_id: i64,
    pub seller_id: i64,
    pub pickup_date: DateTime<Utc>,
    pub drop_date: DateTime<Utc>,
    pub include_driver: bool,
    pub total_cost: f64,
    pub booked_at: DateTime<Utc>,
}

/// 렌탈 비용 계산
/// 기간은 일 단위 올림, 기사 포함 시 기사 요금 추가
pub fn rental_total_cost(
    rental: &RentalRequest,
    pickup: DateTime<Utc>,
    drop: DateTime<Utc>,
    include_driver: bool,
) -> Option<f64> {
    const DAY_MS: i64 = 86_400_000;
    let millis = (drop - pickup).num_milliseconds();
    if millis <= 0 {
        return None;
    }
    let days = ((millis + DAY_MS - 1) / DAY_MS) as f64;
    let base_cost = days * rental.cost_per_day;
    let driver_cost = if include_driver && rental.driver_available {
        days * rental.driver_rate.unwrap_or(0.0)
    } else {
        0.0
    };
    Some(base_cost + driver_cost)
}
