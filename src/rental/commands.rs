/// 렌탈 예약 처리
// region:    --- Imports
use super::model::{rental_total_cost, NewRentalBooking, RentalCost, RentalRequest, RentalStatus};
use crate::error::{AppError, AppResult};
use crate::events::MarketEvent;
use crate::message_broker::{publish_after_commit, EventPublisher};
use crate::model::{is_present, value_as_amount, value_as_id};
use crate::store::MarketStore;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

// endregion: --- Imports

/// 예약 요청 본문
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRentalRequest {
    pub rental_car_id: Option<Value>,
    pub seller_id: Option<Value>,
    pub pickup_date: Option<String>,
    pub drop_date: Option<String>,
    pub include_driver: Option<bool>,
    /// 참고용. 실제 금액은 서버에서 다시 계산한다.
    pub total_cost: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookRentalCommand {
    pub rental_car_id: i64,
    pub buyer_id: i64,
    pub seller_id: i64,
    pub pickup_date: DateTime<Utc>,
    pub drop_date: DateTime<Utc>,
    pub include_driver: bool,
    pub client_total_cost: Option<f64>,
}

impl BookRentalRequest {
    pub fn into_command(self, buyer_id: i64) -> AppResult<BookRentalCommand> {
        let missing = || AppError::validation("Missing required fields");

        let rental_car_id = self.rental_car_id.filter(is_present).ok_or_else(missing)?;
        let seller_id = self.seller_id.filter(is_present).ok_or_else(missing)?;
        let pickup_date = self.pickup_date.filter(|s| !s.trim().is_empty()).ok_or_else(missing)?;
        let drop_date = self.drop_date.filter(|s| !s.trim().is_empty()).ok_or_else(missing)?;

        Ok(BookRentalCommand {
            rental_car_id: value_as_id(&rental_car_id)
                .ok_or_else(|| AppError::validation("Invalid rental ID"))?,
            buyer_id,
            seller_id: value_as_id(&seller_id)
                .ok_or_else(|| AppError::validation("Invalid seller ID"))?,
            pickup_date: parse_date(&pickup_date)
                .ok_or_else(|| AppError::validation("Invalid pickup date"))?,
            drop_date: parse_date(&drop_date)
                .ok_or_else(|| AppError::validation("Invalid drop date"))?,
            include_driver: self.include_driver.unwrap_or(false),
            client_total_cost: self.total_cost.as_ref().and_then(value_as_amount),
        })
    }
}

/// RFC 3339 또는 날짜만 (YYYY-MM-DD, 자정 UTC)
pub fn parse_date(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| Utc.from_utc_datetime(&dt))
}

/// 렌탈 예약
pub async fn book_rental(
    cmd: BookRentalCommand,
    store: &dyn MarketStore,
    publisher: &dyn EventPublisher,
) -> AppResult<(RentalRequest, RentalCost)> {
    let rental = store
        .get_rental(cmd.rental_car_id)
        .await?
        .ok_or_else(|| AppError::not_found("Rental request not found"))?;

    if rental.status != RentalStatus::Available {
        return Err(AppError::conflict("Rental is no longer available"));
    }
    if rental.seller_id != cmd.seller_id {
        warn!(
            "{:<12} --> 요청 판매자 불일치 rental: {}, 요청: {}, 저장: {}",
            "Rental", rental.id, cmd.seller_id, rental.seller_id
        );
    }

    let total_cost = rental_total_cost(&rental, cmd.pickup_date, cmd.drop_date, cmd.include_driver)
        .ok_or_else(|| AppError::validation("Drop date must be after pickup date"))?;

    if let Some(client_cost) = cmd.client_total_cost {
        if (client_cost - total_cost).abs() > f64::EPSILON {
            warn!(
                "{:<12} --> 클라이언트 금액 무시 rental: {}, 요청: {}, 계산: {}",
                "Rental", rental.id, client_cost, total_cost
            );
        }
    }

    let booking = NewRentalBooking {
        rental_car_id: rental.id,
        buyer_id: cmd.buyer_id,
        seller_id: rental.seller_id,
        pickup_date: cmd.pickup_date,
        drop_date: cmd.drop_date,
        include_driver: cmd.include_driver,
        total_cost,
        booked_at: Utc::now(),
    };

    // 조회 이후 다른 예약이 먼저 들어온 경우
    let (booked, cost) = store
        .book_rental(booking)
        .await?
        .ok_or_else(|| AppError::conflict("Rental is no longer available"))?;

    info!(
        "{:<12} --> 렌탈 예약 rental: {}, buyer: {}, 금액: {}",
        "Rental", booked.id, cmd.buyer_id, cost.total_cost
    );
    publish_after_commit(
        publisher,
        MarketEvent::RentalBooked {
            rental_id: booked.id,
            buyer_id: cmd.buyer_id,
            total_cost: cost.total_cost,
            timestamp: cost.created_at,
        },
    )
    .await;
    Ok((booked, cost))
}
