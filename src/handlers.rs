/// HTTP 핸들러
/// 요청을 검증해 커맨드/쿼리로 넘기고 결과를 공통 응답 형식으로 감싼다.
// region:    --- Imports
use crate::app::{ApiResponse, AppState};
use crate::auction::lifecycle;
use crate::auction::model::{AuctionRequest, WinnerStatus};
use crate::bidding::commands::{handle_place_bid, PlaceBidRequest};
use crate::error::{AppError, AppResult};
use crate::query::auctions::{self as auction_query, AuctionDetail, AuctionList, AuctionQuery, MyBid};
use crate::query::dashboard::{self as dashboard_query, Dashboard};
use crate::query::purchases::{self as purchase_query, PurchaseDetail, PurchaseOverview, RentalBookingDetail};
use crate::query::rentals::{self as rental_query, RentalDetail, RentalList, RentalQuery};
use crate::rental::commands::{self as rental_commands, BookRentalRequest};
use crate::rental::model::RentalRequest;
use crate::settlement::commands::{self as settlement_commands, CompletePaymentRequest};
use crate::settlement::model::{PaymentDetails, Purchase};
use crate::user::extractor::{CurrentAuctionManager, CurrentBuyer};
use crate::wishlist::commands::{self as wishlist_commands, WishlistRequest, WishlistView};
use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Serialize;
use tracing::{debug, info};

// endregion: --- Imports

type ApiResult<T> = AppResult<ApiResponse<T>>;

// path 의 id 는 숫자만 허용
fn parse_path_id(raw: &str, label: &str) -> AppResult<i64> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::validation(format!("Invalid {} ID", label)))
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            debug!("{:<12} --> 요청 본문 오류: {}", "Handler", rejection.body_text());
            Err(AppError::validation("Invalid request body"))
        }
    }
}

// region:    --- Dashboard & Auctions
pub async fn dashboard(State(state): State<AppState>, CurrentBuyer(_user): CurrentBuyer) -> ApiResult<Dashboard> {
    let data = dashboard_query::dashboard(state.store.as_ref()).await?;
    Ok(ApiResponse::ok("Dashboard data fetched successfully", data))
}

pub async fn list_auctions(
    State(state): State<AppState>,
    CurrentBuyer(_user): CurrentBuyer,
    Query(query): Query<AuctionQuery>,
) -> ApiResult<AuctionList> {
    let data = auction_query::list_auctions(query, state.store.as_ref()).await?;
    Ok(ApiResponse::ok("Auctions fetched successfully", data))
}

pub async fn auction_detail(
    State(state): State<AppState>,
    CurrentBuyer(user): CurrentBuyer,
    Path(id): Path<String>,
) -> ApiResult<AuctionDetail> {
    let auction_id = parse_path_id(&id, "auction")?;
    let data = auction_query::auction_detail(auction_id, user.id, state.store.as_ref()).await?;
    Ok(ApiResponse::ok("Auction details fetched", data))
}

pub async fn my_bids(State(state): State<AppState>, CurrentBuyer(user): CurrentBuyer) -> ApiResult<Vec<MyBid>> {
    let data = auction_query::my_bids(user.id, state.store.as_ref()).await?;
    Ok(ApiResponse::ok("Bids fetched successfully", data))
}
// endregion: --- Dashboard & Auctions

// region:    --- Bidding & Settlement
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BidPlaced {
    pub bid_amount: f64,
    pub auction_id: i64,
    pub buyer_id: i64,
}

/// 입찰 요청 처리
pub async fn place_bid(
    State(state): State<AppState>,
    CurrentBuyer(user): CurrentBuyer,
    body: Result<Json<PlaceBidRequest>, JsonRejection>,
) -> ApiResult<BidPlaced> {
    let cmd = json_body(body)?.into_command(user.id)?;
    let bid = handle_place_bid(cmd, state.store.as_ref(), state.publisher.as_ref()).await?;
    Ok(ApiResponse::ok(
        "Bid placed successfully",
        BidPlaced {
            bid_amount: bid.bid_amount,
            auction_id: bid.auction_id,
            buyer_id: bid.buyer_id,
        },
    ))
}

pub async fn winner_status(
    State(state): State<AppState>,
    CurrentBuyer(user): CurrentBuyer,
    Path(id): Path<String>,
) -> ApiResult<WinnerStatus> {
    let auction_id = parse_path_id(&id, "auction")?;
    let data = lifecycle::winner_status(auction_id, user.id, state.store.as_ref()).await?;
    Ok(ApiResponse::ok("Winner status checked", data))
}

pub async fn confirm_payment(
    State(state): State<AppState>,
    CurrentBuyer(user): CurrentBuyer,
    Path(id): Path<String>,
) -> ApiResult<PaymentDetails> {
    let auction_id = parse_path_id(&id, "auction")?;
    let data = settlement_commands::confirm_payment(auction_id, user.id, state.store.as_ref()).await?;
    Ok(ApiResponse::ok("Payment details fetched", data))
}

/// 결제 완료. 본문은 없어도 된다.
pub async fn complete_payment(
    State(state): State<AppState>,
    CurrentBuyer(user): CurrentBuyer,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<()> {
    let purchase_id = parse_path_id(&id, "purchase")?;
    let request: CompletePaymentRequest = if body.iter().all(u8::is_ascii_whitespace) {
        CompletePaymentRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|_| AppError::validation("Invalid request body"))?
    };

    settlement_commands::complete_payment(
        purchase_id,
        user.id,
        request.payment_method.as_deref(),
        state.store.as_ref(),
        state.publisher.as_ref(),
    )
    .await?;
    Ok(ApiResponse::message("Payment completed successfully"))
}
// endregion: --- Bidding & Settlement

// region:    --- Rentals & Purchases
pub async fn list_rentals(
    State(state): State<AppState>,
    CurrentBuyer(_user): CurrentBuyer,
    Query(query): Query<RentalQuery>,
) -> ApiResult<RentalList> {
    let data = rental_query::list_rentals(query, state.store.as_ref()).await?;
    Ok(ApiResponse::ok("Rentals fetched", data))
}

pub async fn rental_detail(
    State(state): State<AppState>,
    CurrentBuyer(_user): CurrentBuyer,
    Path(id): Path<String>,
) -> ApiResult<RentalDetail> {
    let rental_id = parse_path_id(&id, "rental")?;
    let data = rental_query::rental_detail(rental_id, state.store.as_ref()).await?;
    Ok(ApiResponse::ok("Rental details fetched", data))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalBooked {
    pub rental_request: RentalRequest,
    pub total_cost: f64,
}

pub async fn book_rental(
    State(state): State<AppState>,
    CurrentBuyer(user): CurrentBuyer,
    body: Result<Json<BookRentalRequest>, JsonRejection>,
) -> ApiResult<RentalBooked> {
    let cmd = json_body(body)?.into_command(user.id)?;
    let (rental, cost) =
        rental_commands::book_rental(cmd, state.store.as_ref(), state.publisher.as_ref()).await?;
    Ok(ApiResponse::ok(
        "Rental booked successfully",
        RentalBooked {
            rental_request: rental,
            total_cost: cost.total_cost,
        },
    ))
}

pub async fn purchases(
    State(state): State<AppState>,
    CurrentBuyer(user): CurrentBuyer,
) -> ApiResult<PurchaseOverview> {
    let data = purchase_query::purchases(user.id, state.store.as_ref()).await?;
    Ok(ApiResponse::ok("Purchase data fetched", data))
}

pub async fn purchase_detail(
    State(state): State<AppState>,
    CurrentBuyer(user): CurrentBuyer,
    Path(id): Path<String>,
) -> ApiResult<PurchaseDetail> {
    let purchase_id = parse_path_id(&id, "purchase")?;
    let data = purchase_query::purchase_detail(purchase_id, user.id, state.store.as_ref()).await?;
    Ok(ApiResponse::ok("Purchase details fetched", data))
}

#[derive(Debug, Serialize)]
pub struct RentalBookingData {
    pub rental: RentalBookingDetail,
}

pub async fn rental_booking_detail(
    State(state): State<AppState>,
    CurrentBuyer(_user): CurrentBuyer,
    Path(id): Path<String>,
) -> ApiResult<RentalBookingData> {
    let rental_id = parse_path_id(&id, "rental")?;
    let rental = purchase_query::rental_booking_detail(rental_id, state.store.as_ref()).await?;
    Ok(ApiResponse::ok("Rental details fetched", RentalBookingData { rental }))
}
// endregion: --- Rentals & Purchases

// region:    --- Wishlist
pub async fn view_wishlist(
    State(state): State<AppState>,
    CurrentBuyer(user): CurrentBuyer,
) -> ApiResult<WishlistView> {
    let data = wishlist_commands::view_wishlist(user.id, state.store.as_ref()).await?;
    Ok(ApiResponse::ok("Wishlist items fetched", data))
}

pub async fn add_to_wishlist(
    State(state): State<AppState>,
    CurrentBuyer(user): CurrentBuyer,
    body: Result<Json<WishlistRequest>, JsonRejection>,
) -> ApiResult<()> {
    let (kind, item_id) = json_body(body)?.target()?;
    wishlist_commands::add_to_wishlist(user.id, kind, item_id, state.store.as_ref()).await?;
    Ok(ApiResponse::message("Item added to wishlist"))
}

pub async fn remove_from_wishlist(
    State(state): State<AppState>,
    CurrentBuyer(user): CurrentBuyer,
    body: Result<Json<WishlistRequest>, JsonRejection>,
) -> ApiResult<()> {
    let (kind, item_id) = json_body(body)?.target()?;
    wishlist_commands::remove_from_wishlist(user.id, kind, item_id, state.store.as_ref()).await?;
    Ok(ApiResponse::message("Item removed from wishlist"))
}
// endregion: --- Wishlist

// region:    --- Auction Manager
pub async fn start_auction(
    State(state): State<AppState>,
    CurrentAuctionManager(manager): CurrentAuctionManager,
    Path(id): Path<String>,
) -> ApiResult<AuctionRequest> {
    let auction_id = parse_path_id(&id, "auction")?;
    info!(
        "{:<12} --> 경매 시작 요청 auction: {}, manager: {}",
        "Handler", auction_id, manager.id
    );
    let auction = lifecycle::start_auction(auction_id, state.store.as_ref(), state.publisher.as_ref()).await?;
    Ok(ApiResponse::ok("Auction started", auction))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionStopped {
    pub auction: AuctionRequest,
    pub purchase: Option<Purchase>,
}

pub async fn stop_auction(
    State(state): State<AppState>,
    CurrentAuctionManager(manager): CurrentAuctionManager,
    Path(id): Path<String>,
) -> ApiResult<AuctionStopped> {
    let auction_id = parse_path_id(&id, "auction")?;
    info!(
        "{:<12} --> 경매 종료 요청 auction: {}, manager: {}",
        "Handler", auction_id, manager.id
    );
    let outcome = lifecycle::stop_auction(auction_id, state.store.as_ref(), state.publisher.as_ref()).await?;
    Ok(ApiResponse::ok(
        "Auction stopped",
        AuctionStopped {
            auction: outcome.auction,
            purchase: outcome.purchase,
        },
    ))
}
// endregion: --- Auction Manager
