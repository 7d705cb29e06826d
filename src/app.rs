/// 애플리케이션 상태와 라우터 구성
// region:    --- Imports
use crate::config::AppConfig;
use crate::error::AppError;
use crate::handlers;
use crate::message_broker::EventPublisher;
use crate::store::MarketStore;
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

// endregion: --- Imports

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MarketStore>,
    pub publisher: Arc<dyn EventPublisher>,
}

impl AppState {
    pub fn new(store: Arc<dyn MarketStore>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self { store, publisher }
    }
}

// region:    --- Response Envelope
/// 성공 응답 `{success: true, message, data}`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// data 가 null 인 성공 응답
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
// endregion: --- Response Envelope

// region:    --- Router
/// 전체 라우터 구성
/// 구매자 API 는 `api_prefix` 아래, 경매 매니저 API 는 `/api/auction-manager` 아래에 둔다.
pub fn build_router(state: AppState, config: &AppConfig) -> Router {
    let buyer_routes = Router::new()
        .route("/dashboard", get(handlers::dashboard))
        .route("/auctions", get(handlers::list_auctions))
        .route("/auctions/:id", get(handlers::auction_detail))
        .route("/auction/place-bid", post(handlers::place_bid))
        .route("/auction/winner-status/:id", get(handlers::winner_status))
        .route("/auction/confirm-payment/:id", get(handlers::confirm_payment))
        .route("/auction/complete-payment/:id", post(handlers::complete_payment))
        .route("/bids", get(handlers::my_bids))
        .route("/rentals", get(handlers::list_rentals))
        .route("/rentals/book", post(handlers::book_rental))
        .route("/rentals/:id", get(handlers::rental_detail))
        .route("/purchases", get(handlers::purchases))
        .route("/purchases/:id", get(handlers::purchase_detail))
        .route("/purchases/rentals/:id", get(handlers::rental_booking_detail))
        .route(
            "/wishlist",
            get(handlers::view_wishlist)
                .post(handlers::add_to_wishlist)
                .delete(handlers::remove_from_wishlist),
        )
        .fallback(route_not_found);

    let manager_routes = Router::new()
        .route("/auctions/:id/start", post(handlers::start_auction))
        .route("/auctions/:id/stop", post(handlers::stop_auction));

    Router::new()
        .nest(&config.api_prefix, buyer_routes)
        .nest("/api/auction-manager", manager_routes)
        .fallback(route_not_found)
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(config.client_url.as_deref()))
        .with_state(state)
}

/// CLIENT_URL 이 있으면 해당 출처만 허용, 없으면 전체 허용
fn cors_layer(client_url: Option<&str>) -> CorsLayer {
    let user_id_header = HeaderName::from_static(crate::user::extractor::USER_ID_HEADER);
    match client_url.map(HeaderValue::from_str) {
        Some(Ok(origin)) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE, user_id_header])
            .allow_credentials(true),
        Some(Err(e)) => {
            warn!("{:<12} --> CLIENT_URL 값 오류, 전체 허용: {}", "Main", e);
            CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
        }
        None => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    }
}

async fn route_not_found() -> AppError {
    AppError::not_found("API route not found")
}
// endregion: --- Router
