/// 요청 사용자 식별
/// 세션/인증은 앞단 게이트웨이가 처리하고, 확인된 사용자 id 를 `x-user-id` 헤더로 전달한다.
// region:    --- Imports
use super::model::{User, UserType};
use crate::app::AppState;
use crate::error::AppError;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tracing::debug;

// endregion: --- Imports

pub const USER_ID_HEADER: &str = "x-user-id";

/// 인증된 구매자
#[derive(Debug, Clone)]
pub struct CurrentBuyer(pub User);

/// 인증된 경매 매니저
#[derive(Debug, Clone)]
pub struct CurrentAuctionManager(pub User);

async fn resolve_user(parts: &Parts, state: &AppState) -> Result<User, AppError> {
    let user_id = parts
        .headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<i64>().ok())
        .ok_or(AppError::Unauthenticated)?;

    let user = state
        .store
        .get_user(user_id)
        .await?
        .ok_or(AppError::Unauthenticated)?;

    debug!("{:<12} --> 사용자 확인 id: {}", "Auth", user.id);
    Ok(user)
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentBuyer {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = resolve_user(parts, state).await?;
        if user.user_type != UserType::Buyer {
            return Err(AppError::forbidden("Buyer access only"));
        }
        Ok(CurrentBuyer(user))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentAuctionManager {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = resolve_user(parts, state).await?;
        if user.user_type != UserType::AuctionManager {
            return Err(AppError::forbidden("Auction manager access only"));
        }
        Ok(CurrentAuctionManager(user))
    }
}
