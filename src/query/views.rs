/// 목록 응답 공통 뷰
/// 경매/렌탈 레코드에 현재 최고가와 판매자 정보를 붙인다.
// region:    --- Imports
use crate::auction::model::AuctionRequest;
use crate::rental::model::RentalRequest;
use crate::store::{MarketStore, StoreResult};
use crate::user::model::SellerSummary;
use serde::Serialize;

// endregion: --- Imports

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionListing {
    #[serde(flatten)]
    pub auction: AuctionRequest,
    /// 현재 입찰가, 입찰이 없으면 시작가
    pub current_highest_bid: f64,
    pub seller: Option<SellerSummary>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalListing {
    #[serde(flatten)]
    pub rental: RentalRequest,
    pub seller: Option<SellerSummary>,
}

/// 경매 목록에 현재가와 판매자 정보 결합 (일괄 조회)
pub async fn auction_listings(
    store: &dyn MarketStore,
    auctions: Vec<AuctionRequest>,
) -> StoreResult<Vec<AuctionListing>> {
    if auctions.is_empty() {
        return Ok(Vec::new());
    }
    let auction_ids: Vec<i64> = auctions.iter().map(|a| a.id).collect();
    let seller_ids = unique(auctions.iter().map(|a| a.seller_id));

    let current_bids = store.current_bids(&auction_ids).await?;
    let sellers = store.get_users(&seller_ids).await?;

    Ok(auctions
        .into_iter()
        .map(|auction| AuctionListing {
            current_highest_bid: current_bids
                .get(&auction.id)
                .map_or(auction.starting_bid, |bid| bid.bid_amount),
            seller: sellers.get(&auction.seller_id).map(|u| u.summary()),
            auction,
        })
        .collect())
}

/// 렌탈 목록에 판매자 정보 결합
pub async fn rental_listings(
    store: &dyn MarketStore,
    rentals: Vec<RentalRequest>,
) -> StoreResult<Vec<RentalListing>> {
    if rentals.is_empty() {
        return Ok(Vec::new());
    }
    let seller_ids = unique(rentals.iter().map(|r| r.seller_id));
    let sellers = store.get_users(&seller_ids).await?;

    Ok(rentals
        .into_iter()
        .map(|rental| RentalListing {
            seller: sellers.get(&rental.seller_id).map(|u| u.summary()),
            rental,
        })
        .collect())
}

pub(crate) fn unique(ids: impl Iterator<Item = i64>) -> Vec<i64> {
    let mut ids: Vec<i64> = ids.collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}
