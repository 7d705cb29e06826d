/// 경매 진행 상태 관리
/// 시작(매니저/스케줄러), 종료(낙찰 확정), 낙찰 여부 조회
// region:    --- Imports
use super::model::{AuctionRequest, WinnerStatus};
use crate::error::{AppError, AppResult};
use crate::events::MarketEvent;
use crate::message_broker::{publish_after_commit, EventPublisher};
use crate::settlement::model::PaymentStatus;
use crate::store::{MarketStore, StopOutcome};
use chrono::{DateTime, Utc};
use tracing::info;

// endregion: --- Imports

/// 경매 시작
pub async fn start_auction(
    auction_id: i64,
    store: &dyn MarketStore,
    publisher: &dyn EventPublisher,
) -> AppResult<AuctionRequest> {
    let auction = store
        .get_auction(auction_id)
        .await?
        .ok_or_else(|| AppError::not_found("Auction not found"))?;

    if !auction.can_start() {
        return Err(AppError::conflict("Auction cannot be started"));
    }

    // 조회와 시작 사이에 다른 요청이 먼저 시작시킨 경우
    let started = store
        .start_auction(auction_id)
        .await?
        .ok_or_else(|| AppError::conflict("Auction cannot be started"))?;

    info!("{:<12} --> 경매 시작 auction: {}", "Lifecycle", started.id);
    publish_after_commit(
        publisher,
        MarketEvent::AuctionStarted {
            auction_id: started.id,
            timestamp: Utc::now(),
        },
    )
    .await;
    Ok(started)
}

/// 경매일이 지난 승인 경매 일괄 시작 (스케줄러용)
pub async fn start_due_auctions(
    now: DateTime<Utc>,
    store: &dyn MarketStore,
    publisher: &dyn EventPublisher,
) -> AppResult<Vec<i64>> {
    let started = store.start_due_auctions(now).await?;
    for auction_id in &started {
        info!("{:<12} --> 예약된 경매 시작 auction: {}", "Lifecycle", auction_id);
        publish_after_commit(
            publisher,
            MarketEvent::AuctionStarted {
                auction_id: *auction_id,
                timestamp: now,
            },
        )
        .await;
    }
    Ok(started)
}

/// 경매 종료
/// 현재 입찰자가 낙찰자가 되고 결제 대기 구매 기록이 생성된다.
pub async fn stop_auction(
    auction_id: i64,
    store: &dyn MarketStore,
    publisher: &dyn EventPublisher,
) -> AppResult<StopOutcome> {
    let auction = store
        .get_auction(auction_id)
        .await?
        .ok_or_else(|| AppError::not_found("Auction not found"))?;

    if auction.auction_stopped {
        return Err(AppError::conflict("Auction already stopped"));
    }
    if !auction.is_accepting_bids() {
        return Err(AppError::conflict("Auction has not started"));
    }

    let stopped_at = Utc::now();
    let outcome = store
        .stop_auction(auction_id, stopped_at)
        .await?
        .ok_or_else(|| AppError::conflict("Auction already stopped"))?;

    match outcome.auction.winner_id {
        Some(winner_id) => info!(
            "{:<12} --> 경매 종료 auction: {}, 낙찰자: {}",
            "Lifecycle", auction_id, winner_id
        ),
        None => info!("{:<12} --> 경매 종료 auction: {}, 유찰", "Lifecycle", auction_id),
    }

    publish_after_commit(
        publisher,
        MarketEvent::AuctionStopped {
            auction_id,
            winner_id: outcome.auction.winner_id,
            final_price: outcome.auction.final_purchase_price,
            purchase_id: outcome.purchase.as_ref().map(|p| p.id),
            timestamp: stopped_at,
        },
    )
    .await;
    Ok(outcome)
}

/// 낙찰 여부 조회
pub async fn winner_status(
    auction_id: i64,
    buyer_id: i64,
    store: &dyn MarketStore,
) -> AppResult<WinnerStatus> {
    let auction = store
        .get_auction(auction_id)
        .await?
        .ok_or_else(|| AppError::not_found("Auction not found"))?;

    if !auction.auction_stopped || auction.winner_id != Some(buyer_id) {
        return Ok(WinnerStatus::not_winner());
    }

    let payment_status = store
        .find_purchase(auction_id, buyer_id)
        .await?
        .map(|p| p.payment_status)
        .unwrap_or(PaymentStatus::Pending);

    Ok(WinnerStatus {
        is_winner: true,
        bid_amount: auction.final_purchase_price,
        payment_status: Some(payment_status),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auction::model::{AuctionStatus, StartedAuction};
    use crate::bidding::commands::{handle_place_bid, PlaceBidCommand};
    use crate::message_broker::LogEventPublisher;
    use crate::store::InMemoryStore;
    use chrono::Duration;

    fn auction(id: i64, status: AuctionStatus, started: StartedAuction) -> AuctionRequest {
        AuctionRequest {
            id,
            seller_id: 50,
            vehicle_name: "Hyundai Creta SX".to_string(),
            vehicle_image: None,
            year: Some(2020),
            mileage: Some(35_000),
            condition: Some("excellent".to_string()),
            fuel_type: Some("diesel".to_string()),
            transmission: Some("automatic".to_string()),
            description: None,
            starting_bid: 800_000.0,
            auction_date: Utc::now() - Duration::hours(1),
            status,
            started_auction: started,
            auction_stopped: false,
            winner_id: None,
            final_purchase_price: None,
            current_bid_id: None,
            created_at: Utc::now() - Duration::days(3),
        }
    }

    async fn bid(store: &InMemoryStore, auction_id: i64, buyer_id: i64, bid_amount: f64) {
        let cmd = PlaceBidCommand {
            auction_id,
            buyer_id,
            bid_amount,
        };
        handle_place_bid(cmd, store, &LogEventPublisher).await.unwrap();
    }

    #[tokio::test]
    async fn test_start_requires_approved_and_not_started() {
        let store = InMemoryStore::new();
        store.insert_auction(auction(1, AuctionStatus::Approved, StartedAuction::No)).await;
        store.insert_auction(auction(2, AuctionStatus::Pending, StartedAuction::No)).await;

        let started = start_auction(1, &store, &LogEventPublisher).await.unwrap();
        assert_eq!(started.started_auction, StartedAuction::Yes);

        let err = start_auction(1, &store, &LogEventPublisher).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        let err = start_auction(2, &store, &LogEventPublisher).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        let err = start_auction(9, &store, &LogEventPublisher).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_due_auctions_start_once() {
        let store = InMemoryStore::new();
        store.insert_auction(auction(1, AuctionStatus::Approved, StartedAuction::No)).await;
        let mut future = auction(2, AuctionStatus::Approved, StartedAuction::No);
        future.auction_date = Utc::now() + Duration::days(2);
        store.insert_auction(future).await;
        store.insert_auction(auction(3, AuctionStatus::Rejected, StartedAuction::No)).await;

        let started = start_due_auctions(Utc::now(), &store, &LogEventPublisher).await.unwrap();
        assert_eq!(started, vec![1]);

        let again = start_due_auctions(Utc::now(), &store, &LogEventPublisher).await.unwrap();
        assert!(again.is_empty());
    }

    #[tokio::test]
    async fn test_stop_declares_current_bidder_winner() {
        let store = InMemoryStore::new();
        store.insert_auction(auction(1, AuctionStatus::Approved, StartedAuction::Yes)).await;
        bid(&store, 1, 7, 800_000.0).await;
        bid(&store, 1, 8, 802_000.0).await;

        let outcome = stop_auction(1, &store, &LogEventPublisher).await.unwrap();
        assert!(outcome.auction.auction_stopped);
        assert_eq!(outcome.auction.started_auction, StartedAuction::Ended);
        assert_eq!(outcome.auction.winner_id, Some(8));
        assert_eq!(outcome.auction.final_purchase_price, Some(802_000.0));

        let purchase = outcome.purchase.unwrap();
        assert_eq!(purchase.buyer_id, 8);
        assert_eq!(purchase.seller_id, 50);
        assert_eq!(purchase.purchase_price, 802_000.0);
        assert_eq!(purchase.payment_status, PaymentStatus::Pending);

        let err = stop_auction(1, &store, &LogEventPublisher).await.unwrap_err();
        assert_eq!(err.to_string(), "Auction already stopped");
    }

    #[tokio::test]
    async fn test_stop_without_bids_has_no_winner() {
        let store = InMemoryStore::new();
        store.insert_auction(auction(1, AuctionStatus::Approved, StartedAuction::Yes)).await;

        let outcome = stop_auction(1, &store, &LogEventPublisher).await.unwrap();
        assert!(outcome.auction.winner_id.is_none());
        assert!(outcome.purchase.is_none());
        assert!(store.purchases_by_buyer(7).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_winner_status() {
        let store = InMemoryStore::new();
        store.insert_auction(auction(1, AuctionStatus::Approved, StartedAuction::Yes)).await;
        bid(&store, 1, 7, 810_000.0).await;

        // 종료 전에는 누구도 낙찰자가 아니다
        assert_eq!(
            winner_status(1, 7, &store).await.unwrap(),
            WinnerStatus::not_winner()
        );

        stop_auction(1, &store, &LogEventPublisher).await.unwrap();

        let status = winner_status(1, 7, &store).await.unwrap();
        assert!(status.is_winner);
        assert_eq!(status.bid_amount, Some(810_000.0));
        assert_eq!(status.payment_status, Some(PaymentStatus::Pending));

        assert!(!winner_status(1, 8, &store).await.unwrap().is_winner);
        assert!(matches!(
            winner_status(99, 7, &store).await,
            Err(AppError::NotFound(_))
        ));
    }
}
