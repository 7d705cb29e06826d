/// 경매 시작 스케줄러
/// 승인된 경매 중 경매일이 지난 것을 주기적으로 시작 상태로 바꾼다.
/// 종료는 경매 매니저가 직접 처리한다.
// region:    --- Imports
use crate::auction::lifecycle::start_due_auctions;
use crate::message_broker::EventPublisher;
use crate::store::MarketStore;
use chrono::Utc;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, error, info};

// endregion: --- Imports

// region:    --- Auction Scheduler
pub struct AuctionScheduler {
    store: Arc<dyn MarketStore>,
    publisher: Arc<dyn EventPublisher>,
    period: Duration,
}

impl AuctionScheduler {
    pub fn new(
        store: Arc<dyn MarketStore>,
        publisher: Arc<dyn EventPublisher>,
        period: Duration,
    ) -> Self {
        Self {
            store,
            publisher,
            period,
        }
    }

    /// 스케줄러 시작. 주기가 0 이면 실행하지 않는다.
    pub fn start(self) -> Option<JoinHandle<()>> {
        if self.period.is_zero() {
            info!("{:<12} --> 스케줄러 비활성화", "Scheduler");
            return None;
        }
        info!(
            "{:<12} --> 스케줄러 시작 (주기: {}초)",
            "Scheduler",
            self.period.as_secs()
        );
        Some(tokio::spawn(async move {
            let mut interval = interval(self.period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                self.run_once().await;
            }
        }))
    }

    /// 한 번 실행
    pub async fn run_once(&self) -> usize {
        match start_due_auctions(Utc::now(), self.store.as_ref(), self.publisher.as_ref()).await {
            Ok(started) => {
                debug!(
                    "{:<12} --> 경매 상태 업데이트 완료 (시작: {}건)",
                    "Scheduler",
                    started.len()
                );
                started.len()
            }
            Err(e) => {
                error!(
                    "{:<12} --> 경매 상태 업데이트 중 오류 발생: {:?}",
                    "Scheduler", e
                );
                0
            }
        }
    }
}
// endregion: --- Auction Scheduler

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auction::model::{AuctionRequest, AuctionStatus, StartedAuction};
    use crate::message_broker::LogEventPublisher;
    use crate::store::InMemoryStore;
    use chrono::Duration as ChronoDuration;

    fn auction(id: i64, offset: ChronoDuration) -> AuctionRequest {
        AuctionRequest {
            id,
            seller_id: 1,
            vehicle_name: "Tata Harrier".to_string(),
            vehicle_image: None,
            year: None,
            mileage: None,
            condition: None,
            fuel_type: None,
            transmission: None,
            description: None,
            starting_bid: 1_200_000.0,
            auction_date: Utc::now() + offset,
            status: AuctionStatus::Approved,
            started_auction: StartedAuction::No,
            auction_stopped: false,
            winner_id: None,
            final_purchase_price: None,
            current_bid_id: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_run_once_starts_due_auctions() {
        let store = Arc::new(InMemoryStore::new());
        store.insert_auction(auction(1, ChronoDuration::minutes(-5))).await;
        store.insert_auction(auction(2, ChronoDuration::days(1))).await;

        let scheduler = AuctionScheduler::new(
            store.clone(),
            Arc::new(LogEventPublisher),
            Duration::from_secs(30),
        );
        assert_eq!(scheduler.run_once().await, 1);
        assert_eq!(scheduler.run_once().await, 0);

        let started = store.get_auction(1).await.unwrap().unwrap();
        assert_eq!(started.started_auction, StartedAuction::Yes);
        let waiting = store.get_auction(2).await.unwrap().unwrap();
        assert_eq!(waiting.started_auction, StartedAuction::No);
    }

    #[test]
    fn test_zero_period_disables() {
        let scheduler = AuctionScheduler::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(LogEventPublisher),
            Duration::ZERO,
        );
        assert!(scheduler.start().is_none());
    }
}
