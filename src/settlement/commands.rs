/// 낙찰 결제 처리
// region:    --- Imports
use super::model::{AuctionCost, NewAuctionCost, PaymentBreakdown, PaymentDetails, PaymentStatus};
use crate::error::{AppError, AppResult};
use crate::events::MarketEvent;
use crate::message_broker::{publish_after_commit, EventPublisher};
use crate::store::MarketStore;
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

// endregion: --- Imports

/// 결제 완료 요청 본문 (선택)
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletePaymentRequest {
    pub payment_method: Option<String>,
}

/// 결제 확인: 구매 기록 조회 + 수수료 계산
pub async fn confirm_payment(
    auction_id: i64,
    buyer_id: i64,
    store: &dyn MarketStore,
) -> AppResult<PaymentDetails> {
    let purchase = store
        .find_purchase(auction_id, buyer_id)
        .await?
        .ok_or_else(|| AppError::not_found("Purchase not found"))?;

    if purchase.payment_status == PaymentStatus::Completed {
        return Err(AppError::conflict("Payment already completed"));
    }

    Ok(PaymentDetails {
        purchase_id: purchase.id,
        auction_id: purchase.auction_id,
        breakdown: PaymentBreakdown::for_price(purchase.purchase_price),
    })
}

/// 결제 완료
/// 결제 대기 상태일 때만 결제 기록을 남기고 완료 처리한다.
pub async fn complete_payment(
    purchase_id: i64,
    buyer_id: i64,
    payment_method: Option<&str>,
    store: &dyn MarketStore,
    publisher: &dyn EventPublisher,
) -> AppResult<AuctionCost> {
    let purchase = store
        .get_purchase(purchase_id)
        .await?
        .ok_or_else(|| AppError::not_found("Purchase not found"))?;

    if purchase.buyer_id != buyer_id {
        return Err(AppError::forbidden("Unauthorized"));
    }
    if purchase.payment_status == PaymentStatus::Completed {
        return Err(AppError::conflict("Payment already completed"));
    }

    let breakdown = PaymentBreakdown::for_price(purchase.purchase_price);
    let cost = NewAuctionCost {
        auction_id: purchase.auction_id,
        buyer_id,
        seller_id: purchase.seller_id,
        amount_paid: breakdown.amount,
        convenience_fee: breakdown.convenience_fee,
        total_amount: breakdown.total_amount,
        payment_date: Utc::now(),
    };

    // 동시에 들어온 중복 결제는 여기서 걸러진다
    let recorded = store
        .complete_payment(purchase_id, cost)
        .await?
        .ok_or_else(|| AppError::conflict("Payment already completed"))?;

    info!(
        "{:<12} --> 결제 완료 purchase: {}, 금액: {}, 결제수단: {}",
        "Settlement",
        purchase_id,
        recorded.total_amount,
        payment_method.unwrap_or("unspecified")
    );
    publish_after_commit(
        publisher,
        MarketEvent::PaymentCompleted {
            purchase_id,
            auction_id: recorded.auction_id,
            buyer_id,
            total_amount: recorded.total_amount,
            timestamp: recorded.payment_date,
        },
    )
    .await;
    Ok(recorded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message_broker::LogEventPublisher;
    use crate::settlement::model::Purchase;
    use crate::store::InMemoryStore;
    use std::sync::Arc;

    fn purchase(id: i64, buyer_id: i64, status: PaymentStatus) -> Purchase {
        Purchase {
            id,
            auction_id: 20,
            buyer_id,
            seller_id: 5,
            vehicle_name: "Tata Nexon EV".to_string(),
            purchase_price: 500_000.0,
            payment_status: status,
            purchase_date: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_confirm_payment_breakdown() {
        let store = InMemoryStore::new();
        store.insert_purchase(purchase(1, 7, PaymentStatus::Pending)).await;

        let details = confirm_payment(20, 7, &store).await.unwrap();
        assert_eq!(details.purchase_id, 1);
        assert_eq!(details.breakdown.convenience_fee, 5_000.0);
        assert_eq!(details.breakdown.total_amount, 505_000.0);

        let value = serde_json::to_value(&details).unwrap();
        assert_eq!(value["totalAmount"], 505_000.0);
        assert_eq!(value["auctionId"], 20);

        assert!(matches!(
            confirm_payment(20, 8, &store).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_complete_payment_once() {
        let store = InMemoryStore::new();
        store.insert_purchase(purchase(1, 7, PaymentStatus::Pending)).await;

        let cost = complete_payment(1, 7, Some("upi"), &store, &LogEventPublisher)
            .await
            .unwrap();
        assert_eq!(cost.amount_paid, 500_000.0);
        assert_eq!(cost.total_amount, 505_000.0);

        let err = complete_payment(1, 7, None, &store, &LogEventPublisher)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Payment already completed");
        assert_eq!(store.auction_costs().await.len(), 1);

        let err = confirm_payment(20, 7, &store).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_complete_payment_checks_owner() {
        let store = InMemoryStore::new();
        store.insert_purchase(purchase(1, 7, PaymentStatus::Pending)).await;

        let err = complete_payment(1, 8, None, &store, &LogEventPublisher)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let err = complete_payment(2, 7, None, &store, &LogEventPublisher)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_concurrent_completion_writes_one_record() {
        let store = Arc::new(InMemoryStore::new());
        store.insert_purchase(purchase(1, 7, PaymentStatus::Pending)).await;

        let mut handles = vec![];
        for _ in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                complete_payment(1, 7, None, store.as_ref(), &LogEventPublisher).await
            }));
        }

        let mut completed = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                completed += 1;
            }
        }
        assert_eq!(completed, 1);
        assert_eq!(store.auction_costs().await.len(), 1);
    }
}
