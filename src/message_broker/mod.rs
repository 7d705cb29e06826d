// region:    --- Imports
use crate::events::MarketEvent;
use async_trait::async_trait;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::ClientConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

// endregion: --- Imports

// region:    --- Event Publisher
/// 도메인 이벤트 발행 트레이트
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: &MarketEvent) -> Result<(), String>;
}

/// 커밋된 변경 이후 이벤트 발행
/// 발행 실패는 요청 결과에 영향을 주지 않고 로그만 남긴다.
pub async fn publish_after_commit(publisher: &dyn EventPublisher, event: MarketEvent) {
    if let Err(e) = publisher.publish(&event).await {
        error!(
            "{:<12} --> 이벤트 발행 실패: type={}, error={}",
            "Producer",
            event.event_type(),
            e
        );
    }
}

/// 브로커가 설정되지 않은 경우 로그로만 남기는 발행기
#[derive(Debug, Default, Clone)]
pub struct LogEventPublisher;

#[async_trait]
impl EventPublisher for LogEventPublisher {
    async fn publish(&self, event: &MarketEvent) -> Result<(), String> {
        info!(
            "{:<12} --> 이벤트(로그 전용): type={}, key={}",
            "Producer",
            event.event_type(),
            event.aggregate_key()
        );
        Ok(())
    }
}
// endregion: --- Event Publisher

// region:    --- Kafka Producer
#[derive(Clone)]
pub struct KafkaProducer {
    producer: Arc<FutureProducer>,
}

/// KafkaProducer 구현
impl KafkaProducer {
    pub fn new(brokers: &str) -> Result<Self, String> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .create()
            .map_err(|e| format!("Producer creation error: {:?}", e))?;

        Ok(KafkaProducer {
            producer: Arc::new(producer),
        })
    }

    /// 메시지 전송
    pub async fn send_message(&self, topic: &str, key: &str, value: &str) -> Result<(), String> {
        info!(
            "{:<12} --> Kafka 메시지 전송: topic={}, key={}",
            "Producer", topic, key
        );
        let record = FutureRecord::to(topic).key(key).payload(value);

        self.producer
            .send(record, Duration::from_secs(0))
            .await
            .map_err(|(e, _)| format!("Error sending message: {:?}", e))?;

        Ok(())
    }
}

/// Kafka 토픽으로 이벤트 발행
pub struct KafkaEventPublisher {
    producer: KafkaProducer,
    topic: String,
}

impl KafkaEventPublisher {
    pub fn new(brokers: &str, topic: &str) -> Result<Self, String> {
        Ok(Self {
            producer: KafkaProducer::new(brokers)?,
            topic: topic.to_string(),
        })
    }
}

#[async_trait]
impl EventPublisher for KafkaEventPublisher {
    async fn publish(&self, event: &MarketEvent) -> Result<(), String> {
        let payload = serde_json::to_string(event).map_err(|e| e.to_string())?;
        self.producer
            .send_message(&self.topic, &event.aggregate_key(), &payload)
            .await
    }
}

// endregion: --- Kafka Producer

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    struct FailingPublisher;

    #[async_trait]
    impl EventPublisher for FailingPublisher {
        async fn publish(&self, _event: &MarketEvent) -> Result<(), String> {
            Err("broker down".to_string())
        }
    }

    #[tokio::test]
    async fn test_publish_failure_is_swallowed() {
        let event = MarketEvent::AuctionStarted {
            auction_id: 1,
            timestamp: Utc::now(),
        };
        publish_after_commit(&FailingPublisher, event.clone()).await;
        assert!(LogEventPublisher.publish(&event).await.is_ok());
    }
}
