// region:    --- Imports
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use vehicle_market_service::app::{build_router, AppState};
use vehicle_market_service::config::AppConfig;
use vehicle_market_service::database::DatabaseManager;
use vehicle_market_service::message_broker::{EventPublisher, KafkaEventPublisher, LogEventPublisher};
use vehicle_market_service::scheduler::AuctionScheduler;
use vehicle_market_service::store::{InMemoryStore, MarketStore, PgMarketStore};
// endregion: --- Imports

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logging 초기화
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    let config = AppConfig::from_env()?;

    // 저장소 선택
    let store: Arc<dyn MarketStore> = match config.database_url.as_deref() {
        Some(database_url) => {
            let db_manager = Arc::new(DatabaseManager::connect(database_url, &config).await?);
            if config.init_database {
                if let Err(e) = db_manager.initialize_database().await {
                    error!("{:<12} --> 데이터베이스 초기화 실패: {:?}", "Main", e);
                    return Err(e.into());
                }
                info!("{:<12} --> 데이터베이스 초기화 성공", "Main");
            }
            Arc::new(PgMarketStore::new(db_manager))
        }
        None => {
            warn!(
                "{:<12} --> DATABASE_URL 미설정: 메모리 저장소로 실행",
                "Main"
            );
            Arc::new(InMemoryStore::new())
        }
    };

    // 이벤트 발행기 선택
    let publisher: Arc<dyn EventPublisher> = match config.kafka_brokers.as_deref() {
        Some(brokers) => {
            let publisher = KafkaEventPublisher::new(brokers, &config.kafka_topic)?;
            info!(
                "{:<12} --> Kafka 발행기 초기화 (topic: {})",
                "Main", config.kafka_topic
            );
            Arc::new(publisher)
        }
        None => {
            info!("{:<12} --> KAFKA_BROKERS 미설정: 이벤트는 로그로만 남김", "Main");
            Arc::new(LogEventPublisher)
        }
    };

    // 경매 시작 스케줄러
    let _scheduler = AuctionScheduler::new(
        Arc::clone(&store),
        Arc::clone(&publisher),
        config.scheduler_interval,
    )
    .start();

    let routes_all = build_router(AppState::new(store, publisher), &config);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    // 서버 실행
    if let Err(err) = axum::serve(listener, routes_all.into_make_service()).await {
        error!("{:<12} --> Server error: {}", "Main", err);
    }
    Ok(())
}
// endregion: --- Main
