// region:    --- Imports
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use lot_auction_service::bidding::BidQueueRegistry;
use lot_auction_service::config::Settings;
use lot_auction_service::database::DatabaseManager;
use lot_auction_service::handlers::{self, AppState};
use lot_auction_service::notifier::{BotApiNotifier, Notifier};
use lot_auction_service::scheduler::AuctionScheduler;
use lot_auction_service::store::{LotStore, PostgresLotStore};
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

    let settings = Arc::new(Settings::from_env());

    // DatabaseManager 생성 및 스키마 부트스트랩
    let db_manager = Arc::new(DatabaseManager::new().await);
    if let Err(e) = db_manager.bootstrap_schema().await {
        error!("{:<12} --> 스키마 부트스트랩 실패: {:?}", "Main", e);
        return Err(e.into());
    }

    let store: Arc<dyn LotStore> = Arc::new(PostgresLotStore::new(Arc::clone(&db_manager)));
    let notifier: Arc<dyn Notifier> = Arc::new(BotApiNotifier::new(settings.bot_token.clone()));

    // 로트별 입찰 큐 레지스트리
    let queues = BidQueueRegistry::new(
        Arc::clone(&store),
        Arc::clone(&notifier),
        Arc::clone(&settings),
    );

    // 단계 전환 스케줄러 (재시작 복구 포함)
    let scheduler = AuctionScheduler::new(
        Arc::clone(&store),
        Arc::clone(&notifier),
        Arc::clone(&settings),
    );
    scheduler.start().await;

    // 테스트 페이지를 위한 cors 설정
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let state = AppState {
        store,
        notifier,
        queues,
        settings: Arc::clone(&settings),
    };

    // 라우터 설정
    let routes_all = Router::new()
        .route(
            "/lots",
            post(handlers::handle_create_lot).get(handlers::handle_list_open_lots),
        )
        .route("/lots/:id", get(handlers::handle_get_lot))
        .route("/lots/:id/moderate", post(handlers::handle_moderate))
        .route("/lots/:id/subscribe", post(handlers::handle_subscribe))
        .route("/lots/:id/bid", post(handlers::handle_bid))
        .route("/lots/:id/settle", post(handlers::handle_settle))
        .route("/lots/:id/bids", get(handlers::handle_get_bid_history))
        .route(
            "/lots/:id/highest-bid",
            get(handlers::handle_get_highest_bid),
        )
        .layer(cors)
        .with_state(state);

    // 리스너 생성
    let listener = TcpListener::bind(settings.listen_addr.as_str()).await?;
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
