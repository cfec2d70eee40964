// region:    --- Imports
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::bidding::{self, BidQueueRegistry, BidRequest};
use crate::config::Settings;
use crate::error::AuctionError;
use crate::lots::{LotDraft, ModerationDecision, SettleDecision};
use crate::moderation;
use crate::notifier::Notifier;
use crate::settlement;
use crate::store::LotStore;
// endregion: --- Imports

// region:    --- App State

/// 핸들러 공유 상태
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn LotStore>,
    pub notifier: Arc<dyn Notifier>,
    pub queues: BidQueueRegistry,
    pub settings: Arc<Settings>,
}

// endregion: --- App State

// region:    --- Request Bodies

#[derive(Debug, Deserialize)]
pub struct ModerateRequest {
    pub decision: ModerationDecision,
}

#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub user_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct PlaceBidRequest {
    pub user_id: i64,
    pub increment: i64,
}

#[derive(Debug, Deserialize)]
pub struct SettleRequest {
    pub winner_id: i64,
    pub decision: SettleDecision,
}

// endregion: --- Request Bodies

// region:    --- Command Handlers

/// 로트 제출 처리
pub async fn handle_create_lot(
    State(state): State<AppState>,
    Json(draft): Json<LotDraft>,
) -> Result<impl IntoResponse, AuctionError> {
    info!("{:<12} --> 로트 제출 요청: seller={}", "Command", draft.seller_id);
    let lot_id = moderation::submit_lot(
        state.store.as_ref(),
        state.notifier.as_ref(),
        &state.settings,
        draft,
    )
    .await?;
    Ok(Json(serde_json::json!({
        "lot_id": lot_id,
        "message": "⌛ Ваш лот отправлен на модерацию. Ожидайте решения.",
    })))
}

/// 모더레이션 결정 처리
pub async fn handle_moderate(
    State(state): State<AppState>,
    Path(lot_id): Path<i64>,
    Json(req): Json<ModerateRequest>,
) -> Result<impl IntoResponse, AuctionError> {
    info!(
        "{:<12} --> 모더레이션 요청: lot={} {:?}",
        "Command", lot_id, req.decision
    );
    moderation::decide_lot(
        state.store.as_ref(),
        state.notifier.as_ref(),
        &state.settings,
        lot_id,
        req.decision,
    )
    .await?;
    let message = match req.decision {
        ModerationDecision::Approve => "✅ Лот одобрен и опубликован!",
        ModerationDecision::Reject => "❌ Лот отклонён.",
    };
    Ok(Json(serde_json::json!({ "message": message })))
}

/// 구독 처리
pub async fn handle_subscribe(
    State(state): State<AppState>,
    Path(lot_id): Path<i64>,
    Json(req): Json<SubscribeRequest>,
) -> Result<impl IntoResponse, AuctionError> {
    info!(
        "{:<12} --> 구독 요청: lot={} user={}",
        "Command", lot_id, req.user_id
    );
    let watcher = bidding::subscribe(
        state.store.as_ref(),
        state.notifier.as_ref(),
        &state.settings,
        lot_id,
        req.user_id,
    )
    .await?;
    Ok(Json(serde_json::json!({
        "message": "✅ Вы подписались на лот.",
        "watcher": watcher,
    })))
}

/// 입찰 처리 — 로트별 큐를 거쳐 직렬로 수락/거절된다
pub async fn handle_bid(
    State(state): State<AppState>,
    Path(lot_id): Path<i64>,
    Json(req): Json<PlaceBidRequest>,
) -> Result<impl IntoResponse, AuctionError> {
    info!(
        "{:<12} --> 입찰 요청: lot={} user={} inc={}",
        "Command", lot_id, req.user_id, req.increment
    );
    let accepted = state
        .queues
        .submit_bid(BidRequest {
            lot_id,
            user_id: req.user_id,
            increment: req.increment,
        })
        .await?;
    Ok(Json(serde_json::json!({
        "message": format!("✅ Ставка {}₸ принята.", accepted.bid.amount),
        "current_price": accepted.bid.amount,
    })))
}

/// 판매자 정산 결정 처리
pub async fn handle_settle(
    State(state): State<AppState>,
    Path(lot_id): Path<i64>,
    Json(req): Json<SettleRequest>,
) -> Result<impl IntoResponse, AuctionError> {
    info!(
        "{:<12} --> 정산 요청: lot={} winner={} {:?}",
        "Command", lot_id, req.winner_id, req.decision
    );
    settlement::seller_decide(
        state.store.as_ref(),
        state.notifier.as_ref(),
        &state.settings,
        lot_id,
        req.winner_id,
        req.decision,
    )
    .await?;
    let message = match req.decision {
        SettleDecision::Accept => "✅ Вы приняли сделку. Контакт передан победителю.",
        SettleDecision::Reject => "❌ Вы отказались от сделки.",
    };
    Ok(Json(serde_json::json!({ "message": message })))
}

// endregion: --- Command Handlers

// region:    --- Query Handlers

/// 진행 중 로트 목록 조회
pub async fn handle_list_open_lots(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AuctionError> {
    info!("{:<12} --> 진행 중 로트 조회", "HandlerQuery");
    let lots = state.store.open_lots().await?;
    Ok(Json(lots))
}

/// 로트 조회
pub async fn handle_get_lot(
    State(state): State<AppState>,
    Path(lot_id): Path<i64>,
) -> Result<impl IntoResponse, AuctionError> {
    info!("{:<12} --> 로트 조회 id: {}", "HandlerQuery", lot_id);
    let lot = state
        .store
        .lot(lot_id)
        .await?
        .ok_or(AuctionError::LotNotFound(lot_id))?;
    Ok(Json(lot))
}

/// 입찰 이력 조회
pub async fn handle_get_bid_history(
    State(state): State<AppState>,
    Path(lot_id): Path<i64>,
) -> Result<impl IntoResponse, AuctionError> {
    info!("{:<12} --> 입찰 이력 조회 id: {}", "HandlerQuery", lot_id);
    let bids = state.store.bid_history(lot_id).await?;
    Ok(Json(bids))
}

/// 최고 입찰가 조회
pub async fn handle_get_highest_bid(
    State(state): State<AppState>,
    Path(lot_id): Path<i64>,
) -> Result<impl IntoResponse, AuctionError> {
    info!("{:<12} --> 최고 입찰가 조회 id: {}", "HandlerQuery", lot_id);
    let bid = state.store.highest_bid(lot_id).await?;
    Ok(Json(bid))
}

// endregion: --- Query Handlers
