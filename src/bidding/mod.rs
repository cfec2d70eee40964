// region:    --- Imports
use chrono::Utc;
use tracing::info;

use crate::config::Settings;
use crate::error::AuctionError;
use crate::lots::{AuctionPhase, Bid, Watcher};
use crate::notifier::{lot_card, send_quietly, InlineKeyboard, Notifier, Recipient};
use crate::store::LotStore;

pub mod queue;

pub use queue::BidQueueRegistry;
// endregion: --- Imports

// region:    --- Types

/// 입찰 요청
#[derive(Debug, Clone, Copy)]
pub struct BidRequest {
    pub lot_id: i64,
    pub user_id: i64,
    /// 증가분 — 목표가는 제출 시점의 현재가 + 증가분
    pub increment: i64,
}

/// 수락된 입찰 (팬아웃에 필요한 로트 정보 포함)
#[derive(Debug, Clone)]
pub struct BidAccepted {
    pub bid: Bid,
    pub lot_title: String,
    pub seller_id: i64,
}

// endregion: --- Types

// region:    --- Admission

/// 큐에서 꺼낸 입찰 하나를 검증하고 반영한다
///
/// 목표가는 제출 시점 가격으로 이미 계산돼 있다 — 두 입찰자가 같은
/// 화면 가격에서 동시에 같은 증가분을 누르면 둘 다 같은 목표가를
/// 들고 온다. 여기서 최고 입찰가를 다시 읽어 비교하므로 그중
/// 하나만 수락되고 나머지는 TooLow로 거절된다.
///
/// 검증 순서: 로트 존재 → 단계 → 최고가 초과 → 본인 입찰.
pub async fn admit_bid(
    store: &dyn LotStore,
    req: &BidRequest,
    target: i64,
) -> Result<BidAccepted, AuctionError> {
    let lot = store
        .lot(req.lot_id)
        .await?
        .ok_or(AuctionError::LotNotFound(req.lot_id))?;

    match lot.phase() {
        AuctionPhase::NotStarted => return Err(AuctionError::NotStarted),
        AuctionPhase::Closed => return Err(AuctionError::AlreadyEnded),
        AuctionPhase::Open => {}
    }

    let highest = store.highest_bid(req.lot_id).await?;
    if let Some(h) = &highest {
        if target <= h.amount {
            return Err(AuctionError::TooLow { highest: h.amount });
        }
    }

    if req.user_id == lot.seller_id {
        return Err(AuctionError::SelfBid);
    }

    let applied = store
        .apply_bid(req.lot_id, req.user_id, target, Utc::now())
        .await?;
    let bid = match applied {
        Some(bid) => bid,
        // 커밋 시점 가드에서 진 경우 — 최고가를 다시 읽어 알려준다
        None => {
            let highest = store
                .highest_bid(req.lot_id)
                .await?
                .map(|b| b.amount)
                .unwrap_or(lot.price());
            return Err(AuctionError::TooLow { highest });
        }
    };

    info!(
        "{:<12} --> 입찰 수락: lot={} user={} amount={}",
        "Bidding", bid.lot_id, bid.user_id, bid.amount
    );

    Ok(BidAccepted {
        bid,
        lot_title: lot.title,
        seller_id: lot.seller_id,
    })
}

/// 수락 후 구독자 팬아웃 — 전부 최선 노력, 수락 응답을 막지 않는다
///
/// 입찰자 본인은 제외하고, 판매자는 따로 알린다.
pub(crate) async fn fan_out(store: &dyn LotStore, notifier: &dyn Notifier, accepted: &BidAccepted) {
    let bid = &accepted.bid;
    let watchers = match store.watchers(bid.lot_id).await {
        Ok(watchers) => watchers,
        Err(e) => {
            tracing::warn!("{:<12} --> 구독자 조회 실패: {:?}", "Bidding", e);
            return;
        }
    };

    for user_id in watchers {
        if user_id == bid.user_id || user_id == accepted.seller_id {
            continue;
        }
        send_quietly(
            notifier,
            Recipient::User(user_id),
            &format!("📢 Новая ставка по лоту #{}: {}₸", bid.lot_id, bid.amount),
            None,
        )
        .await;
    }

    send_quietly(
        notifier,
        Recipient::User(accepted.seller_id),
        &format!(
            "📢 Новая ставка по вашему лоту #{}: {}₸",
            bid.lot_id, bid.amount
        ),
        None,
    )
    .await;
}

// endregion: --- Admission

// region:    --- Subscribe

/// 로트 구독 (멱등 — 중복 구독은 AlreadySubscribed)
///
/// 구독자에게는 로트 카드와 현재가 기준 입찰 버튼을 보내준다.
pub async fn subscribe(
    store: &dyn LotStore,
    notifier: &dyn Notifier,
    settings: &Settings,
    lot_id: i64,
    user_id: i64,
) -> Result<Watcher, AuctionError> {
    let Some(lot) = store.lot(lot_id).await? else {
        return Err(AuctionError::LotNotFound(lot_id));
    };
    match store.add_watcher(lot_id, user_id).await? {
        Some(watcher) => {
            info!(
                "{:<12} --> 구독 추가: lot={} user={}",
                "Bidding", lot_id, user_id
            );
            send_quietly(
                notifier,
                Recipient::User(user_id),
                &format!("✅ Вы подписались на лот:\n\n{}", lot_card(&lot)),
                Some(InlineKeyboard::bid_buttons(
                    lot.id,
                    lot.price(),
                    &settings.bid_increments,
                )),
            )
            .await;
            Ok(watcher)
        }
        None => Err(AuctionError::AlreadySubscribed),
    }
}

// endregion: --- Subscribe
