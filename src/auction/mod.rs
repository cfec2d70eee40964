// region:    --- Imports
use chrono::Utc;
use tracing::{debug, info};

use crate::config::Settings;
use crate::error::AuctionError;
use crate::notifier::{send_quietly, InlineKeyboard, Notifier, Recipient};
use crate::store::LotStore;
// endregion: --- Imports

// region:    --- Open

/// NOT_STARTED → OPEN 전환
///
/// 이미 개장했으면 무시 (타이머 중복 발화 안전).
/// 저장 실패는 그대로 전파되어 스케줄러가 다음 틱에 재시도한다.
pub async fn open_auction(
    store: &dyn LotStore,
    notifier: &dyn Notifier,
    settings: &Settings,
    lot_id: i64,
) -> Result<(), AuctionError> {
    let now = Utc::now();
    let closes_at = now + settings.auction_duration();

    let Some(lot) = store.open_lot(lot_id, now, closes_at).await? else {
        debug!("{:<12} --> 이미 개장된 로트 무시: lot={}", "Auction", lot_id);
        return Ok(());
    };

    info!(
        "{:<12} --> 경매 개장: lot={} 시작가={} 종료={}",
        "Auction", lot.id, lot.start_price, closes_at
    );

    send_quietly(
        notifier,
        Recipient::Channel(settings.auction_channel_id),
        &format!(
            "Аукцион по лоту '{}' начался! Принимаются ставки.",
            lot.title
        ),
        Some(InlineKeyboard::deep_link(&settings.bot_username, lot.id)),
    )
    .await;

    Ok(())
}

// endregion: --- Open

// region:    --- Close

/// OPEN → CLOSED 전환과 낙찰자 결정
///
/// 최고 입찰이 있으면 판매자에게 수락/거절 버튼을, 채널과 낙찰자에게
/// 결과를 알린다. 입찰이 없으면 NO_BIDS로 종결되고 정산 단계는 없다.
/// 알림 실패는 수신자별로 삼킨다 — 전환 자체는 롤백되지 않는다.
pub async fn close_auction(
    store: &dyn LotStore,
    notifier: &dyn Notifier,
    settings: &Settings,
    lot_id: i64,
) -> Result<(), AuctionError> {
    let Some(closed) = store.close_lot(lot_id, Utc::now()).await? else {
        debug!("{:<12} --> 이미 종료된 로트 무시: lot={}", "Auction", lot_id);
        return Ok(());
    };

    let lot = closed.lot;
    match closed.winner {
        Some(winner) => {
            info!(
                "{:<12} --> 경매 종료: lot={} 낙찰가={} 낙찰자={}",
                "Auction", lot.id, winner.amount, winner.user_id
            );

            send_quietly(
                notifier,
                Recipient::User(lot.seller_id),
                &format!(
                    "⚡ Аукцион завершён!\nПобедитель предложил {}₸ за '{}'.\nСогласитесь на сделку и мы отправим Ваши контакты покупателю.",
                    winner.amount, lot.title
                ),
                Some(InlineKeyboard::deal_buttons(lot.id, winner.user_id)),
            )
            .await;

            send_quietly(
                notifier,
                Recipient::Channel(settings.auction_channel_id),
                &format!(
                    "Аукцион по лоту '{}' завершён! Победная ставка {}₸.",
                    lot.title, winner.amount
                ),
                None,
            )
            .await;

            send_quietly(
                notifier,
                Recipient::User(winner.user_id),
                &format!(
                    "🎉 Поздравляем!!!\nВы выиграли лот '{}' за {}₸.\nЕсли продавец согласится на Вашу ставку, мы пришлем Вам его контактный номер.",
                    lot.title, winner.amount
                ),
                None,
            )
            .await;
        }
        None => {
            info!("{:<12} --> 무응찰 종료: lot={}", "Auction", lot.id);

            send_quietly(
                notifier,
                Recipient::Channel(settings.auction_channel_id),
                &format!("Аукцион по лоту '{}' завершён без ставок.", lot.title),
                None,
            )
            .await;

            send_quietly(
                notifier,
                Recipient::User(lot.seller_id),
                &format!(
                    "Аукцион по Вашему лоту '{}' завершён без ставок.",
                    lot.title
                ),
                None,
            )
            .await;
        }
    }

    Ok(())
}

// endregion: --- Close
