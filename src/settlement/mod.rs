// region:    --- Imports
use chrono::Utc;
use tracing::info;

use crate::config::Settings;
use crate::error::AuctionError;
use crate::lots::SettleDecision;
use crate::notifier::{send_quietly, Notifier, Recipient};
use crate::store::{LotStore, SettleOutcome};
// endregion: --- Imports

// region:    --- Seller Decide

/// 판매자의 정산 결정
///
/// 결정은 한 번뿐이다 — AWAITING_SELLER 가드에 걸리면 AlreadyDecided,
/// (lot, winner) 쌍이 맞지 않으면 NotFound. 수락 시 판매자 연락처가
/// 낙찰자에게 공개되고 모더레이션 채팅에 감사 기록이 남는다.
pub async fn seller_decide(
    store: &dyn LotStore,
    notifier: &dyn Notifier,
    settings: &Settings,
    lot_id: i64,
    winner_id: i64,
    decision: SettleDecision,
) -> Result<(), AuctionError> {
    info!(
        "{:<12} --> 정산 결정: lot={} winner={} {:?}",
        "Settlement", lot_id, winner_id, decision
    );

    let lot = match store
        .settle_lot(lot_id, winner_id, decision, Utc::now())
        .await?
    {
        SettleOutcome::Applied(lot) => lot,
        SettleOutcome::AlreadyDecided => return Err(AuctionError::AlreadyDecided),
        SettleOutcome::NotFound => return Err(AuctionError::LotNotFound(lot_id)),
    };

    match decision {
        SettleDecision::Accept => {
            send_quietly(
                notifier,
                Recipient::User(winner_id),
                &format!(
                    "✅ Продавец принял вашу ставку по лоту '{}'.\nСвязаться можно по номеру: {}",
                    lot.title, lot.seller_contact
                ),
                None,
            )
            .await;

            // 연락처 공개 감사 기록
            send_quietly(
                notifier,
                Recipient::Channel(settings.moderator_chat_id),
                &format!(
                    "{}: контакт {} передан победителю {}.",
                    lot.title, lot.seller_contact, winner_id
                ),
                None,
            )
            .await;

            send_quietly(
                notifier,
                Recipient::User(lot.seller_id),
                &format!(
                    "✅ Вы приняли сделку по лоту '{}'. Контакт передан победителю.",
                    lot.title
                ),
                None,
            )
            .await;
        }
        SettleDecision::Reject => {
            send_quietly(
                notifier,
                Recipient::User(winner_id),
                &format!(
                    "❌ К сожалению, продавец не принял вашу ставку по лоту '{}'.",
                    lot.title
                ),
                None,
            )
            .await;

            send_quietly(
                notifier,
                Recipient::User(lot.seller_id),
                &format!("❌ Вы отказались от сделки по лоту '{}'.", lot.title),
                None,
            )
            .await;
        }
    }

    Ok(())
}

// endregion: --- Seller Decide
