// region:    --- Imports
use chrono::Utc;
use tracing::info;

use crate::config::Settings;
use crate::error::AuctionError;
use crate::lots::{LotDraft, ModerationDecision};
use crate::notifier::{lot_card, send_quietly, InlineKeyboard, Notifier, Recipient};
use crate::store::{DecideOutcome, LotStore};
// endregion: --- Imports

// region:    --- Submit

/// 로트 제출
///
/// 검증 통과 시 PENDING으로 저장하고 모더레이션 채팅에
/// 승인/거절 버튼과 함께 공지한다.
pub async fn submit_lot(
    store: &dyn LotStore,
    notifier: &dyn Notifier,
    settings: &Settings,
    draft: LotDraft,
) -> Result<i64, AuctionError> {
    info!(
        "{:<12} --> 로트 제출: seller={} title={}",
        "Moderation", draft.seller_id, draft.title
    );
    validate_draft(&draft, settings)?;

    let lot = store.insert_lot(&draft, Utc::now()).await?;

    send_quietly(
        notifier,
        Recipient::Channel(settings.moderator_chat_id),
        &format!(
            "🔥 Новый лот!\n{}\n💰 Старт: {}₸\n👤 Продавец: {}",
            lot_card(&lot),
            lot.start_price,
            lot.seller_id
        ),
        Some(InlineKeyboard::moderation_buttons(lot.id)),
    )
    .await;

    send_quietly(
        notifier,
        Recipient::User(lot.seller_id),
        "⌛ Ваш лот отправлен на модерацию. Ожидайте решения.",
        None,
    )
    .await;

    Ok(lot.id)
}

/// 제출 검증: 제목, 시작가, 최소 사진 장수, 상태 설명
fn validate_draft(draft: &LotDraft, settings: &Settings) -> Result<(), AuctionError> {
    if draft.title.trim().is_empty() {
        return Err(AuctionError::Validation(
            "❌ Укажите модель устройства.".to_string(),
        ));
    }
    if draft.start_price <= 0 {
        return Err(AuctionError::Validation(
            "❌ Стартовая цена должна быть больше нуля.".to_string(),
        ));
    }
    if draft.photos.len() < settings.min_photos {
        return Err(AuctionError::Validation(format!(
            "❌ Нужно минимум {} фото. Сейчас {}.",
            settings.min_photos,
            draft.photos.len()
        )));
    }
    if draft.condition.trim().is_empty() {
        return Err(AuctionError::Validation(
            "❌ Опишите общее состояние телефона.".to_string(),
        ));
    }
    Ok(())
}

// endregion: --- Submit

// region:    --- Decide

/// 모더레이션 결정
///
/// 상태 전이와 opens_at 기록이 한 트랜잭션이므로 타이머 장전은
/// 로트당 정확히 한 번만 일어난다. 두 번째 결정은 AlreadyDecided.
pub async fn decide_lot(
    store: &dyn LotStore,
    notifier: &dyn Notifier,
    settings: &Settings,
    lot_id: i64,
    decision: ModerationDecision,
) -> Result<(), AuctionError> {
    info!(
        "{:<12} --> 모더레이션 결정: lot={} {:?}",
        "Moderation", lot_id, decision
    );
    let now = Utc::now();
    let opens_at = now + settings.moderation_open_delay();

    let lot = match store.decide_lot(lot_id, decision, now, opens_at).await? {
        DecideOutcome::Applied(lot) => lot,
        DecideOutcome::AlreadyDecided => return Err(AuctionError::AlreadyDecided),
        DecideOutcome::NotFound => return Err(AuctionError::LotNotFound(lot_id)),
    };

    match decision {
        ModerationDecision::Approve => {
            let minutes = settings.moderation_open_delay_secs / 60;
            send_quietly(
                notifier,
                Recipient::Channel(settings.auction_channel_id),
                &format!(
                    "🔥 Новый лот!\n{}\n💰 Старт: {}₸\n⏳ Торги начнутся через {} мин.",
                    lot_card(&lot),
                    lot.start_price,
                    minutes
                ),
                None,
            )
            .await;
            send_quietly(
                notifier,
                Recipient::User(lot.seller_id),
                &format!(
                    "✅ Лот одобрен и опубликован! Торги начнутся через {minutes} мин."
                ),
                None,
            )
            .await;
        }
        ModerationDecision::Reject => {
            send_quietly(
                notifier,
                Recipient::User(lot.seller_id),
                "❌ Ваш лот отклонён. Пожалуйста, уточните причину у службы поддержки.",
                None,
            )
            .await;
        }
    }

    Ok(())
}

// endregion: --- Decide
