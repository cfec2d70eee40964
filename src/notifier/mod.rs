// region:    --- Imports
use async_trait::async_trait;
use serde::Serialize;
use tracing::warn;
// endregion: --- Imports

// region:    --- Recipient / Keyboard

/// 알림 수신자
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    User(i64),
    Channel(i64),
}

impl Recipient {
    pub fn chat_id(&self) -> i64 {
        match self {
            Recipient::User(id) | Recipient::Channel(id) => *id,
        }
    }
}

/// 인라인 버튼 (callback 또는 url 중 하나)
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct InlineButton {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl InlineButton {
    pub fn callback(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: Some(data.into()),
            url: None,
        }
    }

    pub fn link(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: None,
            url: Some(url.into()),
        }
    }
}

/// 인라인 키보드 (전송 제어 버튼)
#[derive(Debug, Clone, Serialize, Default, PartialEq, Eq)]
pub struct InlineKeyboard {
    pub inline_keyboard: Vec<Vec<InlineButton>>,
}

impl InlineKeyboard {
    /// 입찰 증가분 버튼 한 줄
    pub fn bid_buttons(lot_id: i64, current_price: i64, increments: &[i64]) -> Self {
        let row = increments
            .iter()
            .map(|inc| {
                InlineButton::callback(
                    format!("💸 +{inc}₸ (итого {}₸)", current_price + inc),
                    format!("bid_{lot_id}_{inc}"),
                )
            })
            .collect();
        Self {
            inline_keyboard: vec![row],
        }
    }

    /// 채널 공지용 딥링크 버튼
    pub fn deep_link(bot_username: &str, lot_id: i64) -> Self {
        Self {
            inline_keyboard: vec![vec![InlineButton::link(
                "🔨 Поставить",
                format!("https://t.me/{bot_username}?start=lot_{lot_id}"),
            )]],
        }
    }

    /// 모더레이션 승인/거절 버튼
    pub fn moderation_buttons(lot_id: i64) -> Self {
        Self {
            inline_keyboard: vec![
                vec![InlineButton::callback(
                    "✅ Одобрить",
                    format!("approve_{lot_id}"),
                )],
                vec![InlineButton::callback(
                    "❌ Отклонить",
                    format!("reject_{lot_id}"),
                )],
            ],
        }
    }

    /// 판매자 수락/거절 버튼 — (lot_id, winner_id)에 바인딩
    pub fn deal_buttons(lot_id: i64, winner_id: i64) -> Self {
        Self {
            inline_keyboard: vec![
                vec![InlineButton::callback(
                    "✅ Согласиться",
                    format!("accept_deal_{lot_id}_{winner_id}"),
                )],
                vec![InlineButton::callback(
                    "❌ Отказаться",
                    format!("reject_deal_{lot_id}_{winner_id}"),
                )],
            ],
        }
    }
}

// endregion: --- Recipient / Keyboard

// region:    --- Notifier Trait

/// 전송 실패
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("http 오류: {0}")]
    Http(#[from] reqwest::Error),
    #[error("bot api 오류: {0}")]
    Api(String),
}

/// 알림 전송 트레이트
///
/// 전달 보장은 없다. 호출 측은 실패를 로그만 남기고 삼킨다.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(
        &self,
        to: Recipient,
        text: &str,
        keyboard: Option<InlineKeyboard>,
    ) -> Result<(), NotifyError>;
}

/// 실패를 삼키는 전송 — 상태 전환은 알림 때문에 절대 실패하지 않는다
pub async fn send_quietly(
    notifier: &dyn Notifier,
    to: Recipient,
    text: &str,
    keyboard: Option<InlineKeyboard>,
) {
    if let Err(e) = notifier.notify(to, text, keyboard).await {
        warn!("{:<12} --> 알림 전송 실패 ({:?}): {:?}", "Notifier", to, e);
    }
}

// endregion: --- Notifier Trait

// region:    --- Lot Card

/// 로트 카드 (채널·모더레이션·구독 공지용)
pub fn lot_card(lot: &crate::lots::Lot) -> String {
    let mut card = format!("📦 <b>{}</b>\n📝 {}", lot.title, lot.condition);
    if let Some(memory) = &lot.memory {
        card.push_str(&format!("\n💾 Память: {memory}"));
    }
    if let Some(year) = &lot.year {
        card.push_str(&format!("\n📅 Год покупки: {year}"));
    }
    if let Some(battery) = &lot.battery {
        card.push_str(&format!("\n🔋 Аккумулятор: {battery}"));
    }
    if let Some(repairs) = &lot.repairs {
        card.push_str(&format!("\n🛠 Ремонт: {repairs}"));
    }
    if let Some(locks) = &lot.locks {
        card.push_str(&format!("\n🔒 Блокировки: {locks}"));
    }
    card.push_str(&format!("\n💰 <b>Текущая цена:</b> {}₸", lot.price()));
    card.push_str(&format!("\n🆔 ID: <code>{}</code>", lot.id));
    card
}

// endregion: --- Lot Card

// region:    --- BotApiNotifier

/// Telegram 스타일 Bot API sendMessage 구현체
pub struct BotApiNotifier {
    http: reqwest::Client,
    api_base: String,
    token: String,
}

impl BotApiNotifier {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_api_base("https://api.telegram.org", token)
    }

    pub fn with_api_base(api_base: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.into(),
            token: token.into(),
        }
    }
}

#[async_trait]
impl Notifier for BotApiNotifier {
    async fn notify(
        &self,
        to: Recipient,
        text: &str,
        keyboard: Option<InlineKeyboard>,
    ) -> Result<(), NotifyError> {
        let mut body = serde_json::json!({
            "chat_id": to.chat_id(),
            "text": text,
            "parse_mode": "HTML",
        });
        if let Some(kb) = keyboard {
            body["reply_markup"] = serde_json::to_value(kb)
                .map_err(|e| NotifyError::Api(e.to_string()))?;
        }

        let url = format!("{}/bot{}/sendMessage", self.api_base, self.token);
        let response = self.http.post(&url).json(&body).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(NotifyError::Api(format!("{status}: {detail}")));
        }
        Ok(())
    }
}

// endregion: --- BotApiNotifier
