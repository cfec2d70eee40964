// region:    --- Imports
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

use lot_auction_service::lots::{
    Bid, Lot, LotDraft, LotSummary, ModerationDecision, SaleState, SettleDecision, Watcher,
};
use lot_auction_service::notifier::{InlineKeyboard, Notifier, NotifyError, Recipient};
use lot_auction_service::store::{
    ClosedLot, DecideOutcome, LotStore, SettleOutcome, StoreError,
};
// endregion: --- Imports

// region:    --- MemoryLotStore

#[derive(Default)]
struct Inner {
    lots: HashMap<i64, Lot>,
    bids: Vec<Bid>,
    watchers: Vec<Watcher>,
    next_lot_id: i64,
    next_bid_id: i64,
    next_watcher_id: i64,
}

/// Postgres 구현체와 같은 가드 의미를 갖는 인메모리 저장소
#[derive(Default)]
pub struct MemoryLotStore {
    inner: Mutex<Inner>,
}

impl MemoryLotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 테스트에서 로트 상태를 직접 손보고 싶을 때
    pub fn with_lot_mut(&self, lot_id: i64, f: impl FnOnce(&mut Lot)) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(lot) = inner.lots.get_mut(&lot_id) {
            f(lot);
        }
    }
}

#[async_trait]
impl LotStore for MemoryLotStore {
    async fn insert_lot(&self, draft: &LotDraft, now: DateTime<Utc>) -> Result<Lot, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_lot_id += 1;
        let lot = Lot {
            id: inner.next_lot_id,
            title: draft.title.clone(),
            start_price: draft.start_price,
            current_price: None,
            seller_id: draft.seller_id,
            seller_contact: draft.seller_contact.clone(),
            condition: draft.condition.clone(),
            memory: draft.memory.clone(),
            year: draft.year.clone(),
            battery: draft.battery.clone(),
            repairs: draft.repairs.clone(),
            locks: draft.locks.clone(),
            status: "PENDING".to_string(),
            phase: "NOT_STARTED".to_string(),
            sale: None,
            winner_id: None,
            created_at: now,
            approved_at: None,
            opens_at: None,
            opened_at: None,
            closes_at: None,
            closed_at: None,
            settled_at: None,
        };
        inner.lots.insert(lot.id, lot.clone());
        Ok(lot)
    }

    async fn lot(&self, lot_id: i64) -> Result<Option<Lot>, StoreError> {
        Ok(self.inner.lock().unwrap().lots.get(&lot_id).cloned())
    }

    async fn open_lots(&self) -> Result<Vec<LotSummary>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut lots: Vec<LotSummary> = inner
            .lots
            .values()
            .filter(|lot| lot.phase == "OPEN")
            .map(|lot| LotSummary {
                id: lot.id,
                title: lot.title.clone(),
                current_price: lot.current_price,
                closes_at: lot.closes_at,
            })
            .collect();
        lots.sort_by_key(|lot| lot.closes_at);
        Ok(lots)
    }

    async fn decide_lot(
        &self,
        lot_id: i64,
        decision: ModerationDecision,
        now: DateTime<Utc>,
        opens_at: DateTime<Utc>,
    ) -> Result<DecideOutcome, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(lot) = inner.lots.get_mut(&lot_id) else {
            return Ok(DecideOutcome::NotFound);
        };
        if lot.status != "PENDING" {
            return Ok(DecideOutcome::AlreadyDecided);
        }
        match decision {
            ModerationDecision::Approve => {
                lot.status = "APPROVED".to_string();
                lot.approved_at = Some(now);
                lot.opens_at = Some(opens_at);
            }
            ModerationDecision::Reject => {
                lot.status = "REJECTED".to_string();
            }
        }
        Ok(DecideOutcome::Applied(lot.clone()))
    }

    async fn due_to_open(&self, now: DateTime<Utc>) -> Result<Vec<i64>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut ids: Vec<i64> = inner
            .lots
            .values()
            .filter(|lot| {
                lot.status == "APPROVED"
                    && lot.phase == "NOT_STARTED"
                    && lot.opens_at.is_some_and(|at| at <= now)
            })
            .map(|lot| lot.id)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }

    async fn due_to_close(&self, now: DateTime<Utc>) -> Result<Vec<i64>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut ids: Vec<i64> = inner
            .lots
            .values()
            .filter(|lot| lot.phase == "OPEN" && lot.closes_at.is_some_and(|at| at <= now))
            .map(|lot| lot.id)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }

    async fn open_lot(
        &self,
        lot_id: i64,
        now: DateTime<Utc>,
        closes_at: DateTime<Utc>,
    ) -> Result<Option<Lot>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(lot) = inner.lots.get_mut(&lot_id) else {
            return Ok(None);
        };
        if lot.status != "APPROVED" || lot.phase != "NOT_STARTED" {
            return Ok(None);
        }
        lot.phase = "OPEN".to_string();
        lot.current_price = Some(lot.start_price);
        lot.opened_at = Some(now);
        lot.closes_at = Some(closes_at);
        Ok(Some(lot.clone()))
    }

    async fn close_lot(
        &self,
        lot_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<ClosedLot>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let winner = inner
            .bids
            .iter()
            .filter(|bid| bid.lot_id == lot_id)
            .max_by_key(|bid| bid.amount)
            .cloned();
        let Some(lot) = inner.lots.get_mut(&lot_id) else {
            return Ok(None);
        };
        if lot.phase != "OPEN" {
            return Ok(None);
        }
        lot.phase = "CLOSED".to_string();
        lot.closed_at = Some(now);
        match &winner {
            Some(bid) => {
                lot.sale = Some(SaleState::AwaitingSeller.as_str().to_string());
                lot.winner_id = Some(bid.user_id);
            }
            None => {
                lot.sale = Some(SaleState::NoBids.as_str().to_string());
            }
        }
        Ok(Some(ClosedLot {
            lot: lot.clone(),
            winner,
        }))
    }

    async fn apply_bid(
        &self,
        lot_id: i64,
        user_id: i64,
        amount: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<Bid>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let duplicate = inner
            .bids
            .iter()
            .any(|bid| bid.lot_id == lot_id && bid.amount == amount);
        let Some(lot) = inner.lots.get_mut(&lot_id) else {
            return Ok(None);
        };
        let raised = lot.phase == "OPEN"
            && lot.current_price.is_some_and(|current| current < amount)
            && !duplicate;
        if !raised {
            return Ok(None);
        }
        lot.current_price = Some(amount);
        inner.next_bid_id += 1;
        let bid = Bid {
            id: inner.next_bid_id,
            lot_id,
            user_id,
            amount,
            created_at: now,
        };
        inner.bids.push(bid.clone());
        Ok(Some(bid))
    }

    async fn highest_bid(&self, lot_id: i64) -> Result<Option<Bid>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .bids
            .iter()
            .filter(|bid| bid.lot_id == lot_id)
            .max_by_key(|bid| bid.amount)
            .cloned())
    }

    async fn bid_history(&self, lot_id: i64) -> Result<Vec<Bid>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut bids: Vec<Bid> = inner
            .bids
            .iter()
            .filter(|bid| bid.lot_id == lot_id)
            .cloned()
            .collect();
        // 최신순 (Postgres 쿼리와 동일)
        bids.sort_by_key(|bid| std::cmp::Reverse(bid.id));
        Ok(bids)
    }

    async fn add_watcher(&self, lot_id: i64, user_id: i64) -> Result<Option<Watcher>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let exists = inner
            .watchers
            .iter()
            .any(|w| w.lot_id == lot_id && w.user_id == user_id);
        if exists {
            return Ok(None);
        }
        inner.next_watcher_id += 1;
        let watcher = Watcher {
            id: inner.next_watcher_id,
            lot_id,
            user_id,
        };
        inner.watchers.push(watcher.clone());
        Ok(Some(watcher))
    }

    async fn watchers(&self, lot_id: i64) -> Result<Vec<i64>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .watchers
            .iter()
            .filter(|w| w.lot_id == lot_id)
            .map(|w| w.user_id)
            .collect())
    }

    async fn settle_lot(
        &self,
        lot_id: i64,
        winner_id: i64,
        decision: SettleDecision,
        now: DateTime<Utc>,
    ) -> Result<SettleOutcome, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(lot) = inner.lots.get_mut(&lot_id) else {
            return Ok(SettleOutcome::NotFound);
        };
        if lot.winner_id != Some(winner_id) {
            return Ok(SettleOutcome::NotFound);
        }
        if lot.sale.as_deref() != Some("AWAITING_SELLER") {
            return Ok(SettleOutcome::AlreadyDecided);
        }
        let sale = match decision {
            SettleDecision::Accept => SaleState::Settled,
            SettleDecision::Reject => SaleState::Declined,
        };
        lot.sale = Some(sale.as_str().to_string());
        lot.settled_at = Some(now);
        Ok(SettleOutcome::Applied(lot.clone()))
    }

    async fn backfill_open_times(&self, delay: Duration) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let mut count = 0;
        for lot in inner.lots.values_mut() {
            if lot.status == "APPROVED" && lot.phase == "NOT_STARTED" && lot.opens_at.is_none() {
                if let Some(approved_at) = lot.approved_at {
                    lot.opens_at = Some(approved_at + delay);
                    count += 1;
                }
            }
        }
        Ok(count)
    }

    async fn backfill_close_times(&self, duration: Duration) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let mut count = 0;
        for lot in inner.lots.values_mut() {
            if lot.phase == "OPEN" && lot.closes_at.is_none() {
                if let Some(opened_at) = lot.opened_at {
                    lot.closes_at = Some(opened_at + duration);
                    count += 1;
                }
            }
        }
        Ok(count)
    }
}

// endregion: --- MemoryLotStore

// region:    --- Notifiers

/// 보낸 알림 기록
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub to: Recipient,
    pub text: String,
    pub keyboard: Option<InlineKeyboard>,
}

/// 전송 대신 기록만 하는 알림 구현체
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentMessage>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts_to(&self, to: Recipient) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.to == to)
            .map(|m| m.text.clone())
            .collect()
    }

    pub fn count_containing(&self, needle: &str) -> usize {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.text.contains(needle))
            .count()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(
        &self,
        to: Recipient,
        text: &str,
        keyboard: Option<InlineKeyboard>,
    ) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(SentMessage {
            to,
            text: text.to_string(),
            keyboard,
        });
        Ok(())
    }
}

/// 항상 실패하는 알림 구현체 — 전환이 알림에 묶이지 않음을 검증
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn notify(
        &self,
        _to: Recipient,
        _text: &str,
        _keyboard: Option<InlineKeyboard>,
    ) -> Result<(), NotifyError> {
        Err(NotifyError::Api("доставка недоступна".to_string()))
    }
}

// endregion: --- Notifiers
