// region:    --- Imports
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::info;

use super::queries;
use super::{ClosedLot, DecideOutcome, LotStore, SettleOutcome, StoreError};
use crate::database::DatabaseManager;
use crate::lots::{
    Bid, Lot, LotDraft, LotSummary, ModerationDecision, SaleState, SettleDecision, Watcher,
};
// endregion: --- Imports

// region:    --- PostgresLotStore

/// 로트 저장소 Postgres 구현체
pub struct PostgresLotStore {
    db: Arc<DatabaseManager>,
}

impl PostgresLotStore {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LotStore for PostgresLotStore {
    async fn insert_lot(&self, draft: &LotDraft, now: DateTime<Utc>) -> Result<Lot, StoreError> {
        let draft = draft.clone();
        self.db
            .transaction(move |tx| {
                Box::pin(async move {
                    let lot = sqlx::query_as::<_, Lot>(queries::INSERT_LOT)
                        .bind(&draft.title)
                        .bind(draft.start_price)
                        .bind(draft.seller_id)
                        .bind(&draft.seller_contact)
                        .bind(&draft.condition)
                        .bind(&draft.memory)
                        .bind(&draft.year)
                        .bind(&draft.battery)
                        .bind(&draft.repairs)
                        .bind(&draft.locks)
                        .bind(now)
                        .fetch_one(&mut **tx)
                        .await?;

                    for file_id in &draft.photos {
                        sqlx::query(queries::INSERT_LOT_IMAGE)
                            .bind(lot.id)
                            .bind(file_id)
                            .execute(&mut **tx)
                            .await?;
                    }

                    Ok::<_, StoreError>(lot)
                })
            })
            .await
    }

    async fn lot(&self, lot_id: i64) -> Result<Option<Lot>, StoreError> {
        let lot = sqlx::query_as::<_, Lot>(queries::GET_LOT)
            .bind(lot_id)
            .fetch_optional(&*self.db.pool())
            .await?;
        Ok(lot)
    }

    async fn open_lots(&self) -> Result<Vec<LotSummary>, StoreError> {
        let lots = sqlx::query_as::<_, LotSummary>(queries::GET_OPEN_LOTS)
            .fetch_all(&*self.db.pool())
            .await?;
        Ok(lots)
    }

    async fn decide_lot(
        &self,
        lot_id: i64,
        decision: ModerationDecision,
        now: DateTime<Utc>,
        opens_at: DateTime<Utc>,
    ) -> Result<DecideOutcome, StoreError> {
        self.db
            .transaction(move |tx| {
                Box::pin(async move {
                    let updated = match decision {
                        ModerationDecision::Approve => {
                            sqlx::query_as::<_, Lot>(queries::APPROVE_LOT)
                                .bind(lot_id)
                                .bind(now)
                                .bind(opens_at)
                                .fetch_optional(&mut **tx)
                                .await?
                        }
                        ModerationDecision::Reject => {
                            sqlx::query_as::<_, Lot>(queries::REJECT_LOT)
                                .bind(lot_id)
                                .fetch_optional(&mut **tx)
                                .await?
                        }
                    };

                    if let Some(lot) = updated {
                        return Ok::<_, StoreError>(DecideOutcome::Applied(lot));
                    }

                    // PENDING 가드에 걸렸는지, 로트 자체가 없는지 구분
                    let exists = sqlx::query_as::<_, Lot>(queries::GET_LOT)
                        .bind(lot_id)
                        .fetch_optional(&mut **tx)
                        .await?;
                    Ok(match exists {
                        Some(_) => DecideOutcome::AlreadyDecided,
                        None => DecideOutcome::NotFound,
                    })
                })
            })
            .await
    }

    async fn due_to_open(&self, now: DateTime<Utc>) -> Result<Vec<i64>, StoreError> {
        let ids = sqlx::query_scalar::<_, i64>(queries::DUE_TO_OPEN)
            .bind(now)
            .fetch_all(&*self.db.pool())
            .await?;
        Ok(ids)
    }

    async fn due_to_close(&self, now: DateTime<Utc>) -> Result<Vec<i64>, StoreError> {
        let ids = sqlx::query_scalar::<_, i64>(queries::DUE_TO_CLOSE)
            .bind(now)
            .fetch_all(&*self.db.pool())
            .await?;
        Ok(ids)
    }

    async fn open_lot(
        &self,
        lot_id: i64,
        now: DateTime<Utc>,
        closes_at: DateTime<Utc>,
    ) -> Result<Option<Lot>, StoreError> {
        let lot = sqlx::query_as::<_, Lot>(queries::OPEN_LOT)
            .bind(lot_id)
            .bind(now)
            .bind(closes_at)
            .fetch_optional(&*self.db.pool())
            .await?;
        Ok(lot)
    }

    async fn close_lot(
        &self,
        lot_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<ClosedLot>, StoreError> {
        self.db
            .transaction(move |tx| {
                Box::pin(async move {
                    let closed = sqlx::query_as::<_, Lot>(queries::CLOSE_LOT)
                        .bind(lot_id)
                        .bind(now)
                        .fetch_optional(&mut **tx)
                        .await?;

                    // 이미 CLOSED면 중복 발화 — 아무것도 하지 않는다
                    let Some(_) = closed else {
                        return Ok::<_, StoreError>(None);
                    };

                    let winner = sqlx::query_as::<_, Bid>(queries::GET_HIGHEST_BID)
                        .bind(lot_id)
                        .fetch_optional(&mut **tx)
                        .await?;

                    let (sale, winner_id) = match &winner {
                        Some(bid) => (SaleState::AwaitingSeller, Some(bid.user_id)),
                        None => (SaleState::NoBids, None),
                    };

                    let lot = sqlx::query_as::<_, Lot>(queries::RECORD_SALE)
                        .bind(lot_id)
                        .bind(sale.as_str())
                        .bind(winner_id)
                        .fetch_one(&mut **tx)
                        .await?;

                    Ok(Some(ClosedLot { lot, winner }))
                })
            })
            .await
    }

    async fn apply_bid(
        &self,
        lot_id: i64,
        user_id: i64,
        amount: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<Bid>, StoreError> {
        self.db
            .transaction(move |tx| {
                Box::pin(async move {
                    // 가격 갱신 가드가 먼저 — 실패하면 경쟁에서 진 것
                    let raised = sqlx::query_scalar::<_, i64>(queries::RAISE_PRICE)
                        .bind(lot_id)
                        .bind(amount)
                        .fetch_optional(&mut **tx)
                        .await?;
                    if raised.is_none() {
                        return Ok::<_, StoreError>(None);
                    }

                    let bid = sqlx::query_as::<_, Bid>(queries::INSERT_BID)
                        .bind(lot_id)
                        .bind(user_id)
                        .bind(amount)
                        .bind(now)
                        .fetch_optional(&mut **tx)
                        .await?;

                    // 같은 금액이 이미 기록돼 있으면 UNIQUE가 거른다
                    match bid {
                        Some(bid) => Ok(Some(bid)),
                        None => Err(sqlx::Error::RowNotFound.into()),
                    }
                })
            })
            .await
            .or_else(|e| match e {
                // INSERT가 걸러진 경우 트랜잭션은 롤백되고 입찰은 거절된다
                StoreError::Sqlx(sqlx::Error::RowNotFound) => Ok(None),
                other => Err(other),
            })
    }

    async fn highest_bid(&self, lot_id: i64) -> Result<Option<Bid>, StoreError> {
        let bid = sqlx::query_as::<_, Bid>(queries::GET_HIGHEST_BID)
            .bind(lot_id)
            .fetch_optional(&*self.db.pool())
            .await?;
        Ok(bid)
    }

    async fn bid_history(&self, lot_id: i64) -> Result<Vec<Bid>, StoreError> {
        let bids = sqlx::query_as::<_, Bid>(queries::GET_BID_HISTORY)
            .bind(lot_id)
            .fetch_all(&*self.db.pool())
            .await?;
        Ok(bids)
    }

    async fn add_watcher(&self, lot_id: i64, user_id: i64) -> Result<Option<Watcher>, StoreError> {
        let watcher = sqlx::query_as::<_, Watcher>(queries::INSERT_WATCHER)
            .bind(lot_id)
            .bind(user_id)
            .fetch_optional(&*self.db.pool())
            .await?;
        Ok(watcher)
    }

    async fn watchers(&self, lot_id: i64) -> Result<Vec<i64>, StoreError> {
        let ids = sqlx::query_scalar::<_, i64>(queries::GET_WATCHERS)
            .bind(lot_id)
            .fetch_all(&*self.db.pool())
            .await?;
        Ok(ids)
    }

    async fn settle_lot(
        &self,
        lot_id: i64,
        winner_id: i64,
        decision: SettleDecision,
        now: DateTime<Utc>,
    ) -> Result<SettleOutcome, StoreError> {
        self.db
            .transaction(move |tx| {
                Box::pin(async move {
                    let sale = match decision {
                        SettleDecision::Accept => SaleState::Settled,
                        SettleDecision::Reject => SaleState::Declined,
                    };
                    let updated = sqlx::query_as::<_, Lot>(queries::SETTLE_LOT)
                        .bind(lot_id)
                        .bind(winner_id)
                        .bind(sale.as_str())
                        .bind(now)
                        .fetch_optional(&mut **tx)
                        .await?;

                    if let Some(lot) = updated {
                        return Ok::<_, StoreError>(SettleOutcome::Applied(lot));
                    }

                    // (lot, winner) 쌍이 맞는 로트가 있는지 구분
                    let exists = sqlx::query_as::<_, Lot>(queries::GET_LOT)
                        .bind(lot_id)
                        .fetch_optional(&mut **tx)
                        .await?;
                    Ok(match exists {
                        Some(lot) if lot.winner_id == Some(winner_id) => {
                            SettleOutcome::AlreadyDecided
                        }
                        _ => SettleOutcome::NotFound,
                    })
                })
            })
            .await
    }

    async fn backfill_open_times(&self, delay: Duration) -> Result<u64, StoreError> {
        let result = sqlx::query(queries::BACKFILL_OPENS_AT)
            .bind(delay.num_seconds() as f64)
            .execute(&*self.db.pool())
            .await?;
        if result.rows_affected() > 0 {
            info!(
                "{:<12} --> opens_at 복구: {}건",
                "Store",
                result.rows_affected()
            );
        }
        Ok(result.rows_affected())
    }

    async fn backfill_close_times(&self, duration: Duration) -> Result<u64, StoreError> {
        let result = sqlx::query(queries::BACKFILL_CLOSES_AT)
            .bind(duration.num_seconds() as f64)
            .execute(&*self.db.pool())
            .await?;
        if result.rows_affected() > 0 {
            info!(
                "{:<12} --> closes_at 복구: {}건",
                "Store",
                result.rows_affected()
            );
        }
        Ok(result.rows_affected())
    }
}

// endregion: --- PostgresLotStore
