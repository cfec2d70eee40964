// region:    --- Imports
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::lots::{Bid, Lot, LotDraft, LotSummary, ModerationDecision, SettleDecision, Watcher};

mod postgres;
mod queries;

pub use postgres::PostgresLotStore;
// endregion: --- Imports

// region:    --- Outcomes

/// 모더레이션 결정 적용 결과
#[derive(Debug)]
pub enum DecideOutcome {
    Applied(Lot),
    AlreadyDecided,
    NotFound,
}

/// 종료 전환 결과 (낙찰자는 같은 트랜잭션에서 결정된다)
#[derive(Debug)]
pub struct ClosedLot {
    pub lot: Lot,
    pub winner: Option<Bid>,
}

/// 정산 결정 적용 결과
#[derive(Debug)]
pub enum SettleOutcome {
    Applied(Lot),
    AlreadyDecided,
    NotFound,
}

/// 저장소 오류
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("db 오류: {0}")]
    Sqlx(#[from] sqlx::Error),
}

// endregion: --- Outcomes

// region:    --- LotStore Trait

/// 로트 저장소 트레이트
///
/// 메서드 하나가 트랜잭션 하나다. 단계 전환과 입찰 반영은 모두
/// 가드 조건부 갱신이라 중복 호출은 관찰 가능한 상태를 바꾸지 않는다.
#[async_trait]
pub trait LotStore: Send + Sync {
    /// 로트 + 사진을 한 트랜잭션으로 저장 (status=PENDING)
    async fn insert_lot(&self, draft: &LotDraft, now: DateTime<Utc>) -> Result<Lot, StoreError>;

    async fn lot(&self, lot_id: i64) -> Result<Option<Lot>, StoreError>;

    /// 진행 중(OPEN) 로트 요약 목록
    async fn open_lots(&self) -> Result<Vec<LotSummary>, StoreError>;

    /// PENDING 가드 하에 모더레이션 상태를 단 한 번 전이
    ///
    /// 승인 시 opens_at도 같은 트랜잭션에서 기록된다 — 타이머 장전은
    /// 이 기록이 전부이며, 이중 승인 경쟁은 가드가 차단한다.
    async fn decide_lot(
        &self,
        lot_id: i64,
        decision: ModerationDecision,
        now: DateTime<Utc>,
        opens_at: DateTime<Utc>,
    ) -> Result<DecideOutcome, StoreError>;

    /// 개장 기한이 지난 로트 id 목록
    async fn due_to_open(&self, now: DateTime<Utc>) -> Result<Vec<i64>, StoreError>;

    /// 종료 기한이 지난 로트 id 목록
    async fn due_to_close(&self, now: DateTime<Utc>) -> Result<Vec<i64>, StoreError>;

    /// NOT_STARTED → OPEN 가드 전환, current_price := start_price
    ///
    /// 이미 전환됐으면 None (중복 발화 무시)
    async fn open_lot(
        &self,
        lot_id: i64,
        now: DateTime<Utc>,
        closes_at: DateTime<Utc>,
    ) -> Result<Option<Lot>, StoreError>;

    /// OPEN → CLOSED 가드 전환 + 최고 입찰 조회 + 정산 상태 기록
    async fn close_lot(
        &self,
        lot_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<ClosedLot>, StoreError>;

    /// 입찰 기록 삽입 + 가드 가격 갱신을 한 트랜잭션으로
    ///
    /// current_price < amount 그리고 phase = OPEN일 때만 반영.
    /// 경쟁에서 진 경우 None.
    async fn apply_bid(
        &self,
        lot_id: i64,
        user_id: i64,
        amount: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<Bid>, StoreError>;

    async fn highest_bid(&self, lot_id: i64) -> Result<Option<Bid>, StoreError>;

    /// 입찰 이력 (최신순)
    async fn bid_history(&self, lot_id: i64) -> Result<Vec<Bid>, StoreError>;

    /// 구독 추가, 이미 있으면 None (멱등)
    async fn add_watcher(&self, lot_id: i64, user_id: i64) -> Result<Option<Watcher>, StoreError>;

    async fn watchers(&self, lot_id: i64) -> Result<Vec<i64>, StoreError>;

    /// AWAITING_SELLER 가드 하에 정산 결정을 단 한 번 전이
    async fn settle_lot(
        &self,
        lot_id: i64,
        winner_id: i64,
        decision: SettleDecision,
        now: DateTime<Utc>,
    ) -> Result<SettleOutcome, StoreError>;

    /// 재시작 복구: opens_at 없는 APPROVED 로트에
    /// approved_at + delay를 채워 넣는다
    async fn backfill_open_times(&self, delay: Duration) -> Result<u64, StoreError>;

    /// 재시작 복구: closes_at 없는 OPEN 로트에
    /// opened_at + duration을 채워 넣는다
    async fn backfill_close_times(&self, duration: Duration) -> Result<u64, StoreError>;
}

// endregion: --- LotStore Trait
