// region:    --- Imports
use chrono::Utc;
use std::sync::Arc;
use tokio::time::{interval, Duration};
use tracing::{error, info};

use crate::auction;
use crate::config::Settings;
use crate::notifier::Notifier;
use crate::store::{LotStore, StoreError};
// endregion: --- Imports

// region:    --- Auction Scheduler

/// 단계 전환 스케줄러
///
/// 저장된 opens_at / closes_at 타임스탬프를 틱마다 조회해서 기한이
/// 지난 전환을 발화한다. 인프로세스 sleep이 아니므로 재시작해도
/// 예약된 전환이 사라지지 않는다. 전환 실패는 다음 틱에 재시도된다.
pub struct AuctionScheduler {
    store: Arc<dyn LotStore>,
    notifier: Arc<dyn Notifier>,
    settings: Arc<Settings>,
}

impl AuctionScheduler {
    pub fn new(
        store: Arc<dyn LotStore>,
        notifier: Arc<dyn Notifier>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            store,
            notifier,
            settings,
        }
    }

    /// 복구 후 틱 루프 기동
    pub async fn start(&self) {
        if let Err(e) = self.recover().await {
            error!("{:<12} --> 재시작 복구 실패: {:?}", "Scheduler", e);
        }

        let store = Arc::clone(&self.store);
        let notifier = Arc::clone(&self.notifier);
        let settings = Arc::clone(&self.settings);
        tokio::spawn(async move {
            let mut tick = interval(Duration::from_secs(settings.scheduler_tick_secs.max(1)));
            loop {
                tick.tick().await;
                Self::fire_due_transitions(&store, &notifier, &settings).await;
            }
        });
        info!("{:<12} --> 스케줄러 기동", "Scheduler");
    }

    /// 재시작 복구
    ///
    /// 승인됐지만 opens_at이 없는 로트는 approved_at + 지연으로,
    /// 개장됐지만 closes_at이 없는 로트는 opened_at + 경매 시간으로
    /// 다시 계산한다. 0부터 다시 기다리게 하지 않는다.
    pub async fn recover(&self) -> Result<(), StoreError> {
        let opens = self
            .store
            .backfill_open_times(self.settings.moderation_open_delay())
            .await?;
        let closes = self
            .store
            .backfill_close_times(self.settings.auction_duration())
            .await?;
        if opens > 0 || closes > 0 {
            info!(
                "{:<12} --> 복구 완료: 개장 {}건, 종료 {}건 재장전",
                "Scheduler", opens, closes
            );
        }
        Ok(())
    }

    /// 기한이 지난 전환을 모두 발화
    ///
    /// 전환 함수가 가드 갱신으로 멱등하므로 중복 발화는 무해하다.
    async fn fire_due_transitions(
        store: &Arc<dyn LotStore>,
        notifier: &Arc<dyn Notifier>,
        settings: &Arc<Settings>,
    ) {
        let now = Utc::now();

        match store.due_to_open(now).await {
            Ok(lot_ids) => {
                for lot_id in lot_ids {
                    if let Err(e) =
                        auction::open_auction(store.as_ref(), notifier.as_ref(), settings, lot_id)
                            .await
                    {
                        // 다음 틱에 다시 기한으로 잡힌다
                        error!(
                            "{:<12} --> 개장 전환 실패 lot={}: {:?}",
                            "Scheduler", lot_id, e
                        );
                    }
                }
            }
            Err(e) => error!("{:<12} --> 개장 대상 조회 실패: {:?}", "Scheduler", e),
        }

        match store.due_to_close(now).await {
            Ok(lot_ids) => {
                for lot_id in lot_ids {
                    if let Err(e) =
                        auction::close_auction(store.as_ref(), notifier.as_ref(), settings, lot_id)
                            .await
                    {
                        error!(
                            "{:<12} --> 종료 전환 실패 lot={}: {:?}",
                            "Scheduler", lot_id, e
                        );
                    }
                }
            }
            Err(e) => error!("{:<12} --> 종료 대상 조회 실패: {:?}", "Scheduler", e),
        }
    }

    /// 테스트·복구 경로에서 한 번만 돌리고 싶을 때
    pub async fn tick_once(&self) {
        Self::fire_due_transitions(&self.store, &self.notifier, &self.settings).await;
    }
}

// endregion: --- Auction Scheduler
