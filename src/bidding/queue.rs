// region:    --- Imports
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use super::{BidAccepted, BidRequest};
use crate::config::Settings;
use crate::error::AuctionError;
use crate::notifier::Notifier;
use crate::store::LotStore;
// endregion: --- Imports

/// 큐 항목: 요청, 제출 시점에 계산된 목표가, 응답 채널
type Pending = (
    BidRequest,
    i64,
    oneshot::Sender<Result<BidAccepted, AuctionError>>,
);

// region:    --- BidQueueRegistry

/// 로트별 입찰 큐 레지스트리
///
/// 같은 로트의 입찰은 단일 워커가 도착 순서대로 하나씩 처리하고,
/// 다른 로트끼리는 완전히 병렬이다. 워커는 첫 제출에 생성되고
/// 큐가 비면 스스로 내려간다.
#[derive(Clone)]
pub struct BidQueueRegistry {
    inner: Arc<RegistryInner>,
}

struct RegistryInner {
    store: Arc<dyn LotStore>,
    notifier: Arc<dyn Notifier>,
    settings: Arc<Settings>,
    queues: Mutex<HashMap<i64, mpsc::UnboundedSender<Pending>>>,
}

impl BidQueueRegistry {
    pub fn new(
        store: Arc<dyn LotStore>,
        notifier: Arc<dyn Notifier>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                store,
                notifier,
                settings,
                queues: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// 입찰 제출 — 큐를 거쳐 수락/거절이 결정될 때까지 기다린다
    ///
    /// 목표가는 여기서, 즉 제출 시점의 가격으로 굳힌다. 검증은
    /// 워커가 꺼낼 때 최신 상태로 다시 한다.
    pub async fn submit_bid(&self, req: BidRequest) -> Result<BidAccepted, AuctionError> {
        if !self.inner.settings.bid_increments.contains(&req.increment) {
            return Err(AuctionError::InvalidIncrement(req.increment));
        }

        let lot = self
            .inner
            .store
            .lot(req.lot_id)
            .await?
            .ok_or(AuctionError::LotNotFound(req.lot_id))?;
        let target = lot.price() + req.increment;

        let (reply_tx, reply_rx) = oneshot::channel();
        RegistryInner::enqueue(&self.inner, req, target, reply_tx);
        reply_rx.await.map_err(|_| AuctionError::QueueClosed)?
    }
}

impl RegistryInner {
    /// 레지스트리 잠금 아래에서 큐에 넣는다
    ///
    /// 워커 해체도 같은 잠금 아래에서 일어나므로, 전송에 성공했으면
    /// 워커가 반드시 이 항목을 처리한다.
    fn enqueue(
        this: &Arc<Self>,
        req: BidRequest,
        target: i64,
        reply: oneshot::Sender<Result<BidAccepted, AuctionError>>,
    ) {
        let lot_id = req.lot_id;
        let mut item = (req, target, reply);

        let mut queues = this.queues.lock().expect("queue registry poisoned");
        if let Some(tx) = queues.get(&lot_id) {
            match tx.send(item) {
                Ok(()) => return,
                // 워커가 방금 내려간 경우 — 새 큐로 교체
                Err(mpsc::error::SendError(back)) => item = back,
            }
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let _ = tx.send(item);
        queues.insert(lot_id, tx);
        drop(queues);

        let registry = Arc::clone(this);
        tokio::spawn(async move {
            registry.run_worker(lot_id, rx).await;
        });
    }

    /// 로트 하나의 직렬 입찰 워커
    async fn run_worker(self: Arc<Self>, lot_id: i64, mut rx: mpsc::UnboundedReceiver<Pending>) {
        debug!("{:<12} --> 워커 기동: lot={}", "BidQueue", lot_id);
        loop {
            let (req, target, reply) = match rx.try_recv() {
                Ok(item) => item,
                Err(mpsc::error::TryRecvError::Empty) => {
                    // 해체 전 잠금 아래에서 재확인 — enqueue와의 경쟁을 닫는다
                    let mut queues = self.queues.lock().expect("queue registry poisoned");
                    match rx.try_recv() {
                        Ok(item) => {
                            drop(queues);
                            item
                        }
                        Err(_) => {
                            queues.remove(&lot_id);
                            break;
                        }
                    }
                }
                Err(mpsc::error::TryRecvError::Disconnected) => break,
            };

            match super::admit_bid(self.store.as_ref(), &req, target).await {
                Ok(accepted) => {
                    // 수락 응답이 먼저, 팬아웃은 그 뒤 별도 태스크로
                    let _ = reply.send(Ok(accepted.clone()));
                    let store = Arc::clone(&self.store);
                    let notifier = Arc::clone(&self.notifier);
                    tokio::spawn(async move {
                        super::fan_out(store.as_ref(), notifier.as_ref(), &accepted).await;
                    });
                }
                Err(e) => {
                    let _ = reply.send(Err(e));
                }
            }
        }
        debug!("{:<12} --> 워커 해체: lot={}", "BidQueue", lot_id);
    }
}

// endregion: --- BidQueueRegistry
