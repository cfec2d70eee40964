use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// region:    --- Status / Phase

/// 모더레이션 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LotStatus {
    Pending,
    Approved,
    Rejected,
}

impl LotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LotStatus::Pending => "PENDING",
            LotStatus::Approved => "APPROVED",
            LotStatus::Rejected => "REJECTED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(LotStatus::Pending),
            "APPROVED" => Some(LotStatus::Approved),
            "REJECTED" => Some(LotStatus::Rejected),
            _ => None,
        }
    }
}

/// 경매 진행 단계 (모더레이션 상태와는 별개)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuctionPhase {
    NotStarted,
    Open,
    Closed,
}

impl AuctionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuctionPhase::NotStarted => "NOT_STARTED",
            AuctionPhase::Open => "OPEN",
            AuctionPhase::Closed => "CLOSED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "NOT_STARTED" => Some(AuctionPhase::NotStarted),
            "OPEN" => Some(AuctionPhase::Open),
            "CLOSED" => Some(AuctionPhase::Closed),
            _ => None,
        }
    }
}

/// 종료 후 정산 단계 (CLOSED 내부의 하위 상태)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaleState {
    AwaitingSeller,
    Settled,
    Declined,
    NoBids,
}

impl SaleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleState::AwaitingSeller => "AWAITING_SELLER",
            SaleState::Settled => "SETTLED",
            SaleState::Declined => "DECLINED",
            SaleState::NoBids => "NO_BIDS",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "AWAITING_SELLER" => Some(SaleState::AwaitingSeller),
            "SETTLED" => Some(SaleState::Settled),
            "DECLINED" => Some(SaleState::Declined),
            "NO_BIDS" => Some(SaleState::NoBids),
            _ => None,
        }
    }
}

/// 모더레이션 결정
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationDecision {
    Approve,
    Reject,
}

/// 판매자의 정산 결정
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettleDecision {
    Accept,
    Reject,
}

// endregion: --- Status / Phase

// region:    --- Models

/// 로트 모델
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Lot {
    pub id: i64,
    pub title: String,
    pub start_price: i64,
    /// OPEN 전환 전에는 NULL, 전환 시점에 start_price로 설정된다
    pub current_price: Option<i64>,
    pub seller_id: i64,
    /// 판매자 연락처, 정산 수락 시 낙찰자에게만 공개
    pub seller_contact: String,
    pub condition: String,
    pub memory: Option<String>,
    pub year: Option<String>,
    pub battery: Option<String>,
    pub repairs: Option<String>,
    pub locks: Option<String>,
    pub status: String,
    pub phase: String,
    pub sale: Option<String>,
    pub winner_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub opens_at: Option<DateTime<Utc>>,
    pub opened_at: Option<DateTime<Utc>>,
    pub closes_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub settled_at: Option<DateTime<Utc>>,
}

impl Lot {
    pub fn status(&self) -> LotStatus {
        LotStatus::parse(&self.status).unwrap_or(LotStatus::Pending)
    }

    pub fn phase(&self) -> AuctionPhase {
        AuctionPhase::parse(&self.phase).unwrap_or(AuctionPhase::NotStarted)
    }

    pub fn sale(&self) -> Option<SaleState> {
        self.sale.as_deref().and_then(SaleState::parse)
    }

    /// 입찰 기준 가격 (OPEN 이후에만 의미가 있다)
    pub fn price(&self) -> i64 {
        self.current_price.unwrap_or(self.start_price)
    }
}

/// 판매자가 제출하는 로트 초안
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LotDraft {
    pub title: String,
    pub start_price: i64,
    pub seller_id: i64,
    pub seller_contact: String,
    /// 상태 설명 (필수)
    pub condition: String,
    /// 사진 file_id 목록, 최소 장수는 설정값으로 검증
    pub photos: Vec<String>,
    #[serde(default)]
    pub memory: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub battery: Option<String>,
    #[serde(default)]
    pub repairs: Option<String>,
    #[serde(default)]
    pub locks: Option<String>,
}

/// 입찰 모델 (수락된 가격 인상 기록, 불변)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Bid {
    pub id: i64,
    pub lot_id: i64,
    pub user_id: i64,
    /// 증가분이 아닌 새 총액
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

/// 로트 구독자
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Watcher {
    pub id: i64,
    pub lot_id: i64,
    pub user_id: i64,
}

/// 진행 중 로트 목록용 요약
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LotSummary {
    pub id: i64,
    pub title: String,
    pub current_price: Option<i64>,
    pub closes_at: Option<DateTime<Utc>>,
}

// endregion: --- Models
