use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::store::StoreError;

// region:    --- AuctionError

/// 경매 코어 오류 분류
///
/// 검증·단계 가드 오류는 해당 요청에 한해 종결이며 재시도하지 않는다.
/// 저장소 오류만 호출 측(스케줄러)의 재시도 대상이다.
#[derive(Debug, thiserror::Error)]
pub enum AuctionError {
    /// 로트 제출 검증 실패, 사용자에게 바로 표시
    #[error("검증 실패: {0}")]
    Validation(String),

    /// 로트 없음
    #[error("로트 {0} 없음")]
    LotNotFound(i64),

    /// 경매 미시작
    #[error("경매 미시작")]
    NotStarted,

    /// 경매 이미 종료
    #[error("경매 이미 종료")]
    AlreadyEnded,

    /// 모더레이션/정산 결정 이미 처리됨
    #[error("이미 처리된 결정")]
    AlreadyDecided,

    /// 현재 최고 입찰가 이하 — 재시도에 필요한 최고가를 함께 반환
    #[error("입찰가가 최고가 {highest} 이하")]
    TooLow { highest: i64 },

    /// 판매자 본인 입찰
    #[error("판매자 본인 입찰 불가")]
    SelfBid,

    /// 허용되지 않은 증가분
    #[error("허용되지 않은 증가분 {0}")]
    InvalidIncrement(i64),

    /// 이미 구독 중
    #[error("이미 구독 중")]
    AlreadySubscribed,

    /// 저장소 오류
    #[error("저장소 오류: {0}")]
    Store(#[from] StoreError),

    /// 입찰 큐 워커 중단
    #[error("입찰 큐 중단")]
    QueueClosed,
}

impl AuctionError {
    /// 전송 계층에 노출하는 기계용 코드
    pub fn code(&self) -> &'static str {
        match self {
            AuctionError::Validation(_) => "VALIDATION",
            AuctionError::LotNotFound(_) => "NOT_FOUND",
            AuctionError::NotStarted => "NOT_STARTED",
            AuctionError::AlreadyEnded => "ALREADY_ENDED",
            AuctionError::AlreadyDecided => "ALREADY_DECIDED",
            AuctionError::TooLow { .. } => "LOW_BID",
            AuctionError::SelfBid => "SELF_BID",
            AuctionError::InvalidIncrement(_) => "INVALID_INCREMENT",
            AuctionError::AlreadySubscribed => "ALREADY_SUBSCRIBED",
            AuctionError::Store(_) => "STORE",
            AuctionError::QueueClosed => "QUEUE_CLOSED",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AuctionError::Validation(_) | AuctionError::InvalidIncrement(_) => {
                StatusCode::BAD_REQUEST
            }
            AuctionError::LotNotFound(_) => StatusCode::NOT_FOUND,
            AuctionError::NotStarted
            | AuctionError::AlreadyEnded
            | AuctionError::AlreadyDecided
            | AuctionError::TooLow { .. }
            | AuctionError::SelfBid
            | AuctionError::AlreadySubscribed => StatusCode::CONFLICT,
            AuctionError::Store(_) | AuctionError::QueueClosed => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// 사용자에게 보여줄 메시지
    pub fn user_message(&self) -> String {
        match self {
            AuctionError::Validation(msg) => msg.clone(),
            AuctionError::LotNotFound(_) => "❌ Лот с таким ID не найден.".to_string(),
            AuctionError::NotStarted => "⌛ Аукцион еще не начался.".to_string(),
            AuctionError::AlreadyEnded => "⏳ Аукцион завершен.".to_string(),
            AuctionError::AlreadyDecided => "⚠️ Лот уже обработан.".to_string(),
            AuctionError::TooLow { highest } => {
                format!("⚠️ Ставка должна быть больше {highest}₸.")
            }
            AuctionError::SelfBid => {
                "⚠️ Нельзя делать ставки на собственный лот.".to_string()
            }
            AuctionError::InvalidIncrement(inc) => {
                format!("❌ Недопустимый шаг ставки: {inc}.")
            }
            AuctionError::AlreadySubscribed => "⚠️ Вы уже подписаны на этот лот.".to_string(),
            AuctionError::Store(_) | AuctionError::QueueClosed => {
                "❌ Внутренняя ошибка. Попробуйте позже.".to_string()
            }
        }
    }
}

impl IntoResponse for AuctionError {
    fn into_response(self) -> Response {
        let mut body = serde_json::json!({
            "error": self.user_message(),
            "code": self.code(),
        });
        // 재시도에 필요한 데이터를 함께 내려준다
        if let AuctionError::TooLow { highest } = &self {
            body["highest_bid"] = serde_json::json!(highest);
        }
        (self.status_code(), Json(body)).into_response()
    }
}

// endregion: --- AuctionError
