use chrono::Duration;

// region:    --- Settings

/// 환경 변수에서 읽어오는 서비스 설정
///
/// 모더레이션 승인 후 개장까지의 지연과 경매 진행 시간은
/// 서로 독립적인 값으로 둔다.
#[derive(Debug, Clone)]
pub struct Settings {
    /// HTTP 리스너 주소
    pub listen_addr: String,
    /// Bot API 토큰 (알림 발송용)
    pub bot_token: String,
    /// 딥링크용 봇 사용자명
    pub bot_username: String,
    /// 경매 공지 채널
    pub auction_channel_id: i64,
    /// 모더레이션 채팅
    pub moderator_chat_id: i64,
    /// 승인 → 개장 지연 (초)
    pub moderation_open_delay_secs: i64,
    /// 개장 → 종료 경매 시간 (초)
    pub auction_duration_secs: i64,
    /// 허용되는 입찰 증가분 목록
    pub bid_increments: Vec<i64>,
    /// 로트 제출 시 최소 사진 장수
    pub min_photos: usize,
    /// 스케줄러 틱 간격 (초)
    pub scheduler_tick_secs: u64,
}

impl Settings {
    /// 환경 변수 로드, 누락 시 기본값 사용
    pub fn from_env() -> Self {
        Self {
            listen_addr: std::env::var("LISTEN_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            bot_token: std::env::var("BOT_TOKEN").unwrap_or_default(),
            bot_username: std::env::var("BOT_USERNAME")
                .unwrap_or_else(|_| "bit_kz_bot".to_string()),
            auction_channel_id: parse_env("AUCTION_CHANNEL_ID", 0),
            moderator_chat_id: parse_env("MODERATOR_CHAT_ID", 0),
            moderation_open_delay_secs: parse_env("MODERATION_OPEN_DELAY_SECS", 60),
            auction_duration_secs: parse_env("AUCTION_DURATION_SECS", 3600),
            bid_increments: parse_increments(
                &std::env::var("BID_INCREMENTS").unwrap_or_else(|_| "100,500,1000".to_string()),
            ),
            min_photos: parse_env("MIN_PHOTOS", 5),
            scheduler_tick_secs: parse_env("SCHEDULER_TICK_SECS", 1),
        }
    }

    pub fn moderation_open_delay(&self) -> Duration {
        Duration::seconds(self.moderation_open_delay_secs)
    }

    pub fn auction_duration(&self) -> Duration {
        Duration::seconds(self.auction_duration_secs)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:3000".to_string(),
            bot_token: String::new(),
            bot_username: "bit_kz_bot".to_string(),
            auction_channel_id: 0,
            moderator_chat_id: 0,
            moderation_open_delay_secs: 60,
            auction_duration_secs: 3600,
            bid_increments: vec![100, 500, 1000],
            min_photos: 5,
            scheduler_tick_secs: 1,
        }
    }
}

/// 환경 변수 파싱, 실패 시 기본값
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// "100,500,1000" 형식의 증가분 목록 파싱
fn parse_increments(raw: &str) -> Vec<i64> {
    let parsed: Vec<i64> = raw
        .split(',')
        .filter_map(|part| part.trim().parse().ok())
        .filter(|inc| *inc > 0)
        .collect();
    if parsed.is_empty() {
        vec![100, 500, 1000]
    } else {
        parsed
    }
}

// endregion: --- Settings
