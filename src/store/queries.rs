/// 로트 저장
pub const INSERT_LOT: &str = "INSERT INTO lots (title, start_price, seller_id, seller_contact, condition, memory, year, battery, repairs, locks, status, phase, created_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'PENDING', 'NOT_STARTED', $11)
    RETURNING *";

/// 사진 저장
pub const INSERT_LOT_IMAGE: &str = "INSERT INTO lot_images (lot_id, file_id) VALUES ($1, $2)";

/// 로트 조회
pub const GET_LOT: &str = "SELECT * FROM lots WHERE id = $1";

/// 진행 중 로트 요약 조회
pub const GET_OPEN_LOTS: &str =
    "SELECT id, title, current_price, closes_at FROM lots WHERE phase = 'OPEN' ORDER BY closes_at";

/// 승인 전이 (PENDING 가드, opens_at 장전 포함)
pub const APPROVE_LOT: &str = "UPDATE lots SET status = 'APPROVED', approved_at = $2, opens_at = $3
    WHERE id = $1 AND status = 'PENDING'
    RETURNING *";

/// 거절 전이 (PENDING 가드)
pub const REJECT_LOT: &str = "UPDATE lots SET status = 'REJECTED'
    WHERE id = $1 AND status = 'PENDING'
    RETURNING *";

/// 개장 기한 경과 로트 조회
pub const DUE_TO_OPEN: &str = "SELECT id FROM lots
    WHERE status = 'APPROVED' AND phase = 'NOT_STARTED' AND opens_at IS NOT NULL AND opens_at <= $1
    ORDER BY opens_at";

/// 종료 기한 경과 로트 조회
pub const DUE_TO_CLOSE: &str = "SELECT id FROM lots
    WHERE phase = 'OPEN' AND closes_at IS NOT NULL AND closes_at <= $1
    ORDER BY closes_at";

/// 개장 전환 (NOT_STARTED 가드, 가격 리셋)
pub const OPEN_LOT: &str = "UPDATE lots SET phase = 'OPEN', current_price = start_price, opened_at = $2, closes_at = $3
    WHERE id = $1 AND status = 'APPROVED' AND phase = 'NOT_STARTED'
    RETURNING *";

/// 종료 전환 (OPEN 가드)
pub const CLOSE_LOT: &str = "UPDATE lots SET phase = 'CLOSED', closed_at = $2
    WHERE id = $1 AND phase = 'OPEN'
    RETURNING *";

/// 종료 직후 정산 상태·낙찰자 기록
pub const RECORD_SALE: &str = "UPDATE lots SET sale = $2, winner_id = $3
    WHERE id = $1
    RETURNING *";

/// 가드 가격 갱신 — 더 높은 입찰만 반영된다
pub const RAISE_PRICE: &str = "UPDATE lots SET current_price = $2
    WHERE id = $1 AND phase = 'OPEN' AND current_price IS NOT NULL AND current_price < $2
    RETURNING id";

/// 입찰 기록 삽입 (같은 금액 중복은 UNIQUE가 차단)
pub const INSERT_BID: &str = "INSERT INTO bids (lot_id, user_id, amount, created_at)
    VALUES ($1, $2, $3, $4)
    ON CONFLICT (lot_id, amount) DO NOTHING
    RETURNING id, lot_id, user_id, amount, created_at";

/// 최고 입찰 조회
pub const GET_HIGHEST_BID: &str = "SELECT id, lot_id, user_id, amount, created_at FROM bids
    WHERE lot_id = $1 ORDER BY amount DESC LIMIT 1";

/// 입찰 이력 조회
pub const GET_BID_HISTORY: &str = "SELECT id, lot_id, user_id, amount, created_at FROM bids
    WHERE lot_id = $1 ORDER BY created_at DESC";

/// 구독 추가 (멱등)
pub const INSERT_WATCHER: &str = "INSERT INTO watchers (lot_id, user_id) VALUES ($1, $2)
    ON CONFLICT (lot_id, user_id) DO NOTHING
    RETURNING id, lot_id, user_id";

/// 구독자 조회
pub const GET_WATCHERS: &str = "SELECT user_id FROM watchers WHERE lot_id = $1";

/// 정산 전이 (AWAITING_SELLER + 낙찰자 일치 가드)
pub const SETTLE_LOT: &str = "UPDATE lots SET sale = $3, settled_at = $4
    WHERE id = $1 AND winner_id = $2 AND sale = 'AWAITING_SELLER'
    RETURNING *";

/// 재시작 복구: opens_at 백필
pub const BACKFILL_OPENS_AT: &str =
    "UPDATE lots SET opens_at = approved_at + make_interval(secs => $1)
    WHERE status = 'APPROVED' AND phase = 'NOT_STARTED' AND opens_at IS NULL AND approved_at IS NOT NULL";

/// 재시작 복구: closes_at 백필
pub const BACKFILL_CLOSES_AT: &str =
    "UPDATE lots SET closes_at = opened_at + make_interval(secs => $1)
    WHERE phase = 'OPEN' AND closes_at IS NULL AND opened_at IS NOT NULL";
