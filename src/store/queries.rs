// region:    --- Users
/// 사용자 조회
pub const GET_USER: &str = "SELECT id, first_name, last_name, email, phone, city, state, door_no, street, user_type FROM users WHERE id = $1";

/// 사용자 목록 조회
pub const GET_USERS: &str = "SELECT id, first_name, last_name, email, phone, city, state, door_no, street, user_type FROM users WHERE id = ANY($1)";
// endregion: --- Users

// region:    --- Auctions
/// 경매 조회
pub const GET_AUCTION: &str = r#"
    SELECT id, seller_id, vehicle_name, vehicle_image, year, mileage, condition, fuel_type, transmission,
           description, starting_bid, auction_date, status, started_auction, auction_stopped, winner_id,
           final_purchase_price, current_bid_id, created_at
    FROM auction_requests
    WHERE id = $1
"#;

/// 경매 목록 조회 (id 목록)
pub const GET_AUCTIONS: &str = r#"
    SELECT id, seller_id, vehicle_name, vehicle_image, year, mileage, condition, fuel_type, transmission,
           description, starting_bid, auction_date, status, started_auction, auction_stopped, winner_id,
           final_purchase_price, current_bid_id, created_at
    FROM auction_requests
    WHERE id = ANY($1)
"#;

/// 진행 중 경매 검색
/// $1 검색어(LIKE 이스케이프 완료), $2 상태, $3 연료, $4 변속기, $5/$6 가격 범위,
/// $7 id 목록, $8 경매일 내림차순 여부, $9 최대 개수
pub const FIND_OPEN_AUCTIONS: &str = r#"
    SELECT id, seller_id, vehicle_name, vehicle_image, year, mileage, condition, fuel_type, transmission,
           description, starting_bid, auction_date, status, started_auction, auction_stopped, winner_id,
           final_purchase_price, current_bid_id, created_at
    FROM auction_requests
    WHERE status = 'approved' AND started_auction = 'yes'
      AND ($1::text IS NULL OR vehicle_name ILIKE '%' || $1 || '%')
      AND ($2::text IS NULL OR condition = $2)
      AND ($3::text IS NULL OR fuel_type = $3)
      AND ($4::text IS NULL OR transmission = $4)
      AND ($5::float8 IS NULL OR starting_bid >= $5)
      AND ($6::float8 IS NULL OR starting_bid <= $6)
      AND ($7::bigint[] IS NULL OR id = ANY($7))
    ORDER BY
      CASE WHEN $8 THEN auction_date END DESC,
      CASE WHEN NOT $8 THEN auction_date END ASC,
      id ASC
    LIMIT $9
"#;

/// 경매 시작 (승인 + 미시작만)
pub const START_AUCTION: &str = r#"
    UPDATE auction_requests SET started_auction = 'yes'
    WHERE id = $1 AND status = 'approved' AND started_auction = 'no' AND auction_stopped = FALSE
    RETURNING id, seller_id, vehicle_name, vehicle_image, year, mileage, condition, fuel_type, transmission,
              description, starting_bid, auction_date, status, started_auction, auction_stopped, winner_id,
              final_purchase_price, current_bid_id, created_at
"#;

/// 경매일이 지난 경매 일괄 시작
pub const START_DUE_AUCTIONS: &str = r#"
    UPDATE auction_requests SET started_auction = 'yes'
    WHERE status = 'approved' AND started_auction = 'no' AND auction_stopped = FALSE AND auction_date <= $1
    RETURNING id
"#;

/// 종료 대상 경매 잠금
pub const LOCK_AUCTION_FOR_STOP: &str =
    "SELECT auction_stopped, current_bid_id, seller_id, vehicle_name FROM auction_requests WHERE id = $1 FOR UPDATE";

/// 경매 종료 및 낙찰자 확정
pub const STOP_AUCTION: &str = r#"
    UPDATE auction_requests
    SET auction_stopped = TRUE, started_auction = 'ended', winner_id = $2, final_purchase_price = $3
    WHERE id = $1
    RETURNING id, seller_id, vehicle_name, vehicle_image, year, mileage, condition, fuel_type, transmission,
              description, starting_bid, auction_date, status, started_auction, auction_stopped, winner_id,
              final_purchase_price, current_bid_id, created_at
"#;
// endregion: --- Auctions

// region:    --- Bids
/// 입찰 조회
pub const GET_BID: &str = "SELECT id, auction_id, seller_id, buyer_id, bid_amount, is_current_bid, bid_time FROM auction_bids WHERE id = $1";

/// 현재 입찰 조회 (경매 포인터 기준)
pub const CURRENT_BID: &str = r#"
    SELECT b.id, b.auction_id, b.seller_id, b.buyer_id, b.bid_amount, b.is_current_bid, b.bid_time
    FROM auction_requests a
    JOIN auction_bids b ON b.id = a.current_bid_id
    WHERE a.id = $1
"#;

/// 여러 경매의 현재 입찰 조회 (현재 입찰 표시 + 최신순)
pub const CURRENT_BIDS: &str = r#"
    SELECT DISTINCT ON (auction_id) id, auction_id, seller_id, buyer_id, bid_amount, is_current_bid, bid_time
    FROM auction_bids
    WHERE auction_id = ANY($1) AND is_current_bid
    ORDER BY auction_id, bid_time DESC, id DESC
"#;

/// 입찰 조건 확인용 잠금
pub const LOCK_AUCTION_FOR_BID: &str =
    "SELECT current_bid_id, started_auction, auction_stopped FROM auction_requests WHERE id = $1 FOR UPDATE";

/// 이전 현재 입찰 표시 해제
pub const CLEAR_CURRENT_BID_FLAG: &str =
    "UPDATE auction_bids SET is_current_bid = FALSE WHERE auction_id = $1 AND is_current_bid";

/// 입찰 추가
pub const INSERT_BID: &str = r#"
    INSERT INTO auction_bids (auction_id, seller_id, buyer_id, bid_amount, is_current_bid, bid_time)
    VALUES ($1, $2, $3, $4, TRUE, $5)
    RETURNING id, auction_id, seller_id, buyer_id, bid_amount, is_current_bid, bid_time
"#;

/// 현재 입찰 포인터 갱신
pub const SET_CURRENT_BID: &str = "UPDATE auction_requests SET current_bid_id = $2 WHERE id = $1";

/// 구매자 입찰 이력
pub const BIDS_BY_BUYER: &str = r#"
    SELECT id, auction_id, seller_id, buyer_id, bid_amount, is_current_bid, bid_time
    FROM auction_bids
    WHERE buyer_id = $1
    ORDER BY bid_time DESC, id DESC
"#;

/// 경매별 입찰 수
pub const COUNT_BIDS: &str =
    "SELECT auction_id, COUNT(*) AS total FROM auction_bids WHERE auction_id = ANY($1) GROUP BY auction_id";
// endregion: --- Bids

// region:    --- Purchases
/// 구매 조회
pub const GET_PURCHASE: &str = "SELECT id, auction_id, buyer_id, seller_id, vehicle_name, purchase_price, payment_status, purchase_date FROM purchases WHERE id = $1";

/// 경매 + 구매자 기준 구매 조회
pub const FIND_PURCHASE: &str = "SELECT id, auction_id, buyer_id, seller_id, vehicle_name, purchase_price, payment_status, purchase_date FROM purchases WHERE auction_id = $1 AND buyer_id = $2";

/// 구매자 구매 목록
pub const PURCHASES_BY_BUYER: &str = r#"
    SELECT id, auction_id, buyer_id, seller_id, vehicle_name, purchase_price, payment_status, purchase_date
    FROM purchases
    WHERE buyer_id = $1
    ORDER BY purchase_date DESC, id DESC
"#;

/// 낙찰 구매 생성
pub const INSERT_PURCHASE: &str = r#"
    INSERT INTO purchases (auction_id, buyer_id, seller_id, vehicle_name, purchase_price, payment_status, purchase_date)
    VALUES ($1, $2, $3, $4, $5, 'pending', $6)
    RETURNING id, auction_id, buyer_id, seller_id, vehicle_name, purchase_price, payment_status, purchase_date
"#;

/// 결제 완료 처리 (대기 상태일 때만)
pub const MARK_PURCHASE_COMPLETED: &str =
    "UPDATE purchases SET payment_status = 'completed' WHERE id = $1 AND payment_status = 'pending' RETURNING id";

/// 결제 기록 추가
pub const INSERT_AUCTION_COST: &str = r#"
    INSERT INTO auction_costs (auction_id, buyer_id, seller_id, amount_paid, convenience_fee, total_amount, payment_date)
    VALUES ($1, $2, $3, $4, $5, $6, $7)
    RETURNING id, auction_id, buyer_id, seller_id, amount_paid, convenience_fee, total_amount, payment_date
"#;
// endregion: --- Purchases

// region:    --- Rentals
/// 렌탈 조회
pub const GET_RENTAL: &str = r#"
    SELECT id, seller_id, vehicle_name, vehicle_image, year, condition, capacity, fuel_type, transmission, ac,
           cost_per_day, driver_available, driver_rate, status, buyer_id, pickup_date, drop_date,
           include_driver, created_at
    FROM rental_requests
    WHERE id = $1
"#;

/// 렌탈 검색
/// $1 상태, $2 검색어, $3 연료, $4 변속기, $5/$6 일 요금 범위, $7 최소 인원,
/// $8 id 목록, $9 최신순 여부, $10 최대 개수
pub const FIND_RENTALS: &str = r#"
    SELECT id, seller_id, vehicle_name, vehicle_image, year, condition, capacity, fuel_type, transmission, ac,
           cost_per_day, driver_available, driver_rate, status, buyer_id, pickup_date, drop_date,
           include_driver, created_at
    FROM rental_requests
    WHERE ($1::text IS NULL OR status = $1)
      AND ($2::text IS NULL OR vehicle_name ILIKE '%' || $2 || '%')
      AND ($3::text IS NULL OR fuel_type = $3)
      AND ($4::text IS NULL OR transmission = $4)
      AND ($5::float8 IS NULL OR cost_per_day >= $5)
      AND ($6::float8 IS NULL OR cost_per_day <= $6)
      AND ($7::int IS NULL OR capacity >= $7)
      AND ($8::bigint[] IS NULL OR id = ANY($8))
    ORDER BY
      CASE WHEN $9 THEN created_at END DESC,
      id ASC
    LIMIT $10
"#;

/// 렌탈 예약 (예약 가능 상태일 때만)
pub const BOOK_RENTAL: &str = r#"
    UPDATE rental_requests
    SET status = 'unavailable', buyer_id = $2, pickup_date = $3, drop_date = $4, include_driver = $5
    WHERE id = $1 AND status = 'available'
    RETURNING id, seller_id, vehicle_name, vehicle_image, year, condition, capacity, fuel_type, transmission, ac,
              cost_per_day, driver_available, driver_rate, status, buyer_id, pickup_date, drop_date,
              include_driver, created_at
"#;

/// 렌탈 비용 추가
pub const INSERT_RENTAL_COST: &str = r#"
    INSERT INTO rental_costs (rental_car_id, buyer_id, seller_id, total_cost, include_driver, created_at)
    VALUES ($1, $2, $3, $4, $5, $6)
    RETURNING id, rental_car_id, buyer_id, seller_id, total_cost, include_driver, created_at
"#;

/// 구매자 렌탈 비용 목록
pub const RENTAL_COSTS_BY_BUYER: &str = r#"
    SELECT id, rental_car_id, buyer_id, seller_id, total_cost, include_driver, created_at
    FROM rental_costs
    WHERE buyer_id = $1
    ORDER BY created_at DESC, id DESC
"#;

/// 렌탈 차량의 최근 비용 기록
pub const RENTAL_COST_FOR: &str = r#"
    SELECT id, rental_car_id, buyer_id, seller_id, total_cost, include_driver, created_at
    FROM rental_costs
    WHERE rental_car_id = $1
    ORDER BY created_at DESC, id DESC
    LIMIT 1
"#;
// endregion: --- Rentals

// region:    --- Wishlists
/// 위시리스트 존재 여부
pub const WISHLIST_EXISTS: &str = "SELECT EXISTS (SELECT 1 FROM wishlists WHERE user_id = $1)";

/// 위시리스트 생성 (없을 때만)
pub const ENSURE_WISHLIST: &str =
    "INSERT INTO wishlists (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING";

/// 위시리스트 항목 (추가순)
pub const WISHLIST_ITEMS: &str =
    "SELECT kind, item_id FROM wishlist_items WHERE user_id = $1 ORDER BY added_at ASC, item_id ASC";

/// 위시리스트 항목 추가 (중복 무시)
pub const ADD_WISHLIST_ITEM: &str = r#"
    INSERT INTO wishlist_items (user_id, kind, item_id) VALUES ($1, $2, $3)
    ON CONFLICT (user_id, kind, item_id) DO NOTHING
"#;

/// 위시리스트 항목 삭제
pub const REMOVE_WISHLIST_ITEM: &str =
    "DELETE FROM wishlist_items WHERE user_id = $1 AND kind = $2 AND item_id = $3";
// endregion: --- Wishlists
