/// 서비스 공통 에러 타입
/// 모든 에러는 `{success, message, data}` 응답 형식으로 변환된다.
// region:    --- Imports
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

// endregion: --- Imports

// region:    --- Store Error
/// 저장소 계층 에러
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// 저장된 데이터가 도메인 규칙과 맞지 않는 경우 (예: 알 수 없는 상태 문자열)
    #[error("corrupt record: {0}")]
    Corrupt(String),
}
// endregion: --- Store Error

// region:    --- App Error
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Authentication required")]
    Unauthenticated,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// 상태 충돌: 종료된 경매 입찰, 중복 결제, 중복 예약 등
    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        AppError::Forbidden(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 클라이언트에 노출되는 메시지. 서버 오류의 상세 내용은 로그에만 남긴다.
    pub fn client_message(&self) -> String {
        match self {
            AppError::Store(_) => "Server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Store(StoreError::Database(e))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{:<12} --> 서버 오류: {:?}", "Error", self);
        }
        let body = Json(serde_json::json!({
            "success": false,
            "message": self.client_message(),
            "data": null,
        }));
        (status, body).into_response()
    }
}
// endregion: --- App Error

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::validation("Invalid bid amount").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::conflict("Payment already completed").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::forbidden("Unauthorized").status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::not_found("Auction not found").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Store(StoreError::Corrupt("status".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_server_errors_hide_detail() {
        let err = AppError::Store(StoreError::Corrupt("bad started_auction value".into()));
        assert_eq!(err.client_message(), "Server error");

        let err = AppError::not_found("Purchase not found");
        assert_eq!(err.client_message(), "Purchase not found");
    }
}
