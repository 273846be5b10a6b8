use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::warn;
use watcher_core::{ErrorKind, WatcherError};

use crate::response;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Watcher(#[from] WatcherError),
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Watcher(WatcherError::from(e))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        let ApiError::Watcher(e) = self;
        match e.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!("请求处理失败: {}", self);
        }
        response::text(status, self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(WatcherError::not_found("a")).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(WatcherError::InvalidApp).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(WatcherError::Persistence("disk".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(WatcherError::SchedulerUnavailable).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_body_is_raw_message() {
        let err = ApiError::from(WatcherError::not_found("crm"));
        assert_eq!(err.to_string(), "监控未找到: crm");
    }
}
