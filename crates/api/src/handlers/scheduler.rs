use axum::{extract::State, http::StatusCode, response::Response};
use tracing::info;

use crate::response;
use crate::routes::AppState;

/// 开启全局调度，已在运行时同样返回 `true`
pub async fn start_scheduler(State(state): State<AppState>) -> Response {
    let changed = state.scheduler_service.start().await;
    info!("开启调度: 状态变化={}", changed);
    response::text(StatusCode::OK, "true")
}

pub async fn stop_scheduler(State(state): State<AppState>) -> Response {
    let changed = state.scheduler_service.stop().await;
    info!("停止调度: 状态变化={}", changed);
    response::text(StatusCode::OK, "true")
}
