use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::info;

use watcher_core::WatcherDefinition;

use crate::response::{self, json, ApiResult};
use crate::routes::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct EntriesQuery {
    /// 逗号分隔的监控App列表
    #[serde(default)]
    pub apps: String,
}

fn decode_definition(body: &Bytes) -> Result<WatcherDefinition, serde_json::Error> {
    serde_json::from_slice(body)
}

pub async fn list_watchers(State(state): State<AppState>) -> ApiResult {
    json(&state.watcher_service.list_watchers().await)
}

pub async fn get_watcher(State(state): State<AppState>, Path(app): Path<String>) -> ApiResult {
    json(&state.watcher_service.get_watcher(&app).await?)
}

/// 创建监控，请求体的 `App` 为空时使用路径中的App
pub async fn create_watcher(
    State(state): State<AppState>,
    Path(app): Path<String>,
    body: Bytes,
) -> ApiResult {
    let mut definition = decode_definition(&body)?;
    if definition.app.trim().is_empty() {
        definition.app = app;
    }
    info!("创建监控请求: {}", definition.app);

    let created = state.watcher_service.create_watcher(definition).await?;
    Ok(response::text(StatusCode::CREATED, created))
}

/// 更新监控，以路径中的App为准
pub async fn update_watcher(
    State(state): State<AppState>,
    Path(app): Path<String>,
    body: Bytes,
) -> ApiResult {
    let definition = decode_definition(&body)?;
    let updated = state.watcher_service.update_watcher(&app, definition).await?;
    Ok(response::text(StatusCode::OK, updated))
}

pub async fn delete_watcher(State(state): State<AppState>, Path(app): Path<String>) -> ApiResult {
    let deleted = state.watcher_service.delete_watcher(&app).await?;
    Ok(response::text(StatusCode::OK, deleted))
}

pub async fn enable_watcher(State(state): State<AppState>, Path(app): Path<String>) -> ApiResult {
    let enabled = state.watcher_service.enable_watcher(&app).await?;
    Ok(response::text(StatusCode::OK, enabled))
}

pub async fn disable_watcher(State(state): State<AppState>, Path(app): Path<String>) -> ApiResult {
    let disabled = state.watcher_service.disable_watcher(&app).await?;
    Ok(response::text(StatusCode::OK, disabled))
}

/// 注册调度，响应体为注册句柄
pub async fn start_watcher(State(state): State<AppState>, Path(app): Path<String>) -> ApiResult {
    let id = state.watcher_service.start_watcher(&app).await?;
    Ok(response::text(StatusCode::OK, id.to_string()))
}

pub async fn stop_watcher(State(state): State<AppState>, Path(app): Path<String>) -> ApiResult {
    let stopped = state.watcher_service.stop_watcher(&app).await?;
    Ok(response::text(StatusCode::OK, stopped))
}

pub async fn get_entry(State(state): State<AppState>, Path(app): Path<String>) -> ApiResult {
    json(&state.watcher_service.get_entry(&app).await?)
}

/// 批量查询调度状态，未找到的App返回占位，`apps` 为空时返回全部
pub async fn get_entries(
    State(state): State<AppState>,
    Query(query): Query<EntriesQuery>,
) -> ApiResult {
    let apps: Vec<String> = query
        .apps
        .split(',')
        .map(|app| app.trim().to_string())
        .collect();
    json(&state.watcher_service.get_entries(&apps).await)
}
