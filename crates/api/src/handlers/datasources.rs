use axum::extract::State;

use crate::response::{json, ApiResult};
use crate::routes::AppState;

pub async fn list_datasources(State(state): State<AppState>) -> ApiResult {
    json(&state.datasource_service.list_codes().await)
}
