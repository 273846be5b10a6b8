use axum::Json;
use serde_json::{json, Value};

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Local::now().to_rfc3339(),
        "service": "watcher",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
