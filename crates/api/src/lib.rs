//! # Watcher API
//!
//! 监控服务的HTTP接口，基于Axum构建。
//!
//! ## API 端点
//!
//! ### 监控管理
//! - `GET /api/watchers` - 监控列表
//! - `GET /api/watchers/entries?apps=a,b` - 调度状态列表
//! - `GET /api/watchers/{app}` - 监控详情
//! - `GET /api/watchers/{app}/entry` - 调度状态
//! - `POST /api/watchers/{app}` - 创建监控
//! - `PUT /api/watchers/{app}` - 更新监控
//! - `DELETE /api/watchers/{app}` - 删除监控
//! - `PATCH /api/watchers/{app}/enable|disable|start|stop` - 生命周期操作
//!
//! ### 调度
//! - `PATCH /api/scheduler/start` - 开启调度
//! - `PATCH /api/scheduler/stop` - 停止调度
//!
//! ### 数据源
//! - `GET /api/datasources` - 数据源编号列表
//!
//! 成功响应直接返回JSON或纯文本（监控App、注册句柄），错误响应体为原始错误信息。

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;

use axum::Router;
use tower::ServiceBuilder;

pub use routes::AppState;

use middleware::{cors_layer, request_logging, trace_layer};
use routes::create_routes;

/// 创建完整的API应用
pub fn create_app(state: AppState) -> Router {
    create_routes(state).layer(
        ServiceBuilder::new()
            .layer(trace_layer())
            .layer(cors_layer())
            .layer(axum::middleware::from_fn(request_logging)),
    )
}
