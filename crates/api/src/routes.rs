use std::sync::Arc;

use axum::{
    routing::{get, patch},
    Router,
};

use crate::handlers::{
    datasources::list_datasources,
    health::health_check,
    scheduler::{start_scheduler, stop_scheduler},
    watchers::{
        create_watcher, delete_watcher, disable_watcher, enable_watcher, get_entries, get_entry,
        get_watcher, list_watchers, start_watcher, stop_watcher, update_watcher,
    },
};
use watcher_application::{
    DatasourceQueryService, SchedulerControlService, WatcherManagementService,
};

/// API应用状态
#[derive(Clone)]
pub struct AppState {
    pub watcher_service: Arc<dyn WatcherManagementService>,
    pub scheduler_service: Arc<dyn SchedulerControlService>,
    pub datasource_service: Arc<dyn DatasourceQueryService>,
}

/// 创建API路由
pub fn create_routes(state: AppState) -> Router {
    let api = Router::new()
        // 监控管理
        .route("/watchers", get(list_watchers))
        .route("/watchers/entries", get(get_entries))
        .route(
            "/watchers/{app}",
            get(get_watcher)
                .post(create_watcher)
                .put(update_watcher)
                .delete(delete_watcher),
        )
        .route("/watchers/{app}/entry", get(get_entry))
        .route("/watchers/{app}/enable", patch(enable_watcher))
        .route("/watchers/{app}/disable", patch(disable_watcher))
        .route("/watchers/{app}/start", patch(start_watcher))
        .route("/watchers/{app}/stop", patch(stop_watcher))
        // 调度
        .route("/scheduler/start", patch(start_scheduler))
        .route("/scheduler/stop", patch(stop_scheduler))
        // 数据源
        .route("/datasources", get(list_datasources));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api)
        .with_state(state)
}
