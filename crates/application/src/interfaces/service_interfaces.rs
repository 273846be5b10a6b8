// HTTP层依赖的服务接口
use async_trait::async_trait;

use watcher_core::{EntryId, EntryProjection, WatcherDefinition, WatcherResult, WatcherSnapshot};
use watcher_dispatcher::SchedulerStatus;

/// 监控集合管理
#[async_trait]
pub trait WatcherManagementService: Send + Sync {
    async fn list_watchers(&self) -> Vec<WatcherSnapshot>;
    async fn get_watcher(&self, app: &str) -> WatcherResult<WatcherSnapshot>;
    async fn create_watcher(&self, definition: WatcherDefinition) -> WatcherResult<String>;
    async fn update_watcher(&self, app: &str, definition: WatcherDefinition)
        -> WatcherResult<String>;
    async fn delete_watcher(&self, app: &str) -> WatcherResult<String>;
    async fn enable_watcher(&self, app: &str) -> WatcherResult<String>;
    async fn disable_watcher(&self, app: &str) -> WatcherResult<String>;
    async fn start_watcher(&self, app: &str) -> WatcherResult<EntryId>;
    async fn stop_watcher(&self, app: &str) -> WatcherResult<String>;
    async fn get_entry(&self, app: &str) -> WatcherResult<EntryProjection>;
    async fn get_entries(&self, apps: &[String]) -> Vec<EntryProjection>;
}

/// 全局调度控制
#[async_trait]
pub trait SchedulerControlService: Send + Sync {
    /// 返回是否发生了状态迁移
    async fn start(&self) -> bool;
    async fn stop(&self) -> bool;
    async fn status(&self) -> SchedulerStatus;
}

/// 数据源查询
#[async_trait]
pub trait DatasourceQueryService: Send + Sync {
    async fn list_codes(&self) -> Vec<String>;
}
