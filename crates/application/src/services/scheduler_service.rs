use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use watcher_dispatcher::SchedulerStatus;

use crate::interfaces::SchedulerControlService;
use crate::services::watcher_service::WatcherService;

/// 全局调度启停
pub struct SchedulerService {
    watchers: Arc<WatcherService>,
}

impl SchedulerService {
    pub fn new(watchers: Arc<WatcherService>) -> Self {
        Self { watchers }
    }
}

#[async_trait]
impl SchedulerControlService for SchedulerService {
    async fn start(&self) -> bool {
        let changed = self.watchers.start_scheduler().await;
        if !changed {
            info!("调度已在运行，忽略启动请求");
        }
        changed
    }

    async fn stop(&self) -> bool {
        let changed = self.watchers.stop_scheduler().await;
        if !changed {
            info!("调度未运行，忽略停止请求");
        }
        changed
    }

    async fn status(&self) -> SchedulerStatus {
        self.watchers.registry().status().await
    }
}
