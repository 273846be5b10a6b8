use std::fmt;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use watcher_core::{TriggerEngine, WatcherError, WatcherResult};

use crate::polling::PollingContext;
use crate::trigger_engine::CronTriggerEngine;
use crate::watcher::Watcher;

/// 触发引擎工厂
pub type EngineFactory = Box<dyn Fn() -> Arc<dyn TriggerEngine> + Send + Sync>;

/// 全局调度状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerStatus {
    #[default]
    Stopped,
    Running,
}

impl fmt::Display for SchedulerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulerStatus::Stopped => write!(f, "stopped"),
            SchedulerStatus::Running => write!(f, "running"),
        }
    }
}

/// 调度注册表，包装触发引擎的生命周期
pub struct SchedulerRegistry {
    factory: EngineFactory,
    engine: RwLock<Option<Arc<dyn TriggerEngine>>>,
    status: Mutex<SchedulerStatus>,
}

impl SchedulerRegistry {
    pub fn new(factory: EngineFactory) -> Self {
        Self {
            factory,
            engine: RwLock::new(None),
            status: Mutex::new(SchedulerStatus::Stopped),
        }
    }

    /// 使用 `CronTriggerEngine` 的注册表
    pub fn with_cron_engine() -> Self {
        Self::new(Box::new(|| Arc::new(CronTriggerEngine::new())))
    }

    /// 创建触发引擎，重复调用返回同一个引擎
    pub async fn init(&self) -> Arc<dyn TriggerEngine> {
        let mut engine = self.engine.write().await;
        match engine.as_ref() {
            Some(existing) => existing.clone(),
            None => {
                let created = (self.factory)();
                *engine = Some(created.clone());
                info!("触发引擎已创建");
                created
            }
        }
    }

    /// 当前触发引擎，未初始化时返回 `SchedulerUnavailable`
    pub async fn engine(&self) -> WatcherResult<Arc<dyn TriggerEngine>> {
        self.engine
            .read()
            .await
            .clone()
            .ok_or(WatcherError::SchedulerUnavailable)
    }

    pub async fn status(&self) -> SchedulerStatus {
        *self.status.lock().await
    }

    /// 注册所有启用的监控并开始触发，仅在 Stopped 状态下生效
    ///
    /// 单个监控注册失败只记录日志，不影响其他监控。返回是否发生了状态迁移。
    pub async fn start_all(&self, watchers: &[Arc<Watcher>], context: &PollingContext) -> bool {
        let mut status = self.status.lock().await;
        if *status == SchedulerStatus::Running {
            return false;
        }

        let engine = self.init().await;
        let mut registered = 0;
        for watcher in watchers {
            if !watcher.is_enabled().await {
                continue;
            }
            match watcher.start(self, context).await {
                Ok(_) => registered += 1,
                Err(e) => warn!("监控 {} 注册调度失败: {}", watcher.app(), e),
            }
        }

        engine.start();
        *status = SchedulerStatus::Running;
        info!("调度已启动，已注册监控: {}/{}", registered, watchers.len());
        true
    }

    /// 停止触发并注销所有监控，仅在 Running 状态下生效
    ///
    /// 等待正在执行的轮询全部结束后返回。返回是否发生了状态迁移。
    pub async fn stop_all(&self, watchers: &[Arc<Watcher>]) -> bool {
        let mut status = self.status.lock().await;
        if *status == SchedulerStatus::Stopped {
            return false;
        }

        if let Ok(engine) = self.engine().await {
            engine.stop().await;
        }
        for watcher in watchers {
            watcher.stop(self).await;
        }

        *status = SchedulerStatus::Stopped;
        info!("调度已停止");
        true
    }
}

impl Default for SchedulerRegistry {
    fn default() -> Self {
        Self::with_cron_engine()
    }
}
