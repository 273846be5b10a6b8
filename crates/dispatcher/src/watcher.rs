use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use watcher_core::{
    EntryId, EntryProjection, RunStatistics, WatcherDefinition, WatcherError, WatcherResult,
    WatcherSnapshot,
};
use watcher_infrastructure::Datasource;

use crate::polling::{PollTask, PollingContext};
use crate::scheduler::SchedulerRegistry;

#[derive(Default)]
struct WatcherState {
    enabled: bool,
    entry_id: Option<EntryId>,
    /// 注册时绑定的数据源，停止时重置其连接池
    bound: Vec<Arc<Datasource>>,
}

/// 运行中的监控：配置 + 生命周期状态 + 运行统计
///
/// 状态迁移：Disabled -> Enabled (enable) -> Registered (start) -> Enabled (stop) -> Disabled (disable)。
/// 运行统计使用独立的锁，轮询更新统计不会阻塞生命周期操作。
pub struct Watcher {
    definition: Arc<WatcherDefinition>,
    state: Mutex<WatcherState>,
    stats: Arc<Mutex<RunStatistics>>,
}

impl Watcher {
    pub fn new(definition: WatcherDefinition) -> Self {
        Self::with_stats(definition, Arc::new(Mutex::new(RunStatistics::default())))
    }

    /// 使用已有的运行统计创建，更新配置时沿用旧统计
    pub fn with_stats(definition: WatcherDefinition, stats: Arc<Mutex<RunStatistics>>) -> Self {
        let state = WatcherState {
            enabled: definition.enabled,
            ..Default::default()
        };
        Self {
            definition: Arc::new(definition),
            state: Mutex::new(state),
            stats,
        }
    }

    pub fn app(&self) -> &str {
        &self.definition.app
    }

    pub fn definition(&self) -> &WatcherDefinition {
        &self.definition
    }

    pub fn shared_stats(&self) -> Arc<Mutex<RunStatistics>> {
        self.stats.clone()
    }

    pub async fn stats(&self) -> RunStatistics {
        *self.stats.lock().await
    }

    pub async fn is_enabled(&self) -> bool {
        self.state.lock().await.enabled
    }

    pub async fn entry_id(&self) -> Option<EntryId> {
        self.state.lock().await.entry_id
    }

    /// 以新配置替换当前监控，保留注册句柄、绑定数据源和运行统计
    ///
    /// 只在新旧配置不需要重启注册时使用，当前监控随后被丢弃。
    pub async fn replace(&self, definition: WatcherDefinition) -> Watcher {
        let mut state = self.state.lock().await;
        let carried = WatcherState {
            enabled: definition.enabled,
            entry_id: state.entry_id.take(),
            bound: std::mem::take(&mut state.bound),
        };
        Watcher {
            definition: Arc::new(definition),
            state: Mutex::new(carried),
            stats: self.stats.clone(),
        }
    }

    /// 启用，不注册调度
    pub async fn enable(&self) -> WatcherResult<()> {
        let mut state = self.state.lock().await;
        if state.enabled {
            return Ok(());
        }
        if self.definition.cron_expression.trim().is_empty() {
            return Err(WatcherError::invalid_cron(
                &self.definition.cron_expression,
                "Cron表达式为空",
            ));
        }
        state.enabled = true;
        debug!("监控 {} 已启用", self.app());
        Ok(())
    }

    /// 注册到调度，已注册时直接返回已有句柄
    pub async fn start(
        &self,
        registry: &SchedulerRegistry,
        context: &PollingContext,
    ) -> WatcherResult<EntryId> {
        let engine = registry.engine().await?;
        let mut state = self.state.lock().await;
        if !state.enabled {
            return Err(WatcherError::WatcherDisabled {
                app: self.app().to_string(),
            });
        }
        if let Some(id) = state.entry_id {
            return Ok(id);
        }

        let task = PollTask::new(self.definition.clone(), self.stats.clone(), context);
        let bound = task.datasources().to_vec();
        let id = engine.register(&self.definition.cron_expression, task.into_job())?;

        state.entry_id = Some(id);
        state.bound = bound;
        info!(
            "监控 {} 已注册调度: entry={}, cron={}",
            self.app(),
            id,
            self.definition.cron_expression
        );
        Ok(id)
    }

    /// 注销调度并重置绑定数据源的连接池，未注册时无操作
    pub async fn stop(&self, registry: &SchedulerRegistry) {
        let mut state = self.state.lock().await;
        self.stop_locked(&mut state, registry).await;
    }

    /// 停止后禁用
    pub async fn disable(&self, registry: &SchedulerRegistry) {
        let mut state = self.state.lock().await;
        self.stop_locked(&mut state, registry).await;
        if state.enabled {
            state.enabled = false;
            debug!("监控 {} 已禁用", self.app());
        }
    }

    async fn stop_locked(&self, state: &mut WatcherState, registry: &SchedulerRegistry) {
        let Some(id) = state.entry_id.take() else {
            return;
        };
        if let Ok(engine) = registry.engine().await {
            engine.deregister(id);
        }
        // 共享同一数据源的其他监控也会受影响，下次使用时重新建立连接
        for datasource in state.bound.drain(..) {
            datasource.reset().await;
        }
        info!("监控 {} 已注销调度: entry={}", self.app(), id);
    }

    /// 对外视图，`Enabled` 取运行时状态
    pub async fn snapshot(&self) -> WatcherSnapshot {
        let (enabled, entry_id) = {
            let state = self.state.lock().await;
            (state.enabled, state.entry_id)
        };
        let mut definition = (*self.definition).clone();
        definition.enabled = enabled;
        WatcherSnapshot::new(definition, entry_id, self.stats().await)
    }

    /// 用于持久化的配置，`Enabled` 取运行时状态
    pub async fn to_definition(&self) -> WatcherDefinition {
        let mut definition = (*self.definition).clone();
        definition.enabled = self.is_enabled().await;
        definition
    }

    /// 调度状态投影，未注册时句柄为0且没有触发时间
    pub async fn entry(&self, registry: &SchedulerRegistry) -> EntryProjection {
        let Some(id) = self.entry_id().await else {
            return EntryProjection::unregistered(self.app());
        };
        let snapshot = match registry.engine().await {
            Ok(engine) => engine.entry(id),
            Err(_) => None,
        };
        EntryProjection {
            app: self.app().to_string(),
            entry_id: id.0,
            prev_fire_time: snapshot.as_ref().and_then(|s| s.prev),
            next_fire_time: snapshot.as_ref().and_then(|s| s.next),
        }
    }
}
