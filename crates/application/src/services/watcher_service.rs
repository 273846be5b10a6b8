use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use watcher_core::{
    AppConfig, ConfigStore, EntryId, EntryProjection, WatcherDefinition, WatcherError,
    WatcherResult, WatcherSnapshot,
};
use watcher_dispatcher::{PollingContext, SchedulerRegistry, Watcher};

use crate::interfaces::WatcherManagementService;

/// 监控集合服务
///
/// 结构性修改（创建、更新、删除、启用、禁用）以及单个/全局调度启停由 `mutation` 串行化；
/// 读取路径只在 `watchers` 读锁下复制一份列表，不会看到修改中途的集合。
pub struct WatcherService {
    watchers: RwLock<Vec<Arc<Watcher>>>,
    mutation: Mutex<()>,
    registry: Arc<SchedulerRegistry>,
    context: PollingContext,
    store: Arc<dyn ConfigStore>,
    /// 持久化时原样写回的运行参数，取自配置文件而非环境变量
    base_config: AppConfig,
}

impl WatcherService {
    pub fn new(
        config: &AppConfig,
        registry: Arc<SchedulerRegistry>,
        context: PollingContext,
        store: Arc<dyn ConfigStore>,
    ) -> Self {
        let watchers = config
            .watchers
            .iter()
            .cloned()
            .map(|definition| Arc::new(Watcher::new(definition)))
            .collect();
        Self {
            watchers: RwLock::new(watchers),
            mutation: Mutex::new(()),
            registry,
            context,
            store,
            base_config: config.persisted_base(),
        }
    }

    pub fn registry(&self) -> &Arc<SchedulerRegistry> {
        &self.registry
    }

    /// 当前集合的副本
    pub async fn watchers(&self) -> Vec<Arc<Watcher>> {
        self.watchers.read().await.clone()
    }

    async fn find(&self, app: &str) -> WatcherResult<Arc<Watcher>> {
        self.watchers
            .read()
            .await
            .iter()
            .find(|watcher| watcher.app() == app)
            .cloned()
            .ok_or_else(|| WatcherError::not_found(app))
    }

    /// 开启全局调度
    pub async fn start_scheduler(&self) -> bool {
        let _guard = self.mutation.lock().await;
        let watchers = self.watchers().await;
        self.registry.start_all(&watchers, &self.context).await
    }

    /// 停止全局调度，等待正在执行的轮询结束
    pub async fn stop_scheduler(&self) -> bool {
        let _guard = self.mutation.lock().await;
        let watchers = self.watchers().await;
        self.registry.stop_all(&watchers).await
    }

    /// 整体写回配置快照，调用方持有 `mutation`
    async fn persist(&self) -> WatcherResult<()> {
        let mut config = self.base_config.clone();
        config.datasources = self.context.datasources.configs();
        for watcher in self.watchers().await {
            config.watchers.push(watcher.to_definition().await);
        }

        self.store.save(&config).await.map_err(|e| {
            warn!("配置持久化失败: {}", e);
            match e {
                WatcherError::Persistence(_) => e,
                other => WatcherError::Persistence(other.to_string()),
            }
        })
    }
}

#[async_trait]
impl WatcherManagementService for WatcherService {
    async fn list_watchers(&self) -> Vec<WatcherSnapshot> {
        let mut snapshots = Vec::new();
        for watcher in self.watchers().await {
            snapshots.push(watcher.snapshot().await);
        }
        snapshots
    }

    async fn get_watcher(&self, app: &str) -> WatcherResult<WatcherSnapshot> {
        Ok(self.find(app).await?.snapshot().await)
    }

    async fn create_watcher(&self, definition: WatcherDefinition) -> WatcherResult<String> {
        let _guard = self.mutation.lock().await;
        if definition.app.trim().is_empty() {
            return Err(WatcherError::InvalidApp);
        }
        definition.ensure_persistable()?;
        let app = definition.app.clone();
        {
            let mut watchers = self.watchers.write().await;
            if watchers.iter().any(|watcher| watcher.app() == app) {
                return Err(WatcherError::DuplicateApp { app });
            }
            watchers.push(Arc::new(Watcher::new(definition)));
        }
        info!("创建监控: {}", app);

        self.persist().await?;
        Ok(app)
    }

    async fn update_watcher(
        &self,
        app: &str,
        mut definition: WatcherDefinition,
    ) -> WatcherResult<String> {
        let _guard = self.mutation.lock().await;
        let old = self.find(app).await?;
        definition.app = app.to_string();
        definition.ensure_persistable()?;

        let restart = old.definition().requires_restart(&definition);
        let replacement = if restart {
            old.stop(&self.registry).await;
            Watcher::with_stats(definition, old.shared_stats())
        } else {
            old.replace(definition).await
        };
        let replacement = Arc::new(replacement);

        {
            let mut watchers = self.watchers.write().await;
            if let Some(slot) = watchers.iter_mut().find(|watcher| watcher.app() == app) {
                *slot = replacement.clone();
            }
        }
        info!("更新监控: {}, 重新注册: {}", app, restart);

        let started = if replacement.is_enabled().await {
            replacement
                .start(&self.registry, &self.context)
                .await
                .map(|_| ())
        } else {
            Ok(())
        };

        self.persist().await?;
        started?;
        Ok(app.to_string())
    }

    async fn delete_watcher(&self, app: &str) -> WatcherResult<String> {
        let _guard = self.mutation.lock().await;
        let watcher = self.find(app).await?;
        watcher.disable(&self.registry).await;

        self.watchers
            .write()
            .await
            .retain(|existing| existing.app() != app);
        info!("删除监控: {}", app);

        self.persist().await?;
        Ok(app.to_string())
    }

    async fn enable_watcher(&self, app: &str) -> WatcherResult<String> {
        let _guard = self.mutation.lock().await;
        let watcher = self.find(app).await?;
        watcher.enable().await?;

        self.persist().await?;
        Ok(app.to_string())
    }

    async fn disable_watcher(&self, app: &str) -> WatcherResult<String> {
        let _guard = self.mutation.lock().await;
        let watcher = self.find(app).await?;
        watcher.disable(&self.registry).await;

        self.persist().await?;
        Ok(app.to_string())
    }

    async fn start_watcher(&self, app: &str) -> WatcherResult<EntryId> {
        let _guard = self.mutation.lock().await;
        let watcher = self.find(app).await?;
        watcher.start(&self.registry, &self.context).await
    }

    async fn stop_watcher(&self, app: &str) -> WatcherResult<String> {
        let _guard = self.mutation.lock().await;
        let watcher = self.find(app).await?;
        watcher.stop(&self.registry).await;
        Ok(app.to_string())
    }

    async fn get_entry(&self, app: &str) -> WatcherResult<EntryProjection> {
        Ok(self.find(app).await?.entry(&self.registry).await)
    }

    async fn get_entries(&self, apps: &[String]) -> Vec<EntryProjection> {
        let watchers = self.watchers().await;
        let mut entries = Vec::new();

        if apps.iter().all(|app| app.trim().is_empty()) {
            for watcher in &watchers {
                entries.push(watcher.entry(&self.registry).await);
            }
            return entries;
        }

        for app in apps {
            match watchers.iter().find(|watcher| watcher.app() == app.as_str()) {
                Some(watcher) => entries.push(watcher.entry(&self.registry).await),
                None => entries.push(EntryProjection::placeholder()),
            }
        }
        entries
    }
}
