use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, sync::broadcast};
use tower_http::timeout::TimeoutLayer;
use tracing::info;

use watcher_api::{create_app, AppState};
use watcher_application::{DatasourceService, SchedulerService, WatcherService};
use watcher_core::AppConfig;
use watcher_dispatcher::{PollingContext, SchedulerRegistry};
use watcher_infrastructure::{build_sink, DatasourceRegistry, RecordFetcher, TomlConfigStore};

/// 主应用程序
pub struct Application {
    config: AppConfig,
    watcher_service: Arc<WatcherService>,
    state: AppState,
}

impl Application {
    /// 组装数据源、日志汇聚、调度注册表和各服务
    pub async fn new(config: AppConfig, config_path: &str) -> Result<Self> {
        let poll_timeout = Duration::from_secs(config.scheduler.poll_timeout_seconds);

        let datasources = Arc::new(DatasourceRegistry::new(
            config.datasources.clone(),
            poll_timeout,
        ));
        let context = PollingContext::new(
            datasources.clone(),
            build_sink(&config.elastic),
            RecordFetcher::new(poll_timeout),
        );

        let registry = Arc::new(SchedulerRegistry::with_cron_engine());
        registry.init().await;

        let store = Arc::new(TomlConfigStore::new(config_path));
        let watcher_service = Arc::new(WatcherService::new(&config, registry, context, store));

        let state = AppState {
            watcher_service: watcher_service.clone(),
            scheduler_service: Arc::new(SchedulerService::new(watcher_service.clone())),
            datasource_service: Arc::new(DatasourceService::new(datasources)),
        };

        Ok(Self {
            config,
            watcher_service,
            state,
        })
    }

    /// 运行HTTP服务直到收到关闭信号，随后停止调度
    pub async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        if self.config.scheduler.auto_start {
            self.watcher_service.start_scheduler().await;
        } else {
            info!("未开启自动调度，等待 PATCH /api/scheduler/start");
        }

        let bind_address = &self.config.server.bind_address;
        let app = create_app(self.state.clone()).layer(TimeoutLayer::new(Duration::from_secs(
            self.config.server.request_timeout_seconds,
        )));

        let listener = TcpListener::bind(bind_address)
            .await
            .with_context(|| format!("绑定地址失败: {bind_address}"))?;
        info!("API服务器启动在 http://{}", bind_address);

        let served = axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                info!("API服务器收到关闭信号");
            })
            .await
            .context("API服务器运行失败");

        self.watcher_service.stop_scheduler().await;
        info!("调度已停止，API服务器已退出");
        served
    }
}
