use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use watcher_core::{
    ExpiredDataRecord, Job, LogDocument, RecordSink, RunStatistics, WatcherDefinition,
};
use watcher_infrastructure::{Datasource, DatasourceRegistry, RecordFetcher};

/// 构建轮询任务所需的共享依赖
#[derive(Clone)]
pub struct PollingContext {
    pub datasources: Arc<DatasourceRegistry>,
    pub sink: Arc<dyn RecordSink>,
    pub fetcher: RecordFetcher,
}

impl PollingContext {
    pub fn new(
        datasources: Arc<DatasourceRegistry>,
        sink: Arc<dyn RecordSink>,
        fetcher: RecordFetcher,
    ) -> Self {
        Self {
            datasources,
            sink,
            fetcher,
        }
    }
}

/// 一个监控的轮询任务
///
/// 在 `Watcher::start` 时构建一次，绑定当时解析出的数据源列表；
/// 每次触发依次拉取各数据源，单个数据源失败只记录日志并继续。
pub struct PollTask {
    watcher: Arc<WatcherDefinition>,
    datasources: Vec<Arc<Datasource>>,
    stats: Arc<Mutex<RunStatistics>>,
    sink: Arc<dyn RecordSink>,
    fetcher: RecordFetcher,
}

impl PollTask {
    pub fn new(
        watcher: Arc<WatcherDefinition>,
        stats: Arc<Mutex<RunStatistics>>,
        context: &PollingContext,
    ) -> Self {
        let datasources = context.datasources.resolve(&watcher.sources);
        if datasources.len() < watcher.sources.len() {
            warn!(
                "监控 {} 的部分数据源未找到: 配置={:?}, 绑定={}",
                watcher.app,
                watcher.sources,
                datasources.len()
            );
        }
        Self {
            watcher,
            datasources,
            stats,
            sink: context.sink.clone(),
            fetcher: context.fetcher.clone(),
        }
    }

    /// 绑定的数据源
    pub fn datasources(&self) -> &[Arc<Datasource>] {
        &self.datasources
    }

    /// 执行一次轮询
    #[instrument(skip(self), fields(app = %self.watcher.app))]
    pub async fn run(&self) {
        let started = Instant::now();
        let mut records: Vec<ExpiredDataRecord> = Vec::new();

        for datasource in &self.datasources {
            match self.fetcher.fetch_records(datasource, &self.watcher).await {
                Ok(mut fetched) => {
                    debug!("数据源 {} 返回 {} 条记录", datasource.code(), fetched.len());
                    records.append(&mut fetched);
                }
                Err(e) => {
                    warn!("数据源 {} 拉取失败: {}", datasource.code(), e);
                    self.log_failure(datasource.code(), e.to_string());
                }
            }
        }

        let elapsed = started.elapsed().as_millis() as i64;
        self.stats.lock().await.record(elapsed);

        let index = self.watcher.app.to_lowercase();
        for record in records {
            let document = match serde_json::to_value(&record) {
                Ok(document) => document,
                Err(e) => {
                    warn!("记录序列化失败: {}", e);
                    continue;
                }
            };
            let sink = self.sink.clone();
            let index = index.clone();
            tokio::spawn(async move {
                if let Err(e) = sink.log(&index, document).await {
                    warn!("写入日志汇聚失败: index={}, error={}", index, e);
                }
            });
        }
    }

    fn log_failure(&self, code: &str, detail: String) {
        let document = LogDocument::error(
            format!("监控 {} 拉取数据源 {} 失败", self.watcher.app, code),
            detail,
            Some(json!({ "App": self.watcher.app, "Datasource": code })),
        );
        let Ok(document) = serde_json::to_value(&document) else {
            return;
        };
        let sink = self.sink.clone();
        tokio::spawn(async move {
            let _ = sink.log(LogDocument::INDEX, document).await;
        });
    }

    /// 转换为触发引擎回调
    pub fn into_job(self) -> Job {
        let task = Arc::new(self);
        Arc::new(move || {
            let task = task.clone();
            async move { task.run().await }.boxed()
        })
    }
}
