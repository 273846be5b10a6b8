use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};
use watcher_core::{ElasticConfig, RecordSink, WatcherError, WatcherResult};

/// Elasticsearch日志汇聚
pub struct ElasticSink {
    client: reqwest::Client,
    addresses: Vec<String>,
    username: String,
    password: String,
    timeout: Duration,
}

impl ElasticSink {
    pub fn new(config: &ElasticConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            addresses: config
                .addresses
                .iter()
                .map(|address| address.trim_end_matches('/').to_string())
                .collect(),
            username: config.username.clone(),
            password: config.password.clone(),
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }
}

#[async_trait]
impl RecordSink for ElasticSink {
    /// 依次尝试配置的地址，直到有节点响应
    async fn log(&self, index: &str, document: Value) -> WatcherResult<()> {
        let index = index.to_lowercase();
        let mut last_error = None;

        for address in &self.addresses {
            let url = format!("{address}/{index}/_doc?refresh=true");
            let mut request = self.client.post(&url).timeout(self.timeout).json(&document);
            if !self.username.is_empty() {
                request = request.basic_auth(&self.username, Some(&self.password));
            }

            match request.send().await {
                Ok(response) if response.status().is_success() => return Ok(()),
                Ok(response) => {
                    let status = response.status().as_u16();
                    let body = response.text().await.unwrap_or_default();
                    return Err(WatcherError::Upstream(format!(
                        "写入索引失败: status={status}, error={body}"
                    )));
                }
                Err(e) => {
                    warn!("Elasticsearch节点 {} 不可用: {}", address, e);
                    last_error = Some(e);
                }
            }
        }

        Err(match last_error {
            Some(e) => WatcherError::Http(e),
            None => WatcherError::Configuration("未配置Elasticsearch地址".to_string()),
        })
    }
}

/// 未配置Elasticsearch时，把文档写入tracing日志
#[derive(Debug, Default)]
pub struct TracingSink;

#[async_trait]
impl RecordSink for TracingSink {
    async fn log(&self, index: &str, document: Value) -> WatcherResult<()> {
        info!(target: "watcher::sink", index = %index.to_lowercase(), document = %document, "记录数据");
        Ok(())
    }
}

/// 按配置选择日志汇聚
pub fn build_sink(config: &ElasticConfig) -> Arc<dyn RecordSink> {
    if config.is_enabled() {
        info!("日志汇聚: Elasticsearch {:?}", config.addresses);
        Arc::new(ElasticSink::new(config))
    } else {
        info!("日志汇聚: tracing");
        Arc::new(TracingSink)
    }
}
