use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use watcher_core::models::ApiRecord;
use watcher_core::{ExpiredDataRecord, WatcherDefinition, WatcherError, WatcherResult};

use crate::datasource::Datasource;

/// 从HTTP接口获取呆滞数据
#[derive(Clone)]
pub struct ApiFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl ApiFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }

    /// GET数据源Url，响应体为记录数组
    pub async fn fetch_records(
        &self,
        datasource: &Datasource,
        watcher: &Arc<WatcherDefinition>,
    ) -> WatcherResult<Vec<ExpiredDataRecord>> {
        let url = &datasource.config().url;
        debug!("请求API数据源: code={}, url={}", datasource.code(), url);

        let response = self.client.get(url).timeout(self.timeout).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(WatcherError::Upstream(format!(
                "GET {url} 返回状态码 {}",
                status.as_u16()
            )));
        }

        let body = response.bytes().await?;
        let records: Vec<ApiRecord> = serde_json::from_slice(&body)?;
        Ok(records
            .into_iter()
            .map(|record| record.into_record(datasource.code(), watcher.clone()))
            .collect())
    }
}
