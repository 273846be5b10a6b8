mod api;
mod sql;

use std::sync::Arc;
use std::time::Duration;

use watcher_core::{DatasourceType, ExpiredDataRecord, WatcherDefinition, WatcherResult};

use crate::datasource::Datasource;

pub use api::ApiFetcher;
pub use sql::SqlFetcher;

/// 取数方式，由数据源类型决定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    Api,
    Sql,
}

impl From<DatasourceType> for FetchMode {
    fn from(kind: DatasourceType) -> Self {
        if kind.is_api() {
            FetchMode::Api
        } else {
            FetchMode::Sql
        }
    }
}

/// 呆滞数据获取器
#[derive(Clone)]
pub struct RecordFetcher {
    api: ApiFetcher,
    sql: SqlFetcher,
}

impl RecordFetcher {
    /// `timeout` 作用于单个HTTP请求或SQL查询
    pub fn new(timeout: Duration) -> Self {
        Self {
            api: ApiFetcher::new(timeout),
            sql: SqlFetcher::new(timeout),
        }
    }

    /// 从数据源获取呆滞数据
    pub async fn fetch_records(
        &self,
        datasource: &Datasource,
        watcher: &Arc<WatcherDefinition>,
    ) -> WatcherResult<Vec<ExpiredDataRecord>> {
        match FetchMode::from(datasource.kind()) {
            FetchMode::Api => self.api.fetch_records(datasource, watcher).await,
            FetchMode::Sql => self.sql.fetch_records(datasource, watcher).await,
        }
    }
}

impl Default for RecordFetcher {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}
