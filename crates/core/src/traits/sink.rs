use async_trait::async_trait;
use serde_json::Value;

use crate::WatcherResult;

/// 日志汇聚接口（Elasticsearch等）
///
/// 调用方以即发即弃的方式使用：不重试、无背压、不保证顺序。
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// 写入一条文档到指定索引
    async fn log(&self, index: &str, document: Value) -> WatcherResult<()>;
}
