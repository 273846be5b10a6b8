use async_trait::async_trait;

use crate::{config::AppConfig, WatcherResult};

/// 配置快照持久化接口
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// 整体覆盖写入配置快照
    async fn save(&self, config: &AppConfig) -> WatcherResult<()>;
}
