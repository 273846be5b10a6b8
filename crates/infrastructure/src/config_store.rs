use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;
use watcher_core::{AppConfig, ConfigStore, WatcherError, WatcherResult};

/// 将配置快照写回TOML文件
///
/// 先写入同目录下的临时文件再重命名覆盖，写入中途崩溃不会留下残缺的配置文件。
pub struct TomlConfigStore {
    path: PathBuf,
}

impl TomlConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl ConfigStore for TomlConfigStore {
    async fn save(&self, config: &AppConfig) -> WatcherResult<()> {
        let content = config
            .to_toml()
            .map_err(|e| WatcherError::Persistence(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| WatcherError::Persistence(format!("创建目录失败: {e}")))?;
        }

        let temp = self.temp_path();
        tokio::fs::write(&temp, content)
            .await
            .map_err(|e| WatcherError::Persistence(format!("写入 {} 失败: {e}", temp.display())))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|e| {
                WatcherError::Persistence(format!("替换 {} 失败: {e}", self.path.display()))
            })?;

        debug!("配置已保存到 {}", self.path.display());
        Ok(())
    }
}
