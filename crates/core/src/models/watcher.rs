use serde::{Deserialize, Serialize};

use super::entry::EntryId;
use crate::stats::RunStatistics;
use crate::{WatcherError, WatcherResult};

/// 监控配置
///
/// `App` 是主键；运行时状态（注册句柄、运行统计）不在此结构中，
/// 由调度层的 `Watcher` 持有。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct WatcherDefinition {
    /// 模块
    pub module: String,
    /// 系统
    pub system: String,
    /// 提供方
    pub provider: String,
    /// 请求方
    pub requester: String,
    /// 类型（Push/Pull）
    #[serde(rename = "Type")]
    pub kind: String,
    /// 承载方式
    pub method: String,
    /// 应用名称
    pub app: String,
    /// 描述
    pub desc: String,
    /// 接口名称
    pub interface: String,
    /// 配置路径
    pub config_path: String,
    /// 标签
    pub tags: Vec<String>,
    /// 数据源编号列表
    pub sources: Vec<String>,
    /// 获取呆滞数据SQL
    pub get_expired: String,
    /// Cron表达式
    #[serde(rename = "Cron", alias = "CronExpression")]
    pub cron_expression: String,
    /// 是否启用
    pub enabled: bool,
    /// 扩展字段
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extend: Option<serde_json::Value>,
}

impl WatcherDefinition {
    pub fn new(app: impl Into<String>) -> Self {
        Self {
            app: app.into(),
            ..Default::default()
        }
    }

    /// 替换为 `replacement` 之前，旧的调度注册是否必须先停止
    pub fn requires_restart(&self, replacement: &WatcherDefinition) -> bool {
        !replacement.enabled
            || self.cron_expression != replacement.cron_expression
            || self.get_expired != replacement.get_expired
            || self.sources != replacement.sources
    }

    /// 校验配置能否写入TOML配置文件
    ///
    /// TOML没有空值，`Extend` 中的 `null` 会让整个配置快照无法序列化。
    pub fn ensure_persistable(&self) -> WatcherResult<()> {
        toml::to_string(self)
            .map(|_| ())
            .map_err(|e| WatcherError::InvalidWatcher {
                app: self.app.clone(),
                message: e.to_string(),
            })
    }
}

/// 监控对外视图：配置 + 运行时状态
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct WatcherSnapshot {
    #[serde(flatten)]
    pub definition: WatcherDefinition,
    #[serde(rename = "EntryID")]
    pub entry_id: u64,
    /// 运行次数
    pub count: i64,
    /// 上次运行耗时(ms)
    pub prev_duration: i64,
    /// 运行平均耗时(ms)
    pub duration_avg: i64,
}

impl WatcherSnapshot {
    pub fn new(
        definition: WatcherDefinition,
        entry_id: Option<EntryId>,
        stats: RunStatistics,
    ) -> Self {
        Self {
            definition,
            entry_id: EntryId::raw(entry_id),
            count: stats.run_count,
            prev_duration: stats.prev_duration,
            duration_avg: stats.duration_avg,
        }
    }
}
