use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// 触发引擎返回的注册句柄，`0` 不对应任何注册
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub u64);

impl EntryId {
    /// 未注册时为0
    pub fn raw(id: Option<EntryId>) -> u64 {
        id.map(|id| id.0).unwrap_or(0)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 监控调度状态投影
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryProjection {
    #[serde(rename = "App")]
    pub app: String,
    #[serde(rename = "ID")]
    pub entry_id: u64,
    #[serde(rename = "Prev")]
    pub prev_fire_time: Option<DateTime<Local>>,
    #[serde(rename = "Next")]
    pub next_fire_time: Option<DateTime<Local>>,
}

impl EntryProjection {
    /// 未注册的监控
    pub fn unregistered(app: impl Into<String>) -> Self {
        Self {
            app: app.into(),
            entry_id: 0,
            prev_fire_time: None,
            next_fire_time: None,
        }
    }

    /// 批量查询中未找到的监控占位
    pub fn placeholder() -> Self {
        Self::unregistered("")
    }
}
