use std::sync::Arc;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::watcher::WatcherDefinition;
use crate::parser::parse_int;

pub const EXPIRE_1_DAY: &str = "Expire1Day";
pub const EXPIRE_1_WEEK: &str = "Expire1Week";
pub const EXPIRE_1_MONTH: &str = "Expire1Month";
pub const EXTEND: &str = "Extend";

/// 一次轮询从一个数据源得到的呆滞数据
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExpiredDataRecord {
    /// 数据源编号
    pub datasource: String,
    /// 所属监控配置
    pub watcher_config: Arc<WatcherDefinition>,
    #[serde(rename = "@timestamp")]
    pub timestamp: DateTime<Local>,
    /// 过期1天
    pub expire1_day: i64,
    /// 过期7天
    pub expire1_week: i64,
    /// 过期1个月
    pub expire1_month: i64,
    /// 扩展字段
    pub extend: Option<Value>,
}

impl ExpiredDataRecord {
    /// 由解析后的嵌套行数据构造
    pub fn from_nested(
        datasource: &str,
        watcher: Arc<WatcherDefinition>,
        row: &Map<String, Value>,
    ) -> Self {
        Self {
            datasource: datasource.to_string(),
            watcher_config: watcher,
            timestamp: Local::now(),
            expire1_day: parse_int(row.get(EXPIRE_1_DAY)),
            expire1_week: parse_int(row.get(EXPIRE_1_WEEK)),
            expire1_month: parse_int(row.get(EXPIRE_1_MONTH)),
            extend: row.get(EXTEND).cloned(),
        }
    }
}

/// API数据源返回的单条记录
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ApiRecord {
    #[serde(rename = "@timestamp")]
    pub timestamp: Option<DateTime<Local>>,
    pub expire1_day: Option<Value>,
    pub expire1_week: Option<Value>,
    pub expire1_month: Option<Value>,
    pub extend: Option<Value>,
}

impl ApiRecord {
    pub fn into_record(self, datasource: &str, watcher: Arc<WatcherDefinition>) -> ExpiredDataRecord {
        ExpiredDataRecord {
            datasource: datasource.to_string(),
            watcher_config: watcher,
            timestamp: self.timestamp.unwrap_or_else(Local::now),
            expire1_day: parse_int(self.expire1_day.as_ref()),
            expire1_week: parse_int(self.expire1_week.as_ref()),
            expire1_month: parse_int(self.expire1_month.as_ref()),
            extend: self.extend,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// 写入日志索引的事件文档
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LogDocument {
    #[serde(rename = "@timestamp")]
    pub timestamp: DateTime<Local>,
    pub level: LogLevel,
    pub info: String,
    pub detail: String,
    pub extend: Option<Value>,
}

impl LogDocument {
    pub const INDEX: &'static str = "logs";

    pub fn error(info: impl Into<String>, detail: impl Into<String>, extend: Option<Value>) -> Self {
        Self {
            timestamp: Local::now(),
            level: LogLevel::Error,
            info: info.into(),
            detail: detail.into(),
            extend,
        }
    }
}
