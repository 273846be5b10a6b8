use std::str::FromStr;

use chrono::{DateTime, Local};
use cron::Schedule;

use watcher_core::{WatcherError, WatcherResult};

/// 规范化CRON表达式
///
/// - 3段：`秒 分 时`，补齐为 `秒 分 时 * * *`
/// - 5段：标准 `分 时 日 月 周`，补 `0` 秒
/// - 6段/7段：原样使用
pub fn normalize_cron_expression(cron_expr: &str) -> WatcherResult<String> {
    let fields: Vec<&str> = cron_expr.split_whitespace().collect();
    match fields.len() {
        3 => Ok(format!("{} * * *", fields.join(" "))),
        5 => Ok(format!("0 {}", fields.join(" "))),
        6 | 7 => Ok(fields.join(" ")),
        0 => Err(WatcherError::invalid_cron(cron_expr, "表达式为空")),
        n => Err(WatcherError::invalid_cron(
            cron_expr,
            format!("不支持的字段数量: {n}"),
        )),
    }
}

/// CRON表达式解析和调度工具
#[derive(Debug, Clone)]
pub struct CronScheduler {
    schedule: Schedule,
}

impl CronScheduler {
    /// 创建新的CRON调度器
    pub fn new(cron_expr: &str) -> WatcherResult<Self> {
        let normalized = normalize_cron_expression(cron_expr)?;
        let schedule = Schedule::from_str(&normalized)
            .map_err(|e| WatcherError::invalid_cron(cron_expr, e.to_string()))?;

        Ok(Self { schedule })
    }

    /// 获取下一次执行时间
    pub fn next_execution_time(&self, from: DateTime<Local>) -> Option<DateTime<Local>> {
        self.schedule.after(&from).next()
    }
}
