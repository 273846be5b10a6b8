use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use futures::future::BoxFuture;

use crate::{models::EntryId, WatcherResult};

/// 触发引擎回调，每次触发生成一个独立的future
pub type Job = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// 单个注册的触发时间信息
#[derive(Debug, Clone, PartialEq)]
pub struct EntrySnapshot {
    pub id: EntryId,
    pub prev: Option<DateTime<Local>>,
    pub next: Option<DateTime<Local>>,
}

/// Cron风格触发引擎接口
///
/// 同一注册的相邻两次触发由引擎保证串行：上一次回调返回前不会开始下一次。
#[async_trait]
pub trait TriggerEngine: Send + Sync {
    /// 按cron表达式注册回调，返回注册句柄
    fn register(&self, cron_expr: &str, job: Job) -> WatcherResult<EntryId>;

    /// 注销注册，未知句柄忽略
    fn deregister(&self, id: EntryId);

    /// 查询注册的触发时间
    fn entry(&self, id: EntryId) -> Option<EntrySnapshot>;

    /// 开始全局触发
    fn start(&self);

    /// 停止全局触发，等待正在执行的回调全部完成后返回
    async fn stop(&self);
}
