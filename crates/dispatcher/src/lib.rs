//! 监控调度层
//!
//! 包含cron触发引擎、调度注册表、监控生命周期和轮询任务。

pub mod cron_utils;
pub mod polling;
pub mod scheduler;
pub mod trigger_engine;
pub mod watcher;

pub use cron_utils::{normalize_cron_expression, CronScheduler};
pub use polling::{PollTask, PollingContext};
pub use scheduler::{EngineFactory, SchedulerRegistry, SchedulerStatus};
pub use trigger_engine::CronTriggerEngine;
pub use watcher::Watcher;
