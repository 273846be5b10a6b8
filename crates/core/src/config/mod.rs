pub mod models;

pub use models::{AppConfig, ElasticConfig, RuntimeSettings, SchedulerConfig, ServerConfig};

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config/watcher.toml";
