pub mod app_config;
pub mod runtime;

pub use app_config::{AppConfig, RuntimeSettings};
pub use runtime::{ElasticConfig, SchedulerConfig, ServerConfig};
