pub mod datasource_service;
pub mod scheduler_service;
pub mod watcher_service;

pub use datasource_service::DatasourceService;
pub use scheduler_service::SchedulerService;
pub use watcher_service::WatcherService;
