pub mod datasource;
pub mod entry;
pub mod record;
pub mod watcher;

pub use datasource::{DatasourceConfig, DatasourceType};
pub use entry::{EntryId, EntryProjection};
pub use record::{ApiRecord, ExpiredDataRecord, LogDocument, LogLevel};
pub use watcher::{WatcherDefinition, WatcherSnapshot};
