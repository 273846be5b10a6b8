pub mod config;
pub mod errors;
pub mod models;
pub mod parser;
pub mod stats;
pub mod traits;

pub use config::*;
pub use errors::*;
pub use models::{
    DatasourceConfig, DatasourceType, EntryId, EntryProjection, ExpiredDataRecord, LogDocument,
    WatcherDefinition, WatcherSnapshot,
};
pub use stats::RunStatistics;
pub use traits::{ConfigStore, EntrySnapshot, Job, RecordSink, TriggerEngine};
