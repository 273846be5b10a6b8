pub mod config_store;
pub mod datasource;
pub mod fetchers;
pub mod sinks;

pub use config_store::TomlConfigStore;
pub use datasource::{Datasource, DatasourceRegistry, DbPool};
pub use fetchers::{ApiFetcher, FetchMode, RecordFetcher, SqlFetcher};
pub use sinks::{build_sink, ElasticSink, TracingSink};
