//! Test data builders with sensible defaults

use serde_json::Value;
use watcher_core::{DatasourceConfig, DatasourceType, WatcherDefinition};

/// Builder for creating test WatcherDefinition values
pub struct WatcherDefinitionBuilder {
    definition: WatcherDefinition,
}

impl WatcherDefinitionBuilder {
    pub fn new(app: &str) -> Self {
        Self {
            definition: WatcherDefinition {
                module: "inventory".to_string(),
                system: "wms".to_string(),
                app: app.to_string(),
                get_expired: "SELECT 1 AS Expire1Day".to_string(),
                cron_expression: "0 */5 *".to_string(),
                ..Default::default()
            },
        }
    }

    pub fn with_sources(mut self, sources: &[&str]) -> Self {
        self.definition.sources = sources.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_get_expired(mut self, query: &str) -> Self {
        self.definition.get_expired = query.to_string();
        self
    }

    pub fn with_cron(mut self, cron: &str) -> Self {
        self.definition.cron_expression = cron.to_string();
        self
    }

    pub fn with_desc(mut self, desc: &str) -> Self {
        self.definition.desc = desc.to_string();
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.definition.tags = tags.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_extend(mut self, extend: Value) -> Self {
        self.definition.extend = Some(extend);
        self
    }

    pub fn enabled(mut self) -> Self {
        self.definition.enabled = true;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.definition.enabled = false;
        self
    }

    pub fn build(self) -> WatcherDefinition {
        self.definition
    }
}

/// In-memory SQLite datasource; every connection opens its own empty database
pub fn sqlite_datasource(code: &str) -> DatasourceConfig {
    DatasourceConfig {
        code: code.to_string(),
        kind: DatasourceType::Sqlite,
        dsn: "sqlite::memory:".to_string(),
        ..Default::default()
    }
}

/// API datasource pointing at `url`
pub fn api_datasource(code: &str, url: &str) -> DatasourceConfig {
    DatasourceConfig {
        code: code.to_string(),
        kind: DatasourceType::Api,
        url: url.to_string(),
        ..Default::default()
    }
}
