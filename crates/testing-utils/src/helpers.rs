//! Setup helpers shared by integration tests

use std::sync::Arc;
use std::time::Duration;

use watcher_core::DatasourceConfig;
use watcher_infrastructure::DatasourceRegistry;

/// Timeout used by test fetchers and pools
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

pub fn datasource_registry(configs: Vec<DatasourceConfig>) -> Arc<DatasourceRegistry> {
    Arc::new(DatasourceRegistry::new(configs, TEST_TIMEOUT))
}

/// Polls `condition` until it holds or roughly one second passed
pub async fn eventually<F>(mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    for _ in 0..100 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
