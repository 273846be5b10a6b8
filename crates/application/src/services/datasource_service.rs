use std::sync::Arc;

use async_trait::async_trait;

use watcher_infrastructure::DatasourceRegistry;

use crate::interfaces::DatasourceQueryService;

/// 数据源查询
pub struct DatasourceService {
    registry: Arc<DatasourceRegistry>,
}

impl DatasourceService {
    pub fn new(registry: Arc<DatasourceRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl DatasourceQueryService for DatasourceService {
    async fn list_codes(&self) -> Vec<String> {
        self.registry.codes()
    }
}
