use std::sync::Arc;
use std::time::Duration;

use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::{Connection, Database, Pool};
use tokio::sync::Mutex;
use tracing::{debug, info};
use watcher_core::{DatasourceConfig, DatasourceType, WatcherError, WatcherResult};

const MAX_CONNECTIONS: u32 = 5;

/// 按驱动区分的连接池
#[derive(Debug, Clone)]
pub enum DbPool {
    MySql(MySqlPool),
    Postgres(PgPool),
    Sqlite(SqlitePool),
}

impl DbPool {
    async fn ping(&self) -> Result<(), sqlx::Error> {
        match self {
            DbPool::MySql(pool) => ping_pool(pool).await,
            DbPool::Postgres(pool) => ping_pool(pool).await,
            DbPool::Sqlite(pool) => ping_pool(pool).await,
        }
    }
}

async fn ping_pool<DB: Database>(pool: &Pool<DB>) -> Result<(), sqlx::Error> {
    let mut connection = pool.acquire().await?;
    connection.ping().await
}

/// 数据源，持有惰性创建的连接池
pub struct Datasource {
    config: DatasourceConfig,
    pool: Mutex<Option<DbPool>>,
    timeout: Duration,
}

impl Datasource {
    pub fn new(config: DatasourceConfig, timeout: Duration) -> Self {
        Self {
            config,
            pool: Mutex::new(None),
            timeout,
        }
    }

    pub fn code(&self) -> &str {
        &self.config.code
    }

    pub fn kind(&self) -> DatasourceType {
        self.config.kind
    }

    pub fn config(&self) -> &DatasourceConfig {
        &self.config
    }

    /// 是否已缓存连接池
    pub async fn is_connected(&self) -> bool {
        self.pool.lock().await.is_some()
    }

    /// 获取连接池，首次使用时创建；每次获取都会ping验证连接可用
    pub async fn connect(&self) -> WatcherResult<DbPool> {
        let pool = {
            let mut cached = self.pool.lock().await;
            match cached.as_ref() {
                Some(pool) => pool.clone(),
                None => {
                    let pool = self.open()?;
                    info!("数据源 {} 已创建连接池", self.config.code);
                    *cached = Some(pool.clone());
                    pool
                }
            }
        };

        tokio::time::timeout(self.timeout, pool.ping())
            .await
            .map_err(|_| WatcherError::Timeout(format!("ping数据源 {}", self.config.code)))?
            .map_err(|e| self.connection_error(e.to_string()))?;
        Ok(pool)
    }

    /// 清空缓存的连接池，下次使用时重新创建
    ///
    /// 只释放缓存的句柄，其他调用方持有的克隆仍可继续查询，最后一个克隆释放时连接关闭。
    pub async fn reset(&self) {
        if self.pool.lock().await.take().is_some() {
            debug!("清空数据源 {} 的连接池缓存", self.config.code);
        }
    }

    fn open(&self) -> WatcherResult<DbPool> {
        let url = self.config.connection_url()?;
        let pool = match self.config.kind {
            DatasourceType::MySql => MySqlPoolOptions::new()
                .max_connections(MAX_CONNECTIONS)
                .acquire_timeout(self.timeout)
                .connect_lazy(&url)
                .map(DbPool::MySql),
            DatasourceType::Postgres => PgPoolOptions::new()
                .max_connections(MAX_CONNECTIONS)
                .acquire_timeout(self.timeout)
                .connect_lazy(&url)
                .map(DbPool::Postgres),
            DatasourceType::Sqlite => SqlitePoolOptions::new()
                .max_connections(MAX_CONNECTIONS)
                .acquire_timeout(self.timeout)
                .connect_lazy(&url)
                .map(DbPool::Sqlite),
            kind => {
                return Err(WatcherError::UnsupportedDatasource {
                    kind: kind.to_string(),
                })
            }
        };
        pool.map_err(|e| self.connection_error(e.to_string()))
    }

    fn connection_error(&self, message: String) -> WatcherError {
        WatcherError::Connection {
            code: self.config.code.clone(),
            message,
        }
    }
}

/// 数据源注册表，按编号查找数据源
pub struct DatasourceRegistry {
    datasources: Vec<Arc<Datasource>>,
}

impl DatasourceRegistry {
    pub fn new(configs: Vec<DatasourceConfig>, timeout: Duration) -> Self {
        Self {
            datasources: configs
                .into_iter()
                .map(|config| Arc::new(Datasource::new(config, timeout)))
                .collect(),
        }
    }

    /// 数据源编号列表
    pub fn codes(&self) -> Vec<String> {
        self.datasources
            .iter()
            .map(|datasource| datasource.code().to_string())
            .collect()
    }

    pub fn get(&self, code: &str) -> WatcherResult<Arc<Datasource>> {
        self.datasources
            .iter()
            .find(|datasource| datasource.code() == code)
            .cloned()
            .ok_or_else(|| WatcherError::DatasourceNotFound {
                code: code.to_string(),
            })
    }

    /// 解析监控引用的数据源
    ///
    /// 结果保持注册表中的顺序，未知编号直接跳过，找到的数量达到引用数量后停止。
    pub fn resolve(&self, sources: &[String]) -> Vec<Arc<Datasource>> {
        let mut resolved = Vec::new();
        if sources.is_empty() {
            return resolved;
        }
        for datasource in &self.datasources {
            if sources.iter().any(|code| code == datasource.code()) {
                resolved.push(datasource.clone());
                if resolved.len() == sources.len() {
                    break;
                }
            }
        }
        resolved
    }

    /// 当前数据源配置，用于持久化快照
    pub fn configs(&self) -> Vec<DatasourceConfig> {
        self.datasources
            .iter()
            .map(|datasource| datasource.config().clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> DatasourceRegistry {
        let config = |code: &str, kind| DatasourceConfig {
            code: code.to_string(),
            kind,
            dsn: "sqlite::memory:".to_string(),
            ..Default::default()
        };
        DatasourceRegistry::new(
            vec![
                config("a", DatasourceType::Sqlite),
                config("b", DatasourceType::Sqlite),
                config("c", DatasourceType::Sqlite),
            ],
            Duration::from_secs(5),
        )
    }

    #[test]
    fn test_codes() {
        assert_eq!(registry().codes(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_resolve_keeps_registry_order_and_skips_unknown() {
        let registry = registry();
        let sources = vec!["c".to_string(), "x".to_string(), "a".to_string()];
        let codes: Vec<_> = registry
            .resolve(&sources)
            .iter()
            .map(|datasource| datasource.code().to_string())
            .collect();
        assert_eq!(codes, vec!["a", "c"]);
        assert!(registry.resolve(&[]).is_empty());
    }

    #[test]
    fn test_get_unknown() {
        assert!(matches!(
            registry().get("zzz"),
            Err(WatcherError::DatasourceNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_connect_caches_and_reset_clears() {
        let registry = registry();
        let datasource = registry.get("a").unwrap();
        assert!(!datasource.is_connected().await);

        datasource.connect().await.unwrap();
        assert!(datasource.is_connected().await);

        datasource.reset().await;
        assert!(!datasource.is_connected().await);
    }

    #[tokio::test]
    async fn test_reset_keeps_checked_out_pool_usable() {
        let registry = registry();
        let datasource = registry.get("a").unwrap();
        let pool = datasource.connect().await.unwrap();

        datasource.reset().await;
        assert!(!datasource.is_connected().await);

        let DbPool::Sqlite(pool) = pool else {
            panic!("sqlite数据源应创建sqlite连接池");
        };
        assert!(!pool.is_closed());
        let (value,): (i64,) = sqlx::query_as("SELECT 1").fetch_one(&pool).await.unwrap();
        assert_eq!(value, 1);
    }

    #[tokio::test]
    async fn test_connect_unsupported_type() {
        let datasource = Datasource::new(
            DatasourceConfig {
                code: "mssql".to_string(),
                kind: DatasourceType::SqlServer,
                dsn: "server=.;".to_string(),
                ..Default::default()
            },
            Duration::from_secs(1),
        );
        assert!(matches!(
            datasource.connect().await,
            Err(WatcherError::UnsupportedDatasource { .. })
        ));
        assert!(!datasource.is_connected().await);
    }
}
