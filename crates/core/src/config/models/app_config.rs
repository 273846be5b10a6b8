use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use super::runtime::{ElasticConfig, SchedulerConfig, ServerConfig};
use crate::models::{DatasourceConfig, WatcherDefinition};

/// 系统配置
///
/// 运行参数（server/scheduler/elastic）按 默认值 -> 配置文件 -> 环境变量(WATCHER_) 分层加载；
/// 数据源与监控列表直接由toml解析，保留字段名大小写。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub elastic: ElasticConfig,
    /// 数据源列表
    #[serde(default)]
    pub datasources: Vec<DatasourceConfig>,
    /// 监控列表
    #[serde(default)]
    pub watchers: Vec<WatcherDefinition>,
    /// 配置文件中的运行参数，不含环境变量覆盖；写回文件时使用
    #[serde(skip)]
    pub file_settings: Option<RuntimeSettings>,
}

/// 运行参数
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RuntimeSettings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub elastic: ElasticConfig,
}

#[derive(Debug, Default, Deserialize)]
struct Catalog {
    #[serde(default)]
    datasources: Vec<DatasourceConfig>,
    #[serde(default)]
    watchers: Vec<WatcherDefinition>,
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 环境变量示例：`WATCHER_SERVER__BIND_ADDRESS=127.0.0.1:9090`
    pub fn load(config_path: &str) -> Result<Self> {
        Self::load_with_env(
            config_path,
            Environment::with_prefix("WATCHER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
    }

    fn load_with_env(config_path: &str, environment: Environment) -> Result<Self> {
        if !Path::new(config_path).exists() {
            return Err(anyhow::anyhow!("配置文件不存在: {}", config_path));
        }
        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("读取配置文件失败: {config_path}"))?;

        let settings: RuntimeSettings = ConfigBuilder::builder()
            .add_source(File::from_str(&content, FileFormat::Toml))
            .add_source(environment)
            .build()
            .context("构建配置失败")?
            .try_deserialize()
            .context("反序列化配置失败")?;

        let file_settings: RuntimeSettings =
            toml::from_str(&content).context("解析运行参数失败")?;
        let catalog: Catalog = toml::from_str(&content).context("解析数据源与监控列表失败")?;

        let config = Self {
            server: settings.server,
            scheduler: settings.scheduler,
            elastic: settings.elastic,
            datasources: catalog.datasources,
            watchers: catalog.watchers,
            file_settings: Some(file_settings),
        };
        config.validate()?;
        Ok(config)
    }

    /// 写回配置文件时使用的基础配置：运行参数取自配置文件本身，数据源与监控列表为空
    pub fn persisted_base(&self) -> AppConfig {
        let settings = self.file_settings.clone().unwrap_or_else(|| RuntimeSettings {
            server: self.server.clone(),
            scheduler: self.scheduler.clone(),
            elastic: self.elastic.clone(),
        });
        AppConfig {
            server: settings.server,
            scheduler: settings.scheduler,
            elastic: settings.elastic,
            ..Default::default()
        }
    }

    /// 从TOML字符串加载配置（不读取环境变量）
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(toml_str).context("解析TOML配置失败")?;
        config.validate()?;
        Ok(config)
    }

    /// 序列化为TOML字符串
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("序列化配置为TOML失败")
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<()> {
        self.server.validate().context("HTTP服务配置验证失败")?;
        self.scheduler.validate().context("调度配置验证失败")?;
        self.elastic.validate().context("Elasticsearch配置验证失败")?;

        let mut codes = HashSet::new();
        for datasource in &self.datasources {
            if datasource.code.trim().is_empty() {
                return Err(anyhow::anyhow!("数据源编号不能为空"));
            }
            if !codes.insert(datasource.code.as_str()) {
                return Err(anyhow::anyhow!("数据源编号重复: {}", datasource.code));
            }
            if datasource.kind.is_api() && datasource.url.is_empty() {
                return Err(anyhow::anyhow!("API数据源 {} 缺少Url", datasource.code));
            }
        }

        let mut apps = HashSet::new();
        for watcher in &self.watchers {
            if watcher.app.trim().is_empty() {
                return Err(anyhow::anyhow!("监控App不能为空"));
            }
            if !apps.insert(watcher.app.as_str()) {
                return Err(anyhow::anyhow!("监控App重复: {}", watcher.app));
            }
        }

        Ok(())
    }
}
