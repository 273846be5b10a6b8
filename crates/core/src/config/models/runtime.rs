use serde::{Deserialize, Serialize};

/// HTTP服务配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub request_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_seconds: 30,
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.bind_address.is_empty() {
            return Err(anyhow::anyhow!("绑定地址不能为空"));
        }
        if self.request_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("请求超时时间必须大于0"));
        }
        Ok(())
    }
}

/// 调度配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// 启动时是否自动开启调度
    pub auto_start: bool,
    /// 单个数据源请求/查询的超时时间
    pub poll_timeout_seconds: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            auto_start: true,
            poll_timeout_seconds: 30,
        }
    }
}

impl SchedulerConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.poll_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("轮询超时时间必须大于0"));
        }
        Ok(())
    }
}

/// Elasticsearch配置，地址为空时日志只写入tracing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElasticConfig {
    pub addresses: Vec<String>,
    pub username: String,
    pub password: String,
    pub timeout_seconds: u64,
}

impl Default for ElasticConfig {
    fn default() -> Self {
        Self {
            addresses: Vec::new(),
            username: String::new(),
            password: String::new(),
            timeout_seconds: 10,
        }
    }
}

impl ElasticConfig {
    pub fn is_enabled(&self) -> bool {
        !self.addresses.is_empty()
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.is_enabled() && self.timeout_seconds == 0 {
            return Err(anyhow::anyhow!("Elasticsearch超时时间必须大于0"));
        }
        if self.addresses.iter().any(|address| address.trim().is_empty()) {
            return Err(anyhow::anyhow!("Elasticsearch地址不能为空"));
        }
        Ok(())
    }
}
