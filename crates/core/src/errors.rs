use thiserror::Error;

/// 监控服务错误类型定义
#[derive(Debug, Error)]
pub enum WatcherError {
    #[error("监控未找到: {app}")]
    WatcherNotFound { app: String },

    #[error("监控名称为空")]
    InvalidApp,

    #[error("监控名称重复: {app}")]
    DuplicateApp { app: String },

    #[error("监控配置无法保存: {app} - {message}")]
    InvalidWatcher { app: String, message: String },

    #[error("无效的CRON表达式: {expr} - {message}")]
    InvalidCronExpression { expr: String, message: String },

    #[error("监控已禁用: {app}")]
    WatcherDisabled { app: String },

    #[error("调度器未初始化")]
    SchedulerUnavailable,

    #[error("数据源未找到: {code}")]
    DatasourceNotFound { code: String },

    #[error("不支持的数据源类型: {kind}")]
    UnsupportedDatasource { kind: String },

    #[error("数据源配置无效: {code} - {message}")]
    InvalidDatasource { code: String, message: String },

    #[error("连接数据源 {code} 失败: {message}")]
    Connection { code: String, message: String },

    #[error("上游请求失败: {0}")]
    Upstream(String),

    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP请求错误: {0}")]
    Http(#[from] reqwest::Error),

    #[error("序列化错误: {0}")]
    Serialization(String),

    #[error("配置错误: {0}")]
    Configuration(String),

    #[error("已保存到内存但持久化失败: {0}")]
    Persistence(String),

    #[error("操作超时: {0}")]
    Timeout(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 错误分类，决定错误向调用方暴露的方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Unavailable,
    Upstream,
    Serialization,
    Internal,
}

impl WatcherError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WatcherError::WatcherNotFound { .. } | WatcherError::DatasourceNotFound { .. } => {
                ErrorKind::NotFound
            }
            WatcherError::InvalidApp
            | WatcherError::DuplicateApp { .. }
            | WatcherError::InvalidWatcher { .. }
            | WatcherError::InvalidCronExpression { .. }
            | WatcherError::WatcherDisabled { .. }
            | WatcherError::InvalidDatasource { .. } => ErrorKind::Validation,
            WatcherError::SchedulerUnavailable
            | WatcherError::UnsupportedDatasource { .. }
            | WatcherError::Connection { .. }
            | WatcherError::Timeout(_) => ErrorKind::Unavailable,
            WatcherError::Upstream(_) | WatcherError::Database(_) | WatcherError::Http(_) => {
                ErrorKind::Upstream
            }
            WatcherError::Serialization(_) => ErrorKind::Serialization,
            WatcherError::Configuration(_)
            | WatcherError::Persistence(_)
            | WatcherError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn not_found(app: impl Into<String>) -> Self {
        WatcherError::WatcherNotFound { app: app.into() }
    }

    pub fn invalid_cron(expr: impl Into<String>, message: impl Into<String>) -> Self {
        WatcherError::InvalidCronExpression {
            expr: expr.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for WatcherError {
    fn from(e: serde_json::Error) -> Self {
        WatcherError::Serialization(e.to_string())
    }
}

/// 统一的Result类型
pub type WatcherResult<T> = std::result::Result<T, WatcherError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_classification() {
        assert_eq!(WatcherError::not_found("a").kind(), ErrorKind::NotFound);
        assert_eq!(WatcherError::InvalidApp.kind(), ErrorKind::Validation);
        assert_eq!(
            WatcherError::DuplicateApp { app: "a".into() }.kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            WatcherError::invalid_cron("", "表达式为空").kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            WatcherError::InvalidWatcher {
                app: "a".into(),
                message: "null".into()
            }
            .kind(),
            ErrorKind::Validation
        );
        assert_eq!(WatcherError::SchedulerUnavailable.kind(), ErrorKind::Unavailable);
        assert_eq!(
            WatcherError::Upstream("502".into()).kind(),
            ErrorKind::Upstream
        );
        assert_eq!(
            WatcherError::Persistence("disk full".into()).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_error_messages_are_raw() {
        assert_eq!(WatcherError::InvalidApp.to_string(), "监控名称为空");
        assert_eq!(WatcherError::not_found("crm").to_string(), "监控未找到: crm");
        assert_eq!(
            WatcherError::DuplicateApp { app: "crm".into() }.to_string(),
            "监控名称重复: crm"
        );
        assert_eq!(
            WatcherError::UnsupportedDatasource {
                kind: "oracle".into()
            }
            .to_string(),
            "不支持的数据源类型: oracle"
        );
    }
}
