//! 容器错误类型
//!
//! 所有错误在出现处同步返回，容器内部从不重试。

use thiserror::Error;

/// 容器操作的结果类型
pub type Result<T, E = ContainerError> = std::result::Result<T, E>;

/// 依赖注入容器错误
#[derive(Debug, Error)]
pub enum ContainerError {
    /// 结构上非法的配置（父容器自引用、别名自引用等）
    #[error("Invalid operation '{operation}': {reason}")]
    InvalidOperation {
        operation: &'static str,
        reason: String,
    },

    /// 本地注册表与整条父容器链中都没有该标识符
    #[error(
        "Dependency/alias \"{name}\" not found{}",
        not_found_details(.available, .suggestion)
    )]
    NotFound {
        name: String,
        available: Vec<String>,
        suggestion: Option<String>,
    },

    /// 解析过程重新进入了仍在解析中的标识符
    #[error("Circular dependency detected: {}", .chain.join(" -> "))]
    CircularDependency { chain: Vec<String> },

    /// 解析栈深度超过配置上限
    #[error("Resolution of \"{name}\" exceeded the maximum depth of {limit}")]
    DepthExceeded { name: String, limit: usize },

    /// 存储的值与标识符声明的类型不一致
    #[error("Type mismatch for \"{name}\": expected {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
    },

    /// 用户工厂函数返回的错误
    #[error("Factory failed: {source}")]
    Factory {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ContainerError {
    /// 包装用户工厂函数内部产生的任意错误
    pub fn factory<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        ContainerError::Factory { source: err.into() }
    }

    pub(crate) fn invalid(operation: &'static str, reason: impl Into<String>) -> Self {
        ContainerError::InvalidOperation {
            operation,
            reason: reason.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ContainerError::NotFound { .. })
    }

    pub fn is_invalid_operation(&self) -> bool {
        matches!(self, ContainerError::InvalidOperation { .. })
    }
}

fn not_found_details(available: &[String], suggestion: &Option<String>) -> String {
    let mut details = String::new();
    if !available.is_empty() {
        details.push_str(". Available: ");
        details.push_str(&available.join(", "));
    }
    if let Some(suggestion) = suggestion {
        details.push_str(&format!(". Did you mean: {}?", suggestion));
    }
    details
}

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read file '{0}': {1}")]
    FileRead(String, #[source] std::io::Error),
    #[error("Failed to parse TOML from '{0}': {1}")]
    TomlParse(String, #[source] toml::de::Error),
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}
