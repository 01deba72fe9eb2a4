//! 应用层错误定义
//!
//! 统一的命令/查询错误类型

use thiserror::Error;

use super::ports::{ArtifactStoreError, CacheStoreError, RepositoryError, SynthesisError};

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 资源未找到
    #[error("{resource} not found: {key}")]
    NotFound { resource: &'static str, key: String },

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 合成服务错误（保留子类型供 HTTP 层区分上报）
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    /// 存储错误（文件字节层）
    #[error("Storage error: {0}")]
    StorageError(String),

    /// 仓储错误（元数据层）
    #[error("Repository error: {0}")]
    RepositoryError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    pub fn not_found(resource: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            key: key.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

impl From<CacheStoreError> for ApplicationError {
    fn from(err: CacheStoreError) -> Self {
        // Conflict 由编排逻辑在转换前处理；走到这里的只剩存储故障
        Self::RepositoryError(err.to_string())
    }
}

impl From<RepositoryError> for ApplicationError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(key) => Self::NotFound {
                resource: "Custom audio",
                key,
            },
            other => Self::RepositoryError(other.to_string()),
        }
    }
}

impl From<ArtifactStoreError> for ApplicationError {
    fn from(err: ArtifactStoreError) -> Self {
        match err {
            ArtifactStoreError::InvalidFormat(msg) => {
                Self::ValidationError(format!("Invalid audio format: {}", msg))
            }
            ArtifactStoreError::TooLarge { size, limit } => Self::ValidationError(format!(
                "File too large: {} bytes, limit {} bytes",
                size, limit
            )),
            ArtifactStoreError::NotFound(key) => Self::NotFound {
                resource: "Audio file",
                key,
            },
            ArtifactStoreError::IoError(msg) => Self::StorageError(msg),
        }
    }
}
