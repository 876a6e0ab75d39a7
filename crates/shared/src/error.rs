//! 统一错误处理模块
//!
//! 定义文档存储层共享的错误类型，使用 thiserror 提供良好的错误信息。

use thiserror::Error;

/// 存储层错误类型
#[derive(Debug, Error)]
pub enum StoreError {
    // ==================== 数据库错误 ====================
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("数据库迁移失败: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    // ==================== 文档错误 ====================
    #[error("文档序列化失败: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("文档结构无效: {collection}/{id} - {reason}")]
    InvalidDocument {
        collection: String,
        id: String,
        reason: String,
    },

    // ==================== 通用错误 ====================
    #[error("内部错误: {0}")]
    Internal(String),
}

/// 错误结果类型别名
pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::Database(_) => "DATABASE_ERROR",
            Self::Migration(_) => "MIGRATION_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::InvalidDocument { .. } => "INVALID_DOCUMENT",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 构造文档结构无效错误
    pub fn invalid_document(
        collection: impl Into<String>,
        id: impl Into<String>,
        reason: impl std::fmt::Display,
    ) -> Self {
        Self::InvalidDocument {
            collection: collection.into(),
            id: id.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        let err = StoreError::invalid_document("refunds", "r1", "missing field `amount`");
        assert_eq!(err.code(), "INVALID_DOCUMENT");
        assert_eq!(
            err.to_string(),
            "文档结构无效: refunds/r1 - missing field `amount`"
        );

        let db_err = StoreError::Database(sqlx::Error::PoolTimedOut);
        assert_eq!(db_err.code(), "DATABASE_ERROR");
    }
}
