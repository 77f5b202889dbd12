use serde::Serialize;
use thiserror::Error;

use crate::services::authoring::AuthoringError;
use crate::services::quiz_builder::BuildError;
use crate::services::state_codec::{DecodeError, EncodeError};

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 出题表单无效
    #[error("出题表单错误: {0}")]
    Build(#[from] BuildError),
    /// 令牌生成失败
    #[error("令牌生成错误: {0}")]
    Encode(#[from] EncodeError),
    /// 令牌无法还原
    #[error("令牌解析错误: {0}")]
    Decode(#[from] DecodeError),
    /// 出题会话错误
    #[error("出题会话错误: {0}")]
    Authoring(#[from] AuthoringError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 命令行参数错误
    #[error("用法错误: {0}")]
    Usage(String),
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// 返回给客户端的结构化错误
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub status: u16,
    pub error: String,
}

impl AppError {
    /// 对应的 HTTP 状态码：输入问题 400，服务端问题 500
    pub fn status(&self) -> u16 {
        match self {
            AppError::Build(_)
            | AppError::Decode(_)
            | AppError::Authoring(_)
            | AppError::Usage(_) => 400,
            AppError::Encode(_) | AppError::File(_) => 500,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            status: self.status(),
            error: self.to_string(),
        }
    }

    // ========== 便捷构造函数 ==========

    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建 TOML 解析错误
    pub fn toml_parse_failed(path: impl Into<String>, source: toml::de::Error) -> Self {
        AppError::File(FileError::TomlParseFailed {
            path: path.into(),
            source,
        })
    }

    pub fn usage(message: impl Into<String>) -> Self {
        AppError::Usage(message.into())
    }
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
