// crates/baro_io/src/error.rs
//! IO 错误类型定义
//!
//! 所有错误最终可转换为 ModelError 以实现跨层错误传递。

use baro_foundation::ModelError;
use thiserror::Error;

/// IO 模块结果类型别名
pub type IoResult<T> = Result<T, IoError>;

/// IO 错误枚举
#[derive(Error, Debug)]
pub enum IoError {
    /// 文件读写错误
    #[error("文件错误: {path}: {source}")]
    File {
        /// 文件路径
        path: String,
        /// 底层错误
        #[source]
        source: std::io::Error,
    },

    /// JSON 序列化错误
    #[error("JSON 错误: {0}")]
    Json(#[from] serde_json::Error),

    /// 快照文件解析错误
    #[error("文件解析错误: {file}:{line} - {message}")]
    ParseError {
        /// 文件
        file: String,
        /// 行号（从 1 开始）
        line: usize,
        /// 说明
        message: String,
    },

    /// 变量缺失
    #[error("变量缺失: {variable} (文件 {file})")]
    MissingVariable {
        /// 文件
        file: String,
        /// 变量名
        variable: String,
    },

    /// 数据形状不匹配
    #[error("数据形状不匹配: {variable} 期望 {expected:?}, 实际 {actual:?}")]
    ShapeMismatch {
        /// 变量名
        variable: String,
        /// 期望形状
        expected: Vec<usize>,
        /// 实际形状
        actual: Vec<usize>,
    },

    /// 追加输出与已有文件不一致
    #[error("无法追加到 {file}: {reason}")]
    IncompatibleOutput {
        /// 文件
        file: String,
        /// 原因
        reason: String,
    },

    /// NetCDF 错误
    #[error("NetCDF 错误: {0}")]
    NetCdf(String),

    /// 所需特性未启用
    #[error("特性 '{0}' 未启用")]
    FeatureDisabled(&'static str),

    /// 基础层错误转换
    #[error("基础层错误: {0}")]
    Foundation(#[from] ModelError),
}

impl IoError {
    /// 文件错误
    pub fn file(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        Self::File {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}

#[cfg(feature = "netcdf")]
impl From<netcdf::error::Error> for IoError {
    fn from(e: netcdf::error::Error) -> Self {
        IoError::NetCdf(e.to_string())
    }
}

impl From<IoError> for ModelError {
    fn from(err: IoError) -> Self {
        match err {
            IoError::Foundation(inner) => inner,
            other => ModelError::configuration(other.to_string()),
        }
    }
}
