// crates/baro_foundation/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 数值核心只有三类错误：变换错误、配置错误和名称冲突。
//! 所有错误在核心内部都不可恢复，发生即中止当前步（进而中止整次积分）。
//!
//! # 示例
//!
//! ```
//! use baro_foundation::error::{ModelError, ModelResult};
//!
//! fn check() -> ModelResult<()> {
//!     Err(ModelError::configuration("截断阶数不一致"))
//! }
//! assert!(check().is_err());
//! ```

use thiserror::Error;

/// 统一结果类型
pub type ModelResult<T> = Result<T, ModelError>;

/// 模式核心错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    // ========================================================================
    // 谱变换
    // ========================================================================
    /// 网格/谱系数形状或分辨率与变换不兼容（TransformError）
    #[error("变换错误: {message}")]
    Transform {
        /// 具体错误信息
        message: String,
    },

    // ========================================================================
    // 配置
    // ========================================================================
    /// 配置不一致：截断阶数不匹配、强迫参数长度不等、时长字符串非法等（ConfigurationError）
    #[error("配置错误: {message}")]
    Configuration {
        /// 具体错误信息
        message: String,
    },

    // ========================================================================
    // 组合
    // ========================================================================
    /// 两个分量输出了同名诊断量，或同一倾向目标形状不兼容（NameCollisionError）
    #[error("名称冲突: '{key}' 同时由 {first} 与 {second} 产生")]
    NameCollision {
        /// 冲突的键名
        key: String,
        /// 先注册的分量
        first: String,
        /// 后注册的分量
        second: String,
    },

    /// 附带出错分量名称的错误
    #[error("分量 '{component}' 计算失败: {source}")]
    Component {
        /// 出错的倾向分量
        component: String,
        /// 原始错误
        #[source]
        source: Box<ModelError>,
    },
}

// ========================================================================
// 便捷构造方法
// ========================================================================

impl ModelError {
    /// 变换错误
    pub fn transform(message: impl Into<String>) -> Self {
        Self::Transform {
            message: message.into(),
        }
    }

    /// 配置错误
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// 名称冲突
    pub fn name_collision(
        key: impl Into<String>,
        first: impl Into<String>,
        second: impl Into<String>,
    ) -> Self {
        Self::NameCollision {
            key: key.into(),
            first: first.into(),
            second: second.into(),
        }
    }

    /// 为错误附加分量名称
    ///
    /// 已经带有分量信息的错误保持不变，保留最内层的分量名。
    pub fn in_component(self, component: impl Into<String>) -> Self {
        match self {
            err @ Self::Component { .. } => err,
            other => Self::Component {
                component: component.into(),
                source: Box::new(other),
            },
        }
    }

    /// 出错分量名称（若有）
    pub fn component(&self) -> Option<&str> {
        match self {
            Self::Component { component, .. } => Some(component),
            _ => None,
        }
    }

    /// 去掉分量包装后的根错误
    pub fn root(&self) -> &ModelError {
        match self {
            Self::Component { source, .. } => source.root(),
            other => other,
        }
    }
}

// ========================================================================
// 验证辅助方法
// ========================================================================

impl ModelError {
    /// 检查截断阶数是否一致
    #[inline]
    pub fn check_truncation(what: &str, expected: usize, actual: usize) -> ModelResult<()> {
        if expected != actual {
            Err(Self::configuration(format!(
                "{what} 截断阶数不一致: 分量 T{expected}, 状态 T{actual}"
            )))
        } else {
            Ok(())
        }
    }

    /// 检查二维形状是否一致
    #[inline]
    pub fn check_shape(
        what: &str,
        expected: (usize, usize),
        actual: (usize, usize),
    ) -> ModelResult<()> {
        if expected != actual {
            Err(Self::transform(format!(
                "{what} 形状不匹配: 期望 {}x{}, 实际 {}x{}",
                expected.0, expected.1, actual.0, actual.1
            )))
        } else {
            Ok(())
        }
    }
}
