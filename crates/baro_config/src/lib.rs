// crates/baro_config/src/lib.rs

//! Barotropy Config Layer
//!
//! 配置层，提供 JSON 模式配置与时长字符串解析。数值核心不读取配置，
//! 由应用层把 [`ModelConfig`] 翻译为构建器调用。
//!
//! # 模块概览
//!
//! - [`model_config`]: ModelConfig 及各分节
//! - [`duration`]: `"<天>_<时>:<分>"` 时长解析
//! - [`error`]: 配置错误类型
//!
//! # 层级架构
//!
//! ```text
//! Layer 5: baro_cli      ─> uses ModelConfig
//! Layer 4: baro_io       ─> monitors, initial conditions
//! Layer 3: baro_config   ─> ModelConfig (本层)
//! Layer 3: baro_physics
//! Layer 2: baro_spectral
//! Layer 1: baro_foundation
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod duration;
pub mod error;
pub mod model_config;

pub use duration::{format_duration, parse_duration};
pub use error::ConfigError;
pub use model_config::{
    DampingConfig, DiffusionConfig, ForcingConfig, InitialConfig, InitialSource,
    IntegrationConfig, ModelConfig, OutputConfig, OutputFormat,
};
