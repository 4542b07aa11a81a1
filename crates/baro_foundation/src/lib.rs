// crates/baro_foundation/src/lib.rs

//! Barotropy Foundation Layer
//!
//! 基础层，为整个模式提供统一错误类型与物理常数。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型 `ModelError` / `ModelResult`
//! - [`constants`]: 行星常数（半径、自转角速度）及按名称查找
//!
//! # 层级架构
//!
//! ```text
//! Layer 5: baro_cli       ─> 驱动脚本
//! Layer 4: baro_io        ─> Monitor 实现、初始场
//! Layer 3: baro_physics   ─> 状态、倾向项、蛙跳积分
//!          baro_config    ─> 运行配置
//! Layer 2: baro_spectral  ─> 球谐变换、SpectralField
//! Layer 1: baro_foundation (本层)
//! ```
//!
//! # 示例
//!
//! ```
//! use baro_foundation::{constants::PhysicalConstants, error::{ModelError, ModelResult}};
//!
//! fn radius() -> ModelResult<f64> {
//!     PhysicalConstants::earth().lookup("planetary_radius")
//! }
//! assert!(radius().unwrap() > 6.0e6);
//! assert!(matches!(
//!     PhysicalConstants::earth().lookup("gravity"),
//!     Err(ModelError::Configuration { .. })
//! ));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod constants;
pub mod error;

// 重导出常用类型
pub use constants::PhysicalConstants;
pub use error::{ModelError, ModelResult};
