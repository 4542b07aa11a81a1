// crates/baro_physics/src/engine/mod.rs

//! 时间积分引擎
//!
//! - [`leapfrog`]: 蛙跳 + Robert–Asselin 滤波步进器
//! - [`runner`]: 驱动循环、输出频率与监视器接口

pub mod leapfrog;
pub mod runner;

pub use leapfrog::{LeapfrogStepper, DEFAULT_ROBERT_COEFFICIENT};
pub use runner::{should_store, ModelRunner, Monitor, MonitorError, RunError, RunSummary};
