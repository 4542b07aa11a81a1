// crates/baro_physics/src/lib.rs

//! 正压涡度方程数值核心
//!
//! 提供：
//! - 大气状态 (state)：涡度、流函数、风场，线性化时携带基本态
//! - 倾向分量 (tendency)：动力学、扩散、阻尼、强迫及诊断包装器
//! - 时间积分 (engine)：蛙跳 + Robert–Asselin 滤波、驱动循环
//! - 构建器 (builder)：按固定顺序组装分量
//!
//! 核心不做 I/O，也不读取配置文件；谱变换只通过 [`baro_spectral::SpectralField`] 使用。

#![warn(clippy::all)]

pub mod builder;
pub mod engine;
pub mod state;
pub mod tendency;

pub use builder::ModelBuilder;
pub use engine::{
    should_store, LeapfrogStepper, ModelRunner, Monitor, MonitorError, RunError, RunSummary,
    DEFAULT_ROBERT_COEFFICIENT,
};
pub use state::{AtmosphericState, FlowFields, PendingState, FLOW_NAMES};
pub use tendency::{
    Damping, DiagnosticWrapper, Diagnostics, Diffusion, Dynamics, Forcing, ForcingSpec,
    Formulation, TendencyComponent, TendencySet, TendencyTerm, VORTICITY,
};
