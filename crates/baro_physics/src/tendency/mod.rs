// crates/baro_physics/src/tendency/mod.rs

//! 倾向分量
//!
//! 四类物理过程，各自有线性/非线性两种形式：
//!
//! - [`Dynamics`]: 绝对涡度平流
//! - [`Diffusion`]: 双调和超扩散
//! - [`Damping`]: Rayleigh 阻尼
//! - [`Forcing`]: 静态高斯强迫
//!
//! [`TendencyComponent`] 以枚举分发统一调用，[`DiagnosticWrapper`] 为诊断量加前缀。

pub mod damping;
pub mod diffusion;
pub mod dynamics;
pub mod forcing;
pub mod traits;
pub mod wrapper;

pub use damping::{Damping, DEFAULT_DAMPING_TIMESCALE_DAYS};
pub use diffusion::{Diffusion, DEFAULT_DIFFUSION_COEFFICIENT};
pub use dynamics::Dynamics;
pub use forcing::{Forcing, ForcingSpec};
pub use traits::{
    Diagnostics, Formulation, TendencyOutput, TendencySet, TendencyTerm, PROGNOSTIC_NAMES,
    VORTICITY,
};
pub use wrapper::DiagnosticWrapper;

use baro_foundation::error::ModelResult;

use crate::state::AtmosphericState;

/// 倾向分量枚举包装器
///
/// 内置分量走枚举分发；`Custom` 接受任意实现 [`TendencyTerm`] 的类型。
pub enum TendencyComponent {
    /// 平流
    Dynamics(Dynamics),
    /// 超扩散
    Diffusion(Diffusion),
    /// 阻尼
    Damping(Damping),
    /// 强迫
    Forcing(Forcing),
    /// 诊断包装
    Wrapped(DiagnosticWrapper),
    /// 外部分量
    Custom(Box<dyn TendencyTerm>),
}

impl TendencyComponent {
    /// 包装外部分量
    pub fn custom<T: TendencyTerm + 'static>(term: T) -> Self {
        Self::Custom(Box::new(term))
    }

    /// 用诊断包装器包一层
    pub fn wrapped(self, label: impl Into<String>) -> Self {
        Self::Wrapped(DiagnosticWrapper::new(self, label))
    }

    fn as_term(&self) -> &dyn TendencyTerm {
        match self {
            Self::Dynamics(c) => c,
            Self::Diffusion(c) => c,
            Self::Damping(c) => c,
            Self::Forcing(c) => c,
            Self::Wrapped(c) => c,
            Self::Custom(c) => c.as_ref(),
        }
    }
}

impl TendencyTerm for TendencyComponent {
    fn name(&self) -> &str {
        self.as_term().name()
    }

    fn evaluate(&self, state: &AtmosphericState) -> ModelResult<TendencyOutput> {
        self.as_term().evaluate(state)
    }
}

impl std::fmt::Debug for TendencyComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dynamics(c) => f.debug_tuple("Dynamics").field(c).finish(),
            Self::Diffusion(c) => f.debug_tuple("Diffusion").field(c).finish(),
            Self::Damping(c) => f.debug_tuple("Damping").field(c).finish(),
            Self::Forcing(c) => f.debug_tuple("Forcing").field(c).finish(),
            Self::Wrapped(c) => f.debug_tuple("Wrapped").field(c).finish(),
            Self::Custom(c) => f.debug_tuple("Custom").field(&c.name()).finish(),
        }
    }
}

impl From<Dynamics> for TendencyComponent {
    fn from(c: Dynamics) -> Self {
        Self::Dynamics(c)
    }
}

impl From<Diffusion> for TendencyComponent {
    fn from(c: Diffusion) -> Self {
        Self::Diffusion(c)
    }
}

impl From<Damping> for TendencyComponent {
    fn from(c: Damping) -> Self {
        Self::Damping(c)
    }
}

impl From<Forcing> for TendencyComponent {
    fn from(c: Forcing) -> Self {
        Self::Forcing(c)
    }
}

impl From<DiagnosticWrapper> for TendencyComponent {
    fn from(c: DiagnosticWrapper) -> Self {
        Self::Wrapped(c)
    }
}
