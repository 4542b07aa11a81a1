// crates/baro_physics/src/builder.rs

//! 模式构建器
//!
//! 按固定顺序组装分量：动力学、扩散、强迫、阻尼，每个分量用同名标签包装，
//! 诊断量因此带上过程前缀（如 `dynamics_absolute_vorticity`）。
//!
//! # 示例
//!
//! ```ignore
//! use baro_physics::{ModelBuilder, Formulation, ForcingSpec};
//!
//! let stepper = ModelBuilder::new(Formulation::Linear, 42, constants)
//!     .with_diffusion(2.338e16)
//!     .with_forcing(ForcingSpec::single((35.0, 160.0), 4e-10, 7.0))
//!     .with_damping(14.7)
//!     .build(&state)?;
//! ```

use baro_foundation::error::{ModelError, ModelResult};
use baro_foundation::PhysicalConstants;
use tracing::info;

use crate::engine::{LeapfrogStepper, DEFAULT_ROBERT_COEFFICIENT};
use crate::state::AtmosphericState;
use crate::tendency::{
    Damping, DiagnosticWrapper, Diffusion, Dynamics, Forcing, ForcingSpec, Formulation,
    TendencyComponent, TendencyTerm,
};

/// 模式构建器
#[derive(Debug, Clone)]
pub struct ModelBuilder {
    formulation: Formulation,
    ntrunc: usize,
    constants: PhysicalConstants,
    dynamics: bool,
    diffusion: Option<f64>,
    forcing: Option<ForcingSpec>,
    damping: Option<f64>,
    robert_coefficient: f64,
    parallel: bool,
    tendency_diagnostics: bool,
}

impl ModelBuilder {
    /// 创建构建器（默认只含动力学）
    pub fn new(formulation: Formulation, ntrunc: usize, constants: PhysicalConstants) -> Self {
        Self {
            formulation,
            ntrunc,
            constants,
            dynamics: true,
            diffusion: None,
            forcing: None,
            damping: None,
            robert_coefficient: DEFAULT_ROBERT_COEFFICIENT,
            parallel: false,
            tendency_diagnostics: false,
        }
    }

    /// 启用/禁用动力学
    pub fn with_dynamics(mut self, enabled: bool) -> Self {
        self.dynamics = enabled;
        self
    }

    /// 启用超扩散，系数 `k` [m⁴/s]
    pub fn with_diffusion(mut self, k: f64) -> Self {
        self.diffusion = Some(k);
        self
    }

    /// 启用高斯强迫
    pub fn with_forcing(mut self, spec: ForcingSpec) -> Self {
        self.forcing = Some(spec);
        self
    }

    /// 启用阻尼，时间尺度 [天]
    pub fn with_damping(mut self, tau_days: f64) -> Self {
        self.damping = Some(tau_days);
        self
    }

    /// Robert–Asselin 系数
    pub fn with_robert_coefficient(mut self, nu: f64) -> Self {
        self.robert_coefficient = nu;
        self
    }

    /// 并行求值分量
    pub fn with_parallel_evaluation(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// 各过程倾向作为诊断量输出
    pub fn with_tendency_diagnostics(mut self, enabled: bool) -> Self {
        self.tendency_diagnostics = enabled;
        self
    }

    /// 针对初始状态组装步进器
    ///
    /// 截断阶数或线性化标志与状态不一致时返回配置错误。
    pub fn build(&self, state: &AtmosphericState) -> ModelResult<LeapfrogStepper> {
        ModelError::check_truncation("模式", self.ntrunc, state.ntrunc())?;
        self.formulation.check_state("模式", state)?;

        let mut components: Vec<TendencyComponent> = Vec::new();
        if self.dynamics {
            components.push(Dynamics::new(self.formulation, self.ntrunc, self.constants).into());
        }
        if let Some(k) = self.diffusion {
            components.push(Diffusion::new(self.formulation, self.ntrunc, k, self.constants)?.into());
        }
        if let Some(spec) = &self.forcing {
            components.push(Forcing::gaussian(state, spec.clone(), self.formulation)?.into());
        }
        if let Some(tau) = self.damping {
            components.push(Damping::new(self.formulation, tau)?.into());
        }

        let components: Vec<TendencyComponent> = components
            .into_iter()
            .map(|c| {
                let label = c.name().to_string();
                let wrapper = DiagnosticWrapper::new(c, label);
                if self.tendency_diagnostics {
                    wrapper.with_tendency_diagnostics().into()
                } else {
                    wrapper.into()
                }
            })
            .collect();

        let stepper = LeapfrogStepper::new(components)
            .with_robert_coefficient(self.robert_coefficient)?
            .with_parallel_evaluation(self.parallel);

        info!(
            "模式组装完成: {:?}, T{}, 分量 [{}], ν = {}",
            self.formulation,
            self.ntrunc,
            stepper.component_names().join(", "),
            stepper.robert_coefficient()
        );
        Ok(stepper)
    }
}
