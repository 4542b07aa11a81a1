// crates/baro_physics/src/tendency/damping.rs

//! Rayleigh 阻尼
//!
//! ```text
//! ∂ζ/∂t = -(ζ - ζ_ref) / τ
//! ```
//! 线性形式对扰动取 ζ_ref = 0；非线性形式以状态的参考（基本态）涡度为 ζ_ref，
//! 没有参考态时取 0。τ 以天给出。

use baro_foundation::constants::SECONDS_PER_DAY;
use baro_foundation::error::{ModelError, ModelResult};
use baro_spectral::SpectralField;

use super::traits::{Diagnostics, Formulation, TendencyOutput, TendencySet, TendencyTerm, VORTICITY};
use crate::state::AtmosphericState;

/// 原驱动脚本的阻尼时间尺度 [天]
pub const DEFAULT_DAMPING_TIMESCALE_DAYS: f64 = 14.7;

/// 阻尼分量
#[derive(Debug, Clone)]
pub struct Damping {
    formulation: Formulation,
    tau_seconds: f64,
}

impl Damping {
    /// 以天为单位的时间尺度创建，`tau_days` 必须为正
    pub fn new(formulation: Formulation, tau_days: f64) -> ModelResult<Self> {
        if !(tau_days.is_finite() && tau_days > 0.0) {
            return Err(ModelError::configuration(format!(
                "阻尼时间尺度必须为正: {tau_days} 天"
            )));
        }
        Ok(Self {
            formulation,
            tau_seconds: tau_days * SECONDS_PER_DAY,
        })
    }

    /// 时间尺度 [s]
    pub fn timescale_seconds(&self) -> f64 {
        self.tau_seconds
    }
}

impl TendencyTerm for Damping {
    fn name(&self) -> &str {
        "damping"
    }

    fn evaluate(&self, state: &AtmosphericState) -> ModelResult<TendencyOutput> {
        self.formulation.check_state(self.name(), state)?;
        let rate = -1.0 / self.tau_seconds;
        let zeta = &state.flow.vorticity;

        let tendency = match (self.formulation, &state.base) {
            (Formulation::Nonlinear, Some(reference)) => {
                SpectralField::linear_combination(&[(rate, zeta), (-rate, &reference.vorticity)])?
            }
            _ => zeta.map_spectral(|_, c| c * rate)?,
        };
        Ok((TendencySet::single(VORTICITY, tendency), Diagnostics::new()))
    }
}
