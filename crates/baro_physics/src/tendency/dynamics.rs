// crates/baro_physics/src/tendency/dynamics.rs

//! 绝对涡度平流
//!
//! # 算法
//!
//! 非线性：
//! ```text
//! ∂ζ/∂t = -(u ∂q/∂x + v ∂q/∂y),  q = ζ + f
//! ```
//!
//! 线性（基本态固定，不含扰动自平流）：
//! ```text
//! ∂ζ'/∂t = -(ū ∂ζ'/∂x + v̄ ∂ζ'/∂y) - (u' ∂(ζ̄+f)/∂x + v' ∂(ζ̄+f)/∂y)
//! ```
//!
//! 梯度在谱空间求出，平流乘积在格点上形成，再正变换回谱空间完成截断。
//! ∂f/∂y = 2Ω cosφ / a 解析给出。

use baro_foundation::error::{ModelError, ModelResult};
use baro_foundation::PhysicalConstants;
use baro_spectral::SpectralField;
use ndarray::{Array2, Zip};

use super::traits::{Diagnostics, Formulation, TendencyOutput, TendencySet, TendencyTerm, VORTICITY};
use crate::state::{AtmosphericState, FlowFields};

/// 平流动力学分量
#[derive(Debug, Clone)]
pub struct Dynamics {
    formulation: Formulation,
    ntrunc: usize,
    constants: PhysicalConstants,
}

impl Dynamics {
    /// 创建动力学分量
    pub fn new(formulation: Formulation, ntrunc: usize, constants: PhysicalConstants) -> Self {
        Self {
            formulation,
            ntrunc,
            constants,
        }
    }

    /// 形式
    pub fn formulation(&self) -> Formulation {
        self.formulation
    }

    /// 截断阶数
    pub fn ntrunc(&self) -> usize {
        self.ntrunc
    }

    /// 场的物理梯度 (∂/∂x, ∂/∂y)
    fn physical_gradient(&self, field: &SpectralField) -> ModelResult<(Array2<f64>, Array2<f64>)> {
        let inv_a = 1.0 / self.constants.planetary_radius;
        let (gx, gy) = field.gradient()?;
        Ok((gx * inv_a, gy * inv_a))
    }

    /// ∂f/∂y = 2Ω cosφ / a
    fn beta(&self, state: &AtmosphericState) -> Array2<f64> {
        let grid = state.transform().grid();
        let cos_lat = grid.cos_lat();
        let factor = 2.0 * self.constants.planetary_rotation_rate / self.constants.planetary_radius;
        Array2::from_shape_fn(grid.shape(), |(j, _)| factor * cos_lat[j])
    }

    /// -(u ∂q/∂x + v ∂q/∂y)
    fn advect(
        u: &Array2<f64>,
        v: &Array2<f64>,
        dqdx: &Array2<f64>,
        dqdy: &Array2<f64>,
    ) -> Array2<f64> {
        let mut out = Array2::zeros(u.dim());
        Zip::from(&mut out)
            .and(u)
            .and(v)
            .and(dqdx)
            .and(dqdy)
            .for_each(|o, &u, &v, &qx, &qy| *o = -(u * qx + v * qy));
        out
    }

    fn nonlinear(&self, state: &AtmosphericState) -> ModelResult<(Array2<f64>, Array2<f64>)> {
        let flow = &state.flow;
        let (dzdx, dzdy) = self.physical_gradient(&flow.vorticity)?;
        let dqdy = dzdy + &self.beta(state);
        let tendency = Self::advect(flow.u_wind.grid()?, flow.v_wind.grid()?, &dzdx, &dqdy);
        let absolute = flow.vorticity.grid()? + &state.coriolis_parameter();
        Ok((tendency, absolute))
    }

    fn linear(&self, state: &AtmosphericState) -> ModelResult<(Array2<f64>, Array2<f64>)> {
        let prime = &state.flow;
        let bar: &FlowFields = state
            .base
            .as_ref()
            .ok_or_else(|| ModelError::configuration("线性动力学需要基本态"))?;

        let (dzpdx, dzpdy) = self.physical_gradient(&prime.vorticity)?;
        let (dzbdx, dzbdy) = self.physical_gradient(&bar.vorticity)?;
        let dqbdy = dzbdy + &self.beta(state);

        let base_on_prime = Self::advect(bar.u_wind.grid()?, bar.v_wind.grid()?, &dzpdx, &dzpdy);
        let prime_on_base = Self::advect(prime.u_wind.grid()?, prime.v_wind.grid()?, &dzbdx, &dqbdy);
        let tendency = base_on_prime + &prime_on_base;

        let absolute = bar.vorticity.grid()? + prime.vorticity.grid()? + &state.coriolis_parameter();
        Ok((tendency, absolute))
    }
}

impl TendencyTerm for Dynamics {
    fn name(&self) -> &str {
        "dynamics"
    }

    fn evaluate(&self, state: &AtmosphericState) -> ModelResult<TendencyOutput> {
        self.formulation.check_state(self.name(), state)?;
        ModelError::check_truncation("Dynamics", self.ntrunc, state.ntrunc())?;

        let (tendency, absolute) = match self.formulation {
            Formulation::Linear => self.linear(state)?,
            Formulation::Nonlinear => self.nonlinear(state)?,
        };

        let transform = state.transform().clone();
        let coeffs = transform.analyze(&tendency)?;
        let tendency = SpectralField::from_spectral(transform, coeffs)?;

        let mut diagnostics = Diagnostics::new();
        diagnostics.insert("absolute_vorticity".to_string(), absolute);
        Ok((TendencySet::single(VORTICITY, tendency), diagnostics))
    }
}
