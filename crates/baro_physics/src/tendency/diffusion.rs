// crates/baro_physics/src/tendency/diffusion.rs

//! 双调和超扩散
//!
//! 谱空间逐系数计算：
//! ```text
//! ∂ζ_n^m/∂t = -k (n(n+1)/a²)² ζ_n^m
//! ```
//! n = 0 的全球平均不受影响。线性形式扩散扰动，非线性形式扩散全场，
//! 两者都作用于状态的演化涡度。

use baro_foundation::error::{ModelError, ModelResult};
use baro_foundation::PhysicalConstants;
use baro_spectral::SphericalHarmonics;

use super::traits::{Diagnostics, Formulation, TendencyOutput, TendencySet, TendencyTerm, VORTICITY};
use crate::state::AtmosphericState;

/// 原驱动脚本使用的 T42 扩散系数 [m⁴/s]
pub const DEFAULT_DIFFUSION_COEFFICIENT: f64 = 2.338e16;

/// 超扩散分量
#[derive(Debug, Clone)]
pub struct Diffusion {
    formulation: Formulation,
    ntrunc: usize,
    k: f64,
    constants: PhysicalConstants,
}

impl Diffusion {
    /// 创建扩散分量，`k` 必须非负且有限
    pub fn new(
        formulation: Formulation,
        ntrunc: usize,
        k: f64,
        constants: PhysicalConstants,
    ) -> ModelResult<Self> {
        if !k.is_finite() || k < 0.0 {
            return Err(ModelError::configuration(format!("扩散系数非法: {k}")));
        }
        Ok(Self {
            formulation,
            ntrunc,
            k,
            constants,
        })
    }

    /// 扩散系数 [m⁴/s]
    pub fn coefficient(&self) -> f64 {
        self.k
    }

    /// 总波数 n 的衰减率 k (n(n+1)/a²)² [1/s]
    pub fn damping_rate(&self, n: usize) -> f64 {
        let a2 = self.constants.planetary_radius.powi(2);
        let eig = SphericalHarmonics::laplacian_eigenvalue(n) / a2;
        self.k * eig * eig
    }
}

impl TendencyTerm for Diffusion {
    fn name(&self) -> &str {
        "diffusion"
    }

    fn evaluate(&self, state: &AtmosphericState) -> ModelResult<TendencyOutput> {
        self.formulation.check_state(self.name(), state)?;
        ModelError::check_truncation("Diffusion", self.ntrunc, state.ntrunc())?;

        let tendency = state
            .flow
            .vorticity
            .map_spectral(|n, c| c * -self.damping_rate(n))?;
        Ok((TendencySet::single(VORTICITY, tendency), Diagnostics::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use baro_spectral::{Complex64, SpectralField, SphericalGrid};
    use chrono::NaiveDate;
    use ndarray::Array2;
    use std::sync::Arc;

    use crate::state::FlowFields;

    fn state_with_vorticity(coeffs: impl Fn(usize, usize) -> Complex64) -> AtmosphericState {
        let grid = SphericalGrid::regular(25, 48).unwrap();
        let sh = Arc::new(SphericalHarmonics::new(grid, 10).unwrap());
        let spec = sh.index().iter().map(|(m, n)| coeffs(m, n)).collect();
        let zeta = SpectralField::from_spectral(sh, spec).unwrap();
        let flow = FlowFields::from_vorticity(zeta, PhysicalConstants::earth().planetary_radius).unwrap();
        AtmosphericState::new(
            NaiveDate::from_ymd_opt(2000, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap(),
            flow,
            None,
            false,
            PhysicalConstants::earth(),
        )
        .unwrap()
    }

    #[test]
    fn test_global_mean_untouched() {
        let state = state_with_vorticity(|m, n| {
            if m == 0 {
                Complex64::new(1e-5 * (n + 1) as f64, 0.0)
            } else {
                Complex64::new(1e-6, 2e-6)
            }
        });
        let diffusion = Diffusion::new(Formulation::Nonlinear, 10, 1e16, PhysicalConstants::earth()).unwrap();
        let (tend, diags) = diffusion.evaluate(&state).unwrap();
        let spec = tend.get(VORTICITY).unwrap().spectral().unwrap();
        assert_eq!(spec[0], Complex64::new(0.0, 0.0));
        assert!(spec[1].re < 0.0);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_rate_scales_with_degree() {
        let diffusion = Diffusion::new(Formulation::Nonlinear, 10, 2.338e16, PhysicalConstants::earth()).unwrap();
        let a = PhysicalConstants::earth().planetary_radius;
        let expected = 2.338e16 * (42.0 * 43.0 / (a * a)).powi(2);
        assert!((diffusion.damping_rate(42) - expected).abs() / expected < 1e-12);
        assert_eq!(diffusion.damping_rate(0), 0.0);
    }

    #[test]
    fn test_rejects_negative_coefficient() {
        assert!(Diffusion::new(Formulation::Linear, 10, -1.0, PhysicalConstants::earth()).is_err());
    }

    #[test]
    fn test_zero_grid_state() {
        let state = state_with_vorticity(|_, _| Complex64::new(0.0, 0.0));
        let diffusion = Diffusion::new(Formulation::Nonlinear, 10, 1e16, PhysicalConstants::earth()).unwrap();
        let (tend, _) = diffusion.evaluate(&state).unwrap();
        let mut field = tend.get(VORTICITY).unwrap().clone();
        field.transform_to_grid().unwrap();
        assert_eq!(field.grid().unwrap(), &Array2::<f64>::zeros(state.shape()));
    }
}
