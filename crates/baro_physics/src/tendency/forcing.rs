// crates/baro_physics/src/tendency/forcing.rs

//! 局地高斯涡度强迫
//!
//! 每个强迫源为 `A·exp(-(d/w)²)`，d 为到中心的大圆距离 [度]，w 为宽度 [度]，
//! 多个源线性叠加。强迫场在构造时按状态网格计算并做谱截断，此后每次求值原样返回。

use baro_foundation::error::{ModelError, ModelResult};
use baro_spectral::{SpectralField, SphericalGrid};
use ndarray::Array2;
use tracing::debug;

use super::traits::{Diagnostics, Formulation, TendencyOutput, TendencySet, TendencyTerm, VORTICITY};
use crate::state::AtmosphericState;

/// 高斯强迫源列表（三个列表等长）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForcingSpec {
    /// 中心位置 (纬度, 经度) [度]
    pub centerlocs: Vec<(f64, f64)>,
    /// 振幅 [1/s²]
    pub amplitudes: Vec<f64>,
    /// 宽度 [度]
    pub widths: Vec<f64>,
}

impl ForcingSpec {
    /// 单个强迫源
    pub fn single(center: (f64, f64), amplitude: f64, width: f64) -> Self {
        Self {
            centerlocs: vec![center],
            amplitudes: vec![amplitude],
            widths: vec![width],
        }
    }

    /// 强迫源个数
    pub fn len(&self) -> usize {
        self.centerlocs.len()
    }

    /// 是否没有强迫源
    pub fn is_empty(&self) -> bool {
        self.centerlocs.is_empty()
    }

    /// 检查列表等长、宽度为正
    pub fn validate(&self) -> ModelResult<()> {
        let n = self.centerlocs.len();
        if self.amplitudes.len() != n || self.widths.len() != n {
            return Err(ModelError::configuration(format!(
                "强迫参数长度不一致: centerlocs={}, amplitudes={}, widths={}",
                n,
                self.amplitudes.len(),
                self.widths.len()
            )));
        }
        if let Some(w) = self.widths.iter().find(|w| !(w.is_finite() && **w > 0.0)) {
            return Err(ModelError::configuration(format!("强迫宽度必须为正: {w}")));
        }
        if let Some(a) = self.amplitudes.iter().find(|a| !a.is_finite()) {
            return Err(ModelError::configuration(format!("强迫振幅非法: {a}")));
        }
        Ok(())
    }

    /// 在网格上求强迫场
    pub fn evaluate_on(&self, grid: &SphericalGrid) -> ModelResult<Array2<f64>> {
        self.validate()?;
        let lats = grid.latitudes();
        let lons = grid.longitudes();
        let mut field = Array2::zeros(grid.shape());
        for ((&(clat, clon), &amp), &width) in
            self.centerlocs.iter().zip(&self.amplitudes).zip(&self.widths)
        {
            for ((j, k), value) in field.indexed_iter_mut() {
                let d = SphericalGrid::great_circle_degrees(clat, clon, lats[j], lons[k]);
                *value += amp * (-(d / width).powi(2)).exp();
            }
        }
        Ok(field)
    }
}

/// 静态强迫分量
#[derive(Debug, Clone)]
pub struct Forcing {
    formulation: Formulation,
    spec: ForcingSpec,
    field: SpectralField,
}

impl Forcing {
    /// 在状态网格上预计算高斯强迫
    pub fn gaussian(
        state: &AtmosphericState,
        spec: ForcingSpec,
        formulation: Formulation,
    ) -> ModelResult<Self> {
        let transform = state.transform().clone();
        let raw = spec.evaluate_on(transform.grid())?;
        let field = SpectralField::truncated_from_grid(transform, raw)?;
        debug!(
            "强迫场初始化: {} 个源, T{}, 形式 {:?}",
            spec.len(),
            field.ntrunc(),
            formulation
        );
        Ok(Self {
            formulation,
            spec,
            field,
        })
    }

    /// 强迫参数
    pub fn spec(&self) -> &ForcingSpec {
        &self.spec
    }

    /// 截断后的强迫场
    pub fn field(&self) -> &SpectralField {
        &self.field
    }
}

impl TendencyTerm for Forcing {
    fn name(&self) -> &str {
        "forcing"
    }

    fn evaluate(&self, state: &AtmosphericState) -> ModelResult<TendencyOutput> {
        self.formulation.check_state(self.name(), state)?;
        if !self.field.is_compatible(&state.flow.vorticity) {
            return Err(ModelError::configuration(format!(
                "强迫场 T{} {:?} 与状态 T{} {:?} 不一致",
                self.field.ntrunc(),
                self.field.shape(),
                state.ntrunc(),
                state.shape()
            )));
        }
        Ok((
            TendencySet::single(VORTICITY, self.field.clone()),
            Diagnostics::new(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use baro_foundation::PhysicalConstants;
    use chrono::NaiveDate;

    fn rest_state(linearized: bool) -> AtmosphericState {
        windy_state(linearized, 0.0)
    }

    /// 扰动为固体旋转 u = U cosφ 的状态；U = 0 时即静止
    fn windy_state(linearized: bool, speed: f64) -> AtmosphericState {
        let grid = SphericalGrid::regular(37, 72).unwrap();
        let zero = Array2::zeros(grid.shape());
        let mut u = Array2::zeros(grid.shape());
        for (i, lat) in grid.latitudes().iter().enumerate() {
            u.row_mut(i).fill(speed * lat.to_radians().cos());
        }
        AtmosphericState::from_winds(
            grid.latitudes().to_vec(),
            grid.longitudes().to_vec(),
            &zero,
            &zero,
            &u,
            &zero,
            linearized,
            15,
            PhysicalConstants::earth(),
            NaiveDate::from_ymd_opt(2000, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_unequal_lists_rejected() {
        let spec = ForcingSpec {
            centerlocs: vec![(0.0, 0.0), (10.0, 10.0)],
            amplitudes: vec![1e-10],
            widths: vec![5.0, 5.0],
        };
        let err = Forcing::gaussian(&rest_state(false), spec, Formulation::Nonlinear).unwrap_err();
        assert!(matches!(err, ModelError::Configuration { .. }));
    }

    #[test]
    fn test_empty_spec_gives_zero_field() {
        let forcing = Forcing::gaussian(&rest_state(true), ForcingSpec::default(), Formulation::Linear).unwrap();
        assert!(forcing.field().spectral().unwrap().iter().all(|c| c.norm() == 0.0));
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let state = rest_state(false);
        let forcing = Forcing::gaussian(
            &state,
            ForcingSpec::single((35.0, 160.0), 4e-10, 7.0),
            Formulation::Nonlinear,
        )
        .unwrap();
        let (t1, _) = forcing.evaluate(&state).unwrap();
        let (t2, _) = forcing.evaluate(&state).unwrap();
        assert_eq!(
            t1.get(VORTICITY).unwrap().spectral().unwrap(),
            t2.get(VORTICITY).unwrap().spectral().unwrap()
        );
    }

    #[test]
    fn test_tendency_independent_of_state() {
        let forcing = Forcing::gaussian(
            &rest_state(false),
            ForcingSpec::single((35.0, 160.0), 4e-10, 7.0),
            Formulation::Nonlinear,
        )
        .unwrap();
        let moving = windy_state(false, 20.0);
        // 第二个状态确实带有非零涡度
        assert!(moving
            .flow
            .vorticity
            .spectral()
            .unwrap()
            .iter()
            .any(|c| c.norm() > 1e-8));

        let (at_rest, _) = forcing.evaluate(&rest_state(false)).unwrap();
        let (in_motion, _) = forcing.evaluate(&moving).unwrap();
        assert_eq!(
            at_rest.get(VORTICITY).unwrap().spectral().unwrap(),
            in_motion.get(VORTICITY).unwrap().spectral().unwrap()
        );
        assert_eq!(
            in_motion.get(VORTICITY).unwrap().spectral().unwrap(),
            forcing.field().spectral().unwrap()
        );
    }

    #[test]
    fn test_raw_field_peak_at_center() {
        let grid = SphericalGrid::regular(19, 36).unwrap();
        let spec = ForcingSpec::single((0.0, 0.0), 2.0, 10.0);
        let raw = spec.evaluate_on(&grid).unwrap();
        // 赤道为第 9 行，经度 0 为第 0 列
        assert!((raw[[9, 0]] - 2.0).abs() < 1e-12);
        assert!(raw[[0, 0]] < 1e-20);
    }

    #[test]
    fn test_bumps_superpose() {
        let grid = SphericalGrid::regular(19, 36).unwrap();
        let one = ForcingSpec::single((20.0, 40.0), 1.0, 8.0).evaluate_on(&grid).unwrap();
        let two = ForcingSpec {
            centerlocs: vec![(20.0, 40.0), (20.0, 40.0)],
            amplitudes: vec![1.0, -0.25],
            widths: vec![8.0, 8.0],
        }
        .evaluate_on(&grid)
        .unwrap();
        for (a, b) in one.iter().zip(two.iter()) {
            assert!((0.75 * a - b).abs() < 1e-14);
        }
    }
}
