// crates/baro_physics/src/state.rs

//! 大气状态
//!
//! 演化量为相对涡度，流函数与风场由平衡关系从涡度导出：
//!
//! ```text
//! ψ = ∇⁻²ζ,   u = -(1/a) ∂ψ/∂φ,   v = (1/(a cosφ)) ∂ψ/∂λ
//! ```
//!
//! 线性化状态演化扰动场（`*_prime`），并携带固定的基本态（`*_bar`）；
//! 非线性状态演化全场，若由基本态+扰动构造则保留基本态作为阻尼参考。

use std::sync::Arc;

use baro_foundation::error::{ModelError, ModelResult};
use baro_foundation::PhysicalConstants;
use baro_spectral::{Complex64, SpectralField, SphericalGrid, SphericalHarmonics};
use chrono::{Duration, NaiveDateTime};
use ndarray::Array2;

use crate::tendency::Diagnostics;

/// 演化场的基名，输出顺序固定
pub const FLOW_NAMES: [&str; 4] = ["vorticity", "streamfunction", "u_wind", "v_wind"];

/// 演化场的固定结构
#[derive(Debug, Clone)]
pub struct FlowFields {
    /// 相对涡度 [1/s]（格点与谱同步）
    pub vorticity: SpectralField,
    /// 流函数 [m²/s]（格点与谱同步）
    pub streamfunction: SpectralField,
    /// 纬向风 [m/s]（仅格点）
    pub u_wind: SpectralField,
    /// 经向风 [m/s]（仅格点）
    pub v_wind: SpectralField,
}

impl FlowFields {
    /// 由涡度按平衡关系求流函数与风场
    pub fn from_vorticity(mut vorticity: SpectralField, radius: f64) -> ModelResult<Self> {
        vorticity.synchronize()?;
        let transform = vorticity.transform().clone();
        let a2 = radius * radius;

        let mut streamfunction = vorticity.map_spectral(|n, c| {
            if n == 0 {
                Complex64::new(0.0, 0.0)
            } else {
                c * (-a2 / (n * (n + 1)) as f64)
            }
        })?;
        streamfunction.transform_to_grid()?;

        let (gx, gy) = streamfunction.gradient()?;
        let u = gy.mapv(|g| -g / radius);
        let v = gx.mapv(|g| g / radius);

        Ok(Self {
            vorticity,
            streamfunction,
            u_wind: SpectralField::from_grid(transform.clone(), u)?,
            v_wind: SpectralField::from_grid(transform, v)?,
        })
    }

    /// 由格点风场求涡度，再按平衡关系重建其余场（风场被替换为截断后的无辐散风）
    pub fn from_winds(
        transform: Arc<SphericalHarmonics>,
        u: &Array2<f64>,
        v: &Array2<f64>,
        radius: f64,
    ) -> ModelResult<Self> {
        let coeffs = transform.vorticity_from_winds(u, v)?.mapv(|c| c / radius);
        let vorticity = SpectralField::from_spectral(transform, coeffs)?;
        Self::from_vorticity(vorticity, radius)
    }

    /// 静止流场
    pub fn at_rest(transform: Arc<SphericalHarmonics>, radius: f64) -> ModelResult<Self> {
        Self::from_vorticity(SpectralField::zeros(transform), radius)
    }

    /// 两组场逐点相加后重新平衡（用于基本态 + 扰动）
    pub fn superpose(&self, other: &FlowFields, radius: f64) -> ModelResult<Self> {
        let total = SpectralField::linear_combination(&[
            (1.0, &self.vorticity),
            (1.0, &other.vorticity),
        ])?;
        Self::from_vorticity(total, radius)
    }

    /// 与 [`FLOW_NAMES`] 同序的场
    fn fields(&self) -> [&SpectralField; 4] {
        [
            &self.vorticity,
            &self.streamfunction,
            &self.u_wind,
            &self.v_wind,
        ]
    }
}

/// 某一时间层的大气状态
#[derive(Debug, Clone)]
pub struct AtmosphericState {
    /// 模式时间
    pub time: NaiveDateTime,
    /// 演化场（线性化时为扰动）
    pub flow: FlowFields,
    /// 基本态 / 参考态
    pub base: Option<FlowFields>,
    /// 本步合并进来的诊断量
    pub diagnostics: Diagnostics,
    linearized: bool,
    constants: PhysicalConstants,
}

impl AtmosphericState {
    /// 由已平衡的场构造状态
    ///
    /// 线性化状态必须带基本态；所有场必须共享形状与截断阶数。
    pub fn new(
        time: NaiveDateTime,
        flow: FlowFields,
        base: Option<FlowFields>,
        linearized: bool,
        constants: PhysicalConstants,
    ) -> ModelResult<Self> {
        constants.validate()?;
        if linearized && base.is_none() {
            return Err(ModelError::configuration("线性化状态需要基本态"));
        }
        if let Some(base) = &base {
            if !base.vorticity.is_compatible(&flow.vorticity) {
                return Err(ModelError::configuration(format!(
                    "基本态 T{} 与演化场 T{} 不一致",
                    base.vorticity.ntrunc(),
                    flow.vorticity.ntrunc()
                )));
            }
        }
        Ok(Self {
            time,
            flow,
            base,
            diagnostics: Diagnostics::new(),
            linearized,
            constants,
        })
    }

    /// 由基本态与扰动风场构造初始状态
    ///
    /// 线性化时演化扰动、保留基本态；否则演化两者之和，基本态作为参考态保留。
    #[allow(clippy::too_many_arguments)]
    pub fn from_winds(
        latitudes: Vec<f64>,
        longitudes: Vec<f64>,
        u_bar: &Array2<f64>,
        v_bar: &Array2<f64>,
        u_prime: &Array2<f64>,
        v_prime: &Array2<f64>,
        linearized: bool,
        ntrunc: usize,
        constants: PhysicalConstants,
        time: NaiveDateTime,
    ) -> ModelResult<Self> {
        let grid = SphericalGrid::new(latitudes, longitudes)?;
        let transform = Arc::new(SphericalHarmonics::new(grid, ntrunc)?);
        let radius = constants.planetary_radius;

        let bar = FlowFields::from_winds(transform.clone(), u_bar, v_bar, radius)?;
        let prime = FlowFields::from_winds(transform, u_prime, v_prime, radius)?;

        if linearized {
            Self::new(time, prime, Some(bar), true, constants)
        } else {
            let total = bar.superpose(&prime, radius)?;
            Self::new(time, total, Some(bar), false, constants)
        }
    }

    // ========================================================================
    // 访问器
    // ========================================================================

    /// 是否线性化
    pub fn is_linearized(&self) -> bool {
        self.linearized
    }

    /// 物理常数
    pub fn constants(&self) -> &PhysicalConstants {
        &self.constants
    }

    /// 所用球谐变换
    pub fn transform(&self) -> &Arc<SphericalHarmonics> {
        self.flow.vorticity.transform()
    }

    /// 截断阶数
    pub fn ntrunc(&self) -> usize {
        self.flow.vorticity.ntrunc()
    }

    /// 网格形状 (nlat, nlon)
    pub fn shape(&self) -> (usize, usize) {
        self.flow.vorticity.shape()
    }

    /// 纬度 [度]
    pub fn latitudes(&self) -> &[f64] {
        self.transform().grid().latitudes()
    }

    /// 经度 [度]
    pub fn longitudes(&self) -> &[f64] {
        self.transform().grid().longitudes()
    }

    /// 科氏参数 f = 2Ω sinφ
    pub fn coriolis_parameter(&self) -> Array2<f64> {
        let grid = self.transform().grid();
        let sin_lat = grid.sin_lat();
        let two_omega = 2.0 * self.constants.planetary_rotation_rate;
        Array2::from_shape_fn(grid.shape(), |(j, _)| two_omega * sin_lat[j])
    }

    // ========================================================================
    // 诊断合并与输出
    // ========================================================================

    /// 返回合并了诊断量的新状态（原状态不变）
    ///
    /// 诊断名与已有诊断或状态场同名时返回名称冲突错误。
    pub fn with_diagnostics(&self, diagnostics: Diagnostics) -> ModelResult<Self> {
        let field_names = self.field_names();
        let mut merged = self.diagnostics.clone();
        for (name, values) in diagnostics {
            if field_names.iter().any(|f| *f == name) {
                return Err(ModelError::name_collision(name, "state", "diagnostics"));
            }
            ModelError::check_shape(&name, self.shape(), values.dim())?;
            if merged.contains(&name) {
                return Err(ModelError::name_collision(name, "state", "diagnostics"));
            }
            merged.insert(name, values);
        }
        Ok(Self {
            diagnostics: merged,
            ..self.clone()
        })
    }

    /// 输出用的场名（不含诊断）
    pub fn field_names(&self) -> Vec<String> {
        if !self.linearized {
            return FLOW_NAMES.iter().map(|n| n.to_string()).collect();
        }
        let mut names: Vec<String> = FLOW_NAMES.iter().map(|n| format!("{n}_prime")).collect();
        if self.base.is_some() {
            names.extend(FLOW_NAMES.iter().map(|n| format!("{n}_bar")));
        }
        names
    }

    /// 所有命名格点场（状态场在前，诊断量按名称排序在后）
    pub fn named_fields(&self) -> ModelResult<Vec<(String, Array2<f64>)>> {
        let names = self.field_names();
        let mut sources: Vec<&SpectralField> = self.flow.fields().to_vec();
        if self.linearized {
            if let Some(base) = &self.base {
                sources.extend(base.fields());
            }
        }

        let mut out = Vec::with_capacity(names.len() + self.diagnostics.len());
        for (name, field) in names.into_iter().zip(sources) {
            out.push((name, field.grid()?.clone()));
        }
        for (name, values) in self.diagnostics.iter() {
            out.push((name.clone(), values.clone()));
        }
        Ok(out)
    }
}

/// 尚未打上时间戳的新状态
///
/// 步进器不推进时间，由调用方决定新状态的时间。
#[derive(Debug, Clone)]
pub struct PendingState {
    flow: FlowFields,
    base: Option<FlowFields>,
    linearized: bool,
    constants: PhysicalConstants,
    source_time: NaiveDateTime,
}

impl PendingState {
    pub(crate) fn new(source: &AtmosphericState, flow: FlowFields) -> Self {
        Self {
            flow,
            base: source.base.clone(),
            linearized: source.linearized,
            constants: source.constants,
            source_time: source.time,
        }
    }

    /// 新的演化场
    pub fn flow(&self) -> &FlowFields {
        &self.flow
    }

    /// 产生该状态的上一时间层时间
    pub fn source_time(&self) -> NaiveDateTime {
        self.source_time
    }

    /// 以给定时间完成状态；时间不得早于来源状态
    pub fn stamp(self, time: NaiveDateTime) -> ModelResult<AtmosphericState> {
        if time < self.source_time {
            return Err(ModelError::configuration(format!(
                "时间倒退: {} 早于 {}",
                time, self.source_time
            )));
        }
        AtmosphericState::new(time, self.flow, self.base, self.linearized, self.constants)
    }

    /// 以来源时间 + dt 完成状态
    pub fn advance(self, dt: Duration) -> ModelResult<AtmosphericState> {
        let time = self
            .source_time
            .checked_add_signed(dt)
            .ok_or_else(|| ModelError::configuration(format!("时间溢出: {} + {}", self.source_time, dt)))?;
        self.stamp(time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2000, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn solid_body(nlat: usize, nlon: usize, speed: f64) -> (Vec<f64>, Vec<f64>, Array2<f64>) {
        let grid = SphericalGrid::regular(nlat, nlon).unwrap();
        let u = Array2::from_shape_fn((nlat, nlon), |(j, _)| {
            speed * grid.latitudes()[j].to_radians().cos()
        });
        (grid.latitudes().to_vec(), grid.longitudes().to_vec(), u)
    }

    #[test]
    fn test_solid_body_state_is_balanced() {
        let (lats, lons, u) = solid_body(37, 72, 15.0);
        let zero = Array2::zeros(u.dim());
        let state = AtmosphericState::from_winds(
            lats,
            lons,
            &zero,
            &zero,
            &u,
            &zero,
            false,
            15,
            PhysicalConstants::earth(),
            start(),
        )
        .unwrap();

        let a = PhysicalConstants::earth().planetary_radius;
        let grid = state.transform().grid().clone();
        let zeta = state.flow.vorticity.grid().unwrap();
        let u_back = state.flow.u_wind.grid().unwrap();
        for j in 0..grid.nlat() {
            let phi = grid.latitudes()[j].to_radians();
            assert!((zeta[[j, 0]] - 2.0 * 15.0 * phi.sin() / a).abs() < 1e-15);
            assert!((u_back[[j, 5]] - 15.0 * phi.cos()).abs() < 1e-9);
        }
        assert!(state.flow.v_wind.grid().unwrap().iter().all(|v| v.abs() < 1e-9));
    }

    #[test]
    fn test_linearized_requires_base() {
        let (lats, lons, u) = solid_body(19, 36, 10.0);
        let grid = SphericalGrid::new(lats, lons).unwrap();
        let sh = Arc::new(SphericalHarmonics::new(grid, 8).unwrap());
        let flow = FlowFields::from_winds(sh, &u, &Array2::zeros(u.dim()), 6.4e6).unwrap();
        let result = AtmosphericState::new(start(), flow, None, true, PhysicalConstants::earth());
        assert!(matches!(result, Err(ModelError::Configuration { .. })));
    }

    #[test]
    fn test_field_names_follow_formulation() {
        let (lats, lons, u) = solid_body(19, 36, 10.0);
        let zero = Array2::zeros(u.dim());
        let linear = AtmosphericState::from_winds(
            lats.clone(), lons.clone(), &u, &zero, &zero, &zero, true, 8,
            PhysicalConstants::earth(), start(),
        )
        .unwrap();
        let names = linear.field_names();
        assert!(names.contains(&"vorticity_prime".to_string()));
        assert!(names.contains(&"u_wind_bar".to_string()));
        assert_eq!(names.len(), 8);

        let nonlinear = AtmosphericState::from_winds(
            lats, lons, &u, &zero, &zero, &zero, false, 8,
            PhysicalConstants::earth(), start(),
        )
        .unwrap();
        assert_eq!(
            nonlinear.field_names(),
            vec!["vorticity", "streamfunction", "u_wind", "v_wind"]
        );
        assert_eq!(nonlinear.named_fields().unwrap().len(), 4);
    }

    #[test]
    fn test_with_diagnostics_is_copy_on_merge() {
        let (lats, lons, u) = solid_body(19, 36, 10.0);
        let zero = Array2::zeros(u.dim());
        let state = AtmosphericState::from_winds(
            lats, lons, &zero, &zero, &u, &zero, false, 8,
            PhysicalConstants::earth(), start(),
        )
        .unwrap();

        let mut diags = Diagnostics::new();
        diags.insert("dynamics_absolute_vorticity".to_string(), Array2::zeros(u.dim()));
        let merged = state.with_diagnostics(diags.clone()).unwrap();
        assert!(state.diagnostics.is_empty());
        assert_eq!(merged.diagnostics.len(), 1);
        assert_eq!(merged.named_fields().unwrap().len(), 5);

        assert!(matches!(
            merged.with_diagnostics(diags),
            Err(ModelError::NameCollision { .. })
        ));

        let mut clash = Diagnostics::new();
        clash.insert("vorticity".to_string(), Array2::zeros(u.dim()));
        assert!(state.with_diagnostics(clash).is_err());
    }

    #[test]
    fn test_pending_state_rejects_backwards_time() {
        let (lats, lons, u) = solid_body(19, 36, 10.0);
        let zero = Array2::zeros(u.dim());
        let state = AtmosphericState::from_winds(
            lats, lons, &zero, &zero, &u, &zero, false, 8,
            PhysicalConstants::earth(), start(),
        )
        .unwrap();
        let pending = PendingState::new(&state, state.flow.clone());
        assert!(pending.clone().stamp(start() - Duration::minutes(1)).is_err());
        let next = pending.advance(Duration::minutes(15)).unwrap();
        assert_eq!(next.time, start() + Duration::minutes(15));
        assert!(next.diagnostics.is_empty());
    }
}
