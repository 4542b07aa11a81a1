// crates/baro_io/src/initial.rs

//! 初始条件
//!
//! 提供基本态与扰动风场，交由 [`AtmosphericState::from_winds`] 做平衡与截断。
//! 扰动风场一律从零开始。

use baro_foundation::PhysicalConstants;
use baro_physics::AtmosphericState;
use baro_spectral::SphericalGrid;
use chrono::NaiveDateTime;
use ndarray::Array2;
use std::path::Path;
use tracing::info;

use crate::error::{IoError, IoResult};

/// 基本态变量名：纬度
pub const LATITUDE_VAR: &str = "latitude";
/// 基本态变量名：经度
pub const LONGITUDE_VAR: &str = "longitude";
/// 基本态变量名：200 hPa 纬向风
pub const U_WIND_VAR: &str = "U200";
/// 基本态变量名：200 hPa 经向风
pub const V_WIND_VAR: &str = "V200";

/// 初始风场
#[derive(Debug, Clone)]
pub struct InitialConditions {
    /// 纬度 [度]
    pub latitudes: Vec<f64>,
    /// 经度 [度]
    pub longitudes: Vec<f64>,
    /// 基本态纬向风 [m/s]
    pub u_bar: Array2<f64>,
    /// 基本态经向风 [m/s]
    pub v_bar: Array2<f64>,
    /// 扰动纬向风 [m/s]
    pub u_prime: Array2<f64>,
    /// 扰动经向风 [m/s]
    pub v_prime: Array2<f64>,
}

impl InitialConditions {
    /// 由基本态风场构造，扰动为零
    pub fn from_base_winds(
        latitudes: Vec<f64>,
        longitudes: Vec<f64>,
        u_bar: Array2<f64>,
        v_bar: Array2<f64>,
    ) -> IoResult<Self> {
        let shape = (latitudes.len(), longitudes.len());
        for (name, values) in [(U_WIND_VAR, &u_bar), (V_WIND_VAR, &v_bar)] {
            if values.dim() != shape {
                return Err(IoError::ShapeMismatch {
                    variable: name.to_string(),
                    expected: vec![shape.0, shape.1],
                    actual: values.shape().to_vec(),
                });
            }
        }
        Ok(Self {
            latitudes,
            longitudes,
            u_bar,
            v_bar,
            u_prime: Array2::zeros(shape),
            v_prime: Array2::zeros(shape),
        })
    }

    /// 规则网格上的静止大气
    pub fn at_rest(nlat: usize, nlon: usize) -> IoResult<Self> {
        Self::solid_body(nlat, nlon, 0.0)
    }

    /// 规则网格上的固体旋转基本态 u = U cosφ, v = 0
    pub fn solid_body(nlat: usize, nlon: usize, speed: f64) -> IoResult<Self> {
        let grid = SphericalGrid::regular(nlat, nlon)?;
        let cos_lat = grid.cos_lat();
        let u_bar = Array2::from_shape_fn(grid.shape(), |(j, _)| speed * cos_lat[j]);
        let v_bar = Array2::zeros(grid.shape());
        Self::from_base_winds(
            grid.latitudes().to_vec(),
            grid.longitudes().to_vec(),
            u_bar,
            v_bar,
        )
    }

    /// 从 NetCDF 文件读取基本态（变量 latitude, longitude, U200, V200）
    #[cfg(feature = "netcdf")]
    pub fn from_netcdf(path: impl AsRef<Path>) -> IoResult<Self> {
        let path = path.as_ref();
        let file = netcdf::open(path).map_err(|e| IoError::NetCdf(format!("{}: {e}", path.display())))?;
        let display = path.display().to_string();

        let read = |name: &str| -> IoResult<(Vec<f64>, Vec<usize>)> {
            let var = file.variable(name).ok_or_else(|| IoError::MissingVariable {
                file: display.clone(),
                variable: name.to_string(),
            })?;
            let dims: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
            let data: Vec<f64> = var.values::<f64, _>(..)?;
            Ok((data, dims))
        };

        let (latitudes, _) = read(LATITUDE_VAR)?;
        let (longitudes, _) = read(LONGITUDE_VAR)?;
        let shape = (latitudes.len(), longitudes.len());

        let to_grid = |name: &str| -> IoResult<Array2<f64>> {
            let (data, dims) = read(name)?;
            // 允许前置长度为 1 的时间维
            let squeezed: Vec<usize> = dims.iter().copied().filter(|&d| d != 1).collect();
            if squeezed != [shape.0, shape.1] || data.len() != shape.0 * shape.1 {
                return Err(IoError::ShapeMismatch {
                    variable: name.to_string(),
                    expected: vec![shape.0, shape.1],
                    actual: dims,
                });
            }
            Array2::from_shape_vec(shape, data).map_err(|e| IoError::NetCdf(e.to_string()))
        };

        let u_bar = to_grid(U_WIND_VAR)?;
        let v_bar = to_grid(V_WIND_VAR)?;
        info!("读取初始场: {} ({}x{})", display, shape.0, shape.1);
        Self::from_base_winds(latitudes, longitudes, u_bar, v_bar)
    }

    /// 未启用 `netcdf` 特性时不可用
    #[cfg(not(feature = "netcdf"))]
    pub fn from_netcdf(_path: impl AsRef<Path>) -> IoResult<Self> {
        Err(IoError::FeatureDisabled("netcdf"))
    }

    /// 网格形状 (nlat, nlon)
    pub fn shape(&self) -> (usize, usize) {
        (self.latitudes.len(), self.longitudes.len())
    }

    /// 构造模式初始状态
    pub fn into_state(
        self,
        linearized: bool,
        ntrunc: usize,
        constants: PhysicalConstants,
        time: NaiveDateTime,
    ) -> IoResult<AtmosphericState> {
        let state = AtmosphericState::from_winds(
            self.latitudes,
            self.longitudes,
            &self.u_bar,
            &self.v_bar,
            &self.u_prime,
            &self.v_prime,
            linearized,
            ntrunc,
            constants,
            time,
        )?;
        Ok(state)
    }
}
