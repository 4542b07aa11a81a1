// crates/baro_spectral/src/grid.rs

//! 经纬网格几何
//!
//! 支持两类网格：
//! - 规则网格：纬度等间距且包含两极（如 2.5° 的 73×144 再分析网格）
//! - 高斯网格：纬度为 Gauss–Legendre 节点
//!
//! 经度必须等间距并覆盖 360°，起始经度任意。纬度可南北任一方向排列。

use baro_foundation::error::{ModelError, ModelResult};
use ndarray::Array2;
use std::f64::consts::PI;

use crate::quadrature::{clenshaw_curtis_weights, gauss_legendre};

/// 坐标匹配容差 [度]
const COORD_TOLERANCE_DEG: f64 = 1e-4;

/// 网格类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridKind {
    /// 等间距纬度，含两极
    Regular,
    /// 高斯纬度
    Gaussian,
}

/// 球面经纬网格
#[derive(Debug, Clone)]
pub struct SphericalGrid {
    kind: GridKind,
    /// 纬度 [度]
    latitudes: Vec<f64>,
    /// 经度 [度]
    longitudes: Vec<f64>,
    /// sin(φ)
    sin_lat: Vec<f64>,
    /// cos(φ)，极点处严格为 0
    cos_lat: Vec<f64>,
    /// 经向求积权重（对 x = sinφ，和为 2）
    weights: Vec<f64>,
}

impl SphericalGrid {
    /// 由给定坐标构造网格，自动识别网格类型
    pub fn new(latitudes: Vec<f64>, longitudes: Vec<f64>) -> ModelResult<Self> {
        let nlat = latitudes.len();
        if nlat < 2 {
            return Err(ModelError::transform(format!("纬度点数过少: {nlat}")));
        }
        check_longitudes(&longitudes)?;

        let (kind, weights) = if let Some(w) = regular_weights(&latitudes) {
            (GridKind::Regular, w)
        } else if let Some(w) = gaussian_weights(&latitudes) {
            (GridKind::Gaussian, w)
        } else {
            return Err(ModelError::transform(
                "纬度既不是含极点的等间距网格，也不是高斯网格",
            ));
        };

        let (sin_lat, cos_lat) = latitudes
            .iter()
            .map(|&lat| {
                if (lat.abs() - 90.0).abs() < COORD_TOLERANCE_DEG {
                    (lat.signum(), 0.0)
                } else {
                    let r = lat.to_radians();
                    (r.sin(), r.cos())
                }
            })
            .unzip();

        Ok(Self {
            kind,
            latitudes,
            longitudes,
            sin_lat,
            cos_lat,
            weights,
        })
    }

    /// 规则网格：纬度由 90° 到 -90°，经度由 0° 开始
    pub fn regular(nlat: usize, nlon: usize) -> ModelResult<Self> {
        if nlat < 2 {
            return Err(ModelError::transform(format!("纬度点数过少: {nlat}")));
        }
        let dlat = 180.0 / (nlat - 1) as f64;
        let lats = (0..nlat).map(|j| 90.0 - j as f64 * dlat).collect();
        Self::new(lats, uniform_longitudes(nlon))
    }

    /// 高斯网格：纬度由北向南
    pub fn gaussian(nlat: usize, nlon: usize) -> ModelResult<Self> {
        let (nodes, _) = gauss_legendre(nlat);
        let lats = nodes.iter().map(|x| x.asin().to_degrees()).collect();
        Self::new(lats, uniform_longitudes(nlon))
    }

    /// 网格类型
    pub fn kind(&self) -> GridKind {
        self.kind
    }

    /// 纬度点数
    pub fn nlat(&self) -> usize {
        self.latitudes.len()
    }

    /// 经度点数
    pub fn nlon(&self) -> usize {
        self.longitudes.len()
    }

    /// 网格形状 (nlat, nlon)
    pub fn shape(&self) -> (usize, usize) {
        (self.nlat(), self.nlon())
    }

    /// 纬度 [度]
    pub fn latitudes(&self) -> &[f64] {
        &self.latitudes
    }

    /// 经度 [度]
    pub fn longitudes(&self) -> &[f64] {
        &self.longitudes
    }

    /// sin(φ)
    pub fn sin_lat(&self) -> &[f64] {
        &self.sin_lat
    }

    /// cos(φ)
    pub fn cos_lat(&self) -> &[f64] {
        &self.cos_lat
    }

    /// 经向求积权重
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// 单位球面积分 ∫ f dA（球面总面积 4π）
    pub fn integrate(&self, field: &Array2<f64>) -> ModelResult<f64> {
        ModelError::check_shape("积分场", self.shape(), field.dim())?;
        let dlon = 2.0 * PI / self.nlon() as f64;
        let total = field
            .outer_iter()
            .zip(&self.weights)
            .map(|(row, w)| w * row.sum() * dlon)
            .sum();
        Ok(total)
    }

    /// 面积加权全球平均
    pub fn area_mean(&self, field: &Array2<f64>) -> ModelResult<f64> {
        Ok(self.integrate(field)? / (4.0 * PI))
    }

    /// 两点间大圆距离 [度]
    pub fn great_circle_degrees(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
        let (p1, p2) = (lat1.to_radians(), lat2.to_radians());
        let dl = (lon2 - lon1).to_radians();
        let c = p1.sin() * p2.sin() + p1.cos() * p2.cos() * dl.cos();
        c.clamp(-1.0, 1.0).acos().to_degrees()
    }
}

fn uniform_longitudes(nlon: usize) -> Vec<f64> {
    let dlon = 360.0 / nlon.max(1) as f64;
    (0..nlon).map(|i| i as f64 * dlon).collect()
}

fn check_longitudes(longitudes: &[f64]) -> ModelResult<()> {
    let nlon = longitudes.len();
    if nlon == 0 {
        return Err(ModelError::transform("经度为空"));
    }
    let dlon = 360.0 / nlon as f64;
    for (i, &lon) in longitudes.iter().enumerate() {
        let expected = longitudes[0] + i as f64 * dlon;
        if (lon - expected).abs() > COORD_TOLERANCE_DEG {
            return Err(ModelError::transform(format!(
                "经度必须等间距覆盖 360°: 第 {i} 点为 {lon}, 期望 {expected}"
            )));
        }
    }
    Ok(())
}

/// 识别含极点等间距纬度并返回 CC 权重
fn regular_weights(latitudes: &[f64]) -> Option<Vec<f64>> {
    let nlat = latitudes.len();
    let dlat = 180.0 / (nlat - 1) as f64;
    let cc = clenshaw_curtis_weights(nlat);
    latitudes
        .iter()
        .map(|&lat| {
            let k = (90.0 - lat) / dlat;
            let kr = k.round();
            if (k - kr).abs() * dlat > COORD_TOLERANCE_DEG || kr < 0.0 || kr as usize >= nlat {
                None
            } else {
                Some(cc[kr as usize])
            }
        })
        .collect::<Option<Vec<f64>>>()
        .filter(|_| is_permutation_free(latitudes))
}

/// 识别高斯纬度并返回 GL 权重
fn gaussian_weights(latitudes: &[f64]) -> Option<Vec<f64>> {
    let (nodes, weights) = gauss_legendre(latitudes.len());
    let gauss_lats: Vec<f64> = nodes.iter().map(|x| x.asin().to_degrees()).collect();
    latitudes
        .iter()
        .map(|&lat| {
            gauss_lats
                .iter()
                .position(|g| (g - lat).abs() < COORD_TOLERANCE_DEG)
                .map(|i| weights[i])
        })
        .collect::<Option<Vec<f64>>>()
        .filter(|_| is_permutation_free(latitudes))
}

/// 纬度互不重复
fn is_permutation_free(latitudes: &[f64]) -> bool {
    latitudes.iter().enumerate().all(|(i, a)| {
        latitudes[i + 1..]
            .iter()
            .all(|b| (a - b).abs() > COORD_TOLERANCE_DEG)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_grid_detection() {
        let grid = SphericalGrid::regular(73, 144).unwrap();
        assert_eq!(grid.kind(), GridKind::Regular);
        assert_eq!(grid.shape(), (73, 144));
        assert_eq!(grid.cos_lat()[0], 0.0);
        assert_eq!(grid.sin_lat()[72], -1.0);
        assert!((grid.weights().iter().sum::<f64>() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_south_to_north_regular_grid() {
        let lats: Vec<f64> = (0..37).map(|j| -90.0 + 5.0 * j as f64).collect();
        let lons: Vec<f64> = (0..72).map(|i| -180.0 + 5.0 * i as f64).collect();
        let grid = SphericalGrid::new(lats, lons).unwrap();
        assert_eq!(grid.kind(), GridKind::Regular);
    }

    #[test]
    fn test_gaussian_grid_detection() {
        let grid = SphericalGrid::gaussian(32, 64).unwrap();
        assert_eq!(grid.kind(), GridKind::Gaussian);
        assert!((grid.weights().iter().sum::<f64>() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_irregular_latitudes_rejected() {
        let lats = vec![80.0, 10.0, -3.0, -70.0];
        let lons = (0..8).map(|i| i as f64 * 45.0).collect();
        assert!(matches!(
            SphericalGrid::new(lats, lons),
            Err(ModelError::Transform { .. })
        ));
    }

    #[test]
    fn test_uneven_longitudes_rejected() {
        let lats = vec![90.0, 0.0, -90.0];
        let lons = vec![0.0, 100.0, 240.0];
        assert!(SphericalGrid::new(lats, lons).is_err());
    }

    #[test]
    fn test_integrate_constant() {
        let grid = SphericalGrid::regular(37, 72).unwrap();
        let ones = Array2::from_elem(grid.shape(), 1.0);
        let area = grid.integrate(&ones).unwrap();
        assert!((area - 4.0 * PI).abs() < 1e-10);
        assert!((grid.area_mean(&ones).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_great_circle() {
        let d = SphericalGrid::great_circle_degrees(0.0, 0.0, 0.0, 90.0);
        assert!((d - 90.0).abs() < 1e-10);
        let d = SphericalGrid::great_circle_degrees(90.0, 0.0, 90.0, 123.0);
        assert!(d.abs() < 1e-6);
    }
}
