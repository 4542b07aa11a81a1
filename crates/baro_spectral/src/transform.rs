// crates/baro_spectral/src/transform.rs

//! 三角截断球谐变换
//!
//! 约定：
//!
//! ```text
//! f(λ, φ) = Σ_m Σ_n a_n^m P̄_n^m(sinφ) e^{imλ},  m = -N..N,  a_n^{-m} = conj(a_n^m)
//! F_m(φ)  = (1/nlon) Σ_k f(λ_k, φ) e^{-imλ_k}
//! a_n^m   = Σ_j w_j F_m(φ_j) P̄_n^m(sinφ_j)
//! ```
//!
//! 只存储 m ≥ 0 的系数；合成时 m ≥ 1 项取两倍实部。
//! 所有导数在单位球上给出。

use baro_foundation::error::{ModelError, ModelResult};
use ndarray::{Array1, Array2};
use num_complex::Complex64;
use rayon::prelude::*;
use tracing::debug;

use crate::grid::{GridKind, SphericalGrid};
use crate::legendre::{LegendreTable, TriangularIndex};

/// 球谐变换
#[derive(Debug, Clone)]
pub struct SphericalHarmonics {
    grid: SphericalGrid,
    index: TriangularIndex,
    legendre: LegendreTable,
    /// cos(mλ_k)，形状 (N+1) × nlon
    cos_table: Array2<f64>,
    /// sin(mλ_k)，形状 (N+1) × nlon
    sin_table: Array2<f64>,
    /// 每个系数的纬向波数
    orders: Vec<usize>,
    /// 每个系数的总波数
    degrees: Vec<usize>,
}

impl SphericalHarmonics {
    /// 为网格创建 T`ntrunc` 变换
    ///
    /// 网格分辨率必须足以精确积分截断范围内的球谐函数乘积，否则返回变换错误。
    pub fn new(grid: SphericalGrid, ntrunc: usize) -> ModelResult<Self> {
        let (nlat, nlon) = grid.shape();
        if nlon <= 2 * ntrunc {
            return Err(ModelError::transform(format!(
                "经度点数 {nlon} 不足以支持 T{ntrunc}（需要 > {}）",
                2 * ntrunc
            )));
        }
        match grid.kind() {
            GridKind::Regular if nlat - 1 < 2 * ntrunc => {
                // Clenshaw–Curtis 对 nlat 点只精确积分到 nlat-1 次多项式，
                // 截断内两球谐乘积的次数可达 2·ntrunc
                return Err(ModelError::transform(format!(
                    "规则网格 {nlat} 个纬度点最多支持 T{}；T{ntrunc} 需要 ≥ {} 个纬度点，\
                     或改用 ≥ {} 个纬度的高斯网格",
                    (nlat - 1) / 2,
                    2 * ntrunc + 1,
                    ntrunc + 1
                )));
            }
            GridKind::Gaussian if nlat <= ntrunc => {
                return Err(ModelError::transform(format!(
                    "高斯网格纬度点数 {nlat} 不足以支持 T{ntrunc}（需要 > {ntrunc}）"
                )));
            }
            _ => {}
        }

        let index = TriangularIndex::new(ntrunc);
        let legendre = LegendreTable::new(ntrunc, grid.sin_lat(), grid.cos_lat());

        let mut cos_table = Array2::zeros((ntrunc + 1, nlon));
        let mut sin_table = Array2::zeros((ntrunc + 1, nlon));
        for m in 0..=ntrunc {
            for (k, lon) in grid.longitudes().iter().enumerate() {
                let angle = m as f64 * lon.to_radians();
                cos_table[[m, k]] = angle.cos();
                sin_table[[m, k]] = angle.sin();
            }
        }

        debug!(
            "球谐变换初始化: T{}, 网格 {}x{} ({:?}), {} 个谱系数",
            ntrunc,
            nlat,
            nlon,
            grid.kind(),
            index.len()
        );

        Ok(Self {
            orders: index.orders(),
            degrees: index.degrees(),
            grid,
            index,
            legendre,
            cos_table,
            sin_table,
        })
    }

    // ========================================================================
    // 访问器
    // ========================================================================

    /// 网格
    pub fn grid(&self) -> &SphericalGrid {
        &self.grid
    }

    /// 截断阶数
    pub fn ntrunc(&self) -> usize {
        self.index.ntrunc()
    }

    /// 纬度点数
    pub fn nlat(&self) -> usize {
        self.grid.nlat()
    }

    /// 经度点数
    pub fn nlon(&self) -> usize {
        self.grid.nlon()
    }

    /// 格点场形状 (nlat, nlon)
    pub fn shape(&self) -> (usize, usize) {
        self.grid.shape()
    }

    /// 谱系数个数
    pub fn n_coefficients(&self) -> usize {
        self.index.len()
    }

    /// 三角截断索引
    pub fn index(&self) -> &TriangularIndex {
        &self.index
    }

    /// 每个谱系数的总波数 n
    pub fn degrees(&self) -> &[usize] {
        &self.degrees
    }

    /// 每个谱系数的纬向波数 m
    pub fn orders(&self) -> &[usize] {
        &self.orders
    }

    /// 单位球拉普拉斯算子本征值 -n(n+1)
    #[inline]
    pub fn laplacian_eigenvalue(n: usize) -> f64 {
        -((n * (n + 1)) as f64)
    }

    /// 检查格点场形状
    pub fn check_grid_shape(&self, field: &Array2<f64>) -> ModelResult<()> {
        ModelError::check_shape("格点场", self.shape(), field.dim())
    }

    /// 检查谱系数长度
    pub fn check_spectral_len(&self, coeffs: &Array1<Complex64>) -> ModelResult<()> {
        if coeffs.len() != self.n_coefficients() {
            return Err(ModelError::transform(format!(
                "谱系数长度 {} 与 T{} 不符（应为 {}）",
                coeffs.len(),
                self.ntrunc(),
                self.n_coefficients()
            )));
        }
        Ok(())
    }

    // ========================================================================
    // 变换
    // ========================================================================

    /// 正变换：格点 → 截断谱系数
    pub fn analyze(&self, field: &Array2<f64>) -> ModelResult<Array1<Complex64>> {
        self.check_grid_shape(field)?;
        let fourier = self.fourier_analysis(field);
        let weights = self.grid.weights();
        let pnm = self.legendre.pnm();

        let coeffs: Vec<Complex64> = (0..self.n_coefficients())
            .into_par_iter()
            .map(|i| {
                let m = self.orders[i];
                let mut acc = Complex64::new(0.0, 0.0);
                for (j, w) in weights.iter().enumerate() {
                    acc += fourier[j][m] * (w * pnm[[j, i]]);
                }
                if m == 0 {
                    Complex64::new(acc.re, 0.0)
                } else {
                    acc
                }
            })
            .collect();
        Ok(Array1::from(coeffs))
    }

    /// 逆变换：谱系数 → 格点
    pub fn synthesize(&self, coeffs: &Array1<Complex64>) -> ModelResult<Array2<f64>> {
        self.check_spectral_len(coeffs)?;
        self.synthesize_with(self.legendre.pnm(), |i| coeffs[i])
    }

    /// 梯度合成，返回 ((1/cosφ) ∂f/∂λ, ∂f/∂φ)
    pub fn synthesize_gradient(
        &self,
        coeffs: &Array1<Complex64>,
    ) -> ModelResult<(Array2<f64>, Array2<f64>)> {
        self.check_spectral_len(coeffs)?;
        let gx = self.synthesize_with(self.legendre.pnm_over_cos(), |i| {
            coeffs[i] * Complex64::new(0.0, self.orders[i] as f64)
        })?;
        let gy = self.synthesize_with(self.legendre.dpnm(), |i| coeffs[i])?;
        Ok((gx, gy))
    }

    /// 由风场求单位球上的相对涡度谱系数
    ///
    /// ζ = (1/cosφ) [∂v/∂λ - ∂(u cosφ)/∂φ]，分部积分后只用到 P̄/cosφ 与 dP̄/dφ，
    /// 极点处保持有限。物理涡度需再除以行星半径。
    pub fn vorticity_from_winds(
        &self,
        u: &Array2<f64>,
        v: &Array2<f64>,
    ) -> ModelResult<Array1<Complex64>> {
        self.check_grid_shape(u)?;
        self.check_grid_shape(v)?;
        let fu = self.fourier_analysis(u);
        let fv = self.fourier_analysis(v);
        let weights = self.grid.weights();
        let dpnm = self.legendre.dpnm();
        let pnm_over_cos = self.legendre.pnm_over_cos();

        let coeffs: Vec<Complex64> = (0..self.n_coefficients())
            .into_par_iter()
            .map(|i| {
                let m = self.orders[i];
                let im = Complex64::new(0.0, m as f64);
                let mut acc = Complex64::new(0.0, 0.0);
                for (j, w) in weights.iter().enumerate() {
                    acc += (im * fv[j][m] * pnm_over_cos[[j, i]] + fu[j][m] * dpnm[[j, i]]) * *w;
                }
                if m == 0 {
                    Complex64::new(acc.re, 0.0)
                } else {
                    acc
                }
            })
            .collect();
        Ok(Array1::from(coeffs))
    }

    /// 截断到更低阶数（高阶系数丢弃）
    pub fn truncate_coefficients(
        &self,
        coeffs: &Array1<Complex64>,
        ntrunc: usize,
    ) -> ModelResult<Array1<Complex64>> {
        self.check_spectral_len(coeffs)?;
        Ok(coeffs
            .iter()
            .zip(&self.degrees)
            .map(|(c, &n)| if n <= ntrunc { *c } else { Complex64::new(0.0, 0.0) })
            .collect())
    }

    // ========================================================================
    // 内部
    // ========================================================================

    /// 每个纬度上 m = 0..=N 的傅里叶系数
    fn fourier_analysis(&self, field: &Array2<f64>) -> Vec<Vec<Complex64>> {
        let ntrunc = self.ntrunc();
        let inv_nlon = 1.0 / self.nlon() as f64;
        (0..self.nlat())
            .into_par_iter()
            .map(|j| {
                let row = field.row(j);
                (0..=ntrunc)
                    .map(|m| {
                        let (mut re, mut im) = (0.0, 0.0);
                        for (k, f) in row.iter().enumerate() {
                            re += f * self.cos_table[[m, k]];
                            im -= f * self.sin_table[[m, k]];
                        }
                        Complex64::new(re * inv_nlon, im * inv_nlon)
                    })
                    .collect()
            })
            .collect()
    }

    /// 用给定勒让德表合成格点场
    fn synthesize_with<F>(&self, table: &Array2<f64>, coeff: F) -> ModelResult<Array2<f64>>
    where
        F: Fn(usize) -> Complex64 + Sync,
    {
        let ntrunc = self.ntrunc();
        let nlon = self.nlon();
        let rows: Vec<Vec<f64>> = (0..self.nlat())
            .into_par_iter()
            .map(|j| {
                let mut fourier = vec![Complex64::new(0.0, 0.0); ntrunc + 1];
                for (i, &m) in self.orders.iter().enumerate() {
                    fourier[m] += coeff(i) * table[[j, i]];
                }
                (0..nlon)
                    .map(|k| {
                        let mut value = fourier[0].re;
                        for (m, f) in fourier.iter().enumerate().skip(1) {
                            value += 2.0
                                * (f.re * self.cos_table[[m, k]] - f.im * self.sin_table[[m, k]]);
                        }
                        value
                    })
                    .collect()
            })
            .collect();

        Array2::from_shape_vec((self.nlat(), nlon), rows.concat())
            .map_err(|e| ModelError::transform(format!("合成结果形状错误: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn regular(ntrunc: usize) -> SphericalHarmonics {
        let grid = SphericalGrid::regular(2 * ntrunc + 3, 2 * ntrunc + 4).unwrap();
        SphericalHarmonics::new(grid, ntrunc).unwrap()
    }

    fn field_from<F: Fn(f64, f64) -> f64>(sh: &SphericalHarmonics, f: F) -> Array2<f64> {
        let grid = sh.grid();
        Array2::from_shape_fn(sh.shape(), |(j, k)| {
            f(grid.latitudes()[j].to_radians(), grid.longitudes()[k].to_radians())
        })
    }

    #[test]
    fn test_resolution_checks() {
        let grid = SphericalGrid::regular(73, 144).unwrap();
        assert!(SphericalHarmonics::new(grid.clone(), 36).is_ok());
        assert!(matches!(
            SphericalHarmonics::new(grid, 42),
            Err(ModelError::Transform { .. })
        ));
        let grid = SphericalGrid::regular(181, 64).unwrap();
        assert!(SphericalHarmonics::new(grid, 42).is_err());
    }

    #[test]
    fn test_regular_resolution_error_names_limits() {
        // 2.5° 网格：最多 T36，T42 需要 85 个纬度点或 43 点以上的高斯网格
        let grid = SphericalGrid::regular(73, 144).unwrap();
        let message = SphericalHarmonics::new(grid, 42).unwrap_err().to_string();
        assert!(message.contains("T36"), "{message}");
        assert!(message.contains("85"), "{message}");
        assert!(message.contains("43"), "{message}");
        let gaussian = SphericalGrid::gaussian(64, 128).unwrap();
        assert!(SphericalHarmonics::new(gaussian, 42).is_ok());
    }

    #[test]
    fn test_band_limited_roundtrip_exact() {
        let sh = regular(8);
        let f = field_from(&sh, |phi, lam| {
            1.0 + phi.sin() + phi.cos().powi(3) * (3.0 * lam).cos() - 0.5 * phi.cos() * lam.sin()
        });
        let coeffs = sh.analyze(&f).unwrap();
        let back = sh.synthesize(&coeffs).unwrap();
        let max_err = (&back - &f).iter().fold(0.0_f64, |a, v| a.max(v.abs()));
        assert!(max_err < 1e-12, "max_err = {max_err}");
    }

    #[test]
    fn test_gaussian_roundtrip() {
        let grid = SphericalGrid::gaussian(12, 24).unwrap();
        let sh = SphericalHarmonics::new(grid, 10).unwrap();
        let f = field_from(&sh, |phi, lam| phi.sin().powi(2) + phi.cos().powi(2) * (2.0 * lam).sin());
        let back = sh.synthesize(&sh.analyze(&f).unwrap()).unwrap();
        let max_err = (&back - &f).iter().fold(0.0_f64, |a, v| a.max(v.abs()));
        assert!(max_err < 1e-12);
    }

    #[test]
    fn test_gradient_of_sin_lat() {
        let sh = regular(6);
        let f = field_from(&sh, |phi, _| phi.sin());
        let (gx, gy) = sh.synthesize_gradient(&sh.analyze(&f).unwrap()).unwrap();
        let expected = field_from(&sh, |phi, _| phi.cos());
        assert!(gx.iter().all(|v| v.abs() < 1e-12));
        let max_err = (&gy - &expected).iter().fold(0.0_f64, |a, v| a.max(v.abs()));
        assert!(max_err < 1e-12);
    }

    #[test]
    fn test_zonal_gradient_finite_at_poles() {
        let sh = regular(6);
        // f = cosφ cosλ 的 (1/cosφ)∂f/∂λ = -sinλ
        let f = field_from(&sh, |phi, lam| phi.cos() * lam.cos());
        let (gx, _) = sh.synthesize_gradient(&sh.analyze(&f).unwrap()).unwrap();
        let expected = field_from(&sh, |_, lam| -lam.sin());
        let max_err = (&gx - &expected).iter().fold(0.0_f64, |a, v| a.max(v.abs()));
        assert!(max_err < 1e-12);
    }

    #[test]
    fn test_solid_body_vorticity() {
        let sh = regular(10);
        let u = field_from(&sh, |phi, _| 20.0 * phi.cos());
        let v = Array2::zeros(sh.shape());
        let zeta = sh.synthesize(&sh.vorticity_from_winds(&u, &v).unwrap()).unwrap();
        let expected = field_from(&sh, |phi, _| 40.0 * phi.sin());
        let max_err = (&zeta - &expected).iter().fold(0.0_f64, |a, v| a.max(v.abs()));
        assert!(max_err < 1e-10);
    }

    #[test]
    fn test_global_integral_from_mean_coefficient() {
        let sh = regular(4);
        let f = field_from(&sh, |phi, _| 2.0 + phi.sin());
        let coeffs = sh.analyze(&f).unwrap();
        let mean = coeffs[0].re / 2.0_f64.sqrt();
        assert!((mean - 2.0).abs() < 1e-12);
        let integral = sh.grid().integrate(&f).unwrap();
        assert!((integral - 8.0 * PI).abs() < 1e-10);
    }

    #[test]
    fn test_shape_errors() {
        let sh = regular(4);
        let bad = Array2::zeros((3, 3));
        assert!(matches!(sh.analyze(&bad), Err(ModelError::Transform { .. })));
        let short = Array1::zeros(3);
        assert!(matches!(sh.synthesize(&short), Err(ModelError::Transform { .. })));
    }
}
