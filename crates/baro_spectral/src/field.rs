// crates/baro_spectral/src/field.rs

//! 谱场：同时持有格点与谱系数两种表示
//!
//! 任一时刻只有标记为有效的表示是权威的；变换会重算另一表示并把两者都标记为有效。
//! 读取过期表示返回变换错误，而不是静默使用旧值。

use std::sync::Arc;

use baro_foundation::error::{ModelError, ModelResult};
use ndarray::{Array1, Array2};
use num_complex::Complex64;

use crate::transform::SphericalHarmonics;

/// 当前有效的表示
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    /// 仅格点值有效
    Grid,
    /// 仅谱系数有效
    Spectral,
    /// 两者同步
    Both,
}

impl Representation {
    /// 格点值是否有效
    pub fn has_grid(self) -> bool {
        matches!(self, Self::Grid | Self::Both)
    }

    /// 谱系数是否有效
    pub fn has_spectral(self) -> bool {
        matches!(self, Self::Spectral | Self::Both)
    }
}

/// 球面标量场
///
/// 截断阶数在场的整个生命周期内固定（由持有的变换决定）。
#[derive(Debug, Clone)]
pub struct SpectralField {
    transform: Arc<SphericalHarmonics>,
    grid: Array2<f64>,
    spectral: Array1<Complex64>,
    representation: Representation,
}

impl SpectralField {
    // ========================================================================
    // 构造
    // ========================================================================

    /// 由格点值创建（仅格点有效）
    pub fn from_grid(transform: Arc<SphericalHarmonics>, grid: Array2<f64>) -> ModelResult<Self> {
        transform.check_grid_shape(&grid)?;
        let spectral = Array1::zeros(transform.n_coefficients());
        Ok(Self {
            transform,
            grid,
            spectral,
            representation: Representation::Grid,
        })
    }

    /// 由谱系数创建（仅谱有效）
    pub fn from_spectral(
        transform: Arc<SphericalHarmonics>,
        spectral: Array1<Complex64>,
    ) -> ModelResult<Self> {
        transform.check_spectral_len(&spectral)?;
        let grid = Array2::zeros(transform.shape());
        Ok(Self {
            transform,
            grid,
            spectral,
            representation: Representation::Spectral,
        })
    }

    /// 全零场（两种表示同步）
    pub fn zeros(transform: Arc<SphericalHarmonics>) -> Self {
        let grid = Array2::zeros(transform.shape());
        let spectral = Array1::zeros(transform.n_coefficients());
        Self {
            transform,
            grid,
            spectral,
            representation: Representation::Both,
        }
    }

    /// 由格点值创建并截断：格点值替换为截断后的合成结果
    pub fn truncated_from_grid(
        transform: Arc<SphericalHarmonics>,
        grid: Array2<f64>,
    ) -> ModelResult<Self> {
        let mut field = Self::from_grid(transform, grid)?;
        field.transform_to_spectral()?;
        field.transform_to_grid()?;
        Ok(field)
    }

    // ========================================================================
    // 变换
    // ========================================================================

    /// 格点 → 谱（截断到 ntrunc）
    pub fn transform_to_spectral(&mut self) -> ModelResult<()> {
        if !self.representation.has_grid() {
            return Err(ModelError::transform("格点值已过期，无法做正变换"));
        }
        self.spectral = self.transform.analyze(&self.grid)?;
        self.representation = Representation::Both;
        Ok(())
    }

    /// 谱 → 格点
    pub fn transform_to_grid(&mut self) -> ModelResult<()> {
        if !self.representation.has_spectral() {
            return Err(ModelError::transform("谱系数已过期，无法做逆变换"));
        }
        self.grid = self.transform.synthesize(&self.spectral)?;
        self.representation = Representation::Both;
        Ok(())
    }

    /// 把 n > `ntrunc` 的系数置零，此后仅谱表示有效
    ///
    /// `ntrunc` 不小于场自身截断阶数时不做任何事。
    pub fn truncate(&mut self, ntrunc: usize) -> ModelResult<()> {
        if ntrunc >= self.ntrunc() {
            return Ok(());
        }
        if !self.representation.has_spectral() {
            self.transform_to_spectral()?;
        }
        self.spectral = self.transform.truncate_coefficients(&self.spectral, ntrunc)?;
        self.representation = Representation::Spectral;
        Ok(())
    }

    // ========================================================================
    // 访问器
    // ========================================================================

    /// 格点值（过期时报错）
    pub fn grid(&self) -> ModelResult<&Array2<f64>> {
        if self.representation.has_grid() {
            Ok(&self.grid)
        } else {
            Err(ModelError::transform("读取了过期的格点表示"))
        }
    }

    /// 谱系数（过期时报错）
    pub fn spectral(&self) -> ModelResult<&Array1<Complex64>> {
        if self.representation.has_spectral() {
            Ok(&self.spectral)
        } else {
            Err(ModelError::transform("读取了过期的谱表示"))
        }
    }

    /// 当前有效表示
    pub fn representation(&self) -> Representation {
        self.representation
    }

    /// 截断阶数
    pub fn ntrunc(&self) -> usize {
        self.transform.ntrunc()
    }

    /// 格点形状
    pub fn shape(&self) -> (usize, usize) {
        self.transform.shape()
    }

    /// 所用变换
    pub fn transform(&self) -> &Arc<SphericalHarmonics> {
        &self.transform
    }

    /// 两个场能否逐系数相加（形状与截断一致）
    pub fn is_compatible(&self, other: &SpectralField) -> bool {
        Arc::ptr_eq(&self.transform, &other.transform)
            || (self.ntrunc() == other.ntrunc() && self.shape() == other.shape())
    }

    // ========================================================================
    // 谱空间运算
    // ========================================================================

    /// 单位球梯度 ((1/cosφ) ∂/∂λ, ∂/∂φ)
    pub fn gradient(&self) -> ModelResult<(Array2<f64>, Array2<f64>)> {
        self.transform.synthesize_gradient(self.spectral()?)
    }

    /// 全球面积平均（由 (0,0) 系数得到）
    pub fn global_mean(&self) -> ModelResult<f64> {
        Ok(self.spectral()?[0].re * std::f64::consts::FRAC_1_SQRT_2)
    }

    /// 对每个谱系数按总波数 n 作变换，结果仅谱有效
    pub fn map_spectral<F>(&self, f: F) -> ModelResult<SpectralField>
    where
        F: Fn(usize, Complex64) -> Complex64,
    {
        let spectral = self
            .spectral()?
            .iter()
            .zip(self.transform.degrees())
            .map(|(c, &n)| f(n, *c))
            .collect();
        Self::from_spectral(self.transform.clone(), spectral)
    }

    /// 线性组合 Σ c_i f_i（谱空间），结果仅谱有效
    pub fn linear_combination(terms: &[(f64, &SpectralField)]) -> ModelResult<SpectralField> {
        let (_, first) = terms
            .first()
            .ok_or_else(|| ModelError::transform("线性组合至少需要一项"))?;
        let mut spectral = Array1::zeros(first.transform.n_coefficients());
        for (coef, field) in terms {
            if !first.is_compatible(field) {
                return Err(ModelError::transform(format!(
                    "场不兼容: T{} {:?} 与 T{} {:?}",
                    first.ntrunc(),
                    first.shape(),
                    field.ntrunc(),
                    field.shape()
                )));
            }
            spectral.scaled_add(Complex64::new(*coef, 0.0), field.spectral()?);
        }
        Self::from_spectral(first.transform.clone(), spectral)
    }

    /// 原地累加 self += other（谱空间），此后仅谱有效
    pub fn add_assign_spectral(&mut self, other: &SpectralField) -> ModelResult<()> {
        if !self.is_compatible(other) {
            return Err(ModelError::transform("累加的两个场截断或形状不一致"));
        }
        if !self.representation.has_spectral() {
            self.transform_to_spectral()?;
        }
        self.spectral += other.spectral()?;
        self.representation = Representation::Spectral;
        Ok(())
    }

    /// 确保格点与谱同步
    pub fn synchronize(&mut self) -> ModelResult<()> {
        match self.representation {
            Representation::Both => Ok(()),
            Representation::Grid => self.transform_to_spectral(),
            Representation::Spectral => self.transform_to_grid(),
        }
    }
}
