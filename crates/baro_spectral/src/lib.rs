// crates/baro_spectral/src/lib.rs

//! 球谐谱变换层
//!
//! 为数值核心提供三角截断球谐变换及 [`SpectralField`] 类型。
//! 核心只依赖变换的数值约定（精度、截断阶数），具体算法可替换。
//!
//! # 模块概览
//!
//! - [`grid`]: 经纬网格几何（规则含极点网格 / 高斯网格）
//! - [`quadrature`]: Clenshaw–Curtis 与 Gauss–Legendre 求积
//! - [`legendre`]: 归一化缔合勒让德函数表与三角截断索引
//! - [`transform`]: 正/逆变换、梯度、由风场求涡度
//! - [`field`]: 同时持有格点与谱表示的场
//!
//! # 约定
//!
//! 所有导数均在单位球上给出，物理尺度（行星半径）由调用方显式乘上。
//!
//! ```
//! use std::sync::Arc;
//! use baro_spectral::{SphericalGrid, SphericalHarmonics, SpectralField};
//! use ndarray::Array2;
//!
//! let grid = SphericalGrid::regular(33, 64).unwrap();
//! let sh = Arc::new(SphericalHarmonics::new(grid, 15).unwrap());
//! let mut field = SpectralField::from_grid(sh.clone(), Array2::from_elem(sh.shape(), 1.0)).unwrap();
//! field.transform_to_spectral().unwrap();
//! assert!((field.global_mean().unwrap() - 1.0).abs() < 1e-12);
//! ```

#![warn(clippy::all)]

pub mod field;
pub mod grid;
pub mod legendre;
pub mod quadrature;
pub mod transform;

pub use field::{Representation, SpectralField};
pub use grid::{GridKind, SphericalGrid};
pub use legendre::{LegendreTable, TriangularIndex};
pub use transform::SphericalHarmonics;

/// 谱系数类型
pub use num_complex::Complex64;
