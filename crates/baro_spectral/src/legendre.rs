// crates/baro_spectral/src/legendre.rs

//! 归一化缔合勒让德函数
//!
//! 采用在 [-1, 1] 上正交归一的 P̄_n^m（∫ P̄² dx = 1，不含 Condon–Shortley 相位），
//! 由标准三项递推计算：
//!
//! ```text
//! P̄_m^m = C_m cos^m φ,   C_0 = 1/√2,  C_m = C_{m-1} √((2m+1)/(2m))
//! P̄_n^m = a_nm (x P̄_{n-1}^m - b_nm P̄_{n-2}^m)
//! a_nm = √((4n²-1)/(n²-m²)),  b_nm = √(((n-1)²-m²)/(4(n-1)²-1))
//! ```
//!
//! 为使极点处的梯度与风场有限，同时预先计算 P̄/cosφ（m ≥ 1）与 dP̄/dφ：
//!
//! ```text
//! m ≥ 1:  dP̄_n^m/dφ = -n ε_{n+1}^m P̃_{n+1}^m + (n+1) ε_n^m P̃_{n-1}^m,  P̃ = P̄/cosφ
//! m = 0:  dP̄_n^0/dφ = √(n(n+1)) P̄_n^1
//! ε_n^m = √((n²-m²)/(4n²-1))
//! ```

use ndarray::Array2;
use rayon::prelude::*;

/// 三角截断谱系数索引（按 m 主序排列）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriangularIndex {
    ntrunc: usize,
}

impl TriangularIndex {
    /// 创建 T`ntrunc` 索引
    pub fn new(ntrunc: usize) -> Self {
        Self { ntrunc }
    }

    /// 截断阶数
    pub fn ntrunc(&self) -> usize {
        self.ntrunc
    }

    /// 谱系数个数 (N+1)(N+2)/2
    pub fn len(&self) -> usize {
        (self.ntrunc + 1) * (self.ntrunc + 2) / 2
    }

    /// 是否为空（永远不为空，T0 也有一个系数）
    pub fn is_empty(&self) -> bool {
        false
    }

    /// 纬向波数 m 的起始偏移
    #[inline]
    pub fn offset(&self, m: usize) -> usize {
        m * (self.ntrunc + 1) - m * m.saturating_sub(1) / 2
    }

    /// (m, n) 的线性索引，要求 m ≤ n ≤ ntrunc
    #[inline]
    pub fn index(&self, m: usize, n: usize) -> usize {
        debug_assert!(m <= n && n <= self.ntrunc);
        self.offset(m) + (n - m)
    }

    /// 按存储顺序遍历 (m, n)
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> {
        let ntrunc = self.ntrunc;
        (0..=ntrunc).flat_map(move |m| (m..=ntrunc).map(move |n| (m, n)))
    }

    /// 每个系数的总波数 n
    pub fn degrees(&self) -> Vec<usize> {
        self.iter().map(|(_, n)| n).collect()
    }

    /// 每个系数的纬向波数 m
    pub fn orders(&self) -> Vec<usize> {
        self.iter().map(|(m, _)| m).collect()
    }
}

/// 勒让德函数表，行为纬度，列为谱系数
#[derive(Debug, Clone)]
pub struct LegendreTable {
    index: TriangularIndex,
    /// P̄_n^m(sinφ_j)
    pnm: Array2<f64>,
    /// dP̄_n^m/dφ
    dpnm: Array2<f64>,
    /// P̄_n^m / cosφ（m = 0 列置零）
    pnm_over_cos: Array2<f64>,
}

impl LegendreTable {
    /// 在给定纬度上构造函数表
    pub fn new(ntrunc: usize, sin_lat: &[f64], cos_lat: &[f64]) -> Self {
        let index = TriangularIndex::new(ntrunc);
        let ncoef = index.len();
        let nlat = sin_lat.len();

        let rows: Vec<(Vec<f64>, Vec<f64>, Vec<f64>)> = sin_lat
            .par_iter()
            .zip(cos_lat.par_iter())
            .map(|(&x, &s)| compute_row(&index, x, s))
            .collect();

        let mut pnm = Array2::zeros((nlat, ncoef));
        let mut dpnm = Array2::zeros((nlat, ncoef));
        let mut pnm_over_cos = Array2::zeros((nlat, ncoef));
        for (j, (p, dp, pc)) in rows.into_iter().enumerate() {
            for i in 0..ncoef {
                pnm[[j, i]] = p[i];
                dpnm[[j, i]] = dp[i];
                pnm_over_cos[[j, i]] = pc[i];
            }
        }

        Self {
            index,
            pnm,
            dpnm,
            pnm_over_cos,
        }
    }

    /// 索引
    pub fn index(&self) -> &TriangularIndex {
        &self.index
    }

    /// P̄ 表
    pub fn pnm(&self) -> &Array2<f64> {
        &self.pnm
    }

    /// dP̄/dφ 表
    pub fn dpnm(&self) -> &Array2<f64> {
        &self.dpnm
    }

    /// P̄/cosφ 表
    pub fn pnm_over_cos(&self) -> &Array2<f64> {
        &self.pnm_over_cos
    }
}

/// ε_n^m
#[inline]
fn epsilon(n: usize, m: usize) -> f64 {
    if n <= m {
        return 0.0;
    }
    let (n, m) = (n as f64, m as f64);
    ((n * n - m * m) / (4.0 * n * n - 1.0)).sqrt()
}

/// 从种子 P̄_m^m（或其缩放）递推到 n = nmax
fn recur(m: usize, nmax: usize, x: f64, seed: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(nmax + 1 - m);
    let mut p_prev = 0.0;
    let mut p = seed;
    out.push(p);
    let mf = m as f64;
    for n in (m + 1)..=nmax {
        let nf = n as f64;
        let a = ((4.0 * nf * nf - 1.0) / (nf * nf - mf * mf)).sqrt();
        let b = if n == m + 1 {
            0.0
        } else {
            let n1 = nf - 1.0;
            ((n1 * n1 - mf * mf) / (4.0 * n1 * n1 - 1.0)).sqrt()
        };
        let next = a * (x * p - b * p_prev);
        p_prev = p;
        p = next;
        out.push(p);
    }
    out
}

/// 单个纬度上的 (P̄, dP̄/dφ, P̄/cosφ)
fn compute_row(index: &TriangularIndex, x: f64, s: f64) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let ntrunc = index.ntrunc();
    let ncoef = index.len();
    let mut p = vec![0.0; ncoef];
    let mut dp = vec![0.0; ncoef];
    let mut pc = vec![0.0; ncoef];

    // m = 0
    let c0 = std::f64::consts::FRAC_1_SQRT_2;
    for (k, val) in recur(0, ntrunc, x, c0).into_iter().enumerate() {
        p[index.index(0, k)] = val;
    }

    // m ≥ 1：先算 P̃ = P̄/cosφ 到 n = N+1，再得到 P̄ 与导数
    let mut c = c0;
    for m in 1..=ntrunc {
        let mf = m as f64;
        c *= ((2.0 * mf + 1.0) / (2.0 * mf)).sqrt();
        let seed = c * s.powi(m as i32 - 1);
        let ptilde = recur(m, ntrunc + 1, x, seed);
        for n in m..=ntrunc {
            let i = index.index(m, n);
            let pt = ptilde[n - m];
            let pt_up = ptilde[n + 1 - m];
            let pt_down = if n > m { ptilde[n - 1 - m] } else { 0.0 };
            pc[i] = pt;
            p[i] = s * pt;
            dp[i] = -(n as f64) * epsilon(n + 1, m) * pt_up
                + (n as f64 + 1.0) * epsilon(n, m) * pt_down;
        }
    }

    // m = 0 的导数借助 m = 1 的函数值
    for n in 1..=ntrunc {
        let nf = n as f64;
        dp[index.index(0, n)] = (nf * (nf + 1.0)).sqrt() * p[index.index(1, n)];
    }

    (p, dp, pc)
}
