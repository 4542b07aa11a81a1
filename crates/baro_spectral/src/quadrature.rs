// crates/baro_spectral/src/quadrature.rs

//! 经向求积规则
//!
//! - Clenshaw–Curtis：节点 θ_k = kπ/N（含两极），对 x = cosθ 的 N 次多项式精确
//! - Gauss–Legendre：n 个节点，对 2n-1 次多项式精确
//!
//! 两种规则的权重之和均为 2（区间 [-1, 1]）。

use std::f64::consts::PI;

/// Newton 迭代收敛阈值
const NEWTON_TOLERANCE: f64 = 1e-15;

/// Newton 迭代最大次数
const NEWTON_MAX_ITER: usize = 100;

/// Clenshaw–Curtis 权重
///
/// 节点按余纬 θ_k = kπ/(n-1) 排列，k = 0 为北极。
pub fn clenshaw_curtis_weights(n_points: usize) -> Vec<f64> {
    if n_points < 2 {
        return vec![2.0; n_points];
    }
    let n = n_points - 1;
    let half = n / 2;
    (0..=n)
        .map(|k| {
            let c = if k == 0 || k == n { 1.0 } else { 2.0 };
            let mut sum = 0.0;
            for j in 1..=half {
                let b = if 2 * j == n { 1.0 } else { 2.0 };
                let denom = (4 * j * j - 1) as f64;
                sum += b / denom * (2.0 * (j * k) as f64 * PI / n as f64).cos();
            }
            c / n as f64 * (1.0 - sum)
        })
        .collect()
}

/// Gauss–Legendre 节点与权重
///
/// 返回 `(nodes, weights)`，节点按 x 降序（由北向南）。
pub fn gauss_legendre(n: usize) -> (Vec<f64>, Vec<f64>) {
    let mut nodes = Vec::with_capacity(n);
    let mut weights = Vec::with_capacity(n);
    for i in 0..n {
        // 初值取 Tricomi 近似
        let mut x = (PI * (i as f64 + 0.75) / (n as f64 + 0.5)).cos();
        let mut dp = 1.0;
        for _ in 0..NEWTON_MAX_ITER {
            let (p, d) = legendre_with_derivative(n, x);
            dp = d;
            let dx = p / d;
            x -= dx;
            if dx.abs() < NEWTON_TOLERANCE {
                break;
            }
        }
        let (_, d) = legendre_with_derivative(n, x);
        if d.is_finite() {
            dp = d;
        }
        nodes.push(x);
        weights.push(2.0 / ((1.0 - x * x) * dp * dp));
    }
    (nodes, weights)
}

/// 普通勒让德多项式 P_n(x) 及其导数
fn legendre_with_derivative(n: usize, x: f64) -> (f64, f64) {
    if n == 0 {
        return (1.0, 0.0);
    }
    let mut p_prev = 1.0;
    let mut p = x;
    for k in 2..=n {
        let kf = k as f64;
        let next = ((2.0 * kf - 1.0) * x * p - (kf - 1.0) * p_prev) / kf;
        p_prev = p;
        p = next;
    }
    let dp = n as f64 * (x * p - p_prev) / (x * x - 1.0);
    (p, dp)
}
