// crates/baro_physics/src/engine/leapfrog.rs

//! 蛙跳时间积分 + Robert–Asselin 滤波
//!
//! ## 格式
//!
//! ```text
//! 首步（前向欧拉）:  ζ[1]   = ζ[0] + Δt T(ζ[0])
//! 之后:            ζ[t+1] = ζ̄[t-1] + 2Δt T(ζ[t])
//! 滤波:            ζ̄[t]   = ζ[t] + ν (ζ̄[t-1] - 2ζ[t] + ζ[t+1])
//! ```
//!
//! ζ̄[t] 作为下一步的前一时间层保存。所有运算都在谱空间进行，
//! 新涡度确定后由平衡关系重建流函数与风场。
//!
//! ## 参考文献
//!
//! 1. Robert, A. J. (1966). The integration of a low order spectral form of the
//!    primitive meteorological equations. J. Meteor. Soc. Japan, 44, 237-245.
//! 2. Asselin, R. (1972). Frequency filter for time integrations.
//!    Mon. Wea. Rev., 100, 487-490.

use std::collections::BTreeMap;

use baro_foundation::error::{ModelError, ModelResult};
use baro_spectral::SpectralField;
use chrono::Duration;
use rayon::prelude::*;
use tracing::debug;

use crate::state::{AtmosphericState, FlowFields, PendingState};
use crate::tendency::{
    Diagnostics, TendencyComponent, TendencyOutput, TendencySet, TendencyTerm, PROGNOSTIC_NAMES,
    VORTICITY,
};

/// 默认 Robert–Asselin 滤波系数
pub const DEFAULT_ROBERT_COEFFICIENT: f64 = 0.05;

/// 蛙跳步进器
///
/// 唯一的内部状态是滤波后的前一时间层涡度；只有在一步完全成功后才会替换。
#[derive(Debug)]
pub struct LeapfrogStepper {
    components: Vec<TendencyComponent>,
    robert_coefficient: f64,
    parallel: bool,
    previous: Option<SpectralField>,
}

impl LeapfrogStepper {
    /// 按给定顺序组合分量
    pub fn new(components: Vec<TendencyComponent>) -> Self {
        Self {
            components,
            robert_coefficient: DEFAULT_ROBERT_COEFFICIENT,
            parallel: false,
            previous: None,
        }
    }

    /// 设置 Robert–Asselin 系数，须在 [0, 0.5) 内
    pub fn with_robert_coefficient(mut self, nu: f64) -> ModelResult<Self> {
        if !(0.0..0.5).contains(&nu) {
            return Err(ModelError::configuration(format!(
                "Robert–Asselin 系数须在 [0, 0.5) 内: {nu}"
            )));
        }
        self.robert_coefficient = nu;
        Ok(self)
    }

    /// 是否用 rayon 并行求值各分量（合并顺序不变）
    pub fn with_parallel_evaluation(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Robert–Asselin 系数
    pub fn robert_coefficient(&self) -> f64 {
        self.robert_coefficient
    }

    /// 分量名称（按配置顺序）
    pub fn component_names(&self) -> Vec<&str> {
        self.components.iter().map(|c| c.name()).collect()
    }

    /// 分量个数
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// 是否没有分量
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// 下一步是否为首步（前向欧拉）
    pub fn is_first_step(&self) -> bool {
        self.previous.is_none()
    }

    /// 丢弃保存的前一时间层，下一步重新用前向欧拉启动
    pub fn reset(&mut self) {
        self.previous = None;
    }

    /// 求值所有分量并按配置顺序合并
    ///
    /// 诊断量重名或同一倾向目标不兼容时返回名称冲突错误。
    pub fn evaluate(&self, state: &AtmosphericState) -> ModelResult<TendencyOutput> {
        let evaluate_one = |c: &TendencyComponent| {
            c.evaluate(state).map_err(|e| e.in_component(c.name()))
        };
        let outputs: Vec<ModelResult<TendencyOutput>> = if self.parallel {
            self.components.par_iter().map(evaluate_one).collect()
        } else {
            self.components.iter().map(evaluate_one).collect()
        };

        let mut tendencies = TendencySet::new();
        let mut tendency_owners: BTreeMap<String, &str> = BTreeMap::new();
        let mut diagnostics = Diagnostics::new();
        let mut owners: BTreeMap<String, &str> = BTreeMap::new();

        for (component, output) in self.components.iter().zip(outputs) {
            let (tend, diags) = output?;
            let name = component.name();

            for (target, field) in tend {
                if !PROGNOSTIC_NAMES.iter().any(|p| *p == target) {
                    return Err(ModelError::configuration(format!(
                        "未知的倾向目标 '{target}'"
                    ))
                    .in_component(name));
                }
                // 冲突报告的是最先写入该目标的分量
                let first = tendency_owners.get(&target).copied().unwrap_or(name);
                tendencies.accumulate(TendencySet::single(target.clone(), field), first, name)?;
                tendency_owners.entry(target).or_insert(name);
            }

            for (key, values) in diags {
                if let Some(first) = owners.get(&key) {
                    return Err(ModelError::name_collision(key, *first, name));
                }
                owners.insert(key.clone(), name);
                diagnostics.insert(key, values);
            }
        }
        Ok((tendencies, diagnostics))
    }

    /// 推进一步
    ///
    /// 返回本步诊断量与未打时间戳的新状态。任何失败都使整步作废，
    /// 保存的前一时间层保持不变。
    pub fn step(
        &mut self,
        state: &AtmosphericState,
        dt: Duration,
    ) -> ModelResult<(Diagnostics, PendingState)> {
        let dt_seconds = dt.num_milliseconds() as f64 / 1000.0;
        if dt_seconds <= 0.0 {
            return Err(ModelError::configuration(format!("时间步长必须为正: {dt}")));
        }

        let (tendencies, diagnostics) = self.evaluate(state)?;
        let current = &state.flow.vorticity;
        let zero = SpectralField::zeros(current.transform().clone());
        let tendency = tendencies.get(VORTICITY).unwrap_or(&zero);

        let (next, filtered) = match &self.previous {
            None => {
                let next = SpectralField::linear_combination(&[(1.0, current), (dt_seconds, tendency)])?;
                (next, current.clone())
            }
            Some(previous) => {
                if !previous.is_compatible(current) {
                    return Err(ModelError::configuration(
                        "前一时间层与当前状态的截断或网格不一致，需要先 reset",
                    ));
                }
                let next = SpectralField::linear_combination(&[
                    (1.0, previous),
                    (2.0 * dt_seconds, tendency),
                ])?;
                let nu = self.robert_coefficient;
                let filtered = SpectralField::linear_combination(&[
                    (1.0 - 2.0 * nu, current),
                    (nu, previous),
                    (nu, &next),
                ])?;
                (next, filtered)
            }
        };

        let radius = state.constants().planetary_radius;
        let flow = FlowFields::from_vorticity(next, radius)?;

        debug!(
            "蛙跳步: t = {}, dt = {}s, {}, {} 个诊断量",
            state.time,
            dt_seconds,
            if self.previous.is_none() { "前向欧拉" } else { "蛙跳" },
            diagnostics.len()
        );

        self.previous = Some(filtered);
        Ok((diagnostics, PendingState::new(state, flow)))
    }
}
