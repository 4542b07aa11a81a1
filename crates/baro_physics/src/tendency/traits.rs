// crates/baro_physics/src/tendency/traits.rs

//! 倾向分量 Trait 定义
//!
//! 每个分量是状态的纯函数：`evaluate(state) -> (倾向, 诊断量)`，不持有可变状态。

use std::collections::btree_map;
use std::collections::BTreeMap;

use baro_foundation::error::{ModelError, ModelResult};
use baro_spectral::SpectralField;
use ndarray::Array2;

use crate::state::AtmosphericState;

/// 唯一的预报量
pub const VORTICITY: &str = "vorticity";

/// 可作为倾向目标的预报量名称
pub const PROGNOSTIC_NAMES: &[&str] = &[VORTICITY];

/// 线性 / 非线性形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formulation {
    /// 关于固定基本态线性化，演化扰动
    Linear,
    /// 演化全场
    Nonlinear,
}

impl Formulation {
    /// 由线性化标志得到形式
    pub fn from_linearized(linearized: bool) -> Self {
        if linearized {
            Self::Linear
        } else {
            Self::Nonlinear
        }
    }

    /// 是否线性
    pub fn is_linear(self) -> bool {
        matches!(self, Self::Linear)
    }

    /// 检查分量形式与状态一致
    pub fn check_state(self, component: &str, state: &AtmosphericState) -> ModelResult<()> {
        if self.is_linear() != state.is_linearized() {
            return Err(ModelError::configuration(format!(
                "{component} 为 {self:?} 形式，但状态{}线性化",
                if state.is_linearized() { "已" } else { "未" }
            )));
        }
        Ok(())
    }
}

// ============================================================================
// 倾向集合
// ============================================================================

/// 预报量名 → 谱空间倾向 [1/s²]
#[derive(Debug, Clone, Default)]
pub struct TendencySet {
    fields: BTreeMap<String, SpectralField>,
}

impl TendencySet {
    /// 空集合
    pub fn new() -> Self {
        Self::default()
    }

    /// 仅含单个目标的集合
    pub fn single(name: impl Into<String>, field: SpectralField) -> Self {
        let mut set = Self::new();
        set.fields.insert(name.into(), field);
        set
    }

    /// 获取某目标的倾向
    pub fn get(&self, name: &str) -> Option<&SpectralField> {
        self.fields.get(name)
    }

    /// 目标名称
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// 遍历
    pub fn iter(&self) -> impl Iterator<Item = (&String, &SpectralField)> {
        self.fields.iter()
    }

    /// 把另一个集合累加进来；同一目标形状或截断不兼容时报名称冲突
    ///
    /// `first` 与 `second` 只用于错误信息。
    pub fn accumulate(&mut self, other: TendencySet, first: &str, second: &str) -> ModelResult<()> {
        for (name, field) in other.fields {
            match self.fields.get_mut(&name) {
                Some(existing) => {
                    if !existing.is_compatible(&field) {
                        return Err(ModelError::name_collision(name, first, second));
                    }
                    existing.add_assign_spectral(&field)?;
                }
                None => {
                    self.fields.insert(name, field);
                }
            }
        }
        Ok(())
    }
}

impl IntoIterator for TendencySet {
    type Item = (String, SpectralField);
    type IntoIter = btree_map::IntoIter<String, SpectralField>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

// ============================================================================
// 诊断量
// ============================================================================

/// 诊断量名称 → 格点场
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    fields: BTreeMap<String, Array2<f64>>,
}

impl Diagnostics {
    /// 空集合
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入（覆盖同名）
    pub fn insert(&mut self, name: String, values: Array2<f64>) {
        self.fields.insert(name, values);
    }

    /// 获取
    pub fn get(&self, name: &str) -> Option<&Array2<f64>> {
        self.fields.get(name)
    }

    /// 是否包含
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// 个数
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// 名称
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// 遍历
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Array2<f64>)> {
        self.fields.iter()
    }
}

impl IntoIterator for Diagnostics {
    type Item = (String, Array2<f64>);
    type IntoIter = btree_map::IntoIter<String, Array2<f64>>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl FromIterator<(String, Array2<f64>)> for Diagnostics {
    fn from_iter<I: IntoIterator<Item = (String, Array2<f64>)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

// ============================================================================
// 分量接口
// ============================================================================

/// 分量求值结果
pub type TendencyOutput = (TendencySet, Diagnostics);

/// 倾向分量 Trait
pub trait TendencyTerm: Send + Sync {
    /// 分量名称（用于错误归属与日志）
    fn name(&self) -> &str;

    /// 由状态计算倾向与诊断量
    fn evaluate(&self, state: &AtmosphericState) -> ModelResult<TendencyOutput>;
}
