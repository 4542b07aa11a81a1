// crates/baro_physics/src/tendency/wrapper.rs

//! 诊断量重命名包装器
//!
//! 把内层分量的每个诊断量 `name` 改名为 `"{label}_{name}"`，倾向原样透传。
//! 启用 `with_tendency_diagnostics` 后，每个倾向的格点值额外以
//! `"{label}_{name}_tendency"` 写入诊断量。包装器可以嵌套。

use baro_foundation::error::ModelResult;

use super::traits::{Diagnostics, TendencyOutput, TendencyTerm};
use super::TendencyComponent;
use crate::state::AtmosphericState;

/// 诊断包装器
#[derive(Debug)]
pub struct DiagnosticWrapper {
    inner: Box<TendencyComponent>,
    label: String,
    tendency_diagnostics: bool,
}

impl DiagnosticWrapper {
    /// 用标签包装分量
    pub fn new(inner: TendencyComponent, label: impl Into<String>) -> Self {
        Self {
            inner: Box::new(inner),
            label: label.into(),
            tendency_diagnostics: false,
        }
    }

    /// 同时把倾向作为诊断量输出
    pub fn with_tendency_diagnostics(mut self) -> Self {
        self.tendency_diagnostics = true;
        self
    }
}

impl TendencyTerm for DiagnosticWrapper {
    fn name(&self) -> &str {
        &self.label
    }

    fn evaluate(&self, state: &AtmosphericState) -> ModelResult<TendencyOutput> {
        let (tendencies, diagnostics) = self
            .inner
            .evaluate(state)
            .map_err(|e| e.in_component(self.inner.name()))?;

        let mut renamed: Diagnostics = diagnostics
            .into_iter()
            .map(|(name, values)| (format!("{}_{}", self.label, name), values))
            .collect();

        if self.tendency_diagnostics {
            for (name, field) in tendencies.iter() {
                let mut field = field.clone();
                field.synchronize()?;
                renamed.insert(format!("{}_{}_tendency", self.label, name), field.grid()?.clone());
            }
        }

        Ok((tendencies, renamed))
    }
}
