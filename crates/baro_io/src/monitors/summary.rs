// crates/baro_io/src/monitors/summary.rs

//! 日志统计监视器：每次保存时输出各场的最小值、最大值与均方根

use baro_physics::{AtmosphericState, Monitor, MonitorError};
use chrono::NaiveDateTime;
use ndarray::Array2;
use tracing::info;

use crate::error::IoResult;

/// 单个场的统计量
#[derive(Debug, Clone, PartialEq)]
pub struct FieldStatistics {
    /// 场名
    pub name: String,
    /// 最小值
    pub min: f64,
    /// 最大值
    pub max: f64,
    /// 均方根（格点等权）
    pub rms: f64,
}

impl FieldStatistics {
    /// 计算统计量
    pub fn of(name: impl Into<String>, values: &Array2<f64>) -> Self {
        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| (lo.min(x), hi.max(x)));
        let n = values.len().max(1) as f64;
        let rms = (values.iter().map(|x| x * x).sum::<f64>() / n).sqrt();
        Self {
            name: name.into(),
            min,
            max,
            rms,
        }
    }
}

/// 日志统计监视器
#[derive(Debug, Default)]
pub struct SummaryMonitor {
    last: Option<(NaiveDateTime, Vec<FieldStatistics>)>,
}

impl SummaryMonitor {
    /// 创建监视器
    pub fn new() -> Self {
        Self::default()
    }

    /// 最近一次保存的统计量
    pub fn last(&self) -> Option<&(NaiveDateTime, Vec<FieldStatistics>)> {
        self.last.as_ref()
    }

    /// 统计并记录到日志
    pub fn summarize(&mut self, state: &AtmosphericState) -> IoResult<&[FieldStatistics]> {
        let stats: Vec<FieldStatistics> = state
            .named_fields()?
            .iter()
            .map(|(name, values)| FieldStatistics::of(name.as_str(), values))
            .collect();
        for s in &stats {
            info!(
                "{} {:<28} min={:+.4e} max={:+.4e} rms={:.4e}",
                state.time, s.name, s.min, s.max, s.rms
            );
        }
        let (_, stored) = self.last.insert((state.time, stats));
        Ok(stored.as_slice())
    }
}

impl Monitor for SummaryMonitor {
    fn name(&self) -> &str {
        "summary"
    }

    fn store(&mut self, state: &AtmosphericState) -> Result<(), MonitorError> {
        self.summarize(state)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_statistics() {
        let values = Array2::from_shape_vec((2, 2), vec![3.0, -4.0, 0.0, 0.0]).unwrap();
        let s = FieldStatistics::of("x", &values);
        assert_eq!(s.min, -4.0);
        assert_eq!(s.max, 3.0);
        assert!((s.rms - 2.5).abs() < 1e-12);
    }
}
