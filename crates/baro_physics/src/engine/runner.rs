// crates/baro_physics/src/engine/runner.rs

//! 模式运行器
//!
//! 驱动循环：
//!
//! ```text
//! while state.time <= end:
//!     (diagnostics, next) = stepper.step(state, dt)
//!     state = state.with_diagnostics(diagnostics)
//!     按各自频率调用监视器 store(state)
//!     state = next.advance(dt)
//! ```

use std::time::Instant;

use baro_foundation::error::ModelError;
use chrono::{Duration, NaiveDateTime};
use thiserror::Error;

use super::leapfrog::LeapfrogStepper;
use crate::state::AtmosphericState;

/// 监视器返回的错误
pub type MonitorError = Box<dyn std::error::Error + Send + Sync>;

/// 运行错误
#[derive(Debug, Error)]
pub enum RunError {
    /// 某一步计算失败
    #[error("{time} 时刻积分失败: {source}")]
    Step {
        /// 失败步的模式时间
        time: NaiveDateTime,
        /// 原始错误
        #[source]
        source: ModelError,
    },

    /// 监视器写出失败
    #[error("监视器 '{name}' 在 {time} 时刻写出失败: {source}")]
    Monitor {
        /// 监视器名称
        name: String,
        /// 模式时间
        time: NaiveDateTime,
        /// 原始错误
        #[source]
        source: MonitorError,
    },

    /// 运行参数非法
    #[error("运行参数错误: {0}")]
    Setup(String),
}

impl RunError {
    /// 出错分量名称（若为分量错误）
    pub fn component(&self) -> Option<&str> {
        match self {
            Self::Step { source, .. } => source.component(),
            _ => None,
        }
    }
}

/// 状态监视器
///
/// 由驱动循环按输出频率调用；核心本身不做任何 I/O。
pub trait Monitor: Send {
    /// 名称（用于日志与错误）
    fn name(&self) -> &str;

    /// 保存一个状态
    fn store(&mut self, state: &AtmosphericState) -> Result<(), MonitorError>;
}

/// 是否在该时刻输出
///
/// 以整秒计算距起始的时间，恰为 `freq_hours` 小时整数倍时输出；
/// 含小数秒或频率为 0 时不输出。
pub fn should_store(elapsed: Duration, freq_hours: u32) -> bool {
    if freq_hours == 0 || elapsed < Duration::zero() {
        return false;
    }
    if elapsed.num_milliseconds() % 1000 != 0 {
        return false;
    }
    elapsed.num_seconds() % (i64::from(freq_hours) * 3600) == 0
}

/// 运行统计
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// 起始时间
    pub start: NaiveDateTime,
    /// 最后完成的时间层
    pub end: NaiveDateTime,
    /// 完成步数
    pub steps: u64,
    /// 监视器写出次数（所有监视器合计）
    pub stores: u64,
    /// 墙钟时间 [s]
    pub wall_seconds: f64,
}

struct MonitorSlot {
    monitor: Box<dyn Monitor>,
    freq_hours: u32,
}

/// 模式运行器
pub struct ModelRunner {
    stepper: LeapfrogStepper,
    monitors: Vec<MonitorSlot>,
}

impl ModelRunner {
    /// 创建运行器
    pub fn new(stepper: LeapfrogStepper) -> Self {
        Self {
            stepper,
            monitors: Vec::new(),
        }
    }

    /// 添加监视器，每 `freq_hours` 小时输出一次
    pub fn with_monitor(mut self, monitor: Box<dyn Monitor>, freq_hours: u32) -> Self {
        self.monitors.push(MonitorSlot {
            monitor,
            freq_hours,
        });
        self
    }

    /// 步进器
    pub fn stepper(&self) -> &LeapfrogStepper {
        &self.stepper
    }

    /// 监视器名称
    pub fn monitor_names(&self) -> Vec<&str> {
        self.monitors.iter().map(|m| m.monitor.name()).collect()
    }

    /// 从初始状态积分到 `end`（含），返回末状态（时间已越过 `end`）与统计
    pub fn run(
        &mut self,
        initial: AtmosphericState,
        dt: Duration,
        end: NaiveDateTime,
    ) -> Result<(AtmosphericState, RunSummary), RunError> {
        if dt <= Duration::zero() {
            return Err(RunError::Setup(format!("时间步长必须为正: {dt}")));
        }
        let start = initial.time;
        if end < start {
            return Err(RunError::Setup(format!("结束时间 {end} 早于起始时间 {start}")));
        }

        tracing::info!(
            "开始积分: {} -> {} (dt = {}s, 分量: {}, 监视器: {})",
            start,
            end,
            dt.num_seconds(),
            self.stepper.component_names().join(", "),
            self.monitor_names().join(", ")
        );

        let wall = Instant::now();
        let mut state = initial;
        let mut steps = 0u64;
        let mut stores = 0u64;
        let mut last = start;

        while state.time <= end {
            let time = state.time;
            let (diagnostics, pending) = self
                .stepper
                .step(&state, dt)
                .map_err(|source| RunError::Step { time, source })?;
            let stored = state
                .with_diagnostics(diagnostics)
                .map_err(|source| RunError::Step { time, source })?;

            let elapsed = time - start;
            for slot in &mut self.monitors {
                if should_store(elapsed, slot.freq_hours) {
                    slot.monitor
                        .store(&stored)
                        .map_err(|source| RunError::Monitor {
                            name: slot.monitor.name().to_string(),
                            time,
                            source,
                        })?;
                    stores += 1;
                    tracing::info!("{}: 已输出 {}", slot.monitor.name(), time);
                }
            }

            state = pending
                .advance(dt)
                .map_err(|source| RunError::Step { time, source })?;
            last = time;
            steps += 1;
        }

        let summary = RunSummary {
            start,
            end: last,
            steps,
            stores,
            wall_seconds: wall.elapsed().as_secs_f64(),
        };
        tracing::info!(
            "积分完成: {} 步, {} 次输出, 用时 {:.2}s",
            summary.steps,
            summary.stores,
            summary.wall_seconds
        );
        Ok((state, summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cadence() {
        for h in [0, 6, 12, 18, 24, 48] {
            assert!(should_store(Duration::hours(h), 6), "{h}h");
        }
        for h in [3, 9, 15] {
            assert!(!should_store(Duration::hours(h), 6), "{h}h");
        }
        assert!(!should_store(Duration::minutes(15), 6));
        assert!(!should_store(Duration::hours(6) + Duration::milliseconds(500), 6));
        assert!(!should_store(Duration::hours(6), 0));
    }

    #[test]
    fn test_cadence_across_days() {
        assert!(should_store(Duration::days(1) + Duration::hours(6), 6));
        assert!(should_store(Duration::days(10), 24));
        assert!(!should_store(Duration::days(1) + Duration::hours(6), 24));
    }
}
