// crates/baro_io/src/lib.rs

//! Barotropy IO Layer
//!
//! 模式的输入输出：初始条件与输出监视器。数值核心不做 I/O，
//! 本层的监视器由驱动循环调用。
//!
//! # 模块概览
//!
//! - [`initial`]: 初始风场（静止、固体旋转、NetCDF）
//! - [`monitors`]: JSON lines 快照、日志统计、NetCDF 输出
//! - [`error`]: IO 错误类型
//!
//! # 特性
//!
//! - `netcdf`: 启用 NetCDF 读写，需要系统安装 NetCDF 库

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod initial;
pub mod monitors;

pub use error::{IoError, IoResult};
pub use initial::InitialConditions;
#[cfg(feature = "netcdf")]
pub use monitors::NetCdfMonitor;
pub use monitors::{read_snapshots, FieldStatistics, SnapshotMonitor, SnapshotRecord, SummaryMonitor};
