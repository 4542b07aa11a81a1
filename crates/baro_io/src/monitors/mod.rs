// crates/baro_io/src/monitors/mod.rs

//! 状态监视器
//!
//! 实现 [`baro_physics::Monitor`]，由驱动循环按输出频率调用。
//!
//! - [`SnapshotMonitor`]: JSON lines 快照
//! - [`SummaryMonitor`]: 日志统计
//! - `NetCdfMonitor`: NetCDF 输出（需要 `netcdf` 特性）

#[cfg(feature = "netcdf")]
mod netcdf_output;
mod snapshot;
mod summary;

#[cfg(feature = "netcdf")]
pub use netcdf_output::NetCdfMonitor;
pub use snapshot::{read_snapshots, SnapshotMonitor, SnapshotRecord};
pub use summary::{FieldStatistics, SummaryMonitor};
