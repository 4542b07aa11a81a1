// crates/baro_io/src/monitors/snapshot.rs

//! JSON lines 快照输出
//!
//! 每次保存写出一行 `{time, latitude, longitude, fields}`，字段按
//! [`AtmosphericState::named_fields`] 的顺序排列（状态场在前，诊断量在后）。

use baro_physics::{AtmosphericState, Monitor, MonitorError};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{IoError, IoResult};

/// 单个时间层的快照记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    /// 模式时间
    pub time: NaiveDateTime,
    /// 纬度 [度]
    pub latitude: Vec<f64>,
    /// 经度 [度]
    pub longitude: Vec<f64>,
    /// 命名格点场，按行（纬度）存储
    pub fields: BTreeMap<String, Vec<Vec<f64>>>,
}

impl SnapshotRecord {
    /// 从状态生成记录
    pub fn from_state(state: &AtmosphericState) -> IoResult<Self> {
        let fields = state
            .named_fields()?
            .into_iter()
            .map(|(name, values)| {
                let rows = values.outer_iter().map(|row| row.to_vec()).collect();
                (name, rows)
            })
            .collect();
        Ok(Self {
            time: state.time,
            latitude: state.latitudes().to_vec(),
            longitude: state.longitudes().to_vec(),
            fields,
        })
    }

    /// 场名
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    /// 某个场在 (j, i) 处的值
    pub fn value(&self, name: &str, j: usize, i: usize) -> Option<f64> {
        self.fields.get(name)?.get(j)?.get(i).copied()
    }
}

/// JSON lines 快照监视器
///
/// 创建时决定覆盖还是追加：`append = false` 时截断已有文件。
pub struct SnapshotMonitor {
    path: PathBuf,
    writer: BufWriter<File>,
    records: usize,
}

impl SnapshotMonitor {
    /// 创建监视器
    pub fn create(path: impl AsRef<Path>, append: bool) -> IoResult<Self> {
        let path = path.as_ref().to_path_buf();
        if !append && path.exists() {
            info!("覆盖已有输出: {}", path.display());
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(&path)
            .map_err(|e| IoError::file(&path, e))?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            records: 0,
        })
    }

    /// 输出路径
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 本监视器已写出的记录数
    pub fn records(&self) -> usize {
        self.records
    }

    /// 写出一条记录
    pub fn write(&mut self, state: &AtmosphericState) -> IoResult<()> {
        let record = SnapshotRecord::from_state(state)?;
        serde_json::to_writer(&mut self.writer, &record)?;
        self.writer
            .write_all(b"\n")
            .and_then(|_| self.writer.flush())
            .map_err(|e| IoError::file(&self.path, e))?;
        self.records += 1;
        debug!("快照 {} 写入 {}", state.time, self.path.display());
        Ok(())
    }
}

impl Monitor for SnapshotMonitor {
    fn name(&self) -> &str {
        "snapshot"
    }

    fn store(&mut self, state: &AtmosphericState) -> Result<(), MonitorError> {
        Ok(self.write(state)?)
    }
}

/// 读取 JSON lines 快照文件
pub fn read_snapshots(path: impl AsRef<Path>) -> IoResult<Vec<SnapshotRecord>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| IoError::file(path, e))?;
    let mut records = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| IoError::file(path, e))?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|e| IoError::ParseError {
            file: path.display().to_string(),
            line: idx + 1,
            message: e.to_string(),
        })?;
        records.push(record);
    }
    Ok(records)
}
