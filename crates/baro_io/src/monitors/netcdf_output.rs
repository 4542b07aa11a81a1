// crates/baro_io/src/monitors/netcdf_output.rs

//! NetCDF 输出
//!
//! 维度 `(time, latitude, longitude)`，每个命名场一个变量；时间以
//! `seconds since 1970-01-01 00:00:00` 存储，便于多次运行追加到同一文件。
//! 每次保存时重新打开文件，监视器本身不持有句柄。

use baro_physics::{AtmosphericState, Monitor, MonitorError};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{IoError, IoResult};

const TIME_DIM: &str = "time";
const LAT_DIM: &str = "latitude";
const LON_DIM: &str = "longitude";
const TIME_UNITS: &str = "seconds since 1970-01-01 00:00:00";

/// NetCDF 监视器
pub struct NetCdfMonitor {
    path: PathBuf,
    records: usize,
}

impl NetCdfMonitor {
    /// 创建监视器
    ///
    /// `append = false` 时删除已有文件；追加时在首次写入时检查网格是否一致。
    pub fn create(path: impl AsRef<Path>, append: bool) -> IoResult<Self> {
        let path = path.as_ref().to_path_buf();
        if !append && path.exists() {
            std::fs::remove_file(&path).map_err(|e| IoError::file(&path, e))?;
            info!("删除已有输出: {}", path.display());
        }
        Ok(Self { path, records: 0 })
    }

    /// 输出路径
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 本监视器已写出的时间层数
    pub fn records(&self) -> usize {
        self.records
    }

    fn open(&self, state: &AtmosphericState) -> IoResult<netcdf::MutableFile> {
        let (nlat, nlon) = state.shape();
        if !self.path.exists() {
            let mut file = netcdf::create(&self.path)?;
            file.add_unlimited_dimension(TIME_DIM)?;
            file.add_dimension(LAT_DIM, nlat)?;
            file.add_dimension(LON_DIM, nlon)?;

            let mut time = file.add_variable::<f64>(TIME_DIM, &[TIME_DIM])?;
            time.put_attribute("units", TIME_UNITS)?;

            let mut lat = file.add_variable::<f64>(LAT_DIM, &[LAT_DIM])?;
            lat.put_attribute("units", "degrees_north")?;
            lat.put_values(state.latitudes(), [0..nlat].as_slice())?;

            let mut lon = file.add_variable::<f64>(LON_DIM, &[LON_DIM])?;
            lon.put_attribute("units", "degrees_east")?;
            lon.put_values(state.longitudes(), [0..nlon].as_slice())?;
            return Ok(file);
        }

        let file = netcdf::append(&self.path)?;
        for (dim, expected) in [(LAT_DIM, nlat), (LON_DIM, nlon)] {
            let actual = file.dimension(dim).map(|d| d.len());
            if actual != Some(expected) {
                return Err(IoError::IncompatibleOutput {
                    file: self.path.display().to_string(),
                    reason: format!("维度 {dim} 为 {actual:?}, 期望 {expected}"),
                });
            }
        }
        Ok(file)
    }

    /// 写出一个时间层
    pub fn write(&mut self, state: &AtmosphericState) -> IoResult<()> {
        let (nlat, nlon) = state.shape();
        let mut file = self.open(state)?;
        let t = file.dimension(TIME_DIM).map(|d| d.len()).unwrap_or(0);

        let seconds = state.time.and_utc().timestamp() as f64;
        let mut time = file
            .variable_mut(TIME_DIM)
            .ok_or_else(|| IoError::MissingVariable {
                file: self.path.display().to_string(),
                variable: TIME_DIM.to_string(),
            })?;
        time.put_values(&[seconds], [t..t + 1].as_slice())?;

        let extents = vec![t..t + 1, 0..nlat, 0..nlon];
        for (name, values) in state.named_fields()? {
            if file.variable(&name).is_none() {
                file.add_variable::<f64>(&name, &[TIME_DIM, LAT_DIM, LON_DIM])?;
            }
            let mut var = file
                .variable_mut(&name)
                .ok_or_else(|| IoError::MissingVariable {
                    file: self.path.display().to_string(),
                    variable: name.clone(),
                })?;
            let data: Vec<f64> = values.iter().copied().collect();
            var.put_values(&data, extents.as_slice())?;
        }

        self.records += 1;
        debug!("NetCDF 时间层 {} 写入 {} (索引 {})", state.time, self.path.display(), t);
        Ok(())
    }
}

impl Monitor for NetCdfMonitor {
    fn name(&self) -> &str {
        "netcdf"
    }

    fn store(&mut self, state: &AtmosphericState) -> Result<(), MonitorError> {
        Ok(self.write(state)?)
    }
}
