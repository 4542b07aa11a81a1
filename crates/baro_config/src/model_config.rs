// crates/baro_config/src/model_config.rs

//! ModelConfig - 模式配置
//!
//! 所有字段都有默认值，默认配置复现原驱动脚本的 T42 线性化实验：
//! Δt = 15 分钟、积分 10 天、两处 ±4e-10 的高斯强迫、14.7 天阻尼、每 6 小时输出一次。

use baro_foundation::PhysicalConstants;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::duration::parse_duration;
use crate::error::ConfigError;

/// 模式配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// 时间积分
    #[serde(default)]
    pub integration: IntegrationConfig,

    /// 超扩散
    #[serde(default)]
    pub diffusion: DiffusionConfig,

    /// 强迫
    #[serde(default)]
    pub forcing: ForcingConfig,

    /// 阻尼
    #[serde(default)]
    pub damping: DampingConfig,

    /// 初始条件
    #[serde(default)]
    pub initial: InitialConfig,

    /// 输出
    #[serde(default)]
    pub output: OutputConfig,

    /// 行星常数
    #[serde(default = "PhysicalConstants::earth")]
    pub constants: PhysicalConstants,
}

// ============================================================================
// 时间积分
// ============================================================================

/// 时间积分配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationConfig {
    /// 时间步长 [分钟]
    #[serde(default = "default_dt_minutes")]
    pub dt_minutes: f64,

    /// 积分时长 `"<天>_<时>:<分>"`
    #[serde(default = "default_duration")]
    pub duration: String,

    /// 起始时间
    #[serde(default = "default_start_time")]
    pub start_time: NaiveDateTime,

    /// 是否关于基本态线性化
    #[serde(default = "default_linearized")]
    pub linearized: bool,

    /// 三角截断阶数
    #[serde(default = "default_ntrunc")]
    pub ntrunc: usize,

    /// Robert–Asselin 滤波系数
    #[serde(default = "default_robert_coefficient")]
    pub robert_coefficient: f64,

    /// 并行求值倾向分量
    #[serde(default)]
    pub parallel_components: bool,
}

fn default_dt_minutes() -> f64 { 15.0 }
fn default_duration() -> String { "10_00:00".to_string() }
fn default_start_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2017, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}
fn default_linearized() -> bool { true }
fn default_ntrunc() -> usize { 42 }
fn default_robert_coefficient() -> f64 { 0.05 }

impl Default for IntegrationConfig {
    fn default() -> Self {
        Self {
            dt_minutes: default_dt_minutes(),
            duration: default_duration(),
            start_time: default_start_time(),
            linearized: default_linearized(),
            ntrunc: default_ntrunc(),
            robert_coefficient: default_robert_coefficient(),
            parallel_components: false,
        }
    }
}

// ============================================================================
// 物理过程
// ============================================================================

/// 超扩散配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffusionConfig {
    /// 是否启用
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// 扩散系数 [m⁴/s]
    #[serde(default = "default_diffusion_k")]
    pub k: f64,
}

fn default_true() -> bool { true }
fn default_diffusion_k() -> f64 { 2.338e16 }

impl Default for DiffusionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            k: default_diffusion_k(),
        }
    }
}

/// 高斯强迫配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForcingConfig {
    /// 是否启用
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// 中心 (纬度, 经度) [度]
    #[serde(default = "default_centerlocs")]
    pub centerlocs: Vec<(f64, f64)>,

    /// 振幅 [1/s²]
    #[serde(default = "default_amplitudes")]
    pub amplitudes: Vec<f64>,

    /// 宽度 [度]
    #[serde(default = "default_widths")]
    pub widths: Vec<f64>,
}

fn default_centerlocs() -> Vec<(f64, f64)> { vec![(35.0, 160.0), (35.0, 100.0)] }
fn default_amplitudes() -> Vec<f64> { vec![4e-10, -4e-10] }
fn default_widths() -> Vec<f64> { vec![7.0, 7.0] }

impl Default for ForcingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            centerlocs: default_centerlocs(),
            amplitudes: default_amplitudes(),
            widths: default_widths(),
        }
    }
}

/// Rayleigh 阻尼配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DampingConfig {
    /// 是否启用
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// 时间尺度 [天]
    #[serde(default = "default_tau_days")]
    pub tau_days: f64,
}

fn default_tau_days() -> f64 { 14.7 }

impl Default for DampingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tau_days: default_tau_days(),
        }
    }
}

// ============================================================================
// 初始条件
// ============================================================================

/// 初始基本态来源，扰动一律从静止开始
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InitialSource {
    /// 静止大气
    Rest,
    /// 固体旋转 u = U cosφ
    SolidBody {
        /// 赤道风速 [m/s]
        #[serde(default = "default_solid_body_speed")]
        speed: f64,
    },
    /// NetCDF 文件（变量 latitude, longitude, U200, V200）
    Netcdf {
        /// 文件路径
        path: PathBuf,
    },
}

fn default_solid_body_speed() -> f64 { 15.0 }

impl Default for InitialSource {
    fn default() -> Self {
        Self::SolidBody {
            speed: default_solid_body_speed(),
        }
    }
}

/// 初始条件配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialConfig {
    /// 来源
    #[serde(default)]
    pub source: InitialSource,

    /// 解析初值的纬度点数（规则网格，含两极）
    #[serde(default = "default_nlat")]
    pub nlat: usize,

    /// 解析初值的经度点数
    #[serde(default = "default_nlon")]
    pub nlon: usize,
}

fn default_nlat() -> usize { 91 }
fn default_nlon() -> usize { 180 }

impl Default for InitialConfig {
    fn default() -> Self {
        Self {
            source: InitialSource::default(),
            nlat: default_nlat(),
            nlon: default_nlon(),
        }
    }
}

// ============================================================================
// 输出
// ============================================================================

/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON lines，每行一个时间层
    #[default]
    Json,
    /// NetCDF（需要 `netcdf` 特性）
    Netcdf,
    /// 不写文件
    None,
}

/// 输出配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// 输出文件
    #[serde(default = "default_output_path")]
    pub path: PathBuf,

    /// 输出格式
    #[serde(default)]
    pub format: OutputFormat,

    /// 输出间隔 [小时]
    #[serde(default = "default_ncout_freq")]
    pub ncout_freq: u32,

    /// 追加到已有文件（否则覆盖）
    #[serde(default)]
    pub append: bool,

    /// 是否输出各过程倾向
    #[serde(default = "default_true")]
    pub tendency_diagnostics: bool,

    /// 日志场统计间隔 [小时]，0 表示关闭
    #[serde(default = "default_summary_freq")]
    pub summary_freq: u32,
}

fn default_output_path() -> PathBuf { PathBuf::from("barotropic_model_output.jsonl") }
fn default_ncout_freq() -> u32 { 6 }
fn default_summary_freq() -> u32 { 6 }

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            format: OutputFormat::default(),
            ncout_freq: default_ncout_freq(),
            append: false,
            tendency_diagnostics: true,
            summary_freq: default_summary_freq(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            integration: IntegrationConfig::default(),
            diffusion: DiffusionConfig::default(),
            forcing: ForcingConfig::default(),
            damping: DampingConfig::default(),
            initial: InitialConfig::default(),
            output: OutputConfig::default(),
            constants: PhysicalConstants::earth(),
        }
    }
}

// ============================================================================
// 加载、验证与派生量
// ============================================================================

impl ModelConfig {
    /// 从 JSON 文件加载并验证
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        let config = Self::from_json(&content)?;
        Ok(config)
    }

    /// 从 JSON 字符串解析并验证
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: ModelConfig =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 序列化为带缩进的 JSON
    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// 保存到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_json_pretty()?).map_err(ConfigError::Io)?;
        Ok(())
    }

    /// 时间步长（须为整秒）
    pub fn timestep(&self) -> Result<Duration, ConfigError> {
        let seconds = self.integration.dt_minutes * 60.0;
        if !(seconds.is_finite() && seconds >= 1.0) || seconds.fract() != 0.0 {
            return Err(ConfigError::invalid(
                "integration.dt_minutes",
                self.integration.dt_minutes,
                "时间步长必须为正且为整秒",
            ));
        }
        // i64 秒数上限约 9.2e18，超出时 `as` 会饱和
        if seconds >= i64::MAX as f64 {
            return Err(ConfigError::invalid(
                "integration.dt_minutes",
                self.integration.dt_minutes,
                "时间步长超出可表示范围",
            ));
        }
        Duration::try_seconds(seconds as i64).ok_or_else(|| {
            ConfigError::invalid(
                "integration.dt_minutes",
                self.integration.dt_minutes,
                "时间步长超出可表示范围",
            )
        })
    }

    /// 积分时长
    pub fn run_duration(&self) -> Result<Duration, ConfigError> {
        parse_duration(&self.integration.duration)
    }

    /// 结束时间 = 起始时间 + 时长
    pub fn end_time(&self) -> Result<NaiveDateTime, ConfigError> {
        let duration = self.run_duration()?;
        self.integration
            .start_time
            .checked_add_signed(duration)
            .ok_or_else(|| ConfigError::invalid("integration.duration", &self.integration.duration, "时间溢出"))
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.timestep()?;
        self.end_time()?;

        let integration = &self.integration;
        if integration.ntrunc == 0 {
            return Err(ConfigError::invalid("integration.ntrunc", 0, "截断阶数必须为正"));
        }
        if !(0.0..0.5).contains(&integration.robert_coefficient) {
            return Err(ConfigError::invalid(
                "integration.robert_coefficient",
                integration.robert_coefficient,
                "必须在 [0, 0.5) 内",
            ));
        }

        if self.diffusion.enabled && !(self.diffusion.k.is_finite() && self.diffusion.k >= 0.0) {
            return Err(ConfigError::invalid("diffusion.k", self.diffusion.k, "扩散系数不能为负"));
        }

        if self.forcing.enabled {
            let n = self.forcing.centerlocs.len();
            if self.forcing.amplitudes.len() != n || self.forcing.widths.len() != n {
                return Err(ConfigError::invalid(
                    "forcing",
                    format!(
                        "centerlocs={}, amplitudes={}, widths={}",
                        n,
                        self.forcing.amplitudes.len(),
                        self.forcing.widths.len()
                    ),
                    "三个列表长度必须相等",
                ));
            }
            if let Some(w) = self.forcing.widths.iter().find(|w| !(**w > 0.0)) {
                return Err(ConfigError::invalid("forcing.widths", w, "宽度必须为正"));
            }
        }

        if self.damping.enabled && !(self.damping.tau_days.is_finite() && self.damping.tau_days > 0.0) {
            return Err(ConfigError::invalid("damping.tau_days", self.damping.tau_days, "时间尺度必须为正"));
        }

        if self.output.ncout_freq == 0 && self.output.format != OutputFormat::None {
            return Err(ConfigError::invalid("output.ncout_freq", 0, "输出间隔必须为正"));
        }

        if self.initial.nlat < 2 || self.initial.nlon < 1 {
            return Err(ConfigError::invalid(
                "initial",
                format!("{}x{}", self.initial.nlat, self.initial.nlon),
                "网格过小",
            ));
        }

        self.constants
            .validate()
            .map_err(|e| ConfigError::invalid("constants", format!("{:?}", self.constants), e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ModelConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timestep().unwrap(), Duration::minutes(15));
        assert_eq!(config.run_duration().unwrap(), Duration::days(10));
        assert!(config.integration.linearized);
        assert_eq!(config.integration.ntrunc, 42);
        assert_eq!(config.forcing.amplitudes, vec![4e-10, -4e-10]);
        assert_eq!(config.output.ncout_freq, 6);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{
            "integration": { "dt_minutes": 30, "duration": "2_12:00", "linearized": false },
            "forcing": { "enabled": false },
            "initial": { "source": { "kind": "rest" } }
        }"#;
        let config = ModelConfig::from_json(json).unwrap();
        assert_eq!(config.timestep().unwrap(), Duration::minutes(30));
        assert_eq!(config.run_duration().unwrap(), Duration::hours(60));
        assert!(!config.integration.linearized);
        assert_eq!(config.integration.ntrunc, 42);
        assert!(!config.forcing.enabled);
        assert_eq!(config.initial.source, InitialSource::Rest);
        assert!((config.damping.tau_days - 14.7).abs() < 1e-12);
    }

    #[test]
    fn test_unequal_forcing_lists() {
        let mut config = ModelConfig::default();
        config.forcing.widths.pop();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
        config.forcing.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_values() {
        let mut config = ModelConfig::default();
        config.integration.dt_minutes = 0.0;
        assert!(config.validate().is_err());

        let mut config = ModelConfig::default();
        config.integration.dt_minutes = 0.25 / 60.0;
        assert!(config.timestep().is_err());

        let mut config = ModelConfig::default();
        config.integration.duration = "ten days".to_string();
        assert!(config.validate().is_err());

        let mut config = ModelConfig::default();
        config.damping.tau_days = -1.0;
        assert!(config.validate().is_err());

        let mut config = ModelConfig::default();
        config.integration.robert_coefficient = 0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_out_of_range_values_are_errors() {
        let mut config = ModelConfig::default();
        config.integration.dt_minutes = 1e300;
        assert!(matches!(
            config.timestep(),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(config.validate().is_err());

        let mut config = ModelConfig::default();
        config.integration.duration = "9999999999999999_00:00".to_string();
        assert!(matches!(
            config.run_duration(),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(config.validate().is_err());

        // 时长可表示但起始时间加上后溢出
        let mut config = ModelConfig::default();
        config.integration.duration = "100000000_00:00".to_string();
        assert!(config.run_duration().is_ok());
        assert!(config.end_time().is_err());
    }

    #[test]
    fn test_end_time() {
        let config = ModelConfig::default();
        let end = config.end_time().unwrap();
        assert_eq!(end - config.integration.start_time, Duration::days(10));
    }

    #[test]
    fn test_serialize_deserialize() {
        let config = ModelConfig::default();
        let json = config.to_json_pretty().unwrap();
        let parsed = ModelConfig::from_json(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let mut config = ModelConfig::default();
        config.initial.source = InitialSource::Netcdf {
            path: PathBuf::from("ic.nc"),
        };
        config.save_to_file(&path).unwrap();
        let loaded = ModelConfig::from_file(&path).unwrap();
        assert_eq!(loaded.initial.source, config.initial.source);

        assert!(matches!(
            ModelConfig::from_file(dir.path().join("missing.json")),
            Err(ConfigError::Io(_))
        ));
    }
}
