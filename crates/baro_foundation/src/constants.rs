// crates/baro_foundation/src/constants.rs

//! 物理常数
//!
//! 行星常数在启动时解析一次，之后显式传入需要它们的分量（动力、扩散、状态构造），
//! 计算过程中不再做任何全局查找。

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// 地球平均半径 [m]
pub const EARTH_RADIUS: f64 = 6.371_22e6;

/// 地球自转角速度 [rad/s]
pub const EARTH_ROTATION_RATE: f64 = 7.292e-5;

/// 一天的秒数
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// 行星常数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalConstants {
    /// 行星半径 [m]
    #[serde(default = "default_radius")]
    pub planetary_radius: f64,
    /// 行星自转角速度 [s^-1]
    #[serde(default = "default_rotation_rate")]
    pub planetary_rotation_rate: f64,
}

fn default_radius() -> f64 {
    EARTH_RADIUS
}
fn default_rotation_rate() -> f64 {
    EARTH_ROTATION_RATE
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self::earth()
    }
}

impl PhysicalConstants {
    /// 地球常数
    pub const fn earth() -> Self {
        Self {
            planetary_radius: EARTH_RADIUS,
            planetary_rotation_rate: EARTH_ROTATION_RATE,
        }
    }

    /// 按名称查找常数
    ///
    /// 支持 `planetary_radius` 与 `planetary_rotation_rate`，其余名称返回配置错误。
    pub fn lookup(&self, name: &str) -> ModelResult<f64> {
        match name {
            "planetary_radius" => Ok(self.planetary_radius),
            "planetary_rotation_rate" => Ok(self.planetary_rotation_rate),
            other => Err(ModelError::configuration(format!("未知常数: {other}"))),
        }
    }

    /// 科氏参数 f = 2Ω sin(φ)
    #[inline]
    pub fn coriolis(&self, lat_rad: f64) -> f64 {
        2.0 * self.planetary_rotation_rate * lat_rad.sin()
    }

    /// 验证常数为正的有限值
    pub fn validate(&self) -> ModelResult<()> {
        if !(self.planetary_radius.is_finite() && self.planetary_radius > 0.0) {
            return Err(ModelError::configuration(format!(
                "planetary_radius 必须为正: {}",
                self.planetary_radius
            )));
        }
        if !self.planetary_rotation_rate.is_finite() {
            return Err(ModelError::configuration("planetary_rotation_rate 必须为有限值"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let c = PhysicalConstants::earth();
        assert_eq!(c.lookup("planetary_radius").unwrap(), EARTH_RADIUS);
        assert_eq!(c.lookup("planetary_rotation_rate").unwrap(), EARTH_ROTATION_RATE);
        assert!(c.lookup("gravitational_acceleration").is_err());
    }

    #[test]
    fn test_coriolis_equator_and_pole() {
        let c = PhysicalConstants::earth();
        assert!(c.coriolis(0.0).abs() < 1e-20);
        let f_pole = c.coriolis(std::f64::consts::FRAC_PI_2);
        assert!((f_pole - 2.0 * EARTH_ROTATION_RATE).abs() < 1e-15);
    }

    #[test]
    fn test_serde_defaults() {
        let c: PhysicalConstants = serde_json::from_str("{}").unwrap();
        assert_eq!(c, PhysicalConstants::earth());
    }

    #[test]
    fn test_validate() {
        let mut c = PhysicalConstants::earth();
        assert!(c.validate().is_ok());
        c.planetary_radius = -1.0;
        assert!(c.validate().is_err());
    }
}
