// crates/baro_config/src/duration.rs

//! 积分时长字符串
//!
//! 格式为 `"<天>_<时>:<分>"`，例如 `"10_00:00"` 表示 10 天，`"0_06:30"` 表示 6 小时 30 分。

use chrono::Duration;

use crate::error::ConfigError;

/// 解析时长字符串
pub fn parse_duration(text: &str) -> Result<Duration, ConfigError> {
    let invalid = |reason: &str| ConfigError::invalid("integration.duration", text, reason);

    let (days, clock) = text
        .trim()
        .split_once('_')
        .ok_or_else(|| invalid("格式应为 <天>_<时>:<分>"))?;
    let (hours, minutes) = clock
        .split_once(':')
        .ok_or_else(|| invalid("格式应为 <天>_<时>:<分>"))?;

    let parse = |part: &str, what: &str| -> Result<i64, ConfigError> {
        part.trim()
            .parse::<i64>()
            .ok()
            .filter(|v| *v >= 0)
            .ok_or_else(|| invalid(&format!("{what} 必须是非负整数")))
    };
    let days = parse(days, "天数")?;
    let hours = parse(hours, "小时")?;
    let minutes = parse(minutes, "分钟")?;
    if hours >= 24 || minutes >= 60 {
        return Err(invalid("小时须小于 24，分钟须小于 60"));
    }
    Duration::try_days(days)
        .zip(Duration::try_hours(hours))
        .zip(Duration::try_minutes(minutes))
        .and_then(|((d, h), m)| d.checked_add(&h)?.checked_add(&m))
        .ok_or_else(|| invalid("时长超出可表示范围"))
}

/// 把时长格式化为 `"<天>_<时>:<分>"`（不足一分钟的部分舍去）
pub fn format_duration(duration: Duration) -> String {
    let total_minutes = duration.num_minutes();
    let days = total_minutes / (24 * 60);
    let hours = (total_minutes % (24 * 60)) / 60;
    let minutes = total_minutes % 60;
    format!("{days}_{hours:02}:{minutes:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("10_00:00").unwrap(), Duration::days(10));
        assert_eq!(
            parse_duration("0_06:30").unwrap(),
            Duration::hours(6) + Duration::minutes(30)
        );
        assert_eq!(parse_duration("2_23:59").unwrap().num_minutes(), 2 * 1440 + 23 * 60 + 59);
    }

    #[test]
    fn test_parse_duration_errors() {
        for bad in ["10", "10_00", "x_00:00", "1_25:00", "1_00:60", "-1_00:00", ""] {
            assert!(parse_duration(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn test_parse_duration_out_of_range() {
        let err = parse_duration("9999999999999999_00:00").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        assert!(parse_duration("106751991168_00:00").is_err());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::days(10)), "10_00:00");
        assert_eq!(format_duration(Duration::minutes(90)), "0_01:30");
    }
}
