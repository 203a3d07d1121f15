use anyhow::Result;
use time::macros::format_description;
use time::OffsetDateTime;

/// 当前 unix 时间戳（秒）
pub fn unix_timestamp() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

/// 时间戳格式化，用于日志展示
#[allow(dead_code)]
pub fn format_timestamp(ts: i64) -> Result<String> {
    let dt = OffsetDateTime::from_unix_timestamp(ts)?;
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    Ok(dt.format(&format)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_known_timestamp() {
        assert_eq!(format_timestamp(0).unwrap(), "1970-01-01 00:00:00");
    }
}
