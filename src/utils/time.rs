//! 时间戳解析
//!
//! 报价记录的时间戳可能是 RFC3339 文本，也可能是毫秒级 Unix 时间戳。

use chrono::{DateTime, TimeZone, Utc};

use crate::errors::{DomainfolioError, Result};

/// 解析 RFC3339 文本或毫秒时间戳字符串
pub fn parse_instant(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(millis) = input.parse::<i64>() {
        return from_millis(millis);
    }

    Err(DomainfolioError::validation(format!(
        "Invalid timestamp: '{}'. Expected RFC3339 or epoch milliseconds",
        input
    )))
}

/// 从 JSON 值解析时间戳
pub fn parse_json_instant(value: &serde_json::Value) -> Result<DateTime<Utc>> {
    match value {
        serde_json::Value::String(s) => parse_instant(s),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(millis) => from_millis(millis),
            None => Err(DomainfolioError::validation(format!(
                "Timestamp must be integer milliseconds, got: {}",
                n
            ))),
        },
        other => Err(DomainfolioError::validation(format!(
            "Timestamp must be a string or number, got: {}",
            other
        ))),
    }
}

fn from_millis(millis: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single().ok_or_else(|| {
        DomainfolioError::validation(format!("Timestamp out of range: {}", millis))
    })
}
