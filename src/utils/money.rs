//! 货币金额
//!
//! 所有金额都以最小货币单位（分）的整数保存，`i64` 范围内的求和与比较都是精确的。
//! 从 JSON 解析时读取数字的十进制文本，不经过 `f64` 运算。

use std::fmt;
use std::iter::Sum;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::{DomainfolioError, Result};

/// 每个主货币单位包含的分数
const MINOR_PER_MAJOR: i64 = 100;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Cents(i64);

impl Cents {
    pub const ZERO: Cents = Cents(0);

    pub const fn new(minor: i64) -> Self {
        Cents(minor)
    }

    /// 由整数主单位构造（如 250 美元）
    pub fn from_major(major: i64) -> Option<Self> {
        major.checked_mul(MINOR_PER_MAJOR).map(Cents)
    }

    pub const fn minor_units(self) -> i64 {
        self.0
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn checked_add(self, other: Cents) -> Option<Cents> {
        self.0.checked_add(other.0).map(Cents)
    }

    /// 解析十进制金额文本，如 `250`、`99.9`、`-1.25`
    ///
    /// 超过两位小数或使用科学计数法的输入会被拒绝，避免悄悄丢失精度。
    pub fn parse_decimal(input: &str) -> Result<Self> {
        let text = input.trim();
        let invalid = || DomainfolioError::validation(format!("Invalid amount: '{}'", input));

        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };

        let (whole, fraction) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if !whole.bytes().all(|b| b.is_ascii_digit())
            || !fraction.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        // "100.0" 这类尾随 0 不算额外精度
        let fraction = fraction.trim_end_matches('0');
        if fraction.len() > 2 {
            return Err(DomainfolioError::validation(format!(
                "Amount '{}' has more precision than the smallest currency unit",
                input
            )));
        }

        let whole_value: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let fraction_value: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => fraction.parse().map_err(|_| invalid())?,
        };

        let minor = whole_value
            .checked_mul(MINOR_PER_MAJOR)
            .and_then(|v| v.checked_add(fraction_value))
            .ok_or_else(invalid)?;

        Ok(Cents(if negative { -minor } else { minor }))
    }

    /// 从 JSON 值解析金额，接受数字或数字字符串
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::Number(n) => Self::parse_decimal(&n.to_string()),
            serde_json::Value::String(s) => Self::parse_decimal(s),
            other => Err(DomainfolioError::validation(format!(
                "Amount must be a number, got: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for Cents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let per_major = MINOR_PER_MAJOR.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / per_major, abs % per_major)
    }
}

/// 溢出时截断到 `i64` 边界并记录警告
impl Sum for Cents {
    fn sum<I: Iterator<Item = Cents>>(iter: I) -> Self {
        let mut total = 0i64;
        let mut overflowed = false;
        for c in iter {
            total = match total.checked_add(c.0) {
                Some(v) => v,
                None => {
                    overflowed = true;
                    total.saturating_add(c.0)
                }
            };
        }
        if overflowed {
            warn!("Cents sum overflowed i64, clamped to {}", total);
        }
        Cents(total)
    }
}

impl<'a> Sum<&'a Cents> for Cents {
    fn sum<I: Iterator<Item = &'a Cents>>(iter: I) -> Self {
        iter.copied().sum()
    }
}
