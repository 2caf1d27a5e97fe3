//! 报告周期与触发判定

use chrono::{DateTime, Datelike, Duration, Months, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Cadence {
    Daily,
    Weekly,
    Monthly,
}

impl Cadence {
    /// 在 `now` 这个整点是否应当触发
    pub fn is_due(self, now: DateTime<Utc>) -> bool {
        if now.hour() != 0 {
            return false;
        }
        match self {
            Cadence::Daily => true,
            Cadence::Weekly => now.weekday() == Weekday::Mon,
            Cadence::Monthly => now.day() == 1,
        }
    }

    /// 以 `now` 结尾的统计周期起点
    pub fn period_start(self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Cadence::Daily => now - Duration::days(1),
            Cadence::Weekly => now - Duration::weeks(1),
            Cadence::Monthly => now
                .checked_sub_months(Months::new(1))
                .unwrap_or(now - Duration::days(30)),
        }
    }

    /// 邮件标题里的周期名
    pub fn label(self) -> &'static str {
        match self {
            Cadence::Daily => "Daily",
            Cadence::Weekly => "Weekly",
            Cadence::Monthly => "Monthly",
        }
    }
}

/// 当前时刻需要发送的所有周期，按 daily/weekly/monthly 顺序
pub fn due_cadences(now: DateTime<Utc>) -> Vec<Cadence> {
    Cadence::iter().filter(|c| c.is_due(now)).collect()
}
