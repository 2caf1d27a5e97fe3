use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::Cents;

/// 报告接收人
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
}

/// 用户名下的一个域名
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainRecord {
    pub name: String,
    pub user_id: String,
    /// 报价通知阈值，0 表示未设置
    pub threshold: Cents,
    pub subscription_id: Option<String>,
    #[serde(default)]
    pub nameservers: Vec<String>,
}

/// 第三方对域名的一次报价，金额恒为正
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    pub email: String,
    pub amount: Cents,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub timestamp: DateTime<Utc>,
}
