//! 报告通知发送
//!
//! - `email`：通过 HTTP 邮件 API（Resend 兼容）发送
//! - `log`：只写日志，用于演练和本地调试

mod email;
mod log;
pub mod render;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use crate::config::{NotificationConfig, NotificationProvider};
use crate::errors::Result;

pub use email::EmailNotifier;
pub use log::LogNotifier;
pub use render::render_report;

/// 渲染完成、待发送的一封报告
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<()>;

    fn name(&self) -> &'static str;
}

/// 根据配置创建发送器
pub fn create_notifier(config: &NotificationConfig) -> Result<Arc<dyn Notifier>> {
    let notifier: Arc<dyn Notifier> = match config.provider {
        NotificationProvider::Email => Arc::new(EmailNotifier::new(config)?),
        NotificationProvider::Log => Arc::new(LogNotifier),
    };
    info!("Notification provider: {}", notifier.name());
    Ok(notifier)
}
