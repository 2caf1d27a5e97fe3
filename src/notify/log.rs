use async_trait::async_trait;
use tracing::info;

use super::{Notification, Notifier};
use crate::errors::Result;

/// 不发送，只把报告写进日志
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: &Notification) -> Result<()> {
        info!(
            to = %notification.to,
            subject = %notification.subject,
            "Report (dry run):\n{}",
            notification.text
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
