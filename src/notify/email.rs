//! HTTP 邮件 API 发送器
//!
//! 请求格式与 Resend 兼容：
//! `POST {api_url}`，`Authorization: Bearer {api_key}`，
//! body `{"from","to":[..],"subject","html","text"}`

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};
use ureq::Agent;

use super::{Notification, Notifier};
use crate::config::NotificationConfig;
use crate::errors::{DomainfolioError, Result};

#[derive(Debug, Serialize)]
struct EmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

pub struct EmailNotifier {
    agent: Agent,
    api_url: String,
    api_key: String,
    from: String,
}

impl EmailNotifier {
    pub fn new(config: &NotificationConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            warn!("notification.api_key is empty, email API requests will likely be rejected");
        }
        if config.from.trim().is_empty() {
            return Err(DomainfolioError::validation(
                "notification.from must be set for the email provider",
            ));
        }

        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .build()
            .into();

        Ok(Self {
            agent,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            from: config.from.clone(),
        })
    }

    /// 同步发送（在 spawn_blocking 中调用）
    fn send_sync(
        agent: Agent,
        api_url: String,
        api_key: String,
        from: String,
        notification: Notification,
    ) -> Result<()> {
        let body = EmailRequest {
            from: &from,
            to: [&notification.to],
            subject: &notification.subject,
            html: &notification.html,
            text: &notification.text,
        };

        // 非 2xx 状态码由 ureq 转成 Error::StatusCode
        let resp = agent
            .post(&api_url)
            .header("Authorization", &format!("Bearer {}", api_key))
            .send_json(&body)?;

        debug!(
            "Email API accepted report for {} (status {})",
            notification.to,
            resp.status()
        );
        Ok(())
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn send(&self, notification: &Notification) -> Result<()> {
        let agent = self.agent.clone();
        let api_url = self.api_url.clone();
        let api_key = self.api_key.clone();
        let from = self.from.clone();
        let notification = notification.clone();

        // 使用 spawn_blocking 在线程池中执行同步 HTTP 请求
        tokio::task::spawn_blocking(move || {
            Self::send_sync(agent, api_url, api_key, from, notification)
        })
        .await
        .map_err(|e| DomainfolioError::notification(format!("Email task failed: {}", e)))?
    }

    fn name(&self) -> &'static str {
        "email"
    }
}
