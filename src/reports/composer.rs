//! 单个用户、单个周期的报告生成与发送

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::future::try_join;
use futures_util::stream::{self, StreamExt};
use tracing::{debug, error, info, warn};

use crate::config::ReportsConfig;
use crate::errors::{DomainfolioError, Result};
use crate::notify::{Notifier, render_report};
use crate::reports::aggregate::{Report, SummaryWindow, summarize_domain};
use crate::reports::cadence::Cadence;
use crate::storage::{DomainDirectory, DomainRecord, Offer, OfferStore, User};

/// 报告流程的运行参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportSettings {
    pub user_concurrency: usize,
    pub domain_concurrency: usize,
    pub send_empty_reports: bool,
    pub recent_offers_limit: usize,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self::from(&ReportsConfig::default())
    }
}

impl From<&ReportsConfig> for ReportSettings {
    fn from(config: &ReportsConfig) -> Self {
        Self {
            // buffer_unordered(0) 永远不会前进
            user_concurrency: config.user_concurrency.max(1),
            domain_concurrency: config.domain_concurrency.max(1),
            send_empty_reports: config.send_empty_reports,
            recent_offers_limit: config.recent_offers_limit,
        }
    }
}

/// 单个域名的拉取结果
#[derive(Debug)]
pub enum DomainFetch {
    Fetched {
        record: DomainRecord,
        offers: Vec<Offer>,
        visits: u64,
    },
    Failed {
        domain: String,
        error: DomainfolioError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeOutcome {
    Sent,
    SkippedEmpty,
    NotificationFailed,
}

pub struct ReportComposer {
    domains: Arc<dyn DomainDirectory>,
    offers: Arc<dyn OfferStore>,
    notifier: Arc<dyn Notifier>,
    settings: ReportSettings,
}

impl ReportComposer {
    pub fn new(
        domains: Arc<dyn DomainDirectory>,
        offers: Arc<dyn OfferStore>,
        notifier: Arc<dyn Notifier>,
        settings: ReportSettings,
    ) -> Self {
        Self {
            domains,
            offers,
            notifier,
            settings,
        }
    }

    pub fn settings(&self) -> ReportSettings {
        self.settings
    }

    /// 并发读取报价列表和访问计数
    async fn fetch_domain(&self, record: DomainRecord) -> DomainFetch {
        let result = try_join(
            self.offers.get_offers(&record.name),
            self.offers.get_visit_count(&record.name),
        )
        .await;

        match result {
            Ok((offers, visits)) => DomainFetch::Fetched {
                record,
                offers,
                visits,
            },
            Err(e) => DomainFetch::Failed {
                domain: record.name,
                error: DomainfolioError::domain_fetch(e.to_string()),
            },
        }
    }

    /// 生成报告但不发送；拉取失败的域名被跳过
    pub async fn build_report(
        &self,
        user: &User,
        cadence: Cadence,
        now: DateTime<Utc>,
    ) -> Result<Report> {
        let records = self
            .domains
            .list_domains_for_user(&user.id)
            .await
            .map_err(|e| {
                DomainfolioError::compose(format!(
                    "Failed to list domains for user {}: {}",
                    user.id, e
                ))
            })?;

        let window = SummaryWindow {
            period_start: cadence.period_start(now),
            now,
            recent_limit: self.settings.recent_offers_limit,
        };

        let fetches: Vec<DomainFetch> = stream::iter(records)
            .map(|record| self.fetch_domain(record))
            .buffer_unordered(self.settings.domain_concurrency)
            .collect()
            .await;

        let summaries = fetches
            .into_iter()
            .filter_map(|fetch| match fetch {
                DomainFetch::Fetched {
                    record,
                    offers,
                    visits,
                } => Some(summarize_domain(&record, &offers, visits, window)),
                DomainFetch::Failed { domain, error } => {
                    warn!(
                        "Skipping domain {} in {} report for user {}: {}",
                        domain, cadence, user.id, error
                    );
                    None
                }
            })
            .collect();

        Ok(Report::new(cadence, user, now, summaries))
    }

    /// 生成并发送；发送失败只记录，不向上传播
    pub async fn compose_and_send(
        &self,
        user: &User,
        cadence: Cadence,
        now: DateTime<Utc>,
    ) -> Result<ComposeOutcome> {
        let report = self.build_report(user, cadence, now).await?;

        if report.is_empty() && !self.settings.send_empty_reports {
            debug!(
                "Nothing to report for user {} ({}), skipping",
                user.id, cadence
            );
            return Ok(ComposeOutcome::SkippedEmpty);
        }

        let notification = render_report(&report)?;
        match self.notifier.send(&notification).await {
            Ok(()) => {
                info!(
                    "Sent {} report to user {} ({} domains)",
                    cadence,
                    user.id,
                    report.domains.len()
                );
                Ok(ComposeOutcome::Sent)
            }
            Err(e) => {
                error!(
                    "Failed to send {} report to user {}: {}",
                    cadence, user.id, e
                );
                Ok(ComposeOutcome::NotificationFailed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_config_clamps_concurrency() {
        let config = ReportsConfig {
            user_concurrency: 0,
            domain_concurrency: 0,
            ..Default::default()
        };
        let settings = ReportSettings::from(&config);
        assert_eq!(settings.user_concurrency, 1);
        assert_eq!(settings.domain_concurrency, 1);
        assert!(!settings.send_empty_reports);
    }

    #[test]
    fn test_default_settings() {
        let settings = ReportSettings::default();
        assert_eq!(settings.user_concurrency, 8);
        assert_eq!(settings.domain_concurrency, 4);
        assert_eq!(settings.recent_offers_limit, 5);
    }
}
