//! 定时报告入口：判断到期周期，按用户并发生成报告

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{error, info};

use crate::errors::{DomainfolioError, Result};
use crate::reports::cadence::{Cadence, due_cadences};
use crate::reports::composer::{ComposeOutcome, ReportComposer};
use crate::storage::{User, UserDirectory};

/// 单个周期的发送统计
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CadenceTally {
    pub cadence: Cadence,
    pub users: usize,
    pub sent: usize,
    pub skipped_empty: usize,
    pub notify_failed: usize,
    pub failed: usize,
}

impl CadenceTally {
    fn new(cadence: Cadence, users: usize) -> Self {
        Self {
            cadence,
            users,
            sent: 0,
            skipped_empty: 0,
            notify_failed: 0,
            failed: 0,
        }
    }

    fn record(&mut self, outcome: &Result<ComposeOutcome>) {
        match outcome {
            Ok(ComposeOutcome::Sent) => self.sent += 1,
            Ok(ComposeOutcome::SkippedEmpty) => self.skipped_empty += 1,
            Ok(ComposeOutcome::NotificationFailed) => self.notify_failed += 1,
            Err(_) => self.failed += 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchSummary {
    pub cadences: Vec<CadenceTally>,
}

impl DispatchSummary {
    pub fn tally(&self, cadence: Cadence) -> Option<&CadenceTally> {
        self.cadences.iter().find(|t| t.cadence == cadence)
    }

    pub fn total_sent(&self) -> usize {
        self.cadences.iter().map(|t| t.sent).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// 当前时刻没有到期的周期
    NothingDue,
    NoUsers,
    Completed(DispatchSummary),
}

pub struct ReportDispatcher {
    users: Arc<dyn UserDirectory>,
    composer: Arc<ReportComposer>,
}

impl ReportDispatcher {
    pub fn new(users: Arc<dyn UserDirectory>, composer: Arc<ReportComposer>) -> Self {
        Self { users, composer }
    }

    pub fn composer(&self) -> &Arc<ReportComposer> {
        &self.composer
    }

    /// 按 `now` 判断到期周期并发送
    pub async fn dispatch(&self, now: DateTime<Utc>) -> Result<DispatchOutcome> {
        let due = due_cadences(now);
        if due.is_empty() {
            info!("No report cadence due at {}", now);
            return Ok(DispatchOutcome::NothingDue);
        }
        self.dispatch_cadences(&due, now).await
    }

    /// 发送指定周期，不做到期判断
    ///
    /// 用户列表只拉取一次，所有周期共用。
    pub async fn dispatch_cadences(
        &self,
        cadences: &[Cadence],
        now: DateTime<Utc>,
    ) -> Result<DispatchOutcome> {
        if cadences.is_empty() {
            return Ok(DispatchOutcome::NothingDue);
        }

        let users = self.users.list_users().await.map_err(|e| {
            error!("Failed to load users for periodic reports: {}", e);
            DomainfolioError::upstream_list(e.to_string())
        })?;

        if users.is_empty() {
            info!("No users found, nothing to send");
            return Ok(DispatchOutcome::NoUsers);
        }

        let mut summary = DispatchSummary::default();
        for &cadence in cadences {
            let tally = self.run_cadence(&users, cadence, now).await;
            info!(
                "{} reports: users={}, sent={}, skipped_empty={}, notify_failed={}, failed={}",
                cadence,
                tally.users,
                tally.sent,
                tally.skipped_empty,
                tally.notify_failed,
                tally.failed
            );
            summary.cadences.push(tally);
        }

        Ok(DispatchOutcome::Completed(summary))
    }

    async fn run_cadence(&self, users: &[User], cadence: Cadence, now: DateTime<Utc>) -> CadenceTally {
        let composer = &self.composer;
        let limit = composer.settings().user_concurrency;

        let outcomes: Vec<Result<ComposeOutcome>> = stream::iter(users)
            .map(|user| async move {
                let outcome = composer.compose_and_send(user, cadence, now).await;
                if let Err(e) = &outcome {
                    error!("{} report for user {} failed: {}", cadence, user.id, e);
                }
                outcome
            })
            .buffer_unordered(limit)
            .collect()
            .await;

        let mut tally = CadenceTally::new(cadence, users.len());
        for outcome in &outcomes {
            tally.record(outcome);
        }
        tally
    }
}
