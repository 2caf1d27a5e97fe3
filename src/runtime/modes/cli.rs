//! CLI mode
//!
//! 一次性命令：在进程内执行一次报告分发、预览单个用户的报告、生成示例配置。

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use colored::Colorize;
use tracing::info;

use crate::config::StaticConfig;
use crate::notify::render::render_text;
use crate::reports::{Cadence, DispatchOutcome};
use crate::runtime::lifetime;
use crate::storage::UserDirectory;
use crate::utils::parse_instant;

fn resolve_now(at: Option<&str>) -> Result<DateTime<Utc>> {
    match at {
        Some(raw) => parse_instant(raw).with_context(|| format!("Invalid --at value '{}'", raw)),
        None => Ok(Utc::now()),
    }
}

/// 执行一次分发；指定 `cadences` 时不做到期判断
pub async fn run_dispatch(
    config: Arc<StaticConfig>,
    at: Option<String>,
    cadences: Vec<Cadence>,
) -> Result<()> {
    let now = resolve_now(at.as_deref())?;
    let startup = lifetime::startup::prepare_startup(&config).await?;

    let outcome = if cadences.is_empty() {
        startup.dispatcher.dispatch(now).await?
    } else {
        let mut cadences = cadences;
        cadences.sort();
        cadences.dedup();
        startup.dispatcher.dispatch_cadences(&cadences, now).await?
    };

    match outcome {
        DispatchOutcome::NothingDue => {
            println!("{} No report cadence due at {}", "ℹ".bold().blue(), now);
        }
        DispatchOutcome::NoUsers => {
            println!("{} No users found", "ℹ".bold().blue());
        }
        DispatchOutcome::Completed(summary) => {
            for tally in &summary.cadences {
                println!(
                    "{} {}: users={}, sent={}, skipped_empty={}, notify_failed={}, failed={}",
                    "✓".bold().green(),
                    tally.cadence.to_string().cyan(),
                    tally.users,
                    tally.sent,
                    tally.skipped_empty,
                    tally.notify_failed,
                    tally.failed
                );
            }
        }
    }
    Ok(())
}

/// 生成单个用户的报告并打印，不发送
pub async fn run_preview(
    config: Arc<StaticConfig>,
    user_id: String,
    cadence: Cadence,
    at: Option<String>,
) -> Result<()> {
    let now = resolve_now(at.as_deref())?;
    let startup = lifetime::startup::prepare_startup(&config).await?;

    let users = startup.directory.list_users().await?;
    let Some(user) = users.into_iter().find(|u| u.id == user_id) else {
        bail!("User '{}' not found", user_id);
    };

    let report = startup
        .dispatcher
        .composer()
        .build_report(&user, cadence, now)
        .await?;
    info!(
        "Previewing {} report for {} ({} domains)",
        cadence,
        user.id,
        report.domains.len()
    );

    println!("{}", render_text(&report));
    Ok(())
}

/// 输出示例配置
pub fn run_config_generate(output: Option<String>) -> Result<()> {
    match output {
        Some(path) => {
            StaticConfig::default()
                .save_to_file(&path)
                .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", path, e))?;
            println!("{} Sample configuration written to {}", "✓".bold().green(), path);
        }
        None => print!("{}", StaticConfig::generate_sample_config()),
    }
    Ok(())
}
