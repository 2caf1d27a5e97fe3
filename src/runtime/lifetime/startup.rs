use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::StaticConfig;
use crate::notify::{Notifier, create_notifier};
use crate::reports::{ReportComposer, ReportDispatcher, ReportSettings};
use crate::storage::{RedisOfferStore, SeaOrmDirectory, StorageFactory};

/// 启动后共享的组件
pub struct StartupContext {
    pub directory: Arc<SeaOrmDirectory>,
    pub offer_store: Arc<RedisOfferStore>,
    pub notifier: Arc<dyn Notifier>,
    pub dispatcher: Arc<ReportDispatcher>,
}

/// 安装 rustls 加密后端（Redis TLS 与数据库 TLS 连接需要）
pub fn install_crypto_provider() -> Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|e| anyhow::anyhow!("Failed to install rustls crypto provider: {:?}", e))
}

/// 连接外部依赖并组装报告流程
pub async fn prepare_startup(config: &StaticConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    install_crypto_provider()?;

    let directory = StorageFactory::create_directory(config)
        .await
        .context("Failed to create user/domain directory")?;
    info!("Using directory backend: {}", directory.backend_name());

    let offer_store = StorageFactory::create_offer_store(config)
        .await
        .context("Failed to connect to offer store")?;

    let notifier =
        create_notifier(&config.notification).context("Failed to create notification sender")?;

    let settings = ReportSettings::from(&config.reports);
    let composer = Arc::new(ReportComposer::new(
        directory.clone(),
        offer_store.clone(),
        notifier.clone(),
        settings,
    ));
    let dispatcher = Arc::new(ReportDispatcher::new(directory.clone(), composer));

    info!(
        "Report pipeline ready (user_concurrency={}, domain_concurrency={}, send_empty_reports={})",
        settings.user_concurrency, settings.domain_concurrency, settings.send_empty_reports
    );
    debug!("Pre-startup processing completed in {:?}", start_time.elapsed());

    Ok(StartupContext {
        directory,
        offer_store,
        notifier,
        dispatcher,
    })
}
