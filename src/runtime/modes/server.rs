//! Server mode
//!
//! 启动 HTTP 服务：定时报告触发端点和健康检查。

use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::services::{AppStartTime, CronState, HealthTargets, cron_routes, health_routes};
use crate::config::StaticConfig;
use crate::runtime::lifetime;

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server(config: Arc<StaticConfig>) -> Result<()> {
    let app_start_time = AppStartTime {
        start_datetime: chrono::Utc::now(),
    };

    let startup = lifetime::startup::prepare_startup(&config)
        .await
        .map_err(|e| {
            tracing::error!("Server startup failed: {}", e);
            e
        })?;

    let cron_state = CronState::new(startup.dispatcher.clone());
    let health_targets = HealthTargets {
        directory: startup.directory.clone(),
        offer_store: startup.offer_store.clone(),
    };

    let route = config.reports.route.clone();
    let secret = config.reports.cron_secret.clone();
    if secret.is_empty() {
        warn!("reports.cron_secret is empty, {} is disabled", route);
    } else {
        info!("Periodic report trigger available at: {}", route);
    }

    let cpu_count = config.server.cpu_count.clamp(1, 32);
    info!("Using {} CPU cores for the server", cpu_count);

    let db_for_shutdown = startup.directory.get_db().clone();

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Compress::default())
            .wrap(DefaultHeaders::new().add(("Cache-Control", "no-store")))
            .app_data(web::Data::new(cron_state.clone()))
            .app_data(web::Data::new(health_targets.clone()))
            .app_data(web::Data::new(app_start_time.clone()))
            .configure(cron_routes(route.clone(), secret.clone()))
            .service(health_routes())
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .workers(cpu_count);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    warn!("Starting server at http://{}", bind_address);
    let server = server
        .bind(&bind_address)
        .with_context(|| format!("Failed to bind {}", bind_address))?
        .run();

    // Wait for server or shutdown signal
    tokio::select! {
        res = server => {
            res?;
        }
        _ = lifetime::shutdown::listen_for_shutdown(&db_for_shutdown) => {
            warn!("Graceful shutdown completed");
        }
    }

    Ok(())
}
