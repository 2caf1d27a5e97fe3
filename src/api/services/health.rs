use actix_web::{HttpResponse, Responder, web};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, trace};

use crate::storage::{OfferStore, UserDirectory};

/// 单项检查超时
const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

// 应用启动时间结构体
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// 就绪检查需要探测的外部依赖
#[derive(Clone)]
pub struct HealthTargets {
    pub directory: Arc<dyn UserDirectory>,
    pub offer_store: Arc<dyn OfferStore>,
}

#[derive(Debug, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub database: HealthCheck,
    pub offer_store: HealthCheck,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub uptime: u64,
    pub checks: HealthChecks,
    pub response_time_ms: u64,
}

pub struct HealthService;

impl HealthService {
    async fn probe<F>(name: &str, check: F) -> HealthCheck
    where
        F: std::future::Future<Output = crate::errors::Result<()>>,
    {
        match tokio::time::timeout(CHECK_TIMEOUT, check).await {
            Ok(Ok(())) => {
                trace!("{} health check passed", name);
                HealthCheck {
                    status: "healthy",
                    error: None,
                }
            }
            Ok(Err(e)) => {
                error!("{} health check failed: {}", name, e);
                HealthCheck {
                    status: "unhealthy",
                    error: Some(e.to_string()),
                }
            }
            Err(_) => {
                error!("{} health check timeout", name);
                HealthCheck {
                    status: "unhealthy",
                    error: Some("timeout".to_string()),
                }
            }
        }
    }

    // 就绪检查：数据库和报价存储都可用才返回 200
    pub async fn readiness_check(
        targets: web::Data<HealthTargets>,
        app_start_time: web::Data<AppStartTime>,
    ) -> impl Responder {
        let start_time = Instant::now();
        trace!("Received readiness check request");

        let (database, offer_store) = tokio::join!(
            Self::probe("Database", targets.directory.ping()),
            Self::probe("Offer store", targets.offer_store.ping()),
        );

        let is_healthy = database.status == "healthy" && offer_store.status == "healthy";
        let now = chrono::Utc::now();

        let body = HealthResponse {
            status: if is_healthy { "healthy" } else { "unhealthy" },
            timestamp: now.to_rfc3339(),
            uptime: (now - app_start_time.start_datetime).num_seconds().max(0) as u64,
            checks: HealthChecks {
                database,
                offer_store,
            },
            response_time_ms: start_time.elapsed().as_millis() as u64,
        };

        info!(
            "Readiness check completed in {:?}, status: {}",
            start_time.elapsed(),
            body.status
        );

        if is_healthy {
            HttpResponse::Ok().json(body)
        } else {
            HttpResponse::ServiceUnavailable().json(body)
        }
    }

    // 活跃性检查
    pub async fn liveness_check() -> impl Responder {
        trace!("Received liveness check request");

        HttpResponse::NoContent().finish()
    }
}

/// Health 路由配置
pub fn health_routes() -> actix_web::Scope {
    web::scope("/health")
        .route("/ready", web::get().to(HealthService::readiness_check))
        .route("/ready", web::head().to(HealthService::readiness_check))
        .route("/live", web::get().to(HealthService::liveness_check))
        .route("/live", web::head().to(HealthService::liveness_check))
}
