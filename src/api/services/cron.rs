//! 定时报告触发端点

use std::sync::Arc;

use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{error, info};

use crate::api::middleware::CronAuth;
use crate::reports::{DispatchOutcome, ReportDispatcher};

/// 端点依赖：调度器和时钟
#[derive(Clone)]
pub struct CronState {
    pub dispatcher: Arc<ReportDispatcher>,
    /// 每次请求只读一次
    pub clock: fn() -> DateTime<Utc>,
}

impl CronState {
    pub fn new(dispatcher: Arc<ReportDispatcher>) -> Self {
        Self {
            dispatcher,
            clock: Utc::now,
        }
    }
}

pub struct CronService;

impl CronService {
    pub async fn periodic_reports(state: web::Data<CronState>) -> impl Responder {
        let now = (state.clock)();
        info!("Periodic report trigger at {}", now);

        match state.dispatcher.dispatch(now).await {
            Ok(DispatchOutcome::NoUsers) => {
                HttpResponse::Ok().json(json!({ "message": "No users found" }))
            }
            Ok(DispatchOutcome::NothingDue) | Ok(DispatchOutcome::Completed(_)) => {
                HttpResponse::Ok().json(json!({ "success": true }))
            }
            Err(e) => {
                error!("Periodic report dispatch failed: {}", e);
                HttpResponse::InternalServerError()
                    .json(json!({ "error": "Failed to send periodic reports" }))
            }
        }
    }
}

/// 注册触发端点，`secret` 为空时端点返回 404
pub fn cron_routes(route: String, secret: String) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.service(
            web::scope(&route)
                .wrap(CronAuth::new(secret))
                .route("", web::get().to(CronService::periodic_reports)),
        );
    }
}
