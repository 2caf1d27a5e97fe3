use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::header::{AUTHORIZATION, CONTENT_TYPE},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use serde_json::json;
use std::rc::Rc;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::{debug, info, trace};

use crate::errors::DomainfolioError;

/// 定时任务触发端点的 Bearer 密钥校验
///
/// 密钥为空时端点视为未启用，直接返回 404。
#[derive(Clone)]
pub struct CronAuth {
    secret: Arc<str>,
}

impl CronAuth {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: Arc::from(secret.into()),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for CronAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = CronAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CronAuthMiddleware {
            service: Rc::new(service),
            secret: self.secret.clone(),
        }))
    }
}

pub struct CronAuthMiddleware<S> {
    service: Rc<S>,
    secret: Arc<str>,
}

impl<S, B> CronAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    fn handle_disabled(req: ServiceRequest) -> ServiceResponse<EitherBody<B>> {
        debug!("Cron secret not configured - returning 404");
        req.into_response(
            HttpResponse::NotFound()
                .insert_header((CONTENT_TYPE, "text/plain; charset=utf-8"))
                .body("Not Found")
                .map_into_right_body(),
        )
    }

    fn handle_unauthorized(req: ServiceRequest) -> ServiceResponse<EitherBody<B>> {
        let err = DomainfolioError::unauthorized(format!(
            "invalid or missing bearer secret from {}",
            req.connection_info().realip_remote_addr().unwrap_or("unknown")
        ));
        info!("Cron trigger rejected [{}]: {}", err.code(), err.message());
        req.into_response(
            HttpResponse::Unauthorized()
                .json(json!({ "error": err.error_type() }))
                .map_into_right_body(),
        )
    }

    /// 从 Authorization header 提取 Bearer token
    fn extract_bearer_token(req: &ServiceRequest) -> Option<&str> {
        req.headers()
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "))
    }

    /// 常量时间比较两个字符串
    fn constant_time_compare(a: &str, b: &str) -> bool {
        a.as_bytes().ct_eq(b.as_bytes()).into()
    }
}

impl<S, B> Service<ServiceRequest> for CronAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let secret = self.secret.clone();

        Box::pin(async move {
            if secret.is_empty() {
                return Ok(Self::handle_disabled(req));
            }

            let authorized = Self::extract_bearer_token(&req)
                .is_some_and(|token| Self::constant_time_compare(token, &secret));

            if !authorized {
                return Ok(Self::handle_unauthorized(req));
            }

            trace!("Cron trigger authenticated");
            let response = srv.call(req).await?.map_into_left_body();
            Ok(response)
        })
    }
}
