//! HTTP 端点集成测试：触发端点鉴权与响应体、健康检查

mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Value, json};

use common::*;
use domainfolio::api::services::{
    AppStartTime, CronState, HealthTargets, cron_routes, health_routes,
};
use domainfolio::errors::{DomainfolioError, Result};
use domainfolio::reports::ReportSettings;
use domainfolio::storage::{Offer, OfferStore};

const ROUTE: &str = "/api/cron/periodic-reports";
const SECRET: &str = "s3cret-token";

fn fixed_monday() -> DateTime<Utc> {
    monday_midnight()
}

fn fixed_afternoon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 5, 14, 0, 0).unwrap()
}

fn state(h: &Harness, clock: fn() -> DateTime<Utc>) -> CronState {
    CronState {
        dispatcher: h.dispatcher.clone(),
        clock,
    }
}

macro_rules! cron_app {
    ($state:expr, $secret:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .configure(cron_routes(ROUTE.to_string(), $secret.to_string())),
        )
        .await
    };
}

fn monday_harness() -> Harness {
    let (directory, offers) = monday_scenario();
    Harness::new(
        directory,
        offers,
        RecordingNotifier::default(),
        ReportSettings::default(),
    )
}

#[actix_rt::test]
async fn test_missing_authorization_is_rejected_without_io() {
    let h = monday_harness();
    let app = cron_app!(state(&h, fixed_monday), SECRET);

    let resp = test::call_service(&app, TestRequest::get().uri(ROUTE).to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Unauthorized" }));
    assert_eq!(
        body["error"],
        DomainfolioError::unauthorized("").error_type()
    );

    assert_eq!(h.collaborator_calls(), 0);
}

#[actix_rt::test]
async fn test_wrong_secret_is_rejected_without_io() {
    let h = monday_harness();
    let app = cron_app!(state(&h, fixed_monday), SECRET);

    for header in [
        "Bearer wrong",
        "Bearer s3cret-token-extra",
        "Basic s3cret-token",
        "s3cret-token",
        "Bearer ",
    ] {
        let req = TestRequest::get()
            .uri(ROUTE)
            .insert_header(("Authorization", header))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{}", header);
    }

    assert_eq!(h.collaborator_calls(), 0);
}

#[actix_rt::test]
async fn test_authorized_trigger_dispatches() {
    let h = monday_harness();
    let app = cron_app!(state(&h, fixed_monday), SECRET);

    let req = TestRequest::get()
        .uri(ROUTE)
        .insert_header(("Authorization", format!("Bearer {}", SECRET)))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "success": true }));
    assert_eq!(h.notifier.sent_to("user1@example.com").await.len(), 2);
}

#[actix_rt::test]
async fn test_nothing_due_is_success() {
    let h = monday_harness();
    let app = cron_app!(state(&h, fixed_afternoon), SECRET);

    let req = TestRequest::get()
        .uri(ROUTE)
        .insert_header(("Authorization", format!("Bearer {}", SECRET)))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "success": true }));
    assert_eq!(h.collaborator_calls(), 0);
}

#[actix_rt::test]
async fn test_no_users_message() {
    let h = Harness::new(
        FakeDirectory::default(),
        FakeOfferStore::default(),
        RecordingNotifier::default(),
        ReportSettings::default(),
    );
    let app = cron_app!(state(&h, fixed_monday), SECRET);

    let req = TestRequest::get()
        .uri(ROUTE)
        .insert_header(("Authorization", format!("Bearer {}", SECRET)))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "message": "No users found" }));
}

#[actix_rt::test]
async fn test_user_list_failure_is_500() {
    let h = Harness::new(
        FakeDirectory {
            fail_list_users: true,
            ..Default::default()
        },
        FakeOfferStore::default(),
        RecordingNotifier::default(),
        ReportSettings::default(),
    );
    let app = cron_app!(state(&h, fixed_monday), SECRET);

    let req = TestRequest::get()
        .uri(ROUTE)
        .insert_header(("Authorization", format!("Bearer {}", SECRET)))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Failed to send periodic reports" }));
    assert_eq!(h.notifier.calls.load(Ordering::SeqCst), 0);
}

#[actix_rt::test]
async fn test_empty_secret_disables_endpoint() {
    let h = monday_harness();
    let app = cron_app!(state(&h, fixed_monday), "");

    let req = TestRequest::get()
        .uri(ROUTE)
        .insert_header(("Authorization", "Bearer "))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(h.collaborator_calls(), 0);
}

struct DownOfferStore;

#[async_trait]
impl OfferStore for DownOfferStore {
    async fn get_offers(&self, _domain: &str) -> Result<Vec<Offer>> {
        Err(DomainfolioError::offer_store("down"))
    }

    async fn get_visit_count(&self, _domain: &str) -> Result<u64> {
        Err(DomainfolioError::offer_store("down"))
    }

    async fn ping(&self) -> Result<()> {
        Err(DomainfolioError::offer_store("connection refused"))
    }

    fn name(&self) -> &'static str {
        "down"
    }
}

fn start_time() -> AppStartTime {
    AppStartTime {
        start_datetime: Utc::now(),
    }
}

#[actix_rt::test]
async fn test_health_probes() {
    let targets = HealthTargets {
        directory: Arc::new(FakeDirectory::default()),
        offer_store: Arc::new(FakeOfferStore::default()),
    };
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(targets))
            .app_data(web::Data::new(start_time()))
            .service(health_routes()),
    )
    .await;

    let resp = test::call_service(&app, TestRequest::get().uri("/health/live").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp =
        test::call_service(&app, TestRequest::get().uri("/health/ready").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["database"]["status"], "healthy");
}

#[actix_rt::test]
async fn test_readiness_fails_when_offer_store_is_down() {
    let targets = HealthTargets {
        directory: Arc::new(FakeDirectory::default()),
        offer_store: Arc::new(DownOfferStore),
    };
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(targets))
            .app_data(web::Data::new(start_time()))
            .service(health_routes()),
    )
    .await;

    let resp =
        test::call_service(&app, TestRequest::get().uri("/health/ready").to_request()).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["checks"]["offer_store"]["status"], "unhealthy");
    assert_eq!(body["checks"]["offer_store"]["error"], "Offer Store Error: connection refused");
}
