//! 集成测试共用的内存替身
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::Mutex;

use domainfolio::errors::{DomainfolioError, Result};
use domainfolio::notify::{Notification, Notifier};
use domainfolio::reports::{ReportComposer, ReportDispatcher, ReportSettings};
use domainfolio::storage::{DomainDirectory, DomainRecord, Offer, OfferStore, User, UserDirectory};
use domainfolio::utils::Cents;

/// 2024-03-04 是周一，daily + weekly 同时到期
pub fn monday_midnight() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap()
}

pub fn user(id: &str) -> User {
    User {
        id: id.to_string(),
        email: format!("{}@example.com", id),
    }
}

pub fn domain(name: &str, owner: &str) -> DomainRecord {
    DomainRecord {
        name: name.to_string(),
        user_id: owner.to_string(),
        threshold: Cents::ZERO,
        subscription_id: None,
        nameservers: Vec::new(),
    }
}

pub fn offer(email: &str, major: i64, timestamp: DateTime<Utc>) -> Offer {
    Offer {
        email: email.to_string(),
        amount: Cents::from_major(major).unwrap(),
        description: None,
        timestamp,
    }
}

#[derive(Default)]
pub struct FakeDirectory {
    pub users: Vec<User>,
    pub domains: HashMap<String, Vec<DomainRecord>>,
    pub fail_list_users: bool,
    pub failing_owners: HashSet<String>,
    pub list_users_calls: AtomicUsize,
    pub list_domains_calls: AtomicUsize,
}

impl FakeDirectory {
    pub fn total_calls(&self) -> usize {
        self.list_users_calls.load(Ordering::SeqCst) + self.list_domains_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserDirectory for FakeDirectory {
    async fn list_users(&self) -> Result<Vec<User>> {
        self.list_users_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list_users {
            return Err(DomainfolioError::database_connection("directory unavailable"));
        }
        Ok(self.users.clone())
    }
}

#[async_trait]
impl DomainDirectory for FakeDirectory {
    async fn list_domains_for_user(&self, user_id: &str) -> Result<Vec<DomainRecord>> {
        self.list_domains_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_owners.contains(user_id) {
            return Err(DomainfolioError::database_operation("query failed"));
        }
        Ok(self.domains.get(user_id).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
pub struct FakeOfferStore {
    pub offers: HashMap<String, Vec<Offer>>,
    pub visits: HashMap<String, u64>,
    pub failing_domains: HashSet<String>,
    pub calls: AtomicUsize,
}

#[async_trait]
impl OfferStore for FakeOfferStore {
    async fn get_offers(&self, domain: &str) -> Result<Vec<Offer>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_domains.contains(domain) {
            return Err(DomainfolioError::offer_store("connection reset"));
        }
        Ok(self.offers.get(domain).cloned().unwrap_or_default())
    }

    async fn get_visit_count(&self, domain: &str) -> Result<u64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_domains.contains(domain) {
            return Err(DomainfolioError::offer_store("connection reset"));
        }
        Ok(self.visits.get(domain).copied().unwrap_or(0))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// 记录所有发送的通知
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<Notification>>,
    pub fail_for: HashSet<String>,
    pub calls: AtomicUsize,
}

impl RecordingNotifier {
    pub async fn sent(&self) -> Vec<Notification> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_to(&self, email: &str) -> Vec<Notification> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|n| n.to == email)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, notification: &Notification) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_for.contains(&notification.to) {
            return Err(DomainfolioError::notification("provider returned 500"));
        }
        self.sent.lock().await.push(notification.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

pub struct Harness {
    pub directory: Arc<FakeDirectory>,
    pub offers: Arc<FakeOfferStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub dispatcher: Arc<ReportDispatcher>,
}

impl Harness {
    pub fn new(
        directory: FakeDirectory,
        offers: FakeOfferStore,
        notifier: RecordingNotifier,
        settings: ReportSettings,
    ) -> Self {
        let directory = Arc::new(directory);
        let offers = Arc::new(offers);
        let notifier = Arc::new(notifier);

        let composer = Arc::new(ReportComposer::new(
            directory.clone(),
            offers.clone(),
            notifier.clone(),
            settings,
        ));
        let dispatcher = Arc::new(ReportDispatcher::new(directory.clone(), composer));

        Self {
            directory,
            offers,
            notifier,
            dispatcher,
        }
    }

    pub fn collaborator_calls(&self) -> usize {
        self.directory.total_calls()
            + self.offers.calls.load(Ordering::SeqCst)
            + self.notifier.calls.load(Ordering::SeqCst)
    }
}

/// user1 拥有 a.com（两条报价、10 次访问），user2 没有域名
pub fn monday_scenario() -> (FakeDirectory, FakeOfferStore) {
    let now = monday_midnight();
    let directory = FakeDirectory {
        users: vec![user("user1"), user("user2")],
        domains: HashMap::from([("user1".to_string(), vec![domain("a.com", "user1")])]),
        ..Default::default()
    };
    let offers = FakeOfferStore {
        offers: HashMap::from([(
            "a.com".to_string(),
            vec![
                offer("x@buyer.com", 100, now - chrono::Duration::days(3)),
                offer("y@buyer.com", 250, now - chrono::Duration::hours(5)),
            ],
        )]),
        visits: HashMap::from([("a.com".to_string(), 10)]),
        ..Default::default()
    };
    (directory, offers)
}
