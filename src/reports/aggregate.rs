//! 单个域名的报价统计与整份报告

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::reports::cadence::Cadence;
use crate::storage::{DomainRecord, Offer, User};
use crate::utils::Cents;

/// 最高报价及其出价人
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighestOffer {
    pub amount: Cents,
    pub email: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainSummary {
    pub domain: String,
    pub offer_count: usize,
    pub total_value: Cents,
    pub highest_offer: Option<HighestOffer>,
    pub visit_count: u64,
    pub threshold: Cents,
    /// 阈值为 0 时恒为 0
    pub offers_above_threshold: usize,
    /// 本周期内收到的报价数
    pub new_offers: usize,
    /// 最近的若干条报价，按时间先后
    pub recent_offers: Vec<Offer>,
}

/// 汇总参数
#[derive(Debug, Clone, Copy)]
pub struct SummaryWindow {
    pub period_start: DateTime<Utc>,
    pub now: DateTime<Utc>,
    pub recent_limit: usize,
}

/// 报价总额，与报价顺序无关
pub fn total_value(offers: &[Offer]) -> Cents {
    offers.iter().map(|o| o.amount).sum()
}

/// 金额最高的报价；金额相同时取最早提交的那条
pub fn highest_offer(offers: &[Offer]) -> Option<&Offer> {
    offers.iter().reduce(|best, candidate| {
        if candidate.amount > best.amount
            || (candidate.amount == best.amount && candidate.timestamp < best.timestamp)
        {
            candidate
        } else {
            best
        }
    })
}

pub fn summarize_domain(
    record: &DomainRecord,
    offers: &[Offer],
    visit_count: u64,
    window: SummaryWindow,
) -> DomainSummary {
    let offers_above_threshold = if record.threshold.is_positive() {
        offers.iter().filter(|o| o.amount >= record.threshold).count()
    } else {
        0
    };

    let new_offers = offers
        .iter()
        .filter(|o| o.timestamp > window.period_start && o.timestamp <= window.now)
        .count();

    let recent_start = offers.len().saturating_sub(window.recent_limit);

    DomainSummary {
        domain: record.name.clone(),
        offer_count: offers.len(),
        total_value: total_value(offers),
        highest_offer: highest_offer(offers).map(|o| HighestOffer {
            amount: o.amount,
            email: o.email.clone(),
            timestamp: o.timestamp,
        }),
        visit_count,
        threshold: record.threshold,
        offers_above_threshold,
        new_offers,
        recent_offers: offers[recent_start..].to_vec(),
    }
}

/// 一个用户在一个周期的报告
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub cadence: Cadence,
    pub user_id: String,
    pub user_email: String,
    pub generated_at: DateTime<Utc>,
    pub period_start: DateTime<Utc>,
    pub domains: Vec<DomainSummary>,
}

impl Report {
    /// 构造报告，域名按名称排序
    pub fn new(
        cadence: Cadence,
        user: &User,
        now: DateTime<Utc>,
        mut domains: Vec<DomainSummary>,
    ) -> Self {
        domains.sort_by(|a, b| a.domain.cmp(&b.domain));
        Self {
            cadence,
            user_id: user.id.clone(),
            user_email: user.email.clone(),
            generated_at: now,
            period_start: cadence.period_start(now),
            domains,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    pub fn total_offers(&self) -> usize {
        self.domains.iter().map(|d| d.offer_count).sum()
    }

    pub fn total_value(&self) -> Cents {
        self.domains.iter().map(|d| d.total_value).sum()
    }

    pub fn total_visits(&self) -> u64 {
        self.domains.iter().map(|d| d.visit_count).sum()
    }

    pub fn total_new_offers(&self) -> usize {
        self.domains.iter().map(|d| d.new_offers).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap()
    }

    fn offer(email: &str, major: i64, hours_ago: i64) -> Offer {
        Offer {
            email: email.to_string(),
            amount: Cents::from_major(major).unwrap(),
            description: None,
            timestamp: now() - Duration::hours(hours_ago),
        }
    }

    fn record(name: &str, threshold_major: i64) -> DomainRecord {
        DomainRecord {
            name: name.to_string(),
            user_id: "user1".to_string(),
            threshold: Cents::from_major(threshold_major).unwrap(),
            subscription_id: None,
            nameservers: Vec::new(),
        }
    }

    fn window(cadence: Cadence, recent_limit: usize) -> SummaryWindow {
        SummaryWindow {
            period_start: cadence.period_start(now()),
            now: now(),
            recent_limit,
        }
    }

    #[test]
    fn test_zero_offers() {
        let summary = summarize_domain(&record("a.com", 0), &[], 7, window(Cadence::Daily, 5));
        assert_eq!(summary.offer_count, 0);
        assert_eq!(summary.total_value, Cents::ZERO);
        assert!(summary.highest_offer.is_none());
        assert_eq!(summary.visit_count, 7);
        assert!(summary.recent_offers.is_empty());
    }

    #[test]
    fn test_count_total_highest() {
        let offers = vec![offer("x@e.com", 100, 48), offer("y@e.com", 250, 2)];
        let summary = summarize_domain(&record("a.com", 0), &offers, 10, window(Cadence::Daily, 5));

        assert_eq!(summary.offer_count, 2);
        assert_eq!(summary.total_value, Cents::new(35_000));
        let highest = summary.highest_offer.unwrap();
        assert_eq!(highest.amount, Cents::new(25_000));
        assert_eq!(highest.email, "y@e.com");
        assert_eq!(summary.visit_count, 10);
    }

    #[test]
    fn test_total_is_order_independent() {
        let mut offers = vec![
            offer("a@e.com", 13, 1),
            offer("b@e.com", 999, 2),
            offer("c@e.com", 1, 3),
            offer("d@e.com", 40, 4),
        ];
        let forward = total_value(&offers);
        offers.reverse();
        assert_eq!(forward, total_value(&offers));
        offers.swap(0, 2);
        assert_eq!(forward, total_value(&offers));
        assert_eq!(forward, Cents::new(105_300));
    }

    #[test]
    fn test_exact_decimal_sum() {
        let offers: Vec<Offer> = ["0.10", "0.20", "99.99"]
            .iter()
            .map(|a| Offer {
                amount: Cents::parse_decimal(a).unwrap(),
                ..offer("a@e.com", 1, 1)
            })
            .collect();
        assert_eq!(total_value(&offers), Cents::new(10_029));
    }

    #[test]
    fn test_highest_tie_break_picks_earliest() {
        // 列表顺序与时间顺序故意不一致
        let offers = vec![
            offer("late@e.com", 500, 1),
            offer("early@e.com", 500, 30),
            offer("low@e.com", 100, 50),
        ];
        assert_eq!(highest_offer(&offers).unwrap().email, "early@e.com");
    }

    #[test]
    fn test_threshold_and_new_offers() {
        let offers = vec![
            offer("a@e.com", 50, 24 * 10),
            offer("b@e.com", 200, 24 * 3),
            offer("c@e.com", 300, 5),
        ];

        let daily = summarize_domain(&record("a.com", 200), &offers, 0, window(Cadence::Daily, 5));
        assert_eq!(daily.offers_above_threshold, 2);
        assert_eq!(daily.new_offers, 1);

        let weekly = summarize_domain(&record("a.com", 0), &offers, 0, window(Cadence::Weekly, 5));
        assert_eq!(weekly.offers_above_threshold, 0);
        assert_eq!(weekly.new_offers, 2);
    }

    #[test]
    fn test_recent_offers_keeps_last_in_order() {
        let offers = vec![
            offer("1@e.com", 1, 4),
            offer("2@e.com", 2, 3),
            offer("3@e.com", 3, 2),
            offer("4@e.com", 4, 1),
        ];
        let summary = summarize_domain(&record("a.com", 0), &offers, 0, window(Cadence::Daily, 2));
        let emails: Vec<&str> = summary.recent_offers.iter().map(|o| o.email.as_str()).collect();
        assert_eq!(emails, vec!["3@e.com", "4@e.com"]);

        let none = summarize_domain(&record("a.com", 0), &offers, 0, window(Cadence::Daily, 0));
        assert!(none.recent_offers.is_empty());
    }

    #[test]
    fn test_report_sorts_domains_and_totals() {
        let user = User {
            id: "user1".to_string(),
            email: "owner@e.com".to_string(),
        };
        let w = window(Cadence::Weekly, 5);
        let domains = vec![
            summarize_domain(&record("z.com", 0), &[offer("a@e.com", 10, 1)], 3, w),
            summarize_domain(&record("b.com", 0), &[offer("a@e.com", 20, 1)], 4, w),
        ];
        let report = Report::new(Cadence::Weekly, &user, now(), domains);

        assert_eq!(report.domains[0].domain, "b.com");
        assert_eq!(report.domains[1].domain, "z.com");
        assert_eq!(report.total_offers(), 2);
        assert_eq!(report.total_value(), Cents::new(3_000));
        assert_eq!(report.total_visits(), 7);
        assert_eq!(report.period_start, Utc.with_ymd_and_hms(2024, 2, 26, 0, 0, 0).unwrap());
        assert!(!report.is_empty());
    }
}
