//! 报告渲染：纯文本和 HTML 两份正文

use std::fmt::Write;

use askama::Template;

use super::Notification;
use crate::errors::{DomainfolioError, Result};
use crate::reports::{DomainSummary, Report};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

/// 渲染一份报告
pub fn render_report(report: &Report) -> Result<Notification> {
    Ok(Notification {
        to: report.user_email.clone(),
        subject: render_subject(report),
        text: render_text(report),
        html: render_html(report)?,
    })
}

pub fn render_subject(report: &Report) -> String {
    format!(
        "Your {} domain portfolio report ({})",
        report.cadence.label(),
        report.generated_at.format("%Y-%m-%d")
    )
}

/// 单行域名摘要，如 `a.com: count=2, total=350.00, highest=250.00, visits=10`
pub fn domain_line(summary: &DomainSummary) -> String {
    let highest = summary
        .highest_offer
        .as_ref()
        .map(|h| h.amount.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{}: count={}, total={}, highest={}, visits={}",
        summary.domain, summary.offer_count, summary.total_value, highest, summary.visit_count
    )
}

pub fn render_text(report: &Report) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} report for {}",
        report.cadence.label(),
        report.user_email
    );
    let _ = writeln!(
        out,
        "Period: {} to {}",
        report.period_start.format(DATE_FORMAT),
        report.generated_at.format(DATE_FORMAT)
    );
    out.push('\n');

    if report.is_empty() {
        out.push_str("You have no domains to report on.\n");
        return out;
    }

    for summary in &report.domains {
        let _ = writeln!(out, "{}", domain_line(summary));
        if summary.new_offers > 0 {
            let _ = writeln!(out, "  new offers this period: {}", summary.new_offers);
        }
        if summary.threshold.is_positive() {
            let _ = writeln!(
                out,
                "  offers at or above your threshold ({}): {}",
                summary.threshold, summary.offers_above_threshold
            );
        }
        for offer in &summary.recent_offers {
            let _ = write!(
                out,
                "  - {} from {} on {}",
                offer.amount,
                offer.email,
                offer.timestamp.format(DATE_FORMAT)
            );
            if let Some(desc) = &offer.description {
                let _ = write!(out, ": {}", desc);
            }
            out.push('\n');
        }
    }

    out.push('\n');
    let _ = writeln!(
        out,
        "Portfolio: {} domains, {} offers, total {}, {} visits",
        report.domains.len(),
        report.total_offers(),
        report.total_value(),
        report.total_visits()
    );
    out
}

/// HTML 正文模板，字段内容由 askama 转义
#[derive(Template)]
#[template(path = "report_email.html")]
struct ReportEmailTemplate<'a> {
    cadence_label: &'static str,
    period_start: String,
    generated_at: String,
    report: &'a Report,
}

pub fn render_html(report: &Report) -> Result<String> {
    let template = ReportEmailTemplate {
        cadence_label: report.cadence.label(),
        period_start: report.period_start.format(DATE_FORMAT).to_string(),
        generated_at: report.generated_at.format(DATE_FORMAT).to_string(),
        report,
    };
    template.render().map_err(|e| {
        DomainfolioError::compose(format!(
            "Failed to render HTML report for user {}: {}",
            report.user_id, e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::{Cadence, HighestOffer};
    use crate::storage::{Offer, User};
    use crate::utils::Cents;
    use chrono::{TimeZone, Utc};

    fn sample_report(domains: Vec<DomainSummary>) -> Report {
        let user = User {
            id: "user1".to_string(),
            email: "owner@example.com".to_string(),
        };
        let now = Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap();
        Report::new(Cadence::Weekly, &user, now, domains)
    }

    fn summary() -> DomainSummary {
        let ts = Utc.with_ymd_and_hms(2024, 3, 2, 10, 0, 0).unwrap();
        DomainSummary {
            domain: "a.com".to_string(),
            offer_count: 2,
            total_value: Cents::new(35_000),
            highest_offer: Some(HighestOffer {
                amount: Cents::new(25_000),
                email: "y@e.com".to_string(),
                timestamp: ts,
            }),
            visit_count: 10,
            threshold: Cents::ZERO,
            offers_above_threshold: 0,
            new_offers: 1,
            recent_offers: vec![Offer {
                email: "y@e.com".to_string(),
                amount: Cents::new(25_000),
                description: Some("<b>serious</b>".to_string()),
                timestamp: ts,
            }],
        }
    }

    #[test]
    fn test_domain_line() {
        assert_eq!(
            domain_line(&summary()),
            "a.com: count=2, total=350.00, highest=250.00, visits=10"
        );
    }

    #[test]
    fn test_render_report() {
        let n = render_report(&sample_report(vec![summary()])).unwrap();
        assert_eq!(n.to, "owner@example.com");
        assert_eq!(n.subject, "Your Weekly domain portfolio report (2024-03-04)");
        assert!(n.text.contains("a.com: count=2, total=350.00, highest=250.00, visits=10"));
        assert!(n.text.contains("Period: 2024-02-26 00:00 UTC to 2024-03-04 00:00 UTC"));
        assert!(n.html.contains("&lt;b&gt;serious&lt;"));
        assert!(!n.html.contains("<b>"));
        assert!(n.html.contains("<td>a.com</td>"));
        assert!(n.html.contains("250.00 (y@e.com)"));
        assert!(n.html.contains("Recent offers for a.com"));
    }

    #[test]
    fn test_render_html_escapes_offer_email() {
        let mut s = summary();
        s.recent_offers[0].email = "x&y@e.com".to_string();
        s.recent_offers[0].description = None;
        let html = render_html(&sample_report(vec![s])).unwrap();
        assert!(html.contains("x&amp;y@e.com"));
        assert!(!html.contains("x&y@e.com"));
    }

    #[test]
    fn test_render_empty_report() {
        let n = render_report(&sample_report(Vec::new())).unwrap();
        assert!(n.text.contains("no domains"));
        assert!(n.html.contains("no domains"));
    }
}
