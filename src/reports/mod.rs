//! 定时报告流程
//!
//! dispatcher 判断到期周期并按用户分发，composer 为单个用户生成并发送报告，
//! aggregate 负责每个域名的报价统计。

pub mod aggregate;
pub mod cadence;
pub mod composer;
pub mod dispatcher;

pub use aggregate::{DomainSummary, HighestOffer, Report, SummaryWindow, summarize_domain};
pub use cadence::{Cadence, due_cadences};
pub use composer::{ComposeOutcome, DomainFetch, ReportComposer, ReportSettings};
pub use dispatcher::{CadenceTally, DispatchOutcome, DispatchSummary, ReportDispatcher};
