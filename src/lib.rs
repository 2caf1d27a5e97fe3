//! Domainfolio - periodic portfolio reports for domain owners
//!
//! An hourly external trigger hits an authenticated endpoint; the dispatcher
//! decides which cadences (daily / weekly / monthly) are due, loads every
//! user and composes one report per user with bounded concurrency. Each
//! report aggregates the offers and visit counts of the user's domains and
//! is handed to a notification sender.
//!
//! # Architecture
//! - `storage`: user/domain directory (SeaORM) and offer store (Redis)
//! - `reports`: cadence rules, aggregation, composer and dispatcher
//! - `notify`: report rendering and email delivery
//! - `api`: HTTP trigger endpoint and health probes
//! - `config`: static configuration
//! - `runtime`: application lifecycle and execution modes
//! - `system`: logging

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod notify;
pub mod reports;
pub mod runtime;
pub mod storage;
pub mod system;
pub mod utils;
