pub mod cron_auth;

pub use cron_auth::CronAuth;
