pub mod cron;
pub mod health;

pub use cron::{CronService, CronState, cron_routes};
pub use health::{AppStartTime, HealthService, HealthTargets, health_routes};
