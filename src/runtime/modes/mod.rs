//! Mode routing
//!
//! - Server mode：HTTP 服务，等待外部定时任务触发
//! - CLI mode：一次性命令（dispatch / preview / config）

pub mod cli;
pub mod server;

pub use cli::{run_config_generate, run_dispatch, run_preview};
pub use server::run_server;
