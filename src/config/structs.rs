use serde::{Deserialize, Serialize};

use crate::errors::{DomainfolioError, Result};

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 静态配置（从 TOML 加载，启动时使用）
///
/// 包含：
/// - server: 服务器地址、端口、CPU 数量
/// - database: 用户与域名目录所在的关系数据库
/// - offer_store: 存放报价与访问计数的 Redis
/// - notification: 报告邮件发送
/// - reports: 定时报告的触发密钥与并发上限
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub offer_store: OfferStoreConfig,
    #[serde(default)]
    pub notification: NotificationConfig,
    #[serde(default)]
    pub reports: ReportsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：DF，分隔符：__
    /// 示例：DF__REPORTS__CRON_SECRET=change-me
    pub fn load(path: &str) -> Self {
        use config::{Config, Environment, File};

        let builder = Config::builder()
            // 1. 从 TOML 文件加载（可选）
            .add_source(File::with_name(path).required(false))
            // 2. 从环境变量覆盖，前缀 DF，分隔符 __
            .add_source(
                Environment::with_prefix("DF")
                    .separator("__")
                    .try_parsing(true),
            );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<StaticConfig>() {
                Ok(config) => {
                    if std::path::Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        }
    }

    /// 检查会导致服务无法正常工作的配置
    pub fn validate(&self) -> Result<()> {
        if self.reports.user_concurrency == 0 {
            return Err(DomainfolioError::validation(
                "reports.user_concurrency must be at least 1",
            ));
        }
        if self.reports.domain_concurrency == 0 {
            return Err(DomainfolioError::validation(
                "reports.domain_concurrency must be at least 1",
            ));
        }
        if !self.reports.route.starts_with('/') {
            return Err(DomainfolioError::validation(format!(
                "reports.route must start with '/': {}",
                self.reports.route
            )));
        }

        url::Url::parse(&self.offer_store.url).map_err(|e| {
            DomainfolioError::validation(format!(
                "Invalid offer_store.url '{}': {}",
                self.offer_store.url, e
            ))
        })?;

        if self.notification.provider == NotificationProvider::Email {
            url::Url::parse(&self.notification.api_url).map_err(|e| {
                DomainfolioError::validation(format!(
                    "Invalid notification.api_url '{}': {}",
                    self.notification.api_url, e
                ))
            })?;
            if self.notification.from.is_empty() {
                return Err(DomainfolioError::validation(
                    "notification.from is required for the email provider",
                ));
            }
        }

        Ok(())
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
}

/// 数据库连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_database_timeout")]
    pub timeout: u64,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

/// 报价存储（Redis）配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferStoreConfig {
    #[serde(default = "default_redis_url")]
    pub url: String,
    #[serde(default)]
    pub key_prefix: String,
}

/// 通知渠道
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotificationProvider {
    /// 通过 HTTP 邮件 API 发送
    #[default]
    Email,
    /// 只写日志，不真正发送（调试用）
    Log,
}

/// 报告通知配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default)]
    pub provider: NotificationProvider,
    /// 兼容 Resend 的邮件 API 地址
    #[serde(default = "default_notification_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_notification_from")]
    pub from: String,
    #[serde(default = "default_notification_timeout")]
    pub timeout_secs: u64,
}

/// 定时报告配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportsConfig {
    /// 外部定时触发器携带的 Bearer 密钥，为空时禁用触发端点
    #[serde(default)]
    pub cron_secret: String,
    #[serde(default = "default_reports_route")]
    pub route: String,
    /// 同时处理的用户数上限
    #[serde(default = "default_user_concurrency")]
    pub user_concurrency: usize,
    /// 单个用户内同时拉取的域名数上限
    #[serde(default = "default_domain_concurrency")]
    pub domain_concurrency: usize,
    /// 没有任何域名数据时是否仍然发送空报告
    #[serde(default)]
    pub send_empty_reports: bool,
    #[serde(default = "default_recent_offers_limit")]
    pub recent_offers_limit: usize,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_log_file")]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions for static config
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_database_url() -> String {
    "domainfolio.db".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_database_timeout() -> u64 {
    30
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    100
}

fn default_retry_max_delay_ms() -> u64 {
    2000
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379/".to_string()
}

fn default_notification_api_url() -> String {
    "https://api.resend.com/emails".to_string()
}

fn default_notification_from() -> String {
    "Domainfolio <reports@domainfolio.local>".to_string()
}

fn default_notification_timeout() -> u64 {
    10
}

fn default_reports_route() -> String {
    "/api/cron/periodic-reports".to_string()
}

fn default_user_concurrency() -> usize {
    8
}

fn default_domain_concurrency() -> usize {
    4
}

fn default_recent_offers_limit() -> usize {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_file() -> Option<String> {
    None
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            pool_size: default_database_pool_size(),
            timeout: default_database_timeout(),
            retry_count: default_retry_count(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl Default for OfferStoreConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            key_prefix: String::new(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            provider: NotificationProvider::default(),
            api_url: default_notification_api_url(),
            api_key: String::new(),
            from: default_notification_from(),
            timeout_secs: default_notification_timeout(),
        }
    }
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            cron_secret: String::new(),
            route: default_reports_route(),
            user_concurrency: default_user_concurrency(),
            domain_concurrency: default_domain_concurrency(),
            send_empty_reports: false,
            recent_offers_limit: default_recent_offers_limit(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: default_log_file(),
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = StaticConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.reports.cron_secret.is_empty());
        assert!(!config.reports.send_empty_reports);
        assert_eq!(config.reports.route, "/api/cron/periodic-reports");
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let mut config = StaticConfig::default();
        config.reports.user_concurrency = 0;
        assert!(config.validate().is_err());

        let mut config = StaticConfig::default();
        config.reports.domain_concurrency = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_email_provider_requires_valid_url() {
        let mut config = StaticConfig::default();
        config.notification.api_url = "not a url".to_string();
        assert!(config.validate().is_err());

        // log 渠道不关心 api_url
        config.notification.provider = NotificationProvider::Log;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sample_config_round_trips_through_toml() {
        let sample = StaticConfig::generate_sample_config();
        assert!(sample.contains("[reports]"));
        let parsed: StaticConfig = toml::from_str(&sample).expect("sample config should parse");
        assert_eq!(parsed.reports.user_concurrency, 8);
        assert_eq!(parsed.notification.provider, NotificationProvider::Email);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: StaticConfig = toml::from_str(
            r#"
            [reports]
            cron_secret = "s3cret"
            send_empty_reports = true

            [notification]
            provider = "log"
            "#,
        )
        .expect("partial config should parse");

        assert_eq!(parsed.reports.cron_secret, "s3cret");
        assert!(parsed.reports.send_empty_reports);
        assert_eq!(parsed.reports.domain_concurrency, 4);
        assert_eq!(parsed.notification.provider, NotificationProvider::Log);
        assert_eq!(parsed.server.port, 8080);
    }
}
