use std::fmt;

#[derive(Debug, Clone)]
pub enum DomainfolioError {
    Unauthorized(String),
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    OfferStore(String),
    Notification(String),
    Validation(String),
    Serialization(String),
    UpstreamList(String),
    Compose(String),
    DomainFetch(String),
    FileOperation(String),
}

impl DomainfolioError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            DomainfolioError::Unauthorized(_) => "E001",
            DomainfolioError::DatabaseConfig(_) => "E002",
            DomainfolioError::DatabaseConnection(_) => "E003",
            DomainfolioError::DatabaseOperation(_) => "E004",
            DomainfolioError::OfferStore(_) => "E005",
            DomainfolioError::Notification(_) => "E006",
            DomainfolioError::Validation(_) => "E007",
            DomainfolioError::Serialization(_) => "E008",
            DomainfolioError::UpstreamList(_) => "E009",
            DomainfolioError::Compose(_) => "E010",
            DomainfolioError::DomainFetch(_) => "E011",
            DomainfolioError::FileOperation(_) => "E012",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            DomainfolioError::Unauthorized(_) => "Unauthorized",
            DomainfolioError::DatabaseConfig(_) => "Database Configuration Error",
            DomainfolioError::DatabaseConnection(_) => "Database Connection Error",
            DomainfolioError::DatabaseOperation(_) => "Database Operation Error",
            DomainfolioError::OfferStore(_) => "Offer Store Error",
            DomainfolioError::Notification(_) => "Notification Send Error",
            DomainfolioError::Validation(_) => "Validation Error",
            DomainfolioError::Serialization(_) => "Serialization Error",
            DomainfolioError::UpstreamList(_) => "Upstream List Failure",
            DomainfolioError::Compose(_) => "Report Compose Failure",
            DomainfolioError::DomainFetch(_) => "Domain Fetch Failure",
            DomainfolioError::FileOperation(_) => "File Operation Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            DomainfolioError::Unauthorized(msg)
            | DomainfolioError::DatabaseConfig(msg)
            | DomainfolioError::DatabaseConnection(msg)
            | DomainfolioError::DatabaseOperation(msg)
            | DomainfolioError::OfferStore(msg)
            | DomainfolioError::Notification(msg)
            | DomainfolioError::Validation(msg)
            | DomainfolioError::Serialization(msg)
            | DomainfolioError::UpstreamList(msg)
            | DomainfolioError::Compose(msg)
            | DomainfolioError::DomainFetch(msg)
            | DomainfolioError::FileOperation(msg) => msg,
        }
    }

    /// 格式化为彩色输出（用于启动失败时输出到终端）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于日志和 CLI）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for DomainfolioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for DomainfolioError {}

// 便捷的构造函数
impl DomainfolioError {
    pub fn unauthorized<T: Into<String>>(msg: T) -> Self {
        DomainfolioError::Unauthorized(msg.into())
    }

    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        DomainfolioError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        DomainfolioError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        DomainfolioError::DatabaseOperation(msg.into())
    }

    pub fn offer_store<T: Into<String>>(msg: T) -> Self {
        DomainfolioError::OfferStore(msg.into())
    }

    pub fn notification<T: Into<String>>(msg: T) -> Self {
        DomainfolioError::Notification(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        DomainfolioError::Validation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        DomainfolioError::Serialization(msg.into())
    }

    pub fn upstream_list<T: Into<String>>(msg: T) -> Self {
        DomainfolioError::UpstreamList(msg.into())
    }

    pub fn compose<T: Into<String>>(msg: T) -> Self {
        DomainfolioError::Compose(msg.into())
    }

    pub fn domain_fetch<T: Into<String>>(msg: T) -> Self {
        DomainfolioError::DomainFetch(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        DomainfolioError::FileOperation(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for DomainfolioError {
    fn from(err: sea_orm::DbErr) -> Self {
        DomainfolioError::DatabaseOperation(err.to_string())
    }
}

impl From<redis::RedisError> for DomainfolioError {
    fn from(err: redis::RedisError) -> Self {
        DomainfolioError::OfferStore(err.to_string())
    }
}

impl From<std::io::Error> for DomainfolioError {
    fn from(err: std::io::Error) -> Self {
        DomainfolioError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for DomainfolioError {
    fn from(err: serde_json::Error) -> Self {
        DomainfolioError::Serialization(err.to_string())
    }
}

impl From<ureq::Error> for DomainfolioError {
    fn from(err: ureq::Error) -> Self {
        DomainfolioError::Notification(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DomainfolioError>;
