//! 报告流程依赖的外部数据源
//!
//! 用户与域名目录由关系数据库提供，报价与访问计数由键值存储提供。
//! 报告流程只读这些数据，不做任何写入。

use async_trait::async_trait;

use crate::errors::Result;
use crate::storage::models::{DomainRecord, Offer, User};

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// 列出所有用户（id + email）
    async fn list_users(&self) -> Result<Vec<User>>;

    /// 连通性检查
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
pub trait DomainDirectory: Send + Sync {
    /// 列出某个用户名下的域名，没有域名时返回空列表而不是错误
    async fn list_domains_for_user(&self, user_id: &str) -> Result<Vec<DomainRecord>>;
}

#[async_trait]
pub trait OfferStore: Send + Sync {
    /// 读取域名的全部报价，按提交时间先后排列
    async fn get_offers(&self, domain: &str) -> Result<Vec<Offer>>;

    /// 读取域名的访问计数，不存在时为 0
    async fn get_visit_count(&self, domain: &str) -> Result<u64>;

    /// 连通性检查
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str;
}
