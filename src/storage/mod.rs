use std::sync::Arc;

use crate::config::StaticConfig;
use crate::errors::Result;

pub mod backend;
pub mod models;
pub mod offer_store;
pub mod traits;

pub use backend::SeaOrmDirectory;
pub use models::{DomainRecord, Offer, User};
pub use offer_store::RedisOfferStore;
pub use traits::{DomainDirectory, OfferStore, UserDirectory};

pub struct StorageFactory;

impl StorageFactory {
    /// 创建用户/域名目录（同一个数据库同时提供两者）
    pub async fn create_directory(config: &StaticConfig) -> Result<Arc<SeaOrmDirectory>> {
        let database_url = &config.database.database_url;

        // 从 URL 自动推断数据库类型
        let backend_type = backend::infer_backend_from_url(database_url)?;

        let directory = SeaOrmDirectory::new(database_url, &backend_type).await?;
        Ok(Arc::new(directory))
    }

    /// 创建报价存储
    pub async fn create_offer_store(config: &StaticConfig) -> Result<Arc<RedisOfferStore>> {
        let store = RedisOfferStore::connect(&config.offer_store).await?;
        Ok(Arc::new(store))
    }
}
