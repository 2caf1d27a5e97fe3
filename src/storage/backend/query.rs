//! Query operations for SeaOrmDirectory
//!
//! 报告流程只需要读操作。

use async_trait::async_trait;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use tracing::{debug, error};

use super::{SeaOrmDirectory, retry};
use crate::errors::Result;
use crate::storage::traits::{DomainDirectory, UserDirectory};
use crate::storage::{DomainRecord, User};

use migration::entities::{domain, user};

use super::converters::{model_to_domain, model_to_user};

impl SeaOrmDirectory {
    /// 用户总数（用于就绪检查）
    pub async fn count_users(&self) -> Result<u64> {
        let db = &self.db;
        let count = retry::with_retry("count_users", self.retry_config, || async {
            user::Entity::find().count(db).await
        })
        .await?;
        Ok(count)
    }
}

#[async_trait]
impl UserDirectory for SeaOrmDirectory {
    async fn list_users(&self) -> Result<Vec<User>> {
        let db = &self.db;

        let models = retry::with_retry("list_users", self.retry_config, || async {
            user::Entity::find()
                .order_by_asc(user::Column::Id)
                .all(db)
                .await
        })
        .await
        .map_err(|e| {
            error!("Failed to list users (after retries): {}", e);
            e
        })?;

        debug!("Loaded {} users", models.len());
        Ok(models.into_iter().map(model_to_user).collect())
    }

    async fn ping(&self) -> Result<()> {
        self.count_users().await.map(|_| ())
    }
}

#[async_trait]
impl DomainDirectory for SeaOrmDirectory {
    async fn list_domains_for_user(&self, user_id: &str) -> Result<Vec<DomainRecord>> {
        let db = &self.db;
        let owner = user_id.to_string();

        let models = retry::with_retry(
            &format!("list_domains_for_user({})", user_id),
            self.retry_config,
            || async {
                domain::Entity::find()
                    .filter(domain::Column::UserId.eq(owner.as_str()))
                    .order_by_asc(domain::Column::Name)
                    .all(db)
                    .await
            },
        )
        .await?;

        Ok(models.into_iter().map(model_to_domain).collect())
    }
}
