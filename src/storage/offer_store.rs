//! Redis 报价存储
//!
//! 键布局：
//! - `{prefix}offers:{domain}`：报价列表（RPUSH 追加，按时间先后），
//!   兼容旧数据中整体存成 JSON 数组字符串的写法
//! - `{prefix}visits:{domain}`：访问计数整数

use std::sync::Arc;

use async_trait::async_trait;
use redis::{AsyncCommands, aio::MultiplexedConnection};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, error, trace, warn};

use crate::config::OfferStoreConfig;
use crate::errors::{DomainfolioError, Result};
use crate::storage::models::Offer;
use crate::storage::traits::OfferStore;
use crate::utils::{Cents, parse_json_instant};

/// 存储中的原始报价记录，字段类型在解码时再校验
#[derive(Debug, Deserialize)]
struct RawOffer {
    email: String,
    amount: serde_json::Value,
    #[serde(default)]
    description: Option<String>,
    timestamp: serde_json::Value,
}

/// 解码单条报价，拒绝非正金额
pub fn decode_offer(value: serde_json::Value) -> Result<Offer> {
    let raw: RawOffer = serde_json::from_value(value)?;
    let amount = Cents::from_json(&raw.amount)?;
    if !amount.is_positive() {
        return Err(DomainfolioError::validation(format!(
            "Offer amount must be positive, got {}",
            amount
        )));
    }

    Ok(Offer {
        email: raw.email,
        amount,
        description: raw.description.filter(|d| !d.trim().is_empty()),
        timestamp: parse_json_instant(&raw.timestamp)?,
    })
}

/// 解码报价列表，保持原有顺序；坏记录只跳过并记录日志
pub fn decode_offers<I>(domain: &str, entries: I) -> Vec<Offer>
where
    I: IntoIterator<Item = serde_json::Value>,
{
    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match decode_offer(value) {
            Ok(offer) => Some(offer),
            Err(e) => {
                warn!("Skipping invalid offer #{} for {}: {}", index, domain, e);
                None
            }
        })
        .collect()
}

pub struct RedisOfferStore {
    client: redis::Client,
    /// 持久化连接，使用 RwLock 保护
    connection: Arc<RwLock<Option<MultiplexedConnection>>>,
    key_prefix: String,
}

impl RedisOfferStore {
    /// 创建客户端并 PING 一次确认可用
    pub async fn connect(config: &OfferStoreConfig) -> Result<Self> {
        let client = redis::Client::open(config.url.clone()).map_err(|e| {
            DomainfolioError::offer_store(format!("Invalid Redis URL '{}': {}", config.url, e))
        })?;

        let store = Self {
            client,
            connection: Arc::new(RwLock::new(None)),
            key_prefix: config.key_prefix.clone(),
        };

        store.ping().await.map_err(|e| {
            error!(
                "Failed to ping Redis server: {}. Check Redis server status and URL: {}",
                e, config.url
            );
            e
        })?;

        debug!("RedisOfferStore created with prefix: '{}'", store.key_prefix);
        Ok(store)
    }

    /// 获取或建立持久连接
    async fn get_connection(&self) -> Result<MultiplexedConnection> {
        {
            let conn_guard = self.connection.read().await;
            if let Some(ref conn) = *conn_guard {
                return Ok(conn.clone());
            }
        }

        let mut conn_guard = self.connection.write().await;

        // 双重检查，避免竞态条件
        if let Some(ref conn) = *conn_guard {
            return Ok(conn.clone());
        }

        let new_conn = self.client.get_multiplexed_async_connection().await?;
        *conn_guard = Some(new_conn.clone());
        debug!("Redis connection established and cached");

        Ok(new_conn)
    }

    /// 重置连接（在连接错误时调用）
    async fn reset_connection(&self) {
        let mut conn_guard = self.connection.write().await;
        *conn_guard = None;
        debug!("Redis connection reset due to error");
    }

    /// 只有连接层错误才丢弃缓存的连接，命令错误原样返回
    async fn on_redis_error(&self, e: redis::RedisError) -> DomainfolioError {
        if is_connection_error(&e) {
            self.reset_connection().await;
        }
        e.into()
    }

    pub fn offers_key(&self, domain: &str) -> String {
        format!("{}offers:{}", self.key_prefix, domain)
    }

    pub fn visits_key(&self, domain: &str) -> String {
        format!("{}visits:{}", self.key_prefix, domain)
    }

    /// 读取报价原始 JSON，key 不存在视为空列表
    async fn read_offer_values(&self, key: &str) -> Result<Vec<serde_json::Value>> {
        let mut conn = self.get_connection().await?;

        let key_type: String = match redis::cmd("TYPE").arg(key).query_async(&mut conn).await {
            Ok(t) => t,
            Err(e) => {
                return Err(self.on_redis_error(e).await);
            }
        };

        match key_type.as_str() {
            "list" => {
                let entries: Vec<String> = match conn.lrange(key, 0, -1).await {
                    Ok(entries) => entries,
                    Err(e) => {
                        return Err(self.on_redis_error(e).await);
                    }
                };
                Ok(entries
                    .iter()
                    .filter_map(|entry| match serde_json::from_str(entry) {
                        Ok(value) => Some(value),
                        Err(e) => {
                            warn!("Skipping non-JSON offer entry in {}: {}", key, e);
                            None
                        }
                    })
                    .collect())
            }
            "string" => {
                let blob: Option<String> = match conn.get(key).await {
                    Ok(blob) => blob,
                    Err(e) => {
                        return Err(self.on_redis_error(e).await);
                    }
                };
                match blob {
                    Some(b) => serde_json::from_str::<Vec<serde_json::Value>>(&b).map_err(|e| {
                        DomainfolioError::offer_store(format!(
                            "Offer array under {} is not valid JSON: {}",
                            key, e
                        ))
                    }),
                    None => Ok(Vec::new()),
                }
            }
            "none" => Ok(Vec::new()),
            other => Err(DomainfolioError::offer_store(format!(
                "Unexpected key type '{}' for {}",
                other, key
            ))),
        }
    }
}

fn is_connection_error(e: &redis::RedisError) -> bool {
    e.is_io_error() || e.is_connection_dropped()
}

/// 解析访问计数，key 不存在视为 0
fn parse_visit_count(key: &str, raw: Option<&str>) -> Result<u64> {
    let Some(raw) = raw else {
        return Ok(0);
    };
    let count: i64 = raw.trim().parse().map_err(|_| {
        DomainfolioError::offer_store(format!(
            "Visit counter {} is not an integer: {:?}",
            key, raw
        ))
    })?;
    u64::try_from(count).map_err(|_| {
        DomainfolioError::offer_store(format!(
            "Visit counter {} is negative: {}",
            key, count
        ))
    })
}

#[async_trait]
impl OfferStore for RedisOfferStore {
    async fn get_offers(&self, domain: &str) -> Result<Vec<Offer>> {
        let key = self.offers_key(domain);
        let values = self.read_offer_values(&key).await.map_err(|e| {
            error!("Failed to read offers for '{}': {}", domain, e);
            e
        })?;

        let offers = decode_offers(domain, values);
        trace!("Loaded {} offers for {}", offers.len(), domain);
        Ok(offers)
    }

    async fn get_visit_count(&self, domain: &str) -> Result<u64> {
        let key = self.visits_key(domain);
        let mut conn = self.get_connection().await?;

        let result: redis::RedisResult<Option<String>> = conn.get(&key).await;
        match result {
            Ok(raw) => parse_visit_count(&key, raw.as_deref()),
            Err(e) => {
                error!("Failed to read visits for '{}': {}", domain, e);
                Err(self.on_redis_error(e).await)
            }
        }
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.get_connection().await?;
        let result: redis::RedisResult<String> = redis::cmd("PING").query_async(&mut conn).await;
        match result {
            Ok(_) => Ok(()),
            Err(e) => Err(self.on_redis_error(e).await),
        }
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
