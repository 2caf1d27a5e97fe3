use tracing::warn;

use crate::storage::{DomainRecord, User};
use crate::utils::Cents;
use migration::entities::{domain, user};

pub fn model_to_user(model: user::Model) -> User {
    User {
        id: model.id,
        email: model.email,
    }
}

pub fn model_to_domain(model: domain::Model) -> DomainRecord {
    let nameservers = parse_nameservers(&model.name, model.nameservers.as_deref());
    DomainRecord {
        name: model.name,
        user_id: model.user_id,
        threshold: Cents::new(model.threshold_cents.max(0)),
        subscription_id: model.subscription_id,
        nameservers,
    }
}

/// nameservers 列存的是 JSON 字符串数组；损坏的数据只记日志，不影响报告
pub fn parse_nameservers(domain: &str, raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
        return Vec::new();
    };

    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(list) => list,
        Err(e) => {
            warn!("Ignoring malformed nameservers for {}: {}", domain, e);
            Vec::new()
        }
    }
}
