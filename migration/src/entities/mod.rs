pub mod domain;
pub mod user;

pub use domain::Entity as DomainEntity;
pub use user::Entity as UserEntity;
