pub mod money;
pub mod time;

pub use money::Cents;
pub use time::{parse_instant, parse_json_instant};
