// src/normalize/mod.rs
pub mod account;
pub mod amount;
pub mod date;

pub use account::{normalize_account, normalize_account_name, NormalizedAccount};
pub use amount::{parse_amount, parse_amount_with_default, to_yen};
pub use date::parse_date;
