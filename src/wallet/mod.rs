pub mod balance;

pub use balance::{extract_funding_balance, funding_wallets};
