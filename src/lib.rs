pub mod bot;
pub mod client;
pub mod config;
pub mod domain;
pub mod execution;
pub mod logging;
pub mod monitor;
pub mod notify;
pub mod strategy;
pub mod wallet;
