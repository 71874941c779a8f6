//! Timewatcher core library — config, Slack channel connector, balance
//! client, and the hour-bank bot used by the CLI binary.

pub mod balance;
pub mod bot;
pub mod channels;
pub mod config;
