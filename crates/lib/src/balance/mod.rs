//! Hour-bank balance lookup: HTTP client, wire parsing, and the normalized
//! balance record.

mod client;
mod record;

pub use client::{BalanceClient, BalanceError};
pub use record::{convert_duration, parse_balance_body, BalanceRecord};
