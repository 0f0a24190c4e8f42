pub mod client;
pub mod retry;

pub use client::{StatsClient, STATS_BASE_URL};
pub use retry::{AttemptFailure, RetryDecision, RetryPolicy};
