//! Link management: bounded retries and the per-role connection lifecycle

pub mod retry;
pub mod lifecycle;

pub use retry::{RetryBudget, RetryMode, RetryOutcome, RetryPolicy};
pub use lifecycle::{ConnectionLifecycle, LinkState, LinkStatus};
