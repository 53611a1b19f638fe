//! Retry and backoff policy for mirror fetches.
//!
//! Errors are classified into kinds (absent, throttled, timeout, ...) and a
//! small linear-backoff policy decides whether another attempt is worth it.

mod classify;
mod policy;
mod run;

pub use classify::{classify, classify_http_status};
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::{run_with_retry, sleep_unless_aborted};
