//! Upstream Module
//!
//! Everything that talks to the MFL export API on the read path: the
//! rate-limited request queue, envelope handling and the cache-first client.

mod client;
mod envelope;
mod limiter;
mod query;

pub use client::UpstreamClient;
pub use envelope::unwrap_envelope;
pub use limiter::{QueueStats, RequestLimiter};
pub use query::{ExportQuery, TransactionType};
