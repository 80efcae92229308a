//! Session Module
//!
//! Sessions created by a successful upstream login, keyed by the opaque
//! credential the upstream issued.

mod models;
mod store;

pub use models::{LeagueMembership, Session};
pub use store::SessionStore;
