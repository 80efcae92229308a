//! MFL Proxy - A caching, rate-limited backend for the MyFantasyLeague API
//!
//! Serves cached league data, funnels upstream reads through a fixed-rate
//! queue, and relays authenticated write actions for logged-in users.

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod tasks;
pub mod upstream;

pub use api::{create_router, AppState};
pub use config::{Config, RateLimitSettings};
pub use error::{ProxyError, Result};
pub use tasks::{spawn_cache_cleanup_task, spawn_session_sweep_task};
