//! API Module
//!
//! HTTP handlers and routing for the proxy REST API.
//!
//! # Endpoints
//! - `GET /health` - Health check
//! - `/api/auth/*` - Login, session, logout and write passthroughs
//! - `/api/leagues/:leagueId/*`, `/api/players` - Cached upstream reads
//! - `/api/stats`, `/api/cache/*` - Cache and queue administration

pub mod handlers;
pub mod routes;

pub use handlers::{AppState, MflCredential, CREDENTIAL_HEADER};
pub use routes::create_router;
