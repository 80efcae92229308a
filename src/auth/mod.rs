//! Auth Module
//!
//! Login handshake, session-scoped league lookups, and write passthroughs to
//! the upstream on behalf of a logged-in user.

mod gateway;
mod service;
pub mod xml;

pub use gateway::MflGateway;
pub use service::AuthService;
pub use xml::{XmlDocument, XmlElement};
