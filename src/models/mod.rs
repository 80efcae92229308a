//! Request and Response models for the proxy API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{
    LineupRequest, LoginRequest, PlayersQuery, RosterQuery, TradeRequest, TransactionsQuery,
    WaiverRequest,
};
pub use responses::{
    ApiResponse, HealthResponse, InvalidateResponse, LeaguesResponse, SessionView, StatsResponse,
};
