//! Response DTOs for the proxy API
//!
//! Defines the structure of outgoing HTTP response bodies. Successful answers
//! share the `{ success, message?, data? }` envelope that errors also use.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::CacheStats;
use crate::session::{LeagueMembership, Session};
use crate::upstream::QueueStats;

/// Success envelope wrapping every API payload
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
        }
    }
}

/// Session as shown to the client. `cookie` is the credential the client
/// sends back in `x-mfl-cookie`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub cookie: String,
    pub username: String,
    pub leagues: Vec<LeagueMembership>,
    pub expires_at: DateTime<Utc>,
}

impl From<Session> for SessionView {
    fn from(session: Session) -> Self {
        Self {
            cookie: session.credential,
            username: session.username,
            leagues: session.leagues,
            expires_at: session.expires_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaguesResponse {
    pub leagues: Vec<LeagueMembership>,
}

/// Response body for `GET /api/stats`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub cache: CacheStats,
    pub hit_rate: f64,
    pub queue: QueueStats,
}

impl StatsResponse {
    pub fn new(cache: CacheStats, queue: QueueStats) -> Self {
        Self {
            hit_rate: cache.hit_rate(),
            cache,
            queue,
        }
    }
}

/// Response body for `DELETE /api/cache/leagues/:leagueId`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidateResponse {
    pub league_id: String,
    pub removed: usize,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    /// Seconds since the server started
    pub uptime: i64,
}

impl HealthResponse {
    pub fn ok(started_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            status: "OK".to_string(),
            timestamp: now.to_rfc3339(),
            uptime: (now - started_at).num_seconds(),
        }
    }
}
