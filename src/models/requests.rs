//! Request DTOs for the proxy API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;

use crate::error::FieldError;
use crate::upstream::TransactionType;

/// Request body for `POST /api/auth/login`
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl LoginRequest {
    /// Validates the request data
    ///
    /// Returns every failed rule; an empty list means the request is valid.
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.username.trim().is_empty() {
            errors.push(FieldError::new("username", "MFL username is required"));
        }
        if self.password.trim().is_empty() {
            errors.push(FieldError::new("password", "MFL password is required"));
        }
        errors
    }
}

/// Request body for `POST /api/auth/:leagueId/lineup`
#[derive(Debug, Clone, Deserialize)]
pub struct LineupRequest {
    /// Player ids to start
    pub players: Vec<String>,
}

/// Request body for `POST /api/auth/:leagueId/waiver`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaiverRequest {
    pub add_player_id: String,
    #[serde(default)]
    pub drop_player_id: Option<String>,
}

/// Request body for `POST /api/auth/:leagueId/trade`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRequest {
    pub offering_players: Vec<String>,
    pub receiving_franchise_id: String,
    pub requested_players: Vec<String>,
}

/// Query string for `GET /api/leagues/:leagueId/rosters`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterQuery {
    pub franchise_id: Option<String>,
}

/// Query string for `GET /api/players`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayersQuery {
    pub position: Option<String>,
    pub status: Option<String>,
}

/// Query string for `GET /api/leagues/:leagueId/transactions`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionsQuery {
    #[serde(rename = "type")]
    pub trans_type: Option<TransactionType>,
    pub days: Option<u32>,
}
