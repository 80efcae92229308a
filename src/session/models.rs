//! Session Models
//!
//! An authenticated user's session and the league memberships captured with it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// == League Membership ==
/// Snapshot of one league the user owns a franchise in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueMembership {
    pub league_id: String,
    pub league_name: String,
    pub franchise_id: String,
    pub franchise_name: String,
    pub url: String,
}

// == Session ==
/// Authenticated session keyed by the upstream-issued credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Opaque upstream credential, e.g. `MFL_USER_ID=...`
    pub credential: String,
    pub username: String,
    pub leagues: Vec<LeagueMembership>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(
        credential: impl Into<String>,
        username: impl Into<String>,
        leagues: Vec<LeagueMembership>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            credential: credential.into(),
            username: username.into(),
            leagues,
            expires_at,
        }
    }

    /// Expired once `now` reaches `expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// The membership for `league_id`, if the user has one.
    pub fn league(&self, league_id: &str) -> Option<&LeagueMembership> {
        self.leagues.iter().find(|l| l.league_id == league_id)
    }
}
