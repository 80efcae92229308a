//! Auth Service
//!
//! Orchestrates login, session lookups, and the authenticated write actions.
//! Writes go straight to the upstream: they bypass both the cache and the
//! rate-limited read queue.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::auth::gateway::MflGateway;
use crate::config::{Config, MAX_SESSION_TTL_HOURS};
use crate::error::{ProxyError, Result};
use crate::models::{LineupRequest, TradeRequest, WaiverRequest};
use crate::session::{LeagueMembership, Session, SessionStore};

const SESSION_EXPIRED: &str = "Session expired";

// == Auth Service ==
pub struct AuthService {
    gateway: MflGateway,
    sessions: Arc<RwLock<SessionStore>>,
    login_timeout: Duration,
    session_ttl: chrono::Duration,
}

impl AuthService {
    pub fn new(config: &Config, sessions: Arc<RwLock<SessionStore>>) -> Result<Self> {
        Ok(Self {
            gateway: MflGateway::new(config)?,
            sessions,
            login_timeout: Duration::from_secs(config.login_timeout),
            session_ttl: chrono::Duration::hours(
                config.session_ttl_hours.clamp(1, MAX_SESSION_TTL_HOURS),
            ),
        })
    }

    // == Login ==
    /// Authenticates against the upstream and stores a fresh session.
    ///
    /// The league list is best-effort: if it cannot be fetched the session is
    /// still created, with no leagues.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session> {
        info!("Login attempt for {}", username);

        let credential = tokio::time::timeout(
            self.login_timeout,
            self.gateway.authenticate(username, password),
        )
        .await
        .map_err(|_| ProxyError::LoginTimeout)??;

        let leagues = match self.gateway.fetch_leagues(&credential).await {
            Ok(leagues) => leagues,
            Err(e) => {
                warn!("League list unavailable for {}: {}", username, e);
                Vec::new()
            }
        };

        let session = Session::new(
            credential,
            username,
            leagues,
            Utc::now() + self.session_ttl,
        );
        self.sessions.write().await.insert(session.clone());

        info!(
            "Login successful for {} ({} leagues)",
            username,
            session.leagues.len()
        );
        Ok(session)
    }

    // == Sessions ==
    pub async fn session(&self, credential: &str) -> Option<Session> {
        self.sessions.write().await.get(credential)
    }

    async fn require_session(&self, credential: &str) -> Result<Session> {
        self.session(credential)
            .await
            .ok_or_else(|| ProxyError::SessionExpired(SESSION_EXPIRED.to_string()))
    }

    /// Re-fetches the league list and overwrites the stored one.
    ///
    /// A failed fetch leaves the stored list untouched.
    pub async fn refresh_leagues(&self, credential: &str) -> Result<Vec<LeagueMembership>> {
        self.require_session(credential).await?;

        let leagues = self.gateway.fetch_leagues(credential).await?;
        if !self
            .sessions
            .write()
            .await
            .set_leagues(credential, leagues.clone())
        {
            return Err(ProxyError::SessionExpired(SESSION_EXPIRED.to_string()));
        }

        Ok(leagues)
    }

    /// Removes the session. Logging out twice is not an error.
    pub async fn logout(&self, credential: &str) -> bool {
        self.sessions.write().await.remove(credential)
    }

    // == Write Actions ==
    pub async fn set_lineup(
        &self,
        credential: &str,
        league_id: &str,
        request: &LineupRequest,
    ) -> Result<Value> {
        let franchise_id = self.franchise_for(credential, league_id).await?;
        let form = vec![
            ("TYPE", "roster".to_string()),
            ("L", league_id.to_string()),
            ("FRANCHISE_ID", franchise_id),
            ("PLAYERS", request.players.join(",")),
        ];

        self.submit(credential, form, "Failed to set lineup").await
    }

    pub async fn submit_waiver(
        &self,
        credential: &str,
        league_id: &str,
        request: &WaiverRequest,
    ) -> Result<Value> {
        let franchise_id = self.franchise_for(credential, league_id).await?;
        let mut form = vec![
            ("TYPE", "waiver".to_string()),
            ("L", league_id.to_string()),
            ("FRANCHISE_ID", franchise_id),
            ("ADD", request.add_player_id.clone()),
        ];
        if let Some(drop) = &request.drop_player_id {
            form.push(("DROP", drop.clone()));
        }

        self.submit(credential, form, "Failed to submit waiver").await
    }

    pub async fn propose_trade(
        &self,
        credential: &str,
        league_id: &str,
        request: &TradeRequest,
    ) -> Result<Value> {
        let franchise_id = self.franchise_for(credential, league_id).await?;
        let form = vec![
            ("TYPE", "tradeBait".to_string()),
            ("L", league_id.to_string()),
            ("FRANCHISE_ID", franchise_id),
            ("OFFERED_PLAYERS", request.offering_players.join(",")),
            ("FRANCHISE_ID2", request.receiving_franchise_id.clone()),
            ("REQUESTED_PLAYERS", request.requested_players.join(",")),
        ];

        self.submit(credential, form, "Failed to propose trade").await
    }

    /// The caller's franchise in `league_id`. Fails before any upstream call
    /// when the session or the membership is missing.
    async fn franchise_for(&self, credential: &str, league_id: &str) -> Result<String> {
        let session = self.require_session(credential).await?;
        session
            .league(league_id)
            .map(|league| league.franchise_id.clone())
            .ok_or_else(|| ProxyError::LeagueNotFound(league_id.to_string()))
    }

    async fn submit(
        &self,
        credential: &str,
        form: Vec<(&'static str, String)>,
        rejected: &str,
    ) -> Result<Value> {
        let doc = self.gateway.post_action(credential, form).await?;

        if doc.is_error() {
            let message = doc.error_message().unwrap_or(rejected).to_string();
            warn!("MFL rejected write action: {}", message);
            return Err(ProxyError::RequestRejected(message));
        }

        Ok(doc.to_json())
    }
}
