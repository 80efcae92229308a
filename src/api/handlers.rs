//! API Handlers
//!
//! HTTP request handlers for each proxy endpoint.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Path, Query, State},
    http::{request::Parts, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::info;

use crate::auth::AuthService;
use crate::cache::CacheStore;
use crate::config::{Config, RateLimitSettings};
use crate::error::{ProxyError, Result};
use crate::models::{
    ApiResponse, HealthResponse, InvalidateResponse, LeaguesResponse, LineupRequest,
    LoginRequest, PlayersQuery, RosterQuery, SessionView, StatsResponse, TradeRequest,
    TransactionsQuery, WaiverRequest,
};
use crate::session::SessionStore;
use crate::upstream::{RequestLimiter, UpstreamClient};

/// Header carrying the credential handed out at login.
pub const CREDENTIAL_HEADER: &str = "x-mfl-cookie";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<RwLock<CacheStore>>,
    pub sessions: Arc<RwLock<SessionStore>>,
    pub limiter: Arc<RequestLimiter>,
    pub upstream: Arc<UpstreamClient>,
    pub auth: Arc<AuthService>,
    pub rate_limit: RateLimitSettings,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Creates the state from configuration.
    ///
    /// Must be called inside a tokio runtime: the limiter spawns its drain task here.
    pub fn from_config(config: &Config) -> Result<Self> {
        let cache = Arc::new(RwLock::new(CacheStore::new(config.cache_ttl)));
        let sessions = Arc::new(RwLock::new(SessionStore::new()));
        let limiter = Arc::new(RequestLimiter::new(config.requests_per_second));
        let upstream = Arc::new(UpstreamClient::new(config, cache.clone(), limiter.clone())?);
        let auth = Arc::new(AuthService::new(config, sessions.clone())?);

        Ok(Self {
            cache,
            sessions,
            limiter,
            upstream,
            auth,
            rate_limit: config.rate_limit,
            started_at: Utc::now(),
        })
    }
}

// == Credential Extractor ==
/// The caller's upstream credential, taken from the `x-mfl-cookie` header.
#[derive(Debug, Clone)]
pub struct MflCredential(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for MflCredential
where
    S: Send + Sync,
{
    type Rejection = ProxyError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .headers
            .get(CREDENTIAL_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| MflCredential(value.to_string()))
            .ok_or_else(|| ProxyError::SessionExpired("No session cookie provided".to_string()))
    }
}

// == Auth ==
/// Handler for POST /api/auth/login
pub async fn login_handler(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<SessionView>>> {
    let errors = req.validate();
    if !errors.is_empty() {
        return Err(ProxyError::Validation(errors));
    }

    let session = state.auth.login(req.username.trim(), &req.password).await?;
    Ok(Json(ApiResponse::with_message(
        SessionView::from(session),
        "Login successful",
    )))
}

/// Handler for GET /api/auth/session
pub async fn session_handler(
    State(state): State<AppState>,
    MflCredential(credential): MflCredential,
) -> Result<Json<ApiResponse<Value>>> {
    let session = state
        .auth
        .session(&credential)
        .await
        .ok_or_else(|| ProxyError::SessionExpired("Session expired or invalid".to_string()))?;

    Ok(Json(ApiResponse::data(json!({
        "username": session.username,
        "leagues": session.leagues,
        "expiresAt": session.expires_at,
    }))))
}

/// Handler for GET /api/auth/refresh-leagues
pub async fn refresh_leagues_handler(
    State(state): State<AppState>,
    MflCredential(credential): MflCredential,
) -> Result<Json<ApiResponse<LeaguesResponse>>> {
    let leagues = state.auth.refresh_leagues(&credential).await?;
    Ok(Json(ApiResponse::data(LeaguesResponse { leagues })))
}

/// Handler for POST /api/auth/logout. Succeeds with or without a session.
pub async fn logout_handler(
    State(state): State<AppState>,
    credential: Option<MflCredential>,
) -> Json<ApiResponse<()>> {
    if let Some(MflCredential(credential)) = credential {
        state.auth.logout(&credential).await;
    }
    Json(ApiResponse::message("Logged out successfully"))
}

// == Write Passthroughs ==
/// Handler for POST /api/auth/:leagueId/lineup
pub async fn lineup_handler(
    State(state): State<AppState>,
    MflCredential(credential): MflCredential,
    Path(league_id): Path<String>,
    Json(req): Json<LineupRequest>,
) -> Result<Json<ApiResponse<Value>>> {
    let result = state.auth.set_lineup(&credential, &league_id, &req).await?;
    state.upstream.invalidate_league(&league_id).await;

    Ok(Json(ApiResponse::with_message(result, "Lineup updated successfully")))
}

/// Handler for POST /api/auth/:leagueId/waiver
pub async fn waiver_handler(
    State(state): State<AppState>,
    MflCredential(credential): MflCredential,
    Path(league_id): Path<String>,
    Json(req): Json<WaiverRequest>,
) -> Result<Json<ApiResponse<Value>>> {
    let result = state
        .auth
        .submit_waiver(&credential, &league_id, &req)
        .await?;
    state.upstream.invalidate_league(&league_id).await;

    Ok(Json(ApiResponse::with_message(result, "Waiver claim submitted")))
}

/// Handler for POST /api/auth/:leagueId/trade
pub async fn trade_handler(
    State(state): State<AppState>,
    MflCredential(credential): MflCredential,
    Path(league_id): Path<String>,
    Json(req): Json<TradeRequest>,
) -> Result<Json<ApiResponse<Value>>> {
    let result = state
        .auth
        .propose_trade(&credential, &league_id, &req)
        .await?;
    state.upstream.invalidate_league(&league_id).await;

    Ok(Json(ApiResponse::with_message(result, "Trade proposed successfully")))
}

// == League Reads ==
pub async fn league_handler(
    State(state): State<AppState>,
    Path(league_id): Path<String>,
) -> Result<Json<ApiResponse<Value>>> {
    Ok(Json(ApiResponse::data(state.upstream.league(&league_id).await?)))
}

pub async fn rosters_handler(
    State(state): State<AppState>,
    Path(league_id): Path<String>,
    Query(query): Query<RosterQuery>,
) -> Result<Json<ApiResponse<Value>>> {
    let rosters = state
        .upstream
        .rosters(&league_id, query.franchise_id.as_deref())
        .await?;
    Ok(Json(ApiResponse::data(rosters)))
}

pub async fn scores_handler(
    State(state): State<AppState>,
    Path((league_id, week)): Path<(String, String)>,
) -> Result<Json<ApiResponse<Value>>> {
    let scores = state.upstream.player_scores(&league_id, &week).await?;
    Ok(Json(ApiResponse::data(scores)))
}

pub async fn standings_handler(
    State(state): State<AppState>,
    Path(league_id): Path<String>,
) -> Result<Json<ApiResponse<Value>>> {
    Ok(Json(ApiResponse::data(
        state.upstream.standings(&league_id).await?,
    )))
}

pub async fn transactions_handler(
    State(state): State<AppState>,
    Path(league_id): Path<String>,
    Query(query): Query<TransactionsQuery>,
) -> Result<Json<ApiResponse<Value>>> {
    let days = query.days.map(|d| d.to_string());
    let transactions = state
        .upstream
        .transactions(&league_id, query.trans_type, days.as_deref())
        .await?;
    Ok(Json(ApiResponse::data(transactions)))
}

pub async fn schedule_handler(
    State(state): State<AppState>,
    Path(league_id): Path<String>,
) -> Result<Json<ApiResponse<Value>>> {
    Ok(Json(ApiResponse::data(
        state.upstream.schedule(&league_id).await?,
    )))
}

pub async fn players_handler(
    State(state): State<AppState>,
    Query(query): Query<PlayersQuery>,
) -> Result<Json<ApiResponse<Value>>> {
    let players = state
        .upstream
        .players(query.position.as_deref(), query.status.as_deref())
        .await?;
    Ok(Json(ApiResponse::data(players)))
}

// == Cache Admin ==
/// Handler for GET /api/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<ApiResponse<StatsResponse>> {
    let cache = state.upstream.cache_stats().await;
    let queue = state.upstream.queue_stats();

    Json(ApiResponse::data(StatsResponse::new(cache, queue)))
}

/// Handler for DELETE /api/cache/leagues/:leagueId
pub async fn invalidate_league_handler(
    State(state): State<AppState>,
    Path(league_id): Path<String>,
) -> Json<ApiResponse<InvalidateResponse>> {
    let removed = state.upstream.invalidate_league(&league_id).await;
    Json(ApiResponse::data(InvalidateResponse { league_id, removed }))
}

/// Handler for POST /api/cache/flush
pub async fn flush_handler(State(state): State<AppState>) -> Json<ApiResponse<()>> {
    state.cache.write().await.flush();
    info!("Cache flushed");
    Json(ApiResponse::message("Cache flushed"))
}

// == Health ==
/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::ok(state.started_at))
}

/// Fallback for unknown routes
pub async fn not_found_handler() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "message": "Route not found" })),
    )
}
