//! API Routes
//!
//! Configures the Axum router with all proxy endpoints.

use std::sync::Arc;

use axum::{
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::json;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use super::handlers::{
    flush_handler, health_handler, invalidate_league_handler, league_handler, lineup_handler,
    login_handler, logout_handler, not_found_handler, players_handler, refresh_leagues_handler,
    rosters_handler, schedule_handler, scores_handler, session_handler, standings_handler,
    stats_handler, trade_handler, transactions_handler, waiver_handler, AppState,
};
use crate::config::RateLimitSettings;

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - Rate limit: per client IP on `/api` routes
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let auth = Router::new()
        .route("/login", post(login_handler))
        .route("/session", get(session_handler))
        .route("/refresh-leagues", get(refresh_leagues_handler))
        .route("/logout", post(logout_handler))
        .route("/:league_id/lineup", post(lineup_handler))
        .route("/:league_id/waiver", post(waiver_handler))
        .route("/:league_id/trade", post(trade_handler));

    let leagues = Router::new()
        .route("/:league_id", get(league_handler))
        .route("/:league_id/rosters", get(rosters_handler))
        .route("/:league_id/scores/:week", get(scores_handler))
        .route("/:league_id/standings", get(standings_handler))
        .route("/:league_id/transactions", get(transactions_handler))
        .route("/:league_id/schedule", get(schedule_handler));

    let api = Router::new()
        .nest("/auth", auth)
        .nest("/leagues", leagues)
        .route("/players", get(players_handler))
        .route("/stats", get(stats_handler))
        .route("/cache/leagues/:league_id", delete(invalidate_league_handler))
        .route("/cache/flush", post(flush_handler));

    Router::new()
        .route("/health", get(health_handler))
        .nest("/api", rate_limited(api, state.rate_limit))
        .fallback(not_found_handler)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Applies the per-IP request budget. The client IP comes from
/// `X-Forwarded-For`/`X-Real-IP`/`Forwarded`, else from the peer address.
fn rate_limited(api: Router<AppState>, settings: RateLimitSettings) -> Router<AppState> {
    let config = GovernorConfigBuilder::default()
        .per_millisecond(settings.replenish_ms())
        .burst_size(settings.max_requests.max(1))
        .key_extractor(SmartIpKeyExtractor)
        .finish();

    match config {
        Some(config) => api
            .layer(GovernorLayer {
                config: Arc::new(config),
            })
            .layer(middleware::map_response(rate_limit_envelope)),
        None => {
            warn!("Invalid rate limit settings {:?}, /api is not rate limited", settings);
            api
        }
    }
}

/// Rewrites the limiter's plain-text 429 into the failure envelope.
async fn rate_limit_envelope(response: Response) -> Response {
    if response.status() != StatusCode::TOO_MANY_REQUESTS {
        return response;
    }

    let (mut parts, _) = response.into_parts();
    parts.headers.remove(header::CONTENT_TYPE);
    parts.headers.remove(header::CONTENT_LENGTH);

    let body = json!({
        "success": false,
        "message": "Too many requests from this IP, please try again later.",
    });
    (parts, Json(body)).into_response()
}
