//! Upstream Client
//!
//! Cache-first reads against the MFL export API. A miss is fetched through the
//! rate-limited queue, unwrapped from its envelope, and cached under the
//! category's TTL. Concurrent misses for the same key are not coalesced: each
//! issues its own upstream call and the last write wins.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::cache::{CacheCategory, CacheStats, CacheStore};
use crate::config::Config;
use crate::error::{ProxyError, Result};
use crate::upstream::envelope::unwrap_envelope;
use crate::upstream::limiter::{QueueStats, RequestLimiter};
use crate::upstream::query::{ExportQuery, TransactionType};

// == Upstream Client ==
pub struct UpstreamClient {
    http: reqwest::Client,
    export_url: String,
    cache: Arc<RwLock<CacheStore>>,
    limiter: Arc<RequestLimiter>,
}

impl UpstreamClient {
    // == Constructor ==
    /// Builds a client with its own HTTP connection pool from configuration.
    pub fn new(
        config: &Config,
        cache: Arc<RwLock<CacheStore>>,
        limiter: Arc<RequestLimiter>,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .build()
            .map_err(|e| ProxyError::Internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self::with_http_client(
            http,
            &config.mfl_base_url,
            cache,
            limiter,
        ))
    }

    /// Wraps an existing HTTP client.
    pub fn with_http_client(
        http: reqwest::Client,
        base_url: &str,
        cache: Arc<RwLock<CacheStore>>,
        limiter: Arc<RequestLimiter>,
    ) -> Self {
        Self {
            http,
            export_url: format!("{}/export", base_url.trim_end_matches('/')),
            cache,
            limiter,
        }
    }

    // == Fetch ==
    /// Returns the payload for `(category, key)`, calling upstream only on a miss.
    ///
    /// Upstream failures and malformed envelopes are returned as-is and never cached.
    pub async fn fetch(
        &self,
        query: ExportQuery,
        category: CacheCategory,
        key: &str,
    ) -> Result<Value> {
        if let Some(cached) = self.cache.write().await.get(category, key) {
            return Ok(cached);
        }

        let http = self.http.clone();
        let url = self.export_url.clone();
        let export_type = query.export_type().to_string();
        let params = query.into_pairs();

        let body = self
            .limiter
            .enqueue(move || async move {
                debug!("MFL API Request: {} {:?}", url, params);
                let response = http
                    .get(&url)
                    .query(&params)
                    .send()
                    .await
                    .map_err(ProxyError::from_transport)?;

                let status = response.status();
                if !status.is_success() {
                    return Err(ProxyError::UpstreamFetch {
                        status: Some(status.as_u16()),
                        message: format!("MFL API answered {}", status),
                    });
                }

                response
                    .json::<Value>()
                    .await
                    .map_err(|e| ProxyError::MalformedResponse(format!("invalid JSON: {}", e)))
            })
            .await
            .inspect_err(|e| warn!("MFL API Error ({}): {}", export_type, e))?;

        let payload = unwrap_envelope(body)?;
        self.cache
            .write()
            .await
            .set(category, key, payload.clone());

        Ok(payload)
    }

    // == League ==
    pub async fn league(&self, league_id: &str) -> Result<Value> {
        let query = ExportQuery::new("league").param("L", league_id);
        self.fetch(query, CacheCategory::LeagueInfo, league_id).await
    }

    // == Rosters ==
    /// Rosters for a league, or for one franchise in it.
    pub async fn rosters(&self, league_id: &str, franchise_id: Option<&str>) -> Result<Value> {
        let key = match franchise_id {
            Some(franchise) => format!("{}-{}", league_id, franchise),
            None => league_id.to_string(),
        };
        let query = ExportQuery::new("rosters")
            .param("L", league_id)
            .param_opt("FRANCHISE", franchise_id);

        self.fetch(query, CacheCategory::Rosters, &key).await
    }

    // == Player Scores ==
    pub async fn player_scores(&self, league_id: &str, week: &str) -> Result<Value> {
        let query = ExportQuery::new("playerScores")
            .param("L", league_id)
            .param("W", week);

        self.fetch(
            query,
            CacheCategory::LiveScores,
            &format!("{}-{}", league_id, week),
        )
        .await
    }

    // == Players ==
    /// Player directory, optionally filtered by position. Any `status` value
    /// requests the detailed listing.
    pub async fn players(&self, position: Option<&str>, status: Option<&str>) -> Result<Value> {
        let key = format!("{}-{}", position.unwrap_or("all"), status.unwrap_or("all"));
        let query = ExportQuery::new("players")
            .param_opt("POSITION", position)
            .param_opt("DETAILS", status.map(|_| "1"));

        self.fetch(query, CacheCategory::Players, &key).await
    }

    // == Standings ==
    pub async fn standings(&self, league_id: &str) -> Result<Value> {
        let query = ExportQuery::new("leagueStandings").param("L", league_id);
        self.fetch(query, CacheCategory::Standings, league_id).await
    }

    // == Transactions ==
    /// Recent transactions, `days` defaulting to 7.
    pub async fn transactions(
        &self,
        league_id: &str,
        trans_type: Option<TransactionType>,
        days: Option<&str>,
    ) -> Result<Value> {
        let days = days.unwrap_or("7");
        let key = format!(
            "{}-{}-{}",
            league_id,
            trans_type.map(|t| t.as_str()).unwrap_or("all"),
            days
        );
        let query = ExportQuery::new("transactions")
            .param("L", league_id)
            .param("DAYS", days)
            .param_opt("TRANS_TYPE", trans_type.map(|t| t.as_str()));

        self.fetch(query, CacheCategory::Transactions, &key).await
    }

    // == Schedule ==
    /// League schedule. Cached alongside league info since it changes as rarely.
    pub async fn schedule(&self, league_id: &str) -> Result<Value> {
        let query = ExportQuery::new("leagueSchedule").param("L", league_id);
        self.fetch(
            query,
            CacheCategory::LeagueInfo,
            &format!("{}-schedule", league_id),
        )
        .await
    }

    // == Invalidate ==
    /// Drops cached league info, rosters and standings for a league.
    ///
    /// Returns the number of entries removed.
    pub async fn invalidate_league(&self, league_id: &str) -> usize {
        let mut cache = self.cache.write().await;
        let removed: usize = [
            CacheCategory::LeagueInfo,
            CacheCategory::Rosters,
            CacheCategory::Standings,
        ]
        .into_iter()
        .map(|category| cache.delete(category, league_id))
        .sum();

        info!("Cache invalidated for league: {} ({} entries)", league_id, removed);
        removed
    }

    // == Stats ==
    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.read().await.stats()
    }

    pub fn queue_stats(&self) -> QueueStats {
        self.limiter.stats()
    }
}
