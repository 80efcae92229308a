//! MFL auth gateway
//!
//! The three upstream calls that need a user credential rather than the
//! public export API: the login handshake, the user's league list, and
//! form-encoded write actions.

use std::time::Duration;

use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::redirect::Policy;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::auth::xml::XmlDocument;
use crate::config::Config;
use crate::error::{ProxyError, Result};
use crate::session::LeagueMembership;

const USER_ID_COOKIE: &str = "MFL_USER_ID";

// == MFL Gateway ==
pub struct MflGateway {
    http: reqwest::Client,
    login_url: String,
    export_url: String,
}

impl MflGateway {
    // == Constructor ==
    /// Builds the gateway's HTTP client. Redirects are never followed so the
    /// login response, and its cookies, are seen as the upstream sent them.
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .user_agent(config.user_agent.as_str())
            .redirect(Policy::none())
            .build()
            .map_err(|e| ProxyError::Internal(format!("failed to build HTTP client: {}", e)))?;

        let base = config.mfl_base_url.trim_end_matches('/');
        Ok(Self {
            http,
            login_url: format!("{}/login", base),
            export_url: format!("{}/export", base),
        })
    }

    // == Authenticate ==
    /// Exchanges username and password for the upstream credential
    /// (`MFL_USER_ID=<id>`).
    ///
    /// The id is read from the `<status MFL_USER_ID="...">` body first and from
    /// a `Set-Cookie` header second. An `<error>` body, a 401/403, or neither
    /// source yielding an id means the credentials were rejected.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<String> {
        let response = self
            .http
            .post(&self.login_url)
            .form(&[("USERNAME", username), ("PASSWORD", password), ("XML", "1")])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProxyError::LoginTimeout
                } else {
                    ProxyError::from_transport(e)
                }
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ProxyError::InvalidCredentials);
        }
        if status.is_server_error() {
            return Err(ProxyError::UpstreamFetch {
                status: Some(status.as_u16()),
                message: "MFL login is unavailable".to_string(),
            });
        }

        let header_id = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(user_id_from_cookie);

        let body = response.text().await.map_err(ProxyError::from_transport)?;
        match XmlDocument::parse(&body) {
            Ok(doc) if doc.is_error() => return Err(ProxyError::InvalidCredentials),
            Ok(doc) if doc.root.name == "status" => {
                if let Some(id) = doc.root.attribute(USER_ID_COOKIE).filter(|id| !id.is_empty()) {
                    return Ok(credential_for(id));
                }
            }
            Ok(_) => {}
            Err(e) => debug!("Login body unusable ({}), trying headers", e),
        }

        header_id
            .map(|id| credential_for(&id))
            .ok_or(ProxyError::InvalidCredentials)
    }

    // == Fetch Leagues ==
    /// Lists the leagues the credential's owner has a franchise in.
    pub async fn fetch_leagues(&self, credential: &str) -> Result<Vec<LeagueMembership>> {
        let response = self
            .http
            .get(&self.export_url)
            .query(&[("TYPE", "myleagues"), ("JSON", "1")])
            .header(COOKIE, credential)
            .send()
            .await
            .map_err(ProxyError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProxyError::UpstreamFetch {
                status: Some(status.as_u16()),
                message: "failed to fetch leagues".to_string(),
            });
        }

        let body: MyLeaguesResponse = response
            .json()
            .await
            .map_err(|e| ProxyError::MalformedResponse(format!("league list: {}", e)))?;

        Ok(body.into_memberships())
    }

    // == Post Action ==
    /// Submits one form-encoded write action and parses the XML answer.
    ///
    /// An `<error>` answer is returned as a document; judging it is up to the caller.
    pub async fn post_action(
        &self,
        credential: &str,
        mut form: Vec<(&'static str, String)>,
    ) -> Result<XmlDocument> {
        form.push(("XML", "1".to_string()));

        let response = self
            .http
            .post(&self.export_url)
            .header(COOKIE, credential)
            .form(&form)
            .send()
            .await
            .map_err(ProxyError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            warn!("MFL write action answered {}", status);
            return Err(ProxyError::UpstreamFetch {
                status: Some(status.as_u16()),
                message: format!("MFL write action answered {}", status),
            });
        }

        let body = response.text().await.map_err(ProxyError::from_transport)?;
        XmlDocument::parse(&body)
    }
}

fn credential_for(user_id: &str) -> String {
    format!("{}={}", USER_ID_COOKIE, user_id)
}

/// Pulls the user id out of a `Set-Cookie` value such as
/// `MFL_USER_ID=abc123; path=/; domain=.myfantasyleague.com`.
fn user_id_from_cookie(cookie: &str) -> Option<String> {
    cookie.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == USER_ID_COOKIE && !value.is_empty()).then(|| value.to_string())
    })
}

// == League List Wire Format ==
#[derive(Debug, Deserialize)]
struct MyLeaguesResponse {
    #[serde(default)]
    leagues: Option<LeagueList>,
}

#[derive(Debug, Deserialize)]
struct LeagueList {
    #[serde(default)]
    league: Option<OneOrMany<RawLeague>>,
}

/// MFL renders a one-element list as a bare object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

#[derive(Debug, Deserialize)]
struct RawLeague {
    league_id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    franchise_id: String,
    #[serde(default)]
    franchise_name: Option<String>,
    #[serde(default)]
    url: String,
}

impl MyLeaguesResponse {
    fn into_memberships(self) -> Vec<LeagueMembership> {
        let raw = match self.leagues.and_then(|l| l.league) {
            Some(OneOrMany::One(league)) => vec![league],
            Some(OneOrMany::Many(leagues)) => leagues,
            None => Vec::new(),
        };

        raw.into_iter()
            .map(|league| LeagueMembership {
                franchise_name: league
                    .franchise_name
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| format!("Team {}", league.franchise_id)),
                league_id: league.league_id,
                league_name: league.name,
                franchise_id: league.franchise_id,
                url: league.url,
            })
            .collect()
    }
}
