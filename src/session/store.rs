//! Session Store Module
//!
//! In-memory sessions keyed by credential, with the same lazy-expiry contract
//! as the response cache plus a bulk sweep for sessions nobody reads again.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::session::{LeagueMembership, Session};

// == Session Store ==
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<String, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    // == Insert ==
    /// Stores a session under its credential, replacing any previous one.
    pub fn insert(&mut self, session: Session) {
        debug!("Session stored for {}", session.username);
        self.sessions.insert(session.credential.clone(), session);
    }

    // == Get ==
    /// Returns a live session, evicting it if it has expired.
    pub fn get(&mut self, credential: &str) -> Option<Session> {
        self.get_at(credential, Utc::now())
    }

    /// [`SessionStore::get`] against an explicit clock reading.
    pub fn get_at(&mut self, credential: &str, now: DateTime<Utc>) -> Option<Session> {
        let session = self.sessions.get(credential)?;

        if session.is_expired_at(now) {
            debug!("Session expired for {}", session.username);
            self.sessions.remove(credential);
            return None;
        }

        Some(session.clone())
    }

    // == Set Leagues ==
    /// Overwrites the league list of a live session.
    ///
    /// Returns false when there is no live session for the credential.
    pub fn set_leagues(&mut self, credential: &str, leagues: Vec<LeagueMembership>) -> bool {
        self.set_leagues_at(credential, leagues, Utc::now())
    }

    pub fn set_leagues_at(
        &mut self,
        credential: &str,
        leagues: Vec<LeagueMembership>,
        now: DateTime<Utc>,
    ) -> bool {
        let Some(session) = self.sessions.get_mut(credential) else {
            return false;
        };

        if session.is_expired_at(now) {
            self.sessions.remove(credential);
            return false;
        }

        session.leagues = leagues;
        true
    }

    // == Remove ==
    /// Drops a session. Absent credentials are not an error.
    pub fn remove(&mut self, credential: &str) -> bool {
        self.sessions.remove(credential).is_some()
    }

    // == Cleanup Expired ==
    /// Removes every expired session, returning how many were dropped.
    pub fn cleanup_expired(&mut self) -> usize {
        self.cleanup_expired_at(Utc::now())
    }

    pub fn cleanup_expired_at(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| !session.is_expired_at(now));
        before - self.sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session(credential: &str, expires_at: DateTime<Utc>) -> Session {
        Session::new(credential, "coach", vec![], expires_at)
    }

    #[test]
    fn test_insert_and_get() {
        let mut store = SessionStore::new();
        store.insert(session("MFL_USER_ID=a", Utc::now() + Duration::hours(8)));

        let found = store.get("MFL_USER_ID=a").unwrap();
        assert_eq!(found.username, "coach");
        assert!(store.get("MFL_USER_ID=b").is_none());
    }

    #[test]
    fn test_one_session_per_credential() {
        let mut store = SessionStore::new();
        let expires = Utc::now() + Duration::hours(8);

        store.insert(session("cred", expires));
        store.insert(Session::new("cred", "other", vec![], expires));

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("cred").unwrap().username, "other");
    }

    #[test]
    fn test_lazy_expiry_at_eight_hours() {
        let mut store = SessionStore::new();
        let t0 = Utc::now();
        store.insert(session("cred", t0 + Duration::hours(8)));

        assert!(store
            .get_at("cred", t0 + Duration::hours(8) - Duration::seconds(1))
            .is_some());
        assert!(store.get_at("cred", t0 + Duration::hours(8)).is_none());
        assert!(store.is_empty(), "expired session should be removed by the read");
    }

    #[test]
    fn test_set_leagues() {
        let mut store = SessionStore::new();
        store.insert(session("cred", Utc::now() + Duration::hours(1)));

        let leagues = vec![LeagueMembership {
            league_id: "111".to_string(),
            league_name: "Dynasty".to_string(),
            franchise_id: "0001".to_string(),
            franchise_name: "Team 0001".to_string(),
            url: String::new(),
        }];

        assert!(store.set_leagues("cred", leagues.clone()));
        assert_eq!(store.get("cred").unwrap().leagues, leagues);
        assert!(!store.set_leagues("missing", vec![]));
    }

    #[test]
    fn test_set_leagues_on_expired_session_fails() {
        let mut store = SessionStore::new();
        let t0 = Utc::now();
        store.insert(session("cred", t0));

        assert!(!store.set_leagues_at("cred", vec![], t0));
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut store = SessionStore::new();
        store.insert(session("cred", Utc::now() + Duration::hours(1)));

        assert!(store.remove("cred"));
        assert!(!store.remove("cred"));
    }

    #[test]
    fn test_cleanup_expired() {
        let mut store = SessionStore::new();
        let now = Utc::now();
        store.insert(session("old", now - Duration::minutes(1)));
        store.insert(session("fresh", now + Duration::hours(1)));

        assert_eq!(store.cleanup_expired_at(now), 1);
        assert_eq!(store.len(), 1);
        assert!(store.get("fresh").is_some());
    }
}
