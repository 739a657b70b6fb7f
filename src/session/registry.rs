//! In-memory session registry.

use super::Session;
use chrono::Utc;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Maps session ids to session records.
///
/// Ids take the form `session_<user>_<epoch seconds>`. A second session for the
/// same user within the same second gets a `_<n>` suffix. Every id ever issued
/// is remembered, so a deleted id is never handed out again.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<String, Session>,
    issued: HashSet<String>,
}

impl SessionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session with empty data and return its id.
    pub fn create_session(&mut self, user_id: &str) -> String {
        let id = self.issue_id(user_id, Utc::now().timestamp());
        info!("Created session {} for user {}", id, user_id);
        self.sessions
            .insert(id.clone(), Session::new(id.clone(), user_id));
        id
    }

    fn issue_id(&mut self, user_id: &str, epoch_seconds: i64) -> String {
        let base = format!("session_{}_{}", user_id, epoch_seconds);
        let mut id = base.clone();
        let mut suffix = 1;
        while self.issued.contains(&id) {
            id = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        self.issued.insert(id.clone());
        id
    }

    /// Look up a session, refreshing its `last_accessed` time.
    pub fn get_session(&mut self, session_id: &str) -> Option<&Session> {
        let session = self.sessions.get_mut(session_id)?;
        session.last_accessed = Utc::now();
        Some(&*session)
    }

    /// Shallow-merge `partial` into the session's data.
    pub fn update_session(&mut self, session_id: &str, partial: Map<String, Value>) -> bool {
        let Some(session) = self.sessions.get_mut(session_id) else {
            debug!("Update for unknown session {}", session_id);
            return false;
        };
        session.data.extend(partial);
        session.last_accessed = Utc::now();
        true
    }

    /// Remove a session. Returns false if it did not exist.
    pub fn delete_session(&mut self, session_id: &str) -> bool {
        let removed = self.sessions.remove(session_id).is_some();
        if removed {
            info!("Deleted session {}", session_id);
        }
        removed
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// True when no sessions are live.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn partial(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_create_then_get() {
        let mut registry = SessionRegistry::new();
        let id = registry.create_session("u1");

        assert!(id.starts_with("session_u1_"));
        let epoch = id.trim_start_matches("session_u1_");
        assert!(epoch.parse::<i64>().is_ok(), "unexpected id {id}");

        let session = registry.get_session(&id).unwrap();
        assert_eq!(session.user_id, "u1");
        assert!(session.data.is_empty());
    }

    #[test]
    fn test_get_refreshes_last_accessed() {
        let mut registry = SessionRegistry::new();
        let id = registry.create_session("u1");
        let first = registry.get_session(&id).unwrap().clone();
        let again = registry.get_session(&id).unwrap().clone();

        assert!(again.last_accessed >= first.last_accessed);
        assert_eq!(again.created_at, first.created_at);
    }

    #[test]
    fn test_update_merges_and_overwrites() {
        let mut registry = SessionRegistry::new();
        let id = registry.create_session("u1");

        assert!(registry.update_session(&id, partial(json!({"a": 1}))));
        assert!(registry.update_session(&id, partial(json!({"b": 2}))));
        let data = registry.get_session(&id).unwrap().data.clone();
        assert_eq!(Value::Object(data), json!({"a": 1, "b": 2}));

        assert!(registry.update_session(&id, partial(json!({"a": "new"}))));
        let data = registry.get_session(&id).unwrap().data.clone();
        assert_eq!(Value::Object(data), json!({"a": "new", "b": 2}));
    }

    #[test]
    fn test_progress_scenario() {
        let mut registry = SessionRegistry::new();
        let id = registry.create_session("u1");

        assert!(registry.update_session(&id, partial(json!({"progress": 50}))));
        assert_eq!(registry.get_session(&id).unwrap().data["progress"], json!(50));
        assert!(registry.delete_session(&id));
        assert!(registry.get_session(&id).is_none());
    }

    #[test]
    fn test_unknown_session() {
        let mut registry = SessionRegistry::new();
        assert!(registry.get_session("session_nobody_0").is_none());
        assert!(!registry.update_session("session_nobody_0", Map::new()));
        assert!(!registry.delete_session("session_nobody_0"));
    }

    #[test]
    fn test_same_second_ids_get_suffixes() {
        let mut registry = SessionRegistry::new();
        assert_eq!(registry.issue_id("u1", 1_700_000_000), "session_u1_1700000000");
        assert_eq!(registry.issue_id("u1", 1_700_000_000), "session_u1_1700000000_1");
        assert_eq!(registry.issue_id("u1", 1_700_000_000), "session_u1_1700000000_2");
        assert_eq!(registry.issue_id("u2", 1_700_000_000), "session_u2_1700000000");
    }

    #[test]
    fn test_deleted_ids_are_not_reused() {
        let mut registry = SessionRegistry::new();
        let first = registry.create_session("u1");
        assert!(registry.delete_session(&first));

        let second = registry.create_session("u1");
        assert_ne!(first, second);
        assert!(registry.get_session(&first).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_starting_more_sessions_keeps_existing() {
        let mut registry = SessionRegistry::new();
        let a = registry.create_session("u1");
        let b = registry.create_session("u1");

        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
        assert!(registry.get_session(&a).is_some());
    }
}
