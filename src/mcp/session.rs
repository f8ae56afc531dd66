use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

/// What we remember about a connected client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub client_name: String,
    pub created_at: DateTime<Utc>,
}

/// Manages MCP session IDs for the HTTP transport.
#[derive(Debug, Clone, Default)]
pub struct SessionManager {
    sessions: Arc<Mutex<HashMap<String, SessionInfo>>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new session for a client. Returns the session ID.
    pub fn create_session(&self, client_name: &str) -> String {
        let session_id = Uuid::new_v4().to_string();
        self.sessions.lock().insert(
            session_id.clone(),
            SessionInfo {
                client_name: client_name.to_string(),
                created_at: Utc::now(),
            },
        );
        session_id
    }

    /// Remove a session, returning what was stored for it.
    pub fn remove_session(&self, session_id: &str) -> Option<SessionInfo> {
        self.sessions.lock().remove(session_id)
    }

    #[cfg(test)]
    pub fn get(&self, session_id: &str) -> Option<SessionInfo> {
        self.sessions.lock().get(session_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_get_session() {
        let mgr = SessionManager::new();
        let sid = mgr.create_session("test-client");
        assert_eq!(mgr.get(&sid).unwrap().client_name, "test-client");
    }

    #[test]
    fn test_remove_session() {
        let mgr = SessionManager::new();
        let sid = mgr.create_session("test-client");
        let info = mgr.remove_session(&sid).unwrap();
        assert_eq!(info.client_name, "test-client");
        assert!(info.created_at <= Utc::now());
        assert_eq!(mgr.get(&sid), None);
        assert!(mgr.remove_session(&sid).is_none());
    }

    #[test]
    fn test_unknown_session() {
        let mgr = SessionManager::new();
        assert_eq!(mgr.get("nonexistent"), None);
    }

    #[test]
    fn test_clones_share_sessions() {
        let mgr = SessionManager::new();
        let other = mgr.clone();
        let sid = mgr.create_session("a");
        assert!(other.get(&sid).is_some());
    }
}
