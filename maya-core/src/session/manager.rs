//! Registry of live chat sessions, one per browser session

use super::store::{ChatSession, ConversationState, Turn};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(3600);

/// Manages in-memory conversation sessions.
///
/// Each browser session addresses its [`ChatSession`] through an opaque
/// handle. Nothing is persisted: a session lives until it is ended, sits
/// idle for longer than the TTL, or the process exits.
#[derive(Debug)]
pub struct SessionManager {
    greeting: String,
    max_sessions: usize,
    idle_ttl: Duration,
    sessions: Mutex<HashMap<String, ChatSession>>,
}

impl SessionManager {
    /// Create a new session manager
    pub fn new(greeting: impl Into<String>, max_sessions: usize) -> Self {
        Self {
            greeting: greeting.into(),
            max_sessions,
            idle_ttl: DEFAULT_IDLE_TTL,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Drop idle sessions untouched for `ttl`
    pub fn with_idle_ttl(mut self, ttl: Duration) -> Self {
        self.idle_ttl = ttl;
        self
    }

    /// Start a new session seeded with the greeting and return its handle.
    ///
    /// Expired sessions are evicted first, so abandoned tabs do not hold
    /// slots against the cap.
    pub fn create(&self) -> crate::Result<String> {
        let mut sessions = self.sessions.lock();
        self.evict_expired(&mut sessions, Utc::now());
        if sessions.len() >= self.max_sessions {
            return Err(crate::Error::Session(format!(
                "session limit of {} reached",
                self.max_sessions
            )));
        }

        let handle = uuid::Uuid::new_v4().to_string();
        sessions.insert(handle.clone(), ChatSession::new(self.greeting.clone()));
        debug!(handle = %handle, live = sessions.len(), "Session created");
        Ok(handle)
    }

    /// Run `f` against the session while holding the registry lock.
    ///
    /// Keep `f` short: it must not block or await.
    pub fn with_session<R>(
        &self,
        handle: &str,
        f: impl FnOnce(&mut ChatSession) -> R,
    ) -> crate::Result<R> {
        let mut sessions = self.sessions.lock();
        let session = sessions
            .get_mut(handle)
            .ok_or_else(|| crate::Error::NotFound(format!("session {}", handle)))?;
        Ok(f(session))
    }

    /// Snapshot of a whole session
    pub fn get(&self, handle: &str) -> crate::Result<ChatSession> {
        self.with_session(handle, |session| session.clone())
    }

    /// Snapshot of a session's transcript
    pub fn transcript(&self, handle: &str) -> crate::Result<Vec<Turn>> {
        self.with_session(handle, |session| session.transcript().to_vec())
    }

    /// End a session, dropping its transcript
    pub fn end(&self, handle: &str) -> bool {
        let removed = self.sessions.lock().remove(handle).is_some();
        if removed {
            debug!(handle = %handle, "Session ended");
        }
        removed
    }

    /// Number of live sessions
    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sessions awaiting a reply are never evicted
    fn evict_expired(&self, sessions: &mut HashMap<String, ChatSession>, now: DateTime<Utc>) {
        let before = sessions.len();
        sessions.retain(|_, session| {
            let idle_for = (now - session.updated_at()).to_std().unwrap_or_default();
            session.state() == ConversationState::AwaitingReply || idle_for < self.idle_ttl
        });

        let evicted = before - sessions.len();
        if evicted > 0 {
            info!(evicted, live = sessions.len(), "Expired idle sessions");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Role;

    #[test]
    fn test_session_manager_creation() {
        let manager = SessionManager::new("hi", 10);
        assert!(manager.is_empty());
    }

    #[test]
    fn test_create_seeds_greeting() {
        let manager = SessionManager::new("Hey there!", 10);
        let handle = manager.create().unwrap();

        let transcript = manager.transcript(&handle).unwrap();
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript[0].role, Role::Assistant);
        assert_eq!(transcript[0].content, "Hey there!");
    }

    #[test]
    fn test_sessions_are_isolated() {
        let manager = SessionManager::new("hi", 10);
        let a = manager.create().unwrap();
        let b = manager.create().unwrap();
        assert_ne!(a, b);

        manager
            .with_session(&a, |s| s.append_turn(Role::User, "only in a"))
            .unwrap();

        assert_eq!(manager.transcript(&a).unwrap().len(), 2);
        assert_eq!(manager.transcript(&b).unwrap().len(), 1);
    }

    #[test]
    fn test_get_returns_snapshot() {
        let manager = SessionManager::new("hi", 10);
        let handle = manager.create().unwrap();

        let mut snapshot = manager.get(&handle).unwrap();
        snapshot.append_turn(Role::User, "not stored");

        assert_eq!(manager.transcript(&handle).unwrap().len(), 1);
        assert!(manager.get(&handle).unwrap().session_id().is_none());
    }

    #[test]
    fn test_unknown_handle_is_not_found() {
        let manager = SessionManager::new("hi", 10);
        let err = manager.transcript("missing").unwrap_err();
        assert!(matches!(err, crate::Error::NotFound(_)));
    }

    #[test]
    fn test_end_removes_session() {
        let manager = SessionManager::new("hi", 10);
        let handle = manager.create().unwrap();

        assert!(manager.end(&handle));
        assert!(manager.get(&handle).is_err());
        assert!(!manager.end(&handle));
    }

    #[test]
    fn test_session_limit() {
        let manager = SessionManager::new("hi", 2);
        manager.create().unwrap();
        let second = manager.create().unwrap();
        assert!(manager.create().is_err());

        manager.end(&second);
        assert!(manager.create().is_ok());
    }

    #[test]
    fn test_expired_session_frees_slot() {
        let manager = SessionManager::new("hi", 1).with_idle_ttl(Duration::ZERO);
        let abandoned = manager.create().unwrap();

        let fresh = manager.create().unwrap();
        assert!(manager.get(&abandoned).is_err());
        assert!(manager.get(&fresh).is_ok());
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_recent_sessions_survive_eviction() {
        let manager = SessionManager::new("hi", 2);
        let first = manager.create().unwrap();
        manager.create().unwrap();

        assert!(manager.create().is_err());
        assert!(manager.get(&first).is_ok());
    }

    #[test]
    fn test_eviction_uses_last_activity() {
        let manager = SessionManager::new("hi", 10).with_idle_ttl(Duration::from_secs(60));
        let idle = manager.create().unwrap();
        let pending = manager.create().unwrap();
        manager
            .with_session(&pending, |s| s.begin_turn("hello").map(|_| ()))
            .unwrap()
            .unwrap();

        let later = Utc::now() + chrono::Duration::seconds(120);
        manager.evict_expired(&mut manager.sessions.lock(), later);

        assert!(manager.get(&idle).is_err());
        assert!(manager.get(&pending).is_ok());
    }
}
