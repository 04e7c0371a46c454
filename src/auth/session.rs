//! Session State Machine
//!
//! Tracks authentication and preview status per session and gates which
//! portal queries are permitted. Sessions are process-local and in-memory:
//! created on first interaction, mutated by login/logout/preview actions,
//! and discarded when the process exits. The session id travels in a
//! cookie; nothing else is persisted client-side.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::store::models::Mentor;

/// Cookie carrying the session id
pub const SESSION_COOKIE: &str = "portal_session";

/// Authentication state of one session
#[derive(Debug, Clone, Default)]
pub enum SessionState {
    #[default]
    Unauthenticated,
    /// Identity established — via a verified magic link, or borrowed
    /// through the admin-gated preview action
    Authenticated { mentor: Mentor, preview: bool },
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    state: SessionState,
}

impl Session {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: SessionState::Unauthenticated,
        }
    }

    /// Valid token verified: take on the mentor's identity
    pub fn login(&mut self, mentor: Mentor) {
        self.state = SessionState::Authenticated {
            mentor,
            preview: false,
        };
    }

    /// Admin-gated preview: borrow a mentor's identity for read-only display
    pub fn preview(&mut self, mentor: Mentor) {
        self.state = SessionState::Authenticated {
            mentor,
            preview: true,
        };
    }

    /// Explicit logout clears all identity
    pub fn logout(&mut self) {
        self.state = SessionState::Unauthenticated;
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, SessionState::Authenticated { .. })
    }

    pub fn is_preview(&self) -> bool {
        matches!(
            self.state,
            SessionState::Authenticated { preview: true, .. }
        )
    }

    pub fn mentor(&self) -> Option<&Mentor> {
        match &self.state {
            SessionState::Authenticated { mentor, .. } => Some(mentor),
            SessionState::Unauthenticated => None,
        }
    }
}

/// Process-wide session map
#[derive(Default)]
pub struct SessionStore {
    sessions: DashMap<Uuid, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Fetch an existing session, or create a fresh unauthenticated one
    pub fn resolve(&self, id: Option<Uuid>) -> Session {
        if let Some(id) = id {
            if let Some(session) = self.sessions.get(&id) {
                return session.clone();
            }
        }
        let session = Session::new();
        self.sessions.insert(session.id, session.clone());
        session
    }

    pub fn get(&self, id: Uuid) -> Option<Session> {
        self.sessions.get(&id).map(|s| s.clone())
    }

    pub fn save(&self, session: Session) {
        self.sessions.insert(session.id, session);
    }
}

/// Identity injected into request extensions for gated handlers
#[derive(Debug, Clone)]
pub struct CurrentSession {
    pub session_id: Uuid,
    pub mentor: Mentor,
    pub preview: bool,
}

/// Extract the session id from the request's cookie jar
pub fn session_id_from(jar: &CookieJar) -> Option<Uuid> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
}

/// Session gate middleware for the portal routes
pub struct SessionGate;

impl SessionGate {
    /// Reject requests without an authenticated session; inject the
    /// session's mentor identity for downstream handlers
    pub async fn require_mentor(
        State(sessions): State<Arc<SessionStore>>,
        jar: CookieJar,
        mut req: Request,
        next: Next,
    ) -> Result<Response, StatusCode> {
        let session = session_id_from(&jar).and_then(|id| sessions.get(id));

        match session {
            Some(session) if session.is_authenticated() => {
                let Some(mentor) = session.mentor().cloned() else {
                    return Err(StatusCode::UNAUTHORIZED);
                };
                req.extensions_mut().insert(CurrentSession {
                    session_id: session.id,
                    preview: session.is_preview(),
                    mentor,
                });
                Ok(next.run(req).await)
            }
            _ => {
                tracing::warn!("Rejected unauthenticated portal request: {}", req.uri());
                Err(StatusCode::UNAUTHORIZED)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mentor(email: &str) -> Mentor {
        Mentor {
            id: "recM1".to_string(),
            name: "Dr. Ada Park".to_string(),
            email: email.to_string(),
            is_foundation_volunteer: false,
        }
    }

    #[test]
    fn test_new_session_is_unauthenticated() {
        let store = SessionStore::new();
        let session = store.resolve(None);
        assert!(!session.is_authenticated());
        assert!(!session.is_preview());
        assert!(session.mentor().is_none());
    }

    #[test]
    fn test_login_and_logout_transitions() {
        let store = SessionStore::new();
        let mut session = store.resolve(None);

        session.login(mentor("ada@example.com"));
        store.save(session.clone());
        assert!(session.is_authenticated());
        assert!(!session.is_preview());
        assert_eq!(session.mentor().map(|m| m.email.as_str()), Some("ada@example.com"));

        session.logout();
        store.save(session.clone());
        assert!(!session.is_authenticated());
        assert!(session.mentor().is_none());

        // The store reflects the saved transition
        let reloaded = store.get(session.id).unwrap();
        assert!(!reloaded.is_authenticated());
    }

    #[test]
    fn test_preview_is_a_flag_on_authenticated() {
        let store = SessionStore::new();
        let mut session = store.resolve(None);

        session.preview(mentor("someone@example.com"));
        assert!(session.is_authenticated());
        assert!(session.is_preview());

        // A real login afterwards drops the preview flag
        session.login(mentor("someone@example.com"));
        assert!(!session.is_preview());
    }

    #[test]
    fn test_resolve_returns_existing_session() {
        let store = SessionStore::new();
        let mut session = store.resolve(None);
        session.login(mentor("ada@example.com"));
        store.save(session.clone());

        let same = store.resolve(Some(session.id));
        assert_eq!(same.id, session.id);
        assert!(same.is_authenticated());

        // Unknown ids fall back to a fresh session
        let fresh = store.resolve(Some(Uuid::new_v4()));
        assert!(!fresh.is_authenticated());
    }
}
