use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

const SESSION_TIMEOUT: Duration = Duration::from_secs(180);

/// What the bot remembers about a user between chat messages, so a reply
/// like "2" or "show more" can be resolved against the previous answer.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct UserSession {
    pub last_dish: Option<String>,
    pub diet: Option<String>,
    pub course: Option<String>,
    /// Numbered dish options offered to the user
    pub options: Vec<String>,
    /// Dish names from the recommendation preview
    pub recommendations: Vec<String>,
}

struct SessionEntry {
    session: UserSession,
    stored_at: Instant,
}

/// Session store shared between handler invocations. Cheap to clone.
#[derive(Default, Clone)]
pub struct UserSessions {
    sessions: Arc<parking_lot::RwLock<HashMap<String, SessionEntry>>>,
}

impl UserSessions {
    /// Returns the session for the user unless it timed out; stale entries
    /// are dropped on read rather than by a sweeper task.
    pub fn get(&self, user_id: &str) -> Option<UserSession> {
        let expired = {
            let locked = self.sessions.read();
            match locked.get(user_id) {
                None => return None,
                Some(entry) => entry.stored_at.elapsed() > SESSION_TIMEOUT,
            }
        };
        if expired {
            self.sessions.write().remove(user_id);
            return None;
        }
        self.sessions
            .read()
            .get(user_id)
            .map(|entry| entry.session.clone())
    }

    pub fn set(&self, user_id: &str, session: UserSession) {
        self.sessions.write().insert(
            user_id.to_string(),
            SessionEntry {
                session,
                stored_at: Instant::now(),
            },
        );
    }

    pub fn clear(&self, user_id: &str) {
        self.sessions.write().remove(user_id);
    }
}

#[cfg(test)]
mod user_sessions_tests {
    use std::time::{Duration, Instant};

    use super::{SessionEntry, UserSession, UserSessions, SESSION_TIMEOUT};

    #[test]
    fn set_get_and_clear() {
        let sessions = UserSessions::default();
        assert_eq!(sessions.get("u1"), None);

        let session = UserSession {
            last_dish: Some("biryani".to_string()),
            options: vec!["veg biryani".to_string()],
            ..UserSession::default()
        };
        sessions.set("u1", session.clone());
        assert_eq!(sessions.get("u1"), Some(session));
        assert_eq!(sessions.get("u2"), None);

        sessions.clear("u1");
        assert_eq!(sessions.get("u1"), None);
    }

    #[test]
    fn timed_out_session_is_dropped() {
        let sessions = UserSessions::default();
        sessions.sessions.write().insert(
            "u1".to_string(),
            SessionEntry {
                session: UserSession::default(),
                stored_at: Instant::now() - SESSION_TIMEOUT - Duration::from_secs(1),
            },
        );
        assert_eq!(sessions.get("u1"), None);
        assert!(sessions.sessions.read().is_empty());
    }
}
