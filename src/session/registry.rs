use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

type Sessions = Arc<Mutex<HashMap<String, DateTime<Utc>>>>;

/// Currently running sessions (session_id → start time)
///
/// The lock is never held across an await, so a std mutex is enough and
/// lets [`Registration`] deregister from `Drop`.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Sessions,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `None` if `session_id` is already registered.
    ///
    /// The entry lives as long as the returned [`Registration`].
    pub fn register(&self, session_id: &str) -> Option<Registration> {
        let mut sessions = lock(&self.sessions);
        if sessions.contains_key(session_id) {
            return None;
        }
        sessions.insert(session_id.to_string(), Utc::now());

        Some(Registration {
            sessions: Arc::clone(&self.sessions),
            session_id: session_id.to_string(),
        })
    }

    pub fn contains(&self, session_id: &str) -> bool {
        lock(&self.sessions).contains_key(session_id)
    }

    pub fn active_count(&self) -> usize {
        lock(&self.sessions).len()
    }
}

/// Registry entry for one session; removed when dropped.
pub struct Registration {
    sessions: Sessions,
    session_id: String,
}

impl Registration {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        lock(&self.sessions).remove(&self.session_id);
    }
}

// A panic while holding the lock cannot leave the map half-updated
fn lock(sessions: &Sessions) -> MutexGuard<'_, HashMap<String, DateTime<Utc>>> {
    sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
