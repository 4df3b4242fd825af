//! Admin session manager

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::error::{Result, SessionError};
use crate::models::{AdminSession, AdminSessionConfig, LimitPolicy, SessionState};

/// Reason recorded when a session is revoked to make room for a new one
pub const EVICTION_REASON: &str = "session limit eviction";
/// Reason recorded for an explicit logout
pub const LOGOUT_REASON: &str = "logout";

/// Tracks admin sessions, their timeouts and per-admin limits
///
/// All state lives behind one lock, so limit checks and session creation for
/// the same admin cannot interleave.
pub struct AdminSessionManager {
    config: AdminSessionConfig,
    clock: Arc<dyn Clock>,
    sessions: Mutex<HashMap<String, AdminSession>>,
}

impl AdminSessionManager {
    /// Create a manager using wall-clock time
    pub fn new(config: AdminSessionConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: AdminSessionConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &AdminSessionConfig {
        &self.config
    }

    /// Open a new session for `admin_id`, applying the configured limit policy
    pub fn create_session(&self, admin_id: &str) -> Result<AdminSession> {
        let now = self.clock.now();
        let mut sessions = self.sessions.lock();
        self.expire_stale(&mut sessions, now);
        self.sweep_ended(&mut sessions, now);

        let mut active = active_count(&sessions, admin_id);
        if active >= self.config.max_sessions {
            match self.config.on_limit {
                LimitPolicy::Reject => {
                    warn!(admin_id, max = self.config.max_sessions, "Session limit reached");
                    return Err(SessionError::TooManySessions {
                        admin_id: admin_id.to_string(),
                        max: self.config.max_sessions,
                    });
                }
                LimitPolicy::EvictOldest => {
                    while active >= self.config.max_sessions {
                        let Some(oldest) = least_recently_active(&sessions, admin_id) else {
                            break;
                        };
                        if let Some(session) = sessions.get_mut(&oldest) {
                            session.revoke(EVICTION_REASON, now);
                            warn!(admin_id, session_id = %oldest, "Evicted admin session");
                        }
                        active -= 1;
                    }
                }
            }
        }

        // A zero limit cannot be satisfied by eviction
        if active >= self.config.max_sessions {
            return Err(SessionError::TooManySessions {
                admin_id: admin_id.to_string(),
                max: self.config.max_sessions,
            });
        }

        let session = AdminSession::new(Uuid::new_v4().to_string(), admin_id, now);
        sessions.insert(session.session_id.clone(), session.clone());
        info!(admin_id, session_id = %session.session_id, "Created admin session");

        Ok(session)
    }

    /// Whether the session exists, is active and is within both timeouts
    ///
    /// A timed-out session is moved to `Expired`.
    pub fn validate_admin_session(&self, session_id: &str) -> bool {
        let now = self.clock.now();
        let mut sessions = self.sessions.lock();

        match sessions.get_mut(session_id) {
            Some(session) => {
                self.expire_if_stale(session, now);
                session.state == SessionState::Active
            }
            None => {
                debug!(session_id, "Unknown admin session");
                false
            }
        }
    }

    /// Fail if opening one more session would exceed the admin's limit
    pub fn enforce_admin_session_limits(&self, admin_id: &str) -> Result<()> {
        let now = self.clock.now();
        let mut sessions = self.sessions.lock();
        self.expire_stale(&mut sessions, now);

        if active_count(&sessions, admin_id) >= self.config.max_sessions {
            return Err(SessionError::TooManySessions {
                admin_id: admin_id.to_string(),
                max: self.config.max_sessions,
            });
        }
        Ok(())
    }

    /// Record activity on a valid session, extending its idle timeout
    pub fn track_admin_activity(&self, session_id: &str) -> Result<()> {
        let now = self.clock.now();
        let mut sessions = self.sessions.lock();

        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| SessionError::SessionInvalid(session_id.to_string()))?;
        self.expire_if_stale(session, now);

        if session.state != SessionState::Active {
            return Err(SessionError::SessionInvalid(format!(
                "{} is {}",
                session_id, session.state
            )));
        }

        session.last_activity = now;
        Ok(())
    }

    /// Log a session out. Returns whether it was active before the call.
    pub fn revoke_session(&self, session_id: &str) -> Result<bool> {
        let now = self.clock.now();
        let mut sessions = self.sessions.lock();

        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))?;
        self.expire_if_stale(session, now);

        if session.state.is_terminal() {
            return Ok(false);
        }

        session.revoke(LOGOUT_REASON, now);
        info!(admin_id = %session.admin_id, session_id, "Revoked admin session");
        Ok(true)
    }

    /// Revoke every active session of an admin, returning how many were revoked
    pub fn revoke_all(&self, admin_id: &str) -> usize {
        let now = self.clock.now();
        let mut sessions = self.sessions.lock();
        self.expire_stale(&mut sessions, now);

        let mut revoked = 0;
        for session in sessions
            .values_mut()
            .filter(|s| s.admin_id == admin_id && s.state == SessionState::Active)
        {
            session.revoke(LOGOUT_REASON, now);
            revoked += 1;
        }

        if revoked > 0 {
            info!(admin_id, revoked, "Revoked all admin sessions");
        }
        revoked
    }

    pub fn get_session(&self, session_id: &str) -> Result<AdminSession> {
        let now = self.clock.now();
        let mut sessions = self.sessions.lock();

        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))?;
        self.expire_if_stale(session, now);
        Ok(session.clone())
    }

    /// Currently valid sessions of an admin, oldest first
    pub fn active_sessions(&self, admin_id: &str) -> Vec<AdminSession> {
        let now = self.clock.now();
        let mut sessions = self.sessions.lock();
        self.expire_stale(&mut sessions, now);

        let mut active: Vec<AdminSession> = sessions
            .values()
            .filter(|s| s.admin_id == admin_id && s.state == SessionState::Active)
            .cloned()
            .collect();
        active.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        active
    }

    /// Drop expired and revoked sessions from memory
    pub fn purge_inactive(&self) -> usize {
        let now = self.clock.now();
        let mut sessions = self.sessions.lock();
        self.expire_stale(&mut sessions, now);

        let before = sessions.len();
        sessions.retain(|_, s| s.state == SessionState::Active);
        let purged = before - sessions.len();

        debug!(purged, "Purged inactive admin sessions");
        purged
    }

    /// Number of sessions held in memory, in any state
    pub fn session_count(&self) -> usize {
        self.sessions.lock().len()
    }

    fn expire_if_stale(&self, session: &mut AdminSession, now: DateTime<Utc>) {
        if session.state == SessionState::Active && session.is_timed_out(now, &self.config) {
            session.expire(now);
            info!(
                admin_id = %session.admin_id,
                session_id = %session.session_id,
                "Admin session expired"
            );
        }
    }

    fn expire_stale(&self, sessions: &mut HashMap<String, AdminSession>, now: DateTime<Utc>) {
        for session in sessions.values_mut() {
            self.expire_if_stale(session, now);
        }
    }

    /// Forget sessions that ended longer ago than the retention window
    fn sweep_ended(&self, sessions: &mut HashMap<String, AdminSession>, now: DateTime<Utc>) {
        let retention = self.config.retain_ended();
        let before = sessions.len();
        sessions.retain(|_, s| !s.ended_before(now, retention));

        let swept = before - sessions.len();
        if swept > 0 {
            debug!(swept, "Dropped ended admin sessions");
        }
    }
}

impl std::fmt::Debug for AdminSessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSessionManager")
            .field("config", &self.config)
            .field("sessions", &self.sessions.lock().len())
            .finish()
    }
}

fn active_count(sessions: &HashMap<String, AdminSession>, admin_id: &str) -> usize {
    sessions
        .values()
        .filter(|s| s.admin_id == admin_id && s.state == SessionState::Active)
        .count()
}

fn least_recently_active(sessions: &HashMap<String, AdminSession>, admin_id: &str) -> Option<String> {
    sessions
        .values()
        .filter(|s| s.admin_id == admin_id && s.state == SessionState::Active)
        .min_by(|a, b| {
            a.last_activity
                .cmp(&b.last_activity)
                .then_with(|| a.created_at.cmp(&b.created_at))
        })
        .map(|s| s.session_id.clone())
}
