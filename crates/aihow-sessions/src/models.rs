//! Session data models

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// What happens when an admin opens one session too many
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitPolicy {
    /// Refuse the new session
    #[default]
    Reject,
    /// Revoke the least recently active session to make room
    EvictOldest,
}

/// Session limits and timeouts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminSessionConfig {
    /// Concurrent active sessions allowed per admin
    pub max_sessions: usize,
    /// Absolute lifetime of a session, in seconds
    pub session_timeout_secs: u64,
    /// Idle time after which a session expires, in seconds
    pub activity_timeout_secs: u64,
    pub on_limit: LimitPolicy,
    /// How long expired and revoked sessions stay queryable before the next
    /// login sweeps them out, in seconds
    pub retain_ended_secs: u64,
}

impl Default for AdminSessionConfig {
    fn default() -> Self {
        Self {
            max_sessions: 3,
            session_timeout_secs: 8 * 60 * 60,
            activity_timeout_secs: 30 * 60,
            on_limit: LimitPolicy::Reject,
            retain_ended_secs: 5 * 60,
        }
    }
}

impl AdminSessionConfig {
    pub fn session_timeout(&self) -> Duration {
        Duration::seconds(self.session_timeout_secs.min(i64::MAX as u64) as i64)
    }

    pub fn activity_timeout(&self) -> Duration {
        Duration::seconds(self.activity_timeout_secs.min(i64::MAX as u64) as i64)
    }

    pub fn retain_ended(&self) -> Duration {
        Duration::seconds(self.retain_ended_secs.min(i64::MAX as u64) as i64)
    }

    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions;
        self
    }

    pub fn with_on_limit(mut self, policy: LimitPolicy) -> Self {
        self.on_limit = policy;
        self
    }
}

/// Lifecycle state; `Expired` and `Revoked` are terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Active,
    Expired,
    Revoked,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionState::Active)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Active => write!(f, "active"),
            SessionState::Expired => write!(f, "expired"),
            SessionState::Revoked => write!(f, "revoked"),
        }
    }
}

/// An authenticated admin's session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSession {
    pub session_id: String,
    pub admin_id: String,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub state: SessionState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_reason: Option<String>,
    /// When the session left the `Active` state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
}

impl AdminSession {
    pub(crate) fn new(session_id: String, admin_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            session_id,
            admin_id: admin_id.to_string(),
            created_at: now,
            last_activity: now,
            state: SessionState::Active,
            revoked_reason: None,
            ended_at: None,
        }
    }

    pub(crate) fn expire(&mut self, now: DateTime<Utc>) {
        self.state = SessionState::Expired;
        self.ended_at = Some(now);
    }

    pub(crate) fn revoke(&mut self, reason: &str, now: DateTime<Utc>) {
        self.state = SessionState::Revoked;
        self.revoked_reason = Some(reason.to_string());
        self.ended_at = Some(now);
    }

    /// Whether the session ended more than `retention` before `now`
    pub fn ended_before(&self, now: DateTime<Utc>, retention: Duration) -> bool {
        match self.ended_at {
            Some(ended_at) => now - ended_at > retention,
            None => false,
        }
    }

    /// Whether either timeout has elapsed at `now`. Both bounds are inclusive.
    pub fn is_timed_out(&self, now: DateTime<Utc>, config: &AdminSessionConfig) -> bool {
        now - self.last_activity > config.activity_timeout()
            || now - self.created_at > config.session_timeout()
    }

    /// Active and within both timeouts
    pub fn is_valid_at(&self, now: DateTime<Utc>, config: &AdminSessionConfig) -> bool {
        self.state == SessionState::Active && !self.is_timed_out(now, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = AdminSessionConfig::default();
        assert_eq!(config.max_sessions, 3);
        assert_eq!(config.session_timeout(), Duration::hours(8));
        assert_eq!(config.activity_timeout(), Duration::minutes(30));
        assert_eq!(config.on_limit, LimitPolicy::Reject);
        assert_eq!(config.retain_ended(), Duration::minutes(5));
    }

    #[test]
    fn test_config_deserializes_policy() {
        let config: AdminSessionConfig =
            serde_json::from_str(r#"{"max_sessions": 1, "on_limit": "evict_oldest"}"#).unwrap();
        assert_eq!(config.max_sessions, 1);
        assert_eq!(config.on_limit, LimitPolicy::EvictOldest);
        assert_eq!(config.activity_timeout_secs, 30 * 60);
    }

    #[test]
    fn test_timeout_boundaries() {
        let config = AdminSessionConfig::default();
        let start = Utc::now();
        let session = AdminSession::new("s1".to_string(), "a1", start);

        assert!(session.is_valid_at(start + Duration::minutes(30), &config));
        assert!(!session.is_valid_at(
            start + Duration::minutes(30) + Duration::seconds(1),
            &config
        ));
    }

    #[test]
    fn test_ended_before_retention() {
        let start = Utc::now();
        let mut session = AdminSession::new("s1".to_string(), "a1", start);
        assert!(!session.ended_before(start + Duration::days(1), Duration::minutes(5)));

        session.revoke("logout", start);
        assert_eq!(session.ended_at, Some(start));
        assert!(!session.ended_before(start + Duration::minutes(5), Duration::minutes(5)));
        assert!(session.ended_before(
            start + Duration::minutes(5) + Duration::seconds(1),
            Duration::minutes(5)
        ));
    }

    #[test]
    fn test_terminal_states() {
        assert!(!SessionState::Active.is_terminal());
        assert!(SessionState::Expired.is_terminal());
        assert!(SessionState::Revoked.is_terminal());
        assert_eq!(SessionState::Revoked.to_string(), "revoked");
    }
}
