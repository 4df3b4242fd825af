//! Property-based tests for admin session limits and timeouts

use std::sync::Arc;

use aihow_sessions::{
    AdminSessionConfig, AdminSessionManager, LimitPolicy, ManualClock, SessionError, SessionState,
};
use chrono::Duration;
use proptest::prelude::*;

fn manager(config: AdminSessionConfig) -> (AdminSessionManager, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::default());
    (AdminSessionManager::with_clock(config, clock.clone()), clock)
}

/// Property: with the reject policy an admin never holds more than
/// `max_sessions` active sessions, and creation fails exactly past the limit.
#[test]
fn prop_reject_policy_caps_active_sessions() {
    proptest!(|(limit in 1usize..=6, attempts in 0usize..=12)| {
        let (manager, _) = manager(AdminSessionConfig::default().with_max_sessions(limit));

        let mut created = 0;
        for _ in 0..attempts {
            match manager.create_session("a1") {
                Ok(_) => created += 1,
                Err(SessionError::TooManySessions { max, .. }) => {
                    prop_assert_eq!(max, limit);
                    prop_assert_eq!(created, limit);
                }
                Err(e) => prop_assert!(false, "unexpected error: {:?}", e),
            }
        }

        prop_assert_eq!(created, attempts.min(limit));
        prop_assert_eq!(manager.active_sessions("a1").len(), attempts.min(limit));
    });
}

/// Property: with eviction, creation always succeeds and the newest
/// `max_sessions` sessions are the ones left active.
#[test]
fn prop_evict_policy_keeps_newest() {
    proptest!(|(limit in 1usize..=5, attempts in 1usize..=12)| {
        let config = AdminSessionConfig::default()
            .with_max_sessions(limit)
            .with_on_limit(LimitPolicy::EvictOldest);
        let (manager, clock) = manager(config);

        let mut ids = Vec::new();
        for _ in 0..attempts {
            ids.push(manager.create_session("a1").unwrap().session_id);
            clock.advance(Duration::seconds(1));
        }

        let kept = attempts.min(limit);
        let active: Vec<String> = manager
            .active_sessions("a1")
            .into_iter()
            .map(|s| s.session_id)
            .collect();
        prop_assert_eq!(&active[..], &ids[attempts - kept..]);

        for id in &ids[..attempts - kept] {
            let session = manager.get_session(id).unwrap();
            prop_assert_eq!(session.state, SessionState::Revoked);
        }
    });
}

/// Property: a session is valid exactly while idle time stays within the
/// activity timeout, and once expired it stays expired.
#[test]
fn prop_idle_expiry_is_terminal() {
    proptest!(|(idle_secs in 0i64..=3_600, later_secs in 0i64..=600)| {
        let config = AdminSessionConfig::default();
        let (manager, clock) = manager(config.clone());
        let session = manager.create_session("a1").unwrap();

        clock.advance(Duration::seconds(idle_secs));
        let valid = manager.validate_admin_session(&session.session_id);
        prop_assert_eq!(valid, idle_secs <= config.activity_timeout_secs as i64);

        if !valid {
            let _ = manager.track_admin_activity(&session.session_id);
            clock.advance(Duration::seconds(later_secs));
            prop_assert!(!manager.validate_admin_session(&session.session_id));
            prop_assert_eq!(
                manager.get_session(&session.session_id).unwrap().state,
                SessionState::Expired
            );
        }
    });
}

#[test]
fn test_concurrent_creation_respects_limit() {
    let manager = Arc::new(AdminSessionManager::new(
        AdminSessionConfig::default().with_max_sessions(3),
    ));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let manager = Arc::clone(&manager);
            std::thread::spawn(move || manager.create_session("a1").is_ok())
        })
        .collect();

    let created = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();

    assert_eq!(created, 3);
    assert_eq!(manager.active_sessions("a1").len(), 3);
}
