//! Request metadata extraction
//!
//! The web layer hands over its request headers; this module turns them into
//! the `ip` / `userAgent` pair recorded with every audit event.

use std::collections::HashMap;

use crate::models::{AuditEvent, AuditMetadata, Changes};

/// Recorded when a header is missing or empty
pub const UNKNOWN: &str = "unknown";

/// Request headers with case-insensitive lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestHeaders {
    headers: HashMap<String, String>,
}

impl RequestHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header; a later value for the same name replaces the earlier one
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// First address in `X-Forwarded-For`, or `"unknown"`
    pub fn client_ip(&self) -> String {
        self.get("x-forwarded-for")
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
            .unwrap_or(UNKNOWN)
            .to_string()
    }

    /// `User-Agent`, or `"unknown"`
    pub fn user_agent(&self) -> String {
        self.get("user-agent")
            .filter(|agent| !agent.is_empty())
            .unwrap_or(UNKNOWN)
            .to_string()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for RequestHeaders {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = RequestHeaders::new();
        for (name, value) in iter {
            headers.insert(name.as_ref(), value);
        }
        headers
    }
}

/// Build an audit event from an admin action and the request that caused it,
/// stamped with the current time
pub fn create_audit_event(
    admin_id: &str,
    action: &str,
    resource: &str,
    changes: Changes,
    request: &RequestHeaders,
) -> AuditEvent {
    AuditEvent::new(
        admin_id,
        action,
        resource,
        AuditMetadata::now(request.client_ip(), request.user_agent()),
    )
    .with_changes(changes)
}
