//! Route glob patterns
//!
//! A route pattern is a literal path containing at most one `*` wildcard,
//! which matches any (possibly empty) sequence of characters. Every other
//! character is literal: `/admin/tools.json` does not match `/admin/toolsXjson`.

use regex::Regex;

use crate::error::{Result, RoleError};

/// The wildcard token in route patterns
pub const WILDCARD: char = '*';

/// A compiled, anchored route pattern
#[derive(Debug, Clone)]
pub struct RoutePattern {
    source: String,
    regex: Regex,
}

impl RoutePattern {
    /// Compile a route pattern
    ///
    /// Fails on an empty pattern and on patterns with more than one `*`.
    pub fn compile(pattern: &str) -> Result<Self> {
        if pattern.is_empty() {
            return Err(invalid(pattern, "pattern cannot be empty"));
        }

        if pattern.matches(WILDCARD).count() > 1 {
            return Err(invalid(pattern, "at most one '*' wildcard is allowed"));
        }

        let regex_source = match pattern.split_once(WILDCARD) {
            Some((prefix, suffix)) => format!(
                "^{}.*{}$",
                regex::escape(prefix),
                regex::escape(suffix)
            ),
            None => format!("^{}$", regex::escape(pattern)),
        };

        let regex = Regex::new(&regex_source).map_err(|e| invalid(pattern, &e.to_string()))?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// Whether this is the bare `*` pattern
    pub fn is_match_all(&self) -> bool {
        self.source.len() == 1 && self.source.starts_with(WILDCARD)
    }

    /// Check whether the whole route matches this pattern
    pub fn matches(&self, route: &str) -> bool {
        self.is_match_all() || self.regex.is_match(route)
    }

    /// The pattern as written
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl PartialEq for RoutePattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for RoutePattern {}

impl std::fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

fn invalid(pattern: &str, reason: &str) -> RoleError {
    RoleError::InvalidRoutePattern {
        pattern: pattern.to_string(),
        reason: reason.to_string(),
    }
}
