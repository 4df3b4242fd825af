//! Permission data models

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::PermissionError;

/// Wildcard resource / condition value
pub const WILDCARD: &str = "*";

/// Condition map attached to a permission, e.g. `{"category": "llm"}`
pub type Conditions = BTreeMap<String, serde_json::Value>;

/// Action a permission covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    /// Every action
    #[serde(rename = "*")]
    Any,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Create => write!(f, "create"),
            Action::Read => write!(f, "read"),
            Action::Update => write!(f, "update"),
            Action::Delete => write!(f, "delete"),
            Action::Any => write!(f, "*"),
        }
    }
}

impl std::str::FromStr for Action {
    type Err = PermissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Action::Create),
            "read" => Ok(Action::Read),
            "update" => Ok(Action::Update),
            "delete" => Ok(Action::Delete),
            "*" => Ok(Action::Any),
            other => Err(PermissionError::InvalidAction(other.to_string())),
        }
    }
}

/// A fine-grained permission on a resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Permission {
    /// Resource name, or `"*"` for every resource
    pub resource: String,
    /// Action on the resource
    pub action: Action,
    /// Optional conditions narrowing the grant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Conditions>,
}

impl Permission {
    /// Create an unconditional permission
    pub fn new(resource: impl Into<String>, action: Action) -> Self {
        Self {
            resource: resource.into(),
            action,
            conditions: None,
        }
    }

    /// Permission on every resource and action
    pub fn all() -> Self {
        Self::new(WILDCARD, Action::Any)
    }

    /// Add a condition, creating the condition map if needed
    pub fn with_condition(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.conditions
            .get_or_insert_with(Conditions::new)
            .insert(key.into(), value.into());
        self
    }

    /// Replace the condition map
    pub fn with_conditions(mut self, conditions: Conditions) -> Self {
        self.conditions = Some(conditions);
        self
    }

    pub fn is_wildcard_resource(&self) -> bool {
        self.resource == WILDCARD
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.resource, self.action)?;
        if let Some(conditions) = &self.conditions {
            let rendered = serde_json::to_string(conditions).map_err(|_| std::fmt::Error)?;
            write!(f, " {}", rendered)?;
        }
        Ok(())
    }
}
