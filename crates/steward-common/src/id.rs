//! Association and instance identity types.
//!
//! Associations are addressed by an opaque unique identifier assigned by the
//! backing service; instances by the node identity resolved at runtime.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier of a registered association.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssociationId(pub String);

impl AssociationId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssociationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AssociationId {
    fn from(id: &str) -> Self {
        AssociationId(id.to_string())
    }
}

impl From<String> for AssociationId {
    fn from(id: String) -> Self {
        AssociationId(id)
    }
}

/// Identity of the managed node this agent runs on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(pub String);

impl InstanceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for InstanceId {
    fn from(id: &str) -> Self {
        InstanceId(id.to_string())
    }
}

impl From<String> for InstanceId {
    fn from(id: String) -> Self {
        InstanceId(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn association_id_display_and_serde() {
        let id = AssociationId::from("assoc-0001");
        assert_eq!(id.to_string(), "assoc-0001");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"assoc-0001\"");
        let back: AssociationId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn instance_id_transparent() {
        let id: InstanceId = serde_json::from_str("\"i-12345678\"").unwrap();
        assert_eq!(id.as_str(), "i-12345678");
    }
}
