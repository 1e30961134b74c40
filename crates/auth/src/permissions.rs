use serde::{Deserialize, Serialize};

/// A (resource, action) pair: the vocabulary the access engine checks against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Permission {
    pub resource: String,
    pub action: String,
}

impl Permission {
    pub fn new(resource: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            action: action.into(),
        }
    }

    /// Human-readable description, e.g. "View reports".
    pub fn description(&self) -> String {
        let verb = match self.action.as_str() {
            "read" => "View",
            "access" => "Open",
            "create" => "Create",
            "update" => "Edit",
            "delete" => "Delete",
            "export" => "Export",
            other => other,
        };
        format!("{} {}", verb, self.resource)
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{}", self.resource, self.action)
    }
}
