use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role identifier used for RBAC.
///
/// A principal holds exactly one role. Roles are opaque names at this layer;
/// what a role may do is decided by the [`PolicyTable`](crate::PolicyTable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    /// The super-role: satisfies every resource/action check.
    pub const ADMIN: Role = Role(Cow::Borrowed("admin"));
    pub const MEMBER: Role = Role(Cow::Borrowed("member"));
    pub const VIEWER: Role = Role(Cow::Borrowed("viewer"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_admin(&self) -> bool {
        self.as_str() == Self::ADMIN.as_str()
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A role row as stored in the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    pub name: Role,
    pub description: String,
}

impl RoleRecord {
    pub fn new(name: Role, description: impl Into<String>) -> Self {
        Self {
            name,
            description: description.into(),
        }
    }
}

/// Roles every directory is seeded with.
pub fn builtin_roles() -> Vec<RoleRecord> {
    vec![
        RoleRecord::new(Role::ADMIN, "Full administrator; passes every access check"),
        RoleRecord::new(Role::MEMBER, "Regular user with read and update access"),
        RoleRecord::new(Role::VIEWER, "Read-only user"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_admin_is_admin() {
        assert!(Role::ADMIN.is_admin());
        assert!(Role::new("admin".to_string()).is_admin());
        assert!(!Role::MEMBER.is_admin());
        assert!(!Role::new("Admin").is_admin());
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&Role::VIEWER).unwrap();
        assert_eq!(json, "\"viewer\"");
    }
}
