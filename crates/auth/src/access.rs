//! Access decisions: role-based action checks and grant-based UI checks.
//!
//! - No IO
//! - No panics
//! - Deny by default: a missing or inactive principal, or an unknown
//!   (resource, action) pair, is a denial, never an error.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use warden_core::PrincipalId;

use crate::{Permission, Principal, Role};

/// One row of the policy table: which roles may perform `action` on `resource`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRule {
    pub resource: String,
    pub action: String,
    pub roles: BTreeSet<Role>,
}

#[derive(Debug, Error)]
pub enum PolicyTableError {
    #[error("malformed policy table: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("duplicate rule for {0}")]
    DuplicateRule(Permission),
}

/// Explicit (resource, action) → allowed-roles table.
///
/// The admin role never needs an entry: it short-circuits every check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyTable {
    rules: BTreeMap<Permission, BTreeSet<Role>>,
}

impl PolicyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in table.
    pub fn standard() -> Self {
        let both = [Role::MEMBER, Role::VIEWER];
        Self::new()
            .allow("dashboard", "access", both.clone())
            .allow("profile", "read", both.clone())
            .allow("profile", "update", both.clone())
            .allow("reports", "read", both)
            .allow("reports", "export", [Role::MEMBER])
            .allow("settings", "read", [Role::MEMBER])
    }

    /// Add (or extend) the rule for `resource`/`action`.
    pub fn allow(
        mut self,
        resource: impl Into<String>,
        action: impl Into<String>,
        roles: impl IntoIterator<Item = Role>,
    ) -> Self {
        self.rules
            .entry(Permission::new(resource, action))
            .or_default()
            .extend(roles);
        self
    }

    /// Build a table from rule rows, rejecting duplicate pairs.
    pub fn from_rules(rules: Vec<AccessRule>) -> Result<Self, PolicyTableError> {
        let mut table = Self::new();
        for rule in rules {
            let key = Permission::new(rule.resource, rule.action);
            if table.rules.contains_key(&key) {
                return Err(PolicyTableError::DuplicateRule(key));
            }
            table.rules.insert(key, rule.roles);
        }
        Ok(table)
    }

    /// Parse a JSON array of [`AccessRule`] rows.
    pub fn from_json(json: &str) -> Result<Self, PolicyTableError> {
        let rules: Vec<AccessRule> = serde_json::from_str(json)?;
        Self::from_rules(rules)
    }

    /// The table as rule rows (sorted by resource, then action).
    pub fn rules(&self) -> Vec<AccessRule> {
        self.rules
            .iter()
            .map(|(p, roles)| AccessRule {
                resource: p.resource.clone(),
                action: p.action.clone(),
                roles: roles.clone(),
            })
            .collect()
    }

    /// Whether `principal` may perform `action` on `resource`.
    pub fn can_access(&self, principal: Option<&Principal>, resource: &str, action: &str) -> bool {
        let Some(principal) = principal else {
            return false;
        };
        if !principal.active {
            return false;
        }
        if principal.is_admin() {
            return true;
        }
        self.role_allowed(&principal.role, resource, action)
    }

    fn role_allowed(&self, role: &Role, resource: &str, action: &str) -> bool {
        self.rules
            .get(&Permission::new(resource, action))
            .is_some_and(|roles| roles.contains(role))
    }

    /// Every (resource, action) pair `role` may perform.
    ///
    /// For admin this is every pair in the table (admin may also perform pairs
    /// the table does not list).
    pub fn allowed_pairs(&self, role: &Role) -> Vec<Permission> {
        self.rules
            .iter()
            .filter(|(_, roles)| role.is_admin() || roles.contains(role))
            .map(|(p, _)| p.clone())
            .collect()
    }

    /// Explain why a decision is (or would be) made.
    pub fn explain(
        &self,
        principal: Option<&Principal>,
        resource: &str,
        action: &str,
    ) -> AccessExplanation {
        let required = Permission::new(resource, action);
        let granted = self.can_access(principal, resource, action);

        let Some(principal) = principal else {
            return AccessExplanation::denied(
                required,
                None,
                DenialKind::MissingPrincipal,
                "No principal was resolved for this request",
                vec!["Sign in before requesting this resource".to_string()],
            );
        };

        let state = PrincipalState {
            principal_id: principal.id,
            role: principal.role.clone(),
            active: principal.active,
        };

        if !principal.active {
            return AccessExplanation::denied(
                required,
                Some(state),
                DenialKind::InactivePrincipal,
                "Principal is inactive; inactive accounts are denied every check",
                vec!["Ask an administrator to reactivate the account".to_string()],
            );
        }

        if granted {
            let reason = if principal.is_admin() {
                "Principal holds the admin role, which passes every check".to_string()
            } else {
                format!("Role '{}' is allowed '{}'", principal.role, required)
            };
            return AccessExplanation {
                required_permission: required,
                granted: true,
                reason,
                principal: Some(state),
                denial_reason: None,
            };
        }

        let Some(allowed_roles) = self.rules.get(&required) else {
            return AccessExplanation::denied(
                required.clone(),
                Some(state),
                DenialKind::UnknownPermission,
                format!("No rule exists for '{required}'; only admin may perform it"),
                vec!["Ask an administrator to perform this action".to_string()],
            );
        };

        let mut suggestions = vec![format!(
            "Assign one of the roles allowed '{}'",
            required
        )];
        if !allowed_roles.is_empty() {
            let names: Vec<&str> = allowed_roles.iter().map(Role::as_str).collect();
            suggestions.push(format!("Roles allowed: {}", names.join(", ")));
        }

        AccessExplanation::denied(
            required.clone(),
            Some(state),
            DenialKind::RoleNotAllowed,
            format!("Role '{}' is not allowed '{}'", principal.role, required),
            suggestions,
        )
    }
}

/// Whether the principal's menu grants include `menu_id`.
pub fn has_menu_access(principal: Option<&Principal>, menu_id: &str) -> bool {
    active(principal).is_some_and(|p| p.grants.menus.contains(menu_id))
}

/// Whether the principal's sub-menu grants for `menu_id` include `sub_menu_id`.
pub fn has_sub_menu_access(principal: Option<&Principal>, menu_id: &str, sub_menu_id: &str) -> bool {
    active(principal).is_some_and(|p| {
        p.grants
            .sub_menus
            .get(menu_id)
            .is_some_and(|subs| subs.contains(sub_menu_id))
    })
}

/// Whether the principal's component grants include `component_id`.
pub fn has_component_access(principal: Option<&Principal>, component_id: &str) -> bool {
    active(principal).is_some_and(|p| p.grants.components.contains(component_id))
}

fn active(principal: Option<&Principal>) -> Option<&Principal> {
    principal.filter(|p| p.active)
}

// ─────────────────────────────────────────────────────────────────────────────
// Decision Explanation
// ─────────────────────────────────────────────────────────────────────────────

/// Detailed explanation of an access decision.
#[derive(Debug, Clone, Serialize)]
pub struct AccessExplanation {
    pub required_permission: Permission,
    pub granted: bool,
    pub reason: String,
    pub principal: Option<PrincipalState>,
    pub denial_reason: Option<DenialReason>,
}

impl AccessExplanation {
    fn denied(
        required: Permission,
        principal: Option<PrincipalState>,
        kind: DenialKind,
        message: impl Into<String>,
        suggestions: Vec<String>,
    ) -> Self {
        let message = message.into();
        Self {
            required_permission: required,
            granted: false,
            reason: message.clone(),
            principal,
            denial_reason: Some(DenialReason {
                kind,
                message,
                suggestions,
            }),
        }
    }
}

/// The parts of a principal that influenced the decision.
#[derive(Debug, Clone, Serialize)]
pub struct PrincipalState {
    pub principal_id: PrincipalId,
    pub role: Role,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DenialReason {
    pub kind: DenialKind,
    pub message: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    MissingPrincipal,
    InactivePrincipal,
    UnknownPermission,
    RoleNotAllowed,
}
