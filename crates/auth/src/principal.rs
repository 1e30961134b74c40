//! Principal (user account) model and its partial-update patch.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use warden_core::{DomainError, DomainResult, PrincipalId};

use crate::{CredentialState, Role};

/// Explicit UI allow-lists held by a principal.
///
/// These are independent of the role: a role check gates actions, grants gate
/// which menus, sub-menus and components are visible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessGrants {
    #[serde(default)]
    pub menus: BTreeSet<String>,
    #[serde(default)]
    pub sub_menus: BTreeMap<String, BTreeSet<String>>,
    #[serde(default)]
    pub components: BTreeSet<String>,
}

/// A directory account with its role, grants and credential flags.
///
/// # Invariants
/// - `email` is trimmed, lower-cased and contains `@`.
/// - `display_name` is non-empty.
/// - An inactive principal is denied every access decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: PrincipalId,
    pub email: String,
    pub display_name: String,
    pub active: bool,
    pub role: Role,
    pub grants: AccessGrants,
    pub needs_password_reset: bool,
    pub reset_requested_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Principal {
    /// Build a freshly created account.
    ///
    /// New accounts are always active and always start with
    /// `needs_password_reset = true`.
    pub fn new(
        id: PrincipalId,
        email: &str,
        display_name: &str,
        role: Role,
        grants: AccessGrants,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        Ok(Self {
            id,
            email: normalize_email(email)?,
            display_name: validate_display_name(display_name)?,
            active: true,
            role,
            grants,
            needs_password_reset: true,
            reset_requested_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn credential_state(&self) -> CredentialState {
        CredentialState::derive(self.needs_password_reset, self.reset_requested_at.is_some())
    }
}

/// Normalize and validate an email address (basic shape check only).
pub fn normalize_email(email: &str) -> DomainResult<String> {
    let email = email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    };
    if !valid {
        return Err(DomainError::validation("invalid email format"));
    }
    Ok(email)
}

fn validate_display_name(name: &str) -> DomainResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::validation("display name cannot be empty"));
    }
    Ok(name.to_string())
}

/// Partial update of a principal row.
///
/// `None` leaves a field untouched. `reset_requested_at` uses a nested option:
/// `Some(None)` clears the timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalPatch {
    pub display_name: Option<String>,
    pub role: Option<Role>,
    pub menus: Option<BTreeSet<String>>,
    pub sub_menus: Option<BTreeMap<String, BTreeSet<String>>>,
    pub components: Option<BTreeSet<String>>,
    pub active: Option<bool>,
    pub needs_password_reset: Option<bool>,
    pub reset_requested_at: Option<Option<DateTime<Utc>>>,
}

impl PrincipalPatch {
    /// Patch that ends a reset cycle: clears the forced flag and any pending request.
    pub fn credential_reset_complete() -> Self {
        Self {
            needs_password_reset: Some(false),
            reset_requested_at: Some(None),
            ..Default::default()
        }
    }

    /// Set the credential flag fields so the stored state becomes `state`.
    ///
    /// `ResetRequired` leaves any pending request timestamp as given; the
    /// forced flag dominates it.
    pub fn with_credential_state(mut self, state: CredentialState, now: DateTime<Utc>) -> Self {
        match state {
            CredentialState::Normal => {
                self.needs_password_reset = Some(false);
                self.reset_requested_at = Some(None);
            }
            CredentialState::ResetRequired => {
                self.needs_password_reset = Some(true);
            }
            CredentialState::ResetPending => {
                self.needs_password_reset = Some(false);
                self.reset_requested_at = Some(Some(now));
            }
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Validate field contents without touching any record.
    pub fn validate(&self) -> DomainResult<()> {
        if let Some(name) = &self.display_name {
            validate_display_name(name)?;
        }
        Ok(())
    }

    /// Apply the patch in place and bump `updated_at`.
    pub fn apply_to(&self, principal: &mut Principal, now: DateTime<Utc>) -> DomainResult<()> {
        if let Some(name) = &self.display_name {
            principal.display_name = validate_display_name(name)?;
        }
        if let Some(role) = &self.role {
            principal.role = role.clone();
        }
        if let Some(menus) = &self.menus {
            principal.grants.menus = menus.clone();
        }
        if let Some(sub_menus) = &self.sub_menus {
            principal.grants.sub_menus = sub_menus.clone();
        }
        if let Some(components) = &self.components {
            principal.grants.components = components.clone();
        }
        if let Some(active) = self.active {
            principal.active = active;
        }
        if let Some(flag) = self.needs_password_reset {
            principal.needs_password_reset = flag;
        }
        if let Some(requested) = self.reset_requested_at {
            principal.reset_requested_at = requested;
        }
        principal.updated_at = now;
        Ok(())
    }
}
