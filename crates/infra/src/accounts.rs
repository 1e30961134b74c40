//! Account directory service: admin-side principal management.
//!
//! Creating and deleting an account touches two systems (identity provider and
//! directory store) with no shared transaction. Ordering and compensation:
//!
//! - create: provision identity → insert row; on insert failure the identity is
//!   deprovisioned again.
//! - delete: deprovision identity → delete row; a provider failure leaves the
//!   row in place.
//!
//! A failed compensation is reported as `InconsistentState`.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use warden_auth::{AccessGrants, CredentialEvent, Principal, PrincipalPatch, Role, RoleRecord};
use warden_core::PrincipalId;

use crate::directory::DirectoryStore;
use crate::error::{ProviderError, ServiceError};
use crate::identity::IdentityProvider;
use crate::lifecycle::CredentialLifecycle;

/// Input for [`AccountDirectory::create`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAccount {
    pub email: String,
    pub display_name: String,
    pub role: Role,
    /// When absent a temporary password is generated; the user sets their own
    /// through the reset link either way.
    #[serde(default)]
    pub initial_password: Option<String>,
    #[serde(default)]
    pub grants: AccessGrants,
}

#[derive(Clone)]
pub struct AccountDirectory {
    provider: Arc<dyn IdentityProvider>,
    store: Arc<dyn DirectoryStore>,
    lifecycle: CredentialLifecycle,
    reset_return_url: String,
}

impl AccountDirectory {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        store: Arc<dyn DirectoryStore>,
        lifecycle: CredentialLifecycle,
        reset_return_url: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            store,
            lifecycle,
            reset_return_url: reset_return_url.into(),
        }
    }

    pub async fn list(&self) -> Result<Vec<Principal>, ServiceError> {
        Ok(self.store.list().await?)
    }

    pub async fn get(&self, id: PrincipalId) -> Result<Principal, ServiceError> {
        self.store.get(id).await?.ok_or(ServiceError::NotFound)
    }

    pub async fn roles(&self) -> Result<Vec<RoleRecord>, ServiceError> {
        Ok(self.store.roles().await?)
    }

    /// Create an account in `ResetRequired` and send it a reset link.
    pub async fn create(&self, new: NewAccount) -> Result<Principal, ServiceError> {
        let now = Utc::now();
        // Validate everything before touching the provider; the id is replaced below.
        let mut principal = Principal::new(
            PrincipalId::new(),
            &new.email,
            &new.display_name,
            new.role.clone(),
            new.grants,
            now,
        )?;
        self.ensure_role(&new.role).await?;

        let password = match new.initial_password {
            Some(password) => {
                let result = self.lifecycle.check_password(&password);
                if !result.valid {
                    return Err(ServiceError::PolicyViolation(result));
                }
                password
            }
            None => self.lifecycle.policy().generate(),
        };

        principal.id = self
            .provider
            .provision_identity(&principal.email, &password)
            .await?;

        self.insert_or_compensate(principal.clone()).await?;
        info!(principal_id = %principal.id, role = %principal.role, "account created");

        self.lifecycle
            .send_reset_link(&principal, &self.reset_return_url)
            .await;
        Ok(principal)
    }

    /// Seed an administrator with a known password (no reset required).
    ///
    /// Returns the existing principal if the email is already registered.
    pub async fn bootstrap_admin(
        &self,
        email: &str,
        display_name: &str,
        password: &str,
    ) -> Result<Principal, ServiceError> {
        if let Some(existing) = self.store.find_by_email(email).await? {
            debug!(principal_id = %existing.id, "bootstrap admin already present");
            return Ok(existing);
        }

        let mut principal = Principal::new(
            PrincipalId::new(),
            email,
            display_name,
            Role::ADMIN,
            AccessGrants::default(),
            Utc::now(),
        )?;
        principal.needs_password_reset = false;

        let result = self.lifecycle.check_password(password);
        if !result.valid {
            return Err(ServiceError::PolicyViolation(result));
        }

        principal.id = self.provider.provision_identity(&principal.email, password).await?;
        self.insert_or_compensate(principal.clone()).await?;
        info!(principal_id = %principal.id, "bootstrap admin created");
        Ok(principal)
    }

    /// Apply an admin edit.
    ///
    /// A change to `needs_password_reset` is a credential event: setting it
    /// forces a reset (and sends a fresh link to active accounts), clearing it
    /// returns the account to `Normal`, dropping any pending request.
    pub async fn update(
        &self,
        id: PrincipalId,
        patch: PrincipalPatch,
    ) -> Result<Principal, ServiceError> {
        patch.validate()?;
        if let Some(role) = &patch.role {
            self.ensure_role(role).await?;
        }

        let event = patch.needs_password_reset.map(|forced| {
            if forced {
                CredentialEvent::ResetForced
            } else {
                CredentialEvent::ResetCleared
            }
        });
        let patch = match event {
            Some(event) => {
                let current = self.get(id).await?;
                let next = current.credential_state().on(event);
                patch.with_credential_state(next, Utc::now())
            }
            None => patch,
        };

        let updated = self.store.update(id, patch).await?;
        debug!(principal_id = %id, "account updated");

        if event == Some(CredentialEvent::ResetForced) {
            info!(principal_id = %id, "password reset forced");
            if updated.active {
                self.lifecycle
                    .send_reset_link(&updated, &self.reset_return_url)
                    .await;
            } else {
                debug!(principal_id = %id, "inactive account; no reset link sent");
            }
        }
        Ok(updated)
    }

    /// Delete `id` on behalf of `actor`.
    pub async fn delete(&self, actor: PrincipalId, id: PrincipalId) -> Result<(), ServiceError> {
        if actor == id {
            return Err(ServiceError::validation("cannot delete your own account"));
        }
        self.get(id).await?;

        match self.provider.deprovision_identity(id).await {
            Ok(()) => {}
            Err(ProviderError::NotFound) => {
                warn!(principal_id = %id, "identity already absent; removing directory row");
            }
            Err(e) => {
                warn!(principal_id = %id, error = %e, "deprovisioning failed; directory untouched");
                return Err(ServiceError::ProviderFailure(e.to_string()));
            }
        }

        match self.store.delete(id).await {
            Ok(()) => {
                info!(principal_id = %id, actor = %actor, "account deleted");
                Ok(())
            }
            Err(e) => {
                error!(principal_id = %id, error = %e, "identity removed but directory row remains");
                Err(ServiceError::inconsistent(
                    "account sign-in was removed but the directory entry could not be deleted",
                ))
            }
        }
    }

    async fn ensure_role(&self, role: &Role) -> Result<(), ServiceError> {
        match self.store.role(role).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::validation(format!("unknown role '{role}'"))),
        }
    }

    async fn insert_or_compensate(&self, principal: Principal) -> Result<(), ServiceError> {
        let id = principal.id;
        let Err(insert_err) = self.store.insert(principal).await else {
            return Ok(());
        };

        warn!(principal_id = %id, error = %insert_err, "directory insert failed; deprovisioning identity");
        match self.provider.deprovision_identity(id).await {
            Ok(()) => Err(insert_err.into()),
            Err(e) => {
                error!(principal_id = %id, error = %e, "compensating deprovision failed");
                Err(ServiceError::inconsistent(
                    "account sign-in was created but the directory entry was not",
                ))
            }
        }
    }
}
