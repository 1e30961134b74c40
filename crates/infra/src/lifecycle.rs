//! Credential lifecycle service.
//!
//! Coordinates the identity provider (which owns the credential) with the
//! directory (which owns the `needs_password_reset` / `reset_requested_at`
//! flags). The transition rules themselves live in
//! [`warden_auth::CredentialState`].
//!
//! ```text
//! request_reset   lookup → provider.issue_reset_token → record reset_requested_at
//! redeem_reset    confirm → policy → provider.redeem_reset_token → clear flags
//! change_password lookup → confirm → policy → provider.set_credential → clear flags
//! ```
//!
//! Once the provider has accepted a new credential, a failure to clear the flags
//! is reported as `InconsistentState`, never as success and never silently.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use warden_auth::{
    CredentialEvent, CredentialState, PasswordPolicy, PolicyResult, Principal, PrincipalPatch,
    normalize_email,
};
use warden_core::PrincipalId;

use crate::directory::DirectoryStore;
use crate::error::ServiceError;
use crate::identity::IdentityProvider;

#[derive(Clone)]
pub struct CredentialLifecycle {
    provider: Arc<dyn IdentityProvider>,
    store: Arc<dyn DirectoryStore>,
    policy: PasswordPolicy,
}

impl CredentialLifecycle {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        store: Arc<dyn DirectoryStore>,
        policy: PasswordPolicy,
    ) -> Self {
        Self {
            provider,
            store,
            policy,
        }
    }

    pub fn policy(&self) -> &PasswordPolicy {
        &self.policy
    }

    /// Advisory strength check; never fails.
    pub fn check_password(&self, password: &str) -> PolicyResult {
        self.policy.evaluate(password)
    }

    /// Start a self-service reset.
    ///
    /// Always returns `Ok`: unknown or inactive emails and downstream failures
    /// are logged, not reported, so the response can't reveal which
    /// accounts exist.
    pub async fn request_reset(&self, email: &str, return_url: &str) -> Result<(), ServiceError> {
        let Ok(email) = normalize_email(email) else {
            debug!("reset requested for malformed email");
            return Ok(());
        };

        let principal = match self.store.find_by_email(&email).await {
            Ok(Some(p)) => p,
            Ok(None) => {
                debug!("reset requested for unknown email");
                return Ok(());
            }
            Err(e) => {
                warn!(error = %e, "directory lookup failed during reset request");
                return Ok(());
            }
        };

        if !principal.active {
            debug!(principal_id = %principal.id, "reset requested for inactive principal");
            return Ok(());
        }

        self.send_reset_link(&principal, return_url).await;
        Ok(())
    }

    /// Issue a reset link for `principal` and record the request.
    ///
    /// Fire-and-forget: failures are logged at `warn`.
    pub async fn send_reset_link(&self, principal: &Principal, return_url: &str) {
        if let Err(e) = self.provider.issue_reset_token(&principal.email, return_url).await {
            warn!(principal_id = %principal.id, error = %e, "reset link could not be issued");
            return;
        }

        let next = principal.credential_state().on(CredentialEvent::ResetRequested);
        if next != CredentialState::ResetPending {
            return;
        }

        let patch = PrincipalPatch {
            reset_requested_at: Some(Some(Utc::now())),
            ..Default::default()
        };
        if let Err(e) = self.store.update(principal.id, patch).await {
            warn!(principal_id = %principal.id, error = %e, "reset request not recorded");
        }
    }

    /// Complete a self-service reset with a token from a reset link.
    pub async fn redeem_reset(
        &self,
        token: &str,
        new_password: &str,
        confirmation: Option<&str>,
    ) -> Result<PrincipalId, ServiceError> {
        self.check_new_password(new_password, confirmation)?;

        if token.trim().is_empty() {
            return Err(ServiceError::InvalidOrExpiredToken);
        }

        let id = self
            .provider
            .redeem_reset_token(token, new_password)
            .await
            .map_err(ServiceError::from)?;

        self.clear_reset_flags(id).await?;
        info!(principal_id = %id, "password reset completed");
        Ok(id)
    }

    /// Change the password of an authenticated principal.
    pub async fn change_password(
        &self,
        id: PrincipalId,
        new_password: &str,
        confirmation: Option<&str>,
    ) -> Result<(), ServiceError> {
        self.store.get(id).await?.ok_or(ServiceError::NotFound)?;
        self.check_new_password(new_password, confirmation)?;

        self.provider
            .set_credential(id, new_password)
            .await
            .map_err(|e| ServiceError::ProviderFailure(e.to_string()))?;

        // Unconditional: a reset may have been forced since the lookup.
        self.clear_reset_flags(id).await?;
        info!(principal_id = %id, "password changed");
        Ok(())
    }

    fn check_new_password(
        &self,
        new_password: &str,
        confirmation: Option<&str>,
    ) -> Result<(), ServiceError> {
        if let Some(confirmation) = confirmation {
            if confirmation != new_password {
                return Err(ServiceError::ConfirmationMismatch);
            }
        }
        let result = self.policy.evaluate(new_password);
        if !result.valid {
            return Err(ServiceError::PolicyViolation(result));
        }
        Ok(())
    }

    // Credential is already updated at this point.
    async fn clear_reset_flags(&self, id: PrincipalId) -> Result<(), ServiceError> {
        match self
            .store
            .update(id, PrincipalPatch::credential_reset_complete())
            .await
        {
            Ok(_) => Ok(()),
            Err(e) => {
                error!(principal_id = %id, error = %e, "credential updated but reset flags not cleared");
                Err(ServiceError::inconsistent(
                    "password was updated but the account could not be marked as reset",
                ))
            }
        }
    }
}
