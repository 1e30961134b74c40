//! Authorization guard.
//!
//! Resolves the caller for every protected request and answers the admin and
//! resource/action questions. Ambiguity always resolves to `Forbidden`: a
//! directory outage while resolving a principal is never a 5xx.

use std::sync::Arc;

use axum::http::{HeaderMap, header};
use tracing::{debug, warn};

use warden_auth::PolicyTable;
use warden_infra::{DirectoryStore, IdentityProvider, ServiceError};

use crate::context::PrincipalContext;

#[derive(Clone)]
pub struct Guard {
    provider: Arc<dyn IdentityProvider>,
    store: Arc<dyn DirectoryStore>,
    policy: Arc<PolicyTable>,
}

impl Guard {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        store: Arc<dyn DirectoryStore>,
        policy: Arc<PolicyTable>,
    ) -> Self {
        Self {
            provider,
            store,
            policy,
        }
    }

    /// Resolve the bearer credential in `headers` to an active principal.
    ///
    /// - missing/malformed header or rejected credential → `Unauthenticated`
    /// - lookup failure, missing row, or inactive principal → `Forbidden`
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<PrincipalContext, ServiceError> {
        let token = extract_bearer(headers).ok_or(ServiceError::Unauthenticated)?;

        let id = self
            .provider
            .authenticate(token)
            .await
            .map_err(|e| {
                debug!(error = %e, "bearer credential rejected");
                ServiceError::Unauthenticated
            })?;

        let principal = match self.store.get(id).await {
            Ok(Some(p)) => p,
            Ok(None) => {
                warn!(principal_id = %id, "authenticated identity has no directory entry");
                return Err(ServiceError::forbidden("account is not provisioned"));
            }
            Err(e) => {
                warn!(principal_id = %id, error = %e, "directory lookup failed; denying");
                return Err(ServiceError::forbidden("account could not be resolved"));
            }
        };

        if !principal.active {
            return Err(ServiceError::forbidden("account is inactive"));
        }

        Ok(PrincipalContext::new(principal, token))
    }

    /// Admin role and no outstanding forced reset.
    pub fn require_admin(&self, ctx: &PrincipalContext) -> Result<(), ServiceError> {
        if !ctx.principal().is_admin() {
            return Err(ServiceError::forbidden("admin role required"));
        }
        if ctx.credential_state().blocks_privileged_use() {
            return Err(ServiceError::forbidden("password reset required"));
        }
        Ok(())
    }

    pub fn require_access(
        &self,
        ctx: &PrincipalContext,
        resource: &str,
        action: &str,
    ) -> Result<(), ServiceError> {
        if self.policy.can_access(Some(ctx.principal()), resource, action) {
            Ok(())
        } else {
            Err(ServiceError::forbidden(format!(
                "'{resource}.{action}' is not allowed for role '{}'",
                ctx.principal().role
            )))
        }
    }

    pub fn policy(&self) -> &PolicyTable {
        &self.policy
    }
}

pub(crate) fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}
