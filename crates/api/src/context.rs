use warden_auth::{CredentialState, Principal};
use warden_core::PrincipalId;

/// Principal context for a request (resolved principal + the bearer it presented).
///
/// Built by the auth middleware for every protected route and handed to
/// handlers as an extension; nothing about the caller lives in global state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Principal,
    credential: String,
}

impl PrincipalContext {
    pub fn new(principal: Principal, credential: impl Into<String>) -> Self {
        Self {
            principal,
            credential: credential.into(),
        }
    }

    pub fn principal_id(&self) -> PrincipalId {
        self.principal.id
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn credential_state(&self) -> CredentialState {
        self.principal.credential_state()
    }

    /// The session credential this request was authenticated with.
    pub fn credential(&self) -> &str {
        &self.credential
    }
}
