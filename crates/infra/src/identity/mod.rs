//! Identity provider boundary.
//!
//! The provider owns credentials, sessions and reset tokens. The rest of Warden
//! only sees principal ids and opaque token strings.

pub mod in_memory;

use async_trait::async_trait;

use warden_core::PrincipalId;

use crate::error::ProviderError;

pub use in_memory::{IdentityConfig, InMemoryIdentityProvider, ResetNotification};

/// Session, credential and reset-token primitives consumed by Warden.
///
/// Every call may fail independently; implementations must not assume any
/// ordering between concurrent calls for the same principal.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve a bearer credential to the principal it was issued for.
    async fn authenticate(&self, credential: &str) -> Result<PrincipalId, ProviderError>;

    /// Exchange email + password for a session credential.
    async fn sign_in(&self, email: &str, password: &str) -> Result<String, ProviderError>;

    /// Invalidate a session credential.
    async fn sign_out(&self, credential: &str) -> Result<(), ProviderError>;

    async fn set_credential(&self, id: PrincipalId, new_password: &str) -> Result<(), ProviderError>;

    /// Mint a reset token and deliver it out-of-band (e.g. by email).
    async fn issue_reset_token(&self, email: &str, return_url: &str) -> Result<(), ProviderError>;

    /// Redeem a reset token, setting `new_password`. Tokens are single-use.
    async fn redeem_reset_token(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<PrincipalId, ProviderError>;

    async fn provision_identity(&self, email: &str, password: &str)
    -> Result<PrincipalId, ProviderError>;

    async fn deprovision_identity(&self, id: PrincipalId) -> Result<(), ProviderError>;
}
