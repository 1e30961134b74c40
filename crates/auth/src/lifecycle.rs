//! Credential lifecycle states and transitions.
//!
//! This is the pure half of the lifecycle: which state a principal is in, and
//! where each event takes it. Coordinating the identity provider and the
//! directory lives in `warden-infra`.

use serde::{Deserialize, Serialize};

/// Password state of a principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialState {
    /// Password set, nothing pending.
    Normal,
    /// Admin-forced or newly created: the password must change before normal use.
    ResetRequired,
    /// A self-service reset token is outstanding. The existing password keeps
    /// working until a new one is set.
    ResetPending,
}

/// Something that happened to a principal's credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialEvent {
    AccountCreated,
    ResetRequested,
    ResetRedeemed,
    PasswordChanged,
    ResetForced,
    ResetCleared,
}

impl CredentialState {
    /// Derive the state from the stored flags.
    ///
    /// A forced reset dominates an outstanding self-service request.
    pub fn derive(needs_password_reset: bool, reset_requested: bool) -> Self {
        match (needs_password_reset, reset_requested) {
            (true, _) => Self::ResetRequired,
            (false, true) => Self::ResetPending,
            (false, false) => Self::Normal,
        }
    }

    /// Next state after `event`. Every (state, event) pair is defined.
    pub fn on(self, event: CredentialEvent) -> Self {
        use CredentialEvent::*;
        match (self, event) {
            (_, AccountCreated) | (_, ResetForced) => Self::ResetRequired,
            (Self::Normal, ResetRequested) => Self::ResetPending,
            (state, ResetRequested) => state,
            (_, ResetRedeemed) | (_, PasswordChanged) | (_, ResetCleared) => Self::Normal,
        }
    }

    /// Whether the principal must change their password before privileged use.
    pub fn blocks_privileged_use(self) -> bool {
        self == Self::ResetRequired
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::ResetRequired => "reset_required",
            Self::ResetPending => "reset_pending",
        }
    }
}

impl core::fmt::Display for CredentialState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::CredentialEvent::*;
    use super::CredentialState::*;
    use super::*;

    const ALL_STATES: [CredentialState; 3] = [Normal, ResetRequired, ResetPending];

    #[test]
    fn derive_from_flags() {
        assert_eq!(CredentialState::derive(false, false), Normal);
        assert_eq!(CredentialState::derive(false, true), ResetPending);
        assert_eq!(CredentialState::derive(true, false), ResetRequired);
        assert_eq!(CredentialState::derive(true, true), ResetRequired);
    }

    #[test]
    fn creation_and_force_always_require_reset() {
        for s in ALL_STATES {
            assert_eq!(s.on(AccountCreated), ResetRequired);
            assert_eq!(s.on(ResetForced), ResetRequired);
        }
    }

    #[test]
    fn completing_a_reset_always_returns_to_normal() {
        for s in ALL_STATES {
            assert_eq!(s.on(ResetRedeemed), Normal);
            assert_eq!(s.on(PasswordChanged), Normal);
            assert_eq!(s.on(ResetCleared), Normal);
        }
    }

    #[test]
    fn reset_request_does_not_override_forced_reset() {
        assert_eq!(Normal.on(ResetRequested), ResetPending);
        assert_eq!(ResetPending.on(ResetRequested), ResetPending);
        assert_eq!(ResetRequired.on(ResetRequested), ResetRequired);
    }

    #[test]
    fn only_reset_required_blocks() {
        assert!(ResetRequired.blocks_privileged_use());
        assert!(!ResetPending.blocks_privileged_use());
        assert!(!Normal.blocks_privileged_use());
    }
}
