//! `warden-auth`: pure access-control and credential-policy logic.
//!
//! This crate is intentionally decoupled from HTTP and storage: every function
//! here is a deterministic decision over values handed in by the caller.

pub mod access;
pub mod claims;
pub mod lifecycle;
pub mod password;
pub mod permissions;
pub mod principal;
pub mod reset_link;
pub mod roles;

pub use access::{
    AccessExplanation, AccessRule, DenialKind, DenialReason, PolicyTable, PolicyTableError,
    PrincipalState, has_component_access, has_menu_access, has_sub_menu_access,
};
pub use claims::{SessionClaims, TokenValidationError, validate_claims};
pub use lifecycle::{CredentialEvent, CredentialState};
pub use password::{
    MIN_PASSWORD_LENGTH, PasswordPolicy, PasswordRule, PolicyResult, evaluate,
    generate_temporary_password,
};
pub use permissions::Permission;
pub use principal::{AccessGrants, Principal, PrincipalPatch, normalize_email};
pub use reset_link::extract_reset_token;
pub use roles::{Role, RoleRecord, builtin_roles};
