use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use warden_auth::{AccessGrants, CredentialState, Permission, Principal, PrincipalPatch, Role};
use warden_infra::NewAccount;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CheckPasswordRequest {
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
    pub return_url: Option<String>,
}

/// The token comes from `token`, or failing that from the reset link the
/// browser landed on (`return_url`).
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub new_password: String,
    pub confirm_password: Option<String>,
    pub token: Option<String>,
    pub return_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct AccessQuery {
    pub resource: String,
    pub action: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateAdminUserRequest {
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub password: Option<String>,
    #[serde(default)]
    pub menus: BTreeSet<String>,
    #[serde(default)]
    pub sub_menus: BTreeMap<String, BTreeSet<String>>,
    #[serde(default)]
    pub components: BTreeSet<String>,
}

impl From<CreateAdminUserRequest> for NewAccount {
    fn from(req: CreateAdminUserRequest) -> Self {
        NewAccount {
            email: req.email,
            display_name: req.display_name,
            role: Role::new(req.role),
            initial_password: req.password,
            grants: AccessGrants {
                menus: req.menus,
                sub_menus: req.sub_menus,
                components: req.components,
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateAdminUserRequest {
    pub display_name: Option<String>,
    pub role: Option<String>,
    pub menus: Option<BTreeSet<String>>,
    pub sub_menus: Option<BTreeMap<String, BTreeSet<String>>>,
    pub components: Option<BTreeSet<String>>,
    pub active: Option<bool>,
    pub needs_password_reset: Option<bool>,
}

impl From<UpdateAdminUserRequest> for PrincipalPatch {
    fn from(req: UpdateAdminUserRequest) -> Self {
        PrincipalPatch {
            display_name: req.display_name,
            role: req.role.map(Role::new),
            menus: req.menus,
            sub_menus: req.sub_menus,
            components: req.components,
            active: req.active,
            needs_password_reset: req.needs_password_reset,
            reset_requested_at: None,
        }
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct PrincipalResponse {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub active: bool,
    pub role: Role,
    pub menus: BTreeSet<String>,
    pub sub_menus: BTreeMap<String, BTreeSet<String>>,
    pub components: BTreeSet<String>,
    pub needs_password_reset: bool,
    pub credential_state: CredentialState,
    pub reset_requested_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Principal> for PrincipalResponse {
    fn from(p: Principal) -> Self {
        let credential_state = p.credential_state();
        Self {
            id: p.id.to_string(),
            email: p.email,
            display_name: p.display_name,
            active: p.active,
            role: p.role,
            menus: p.grants.menus,
            sub_menus: p.grants.sub_menus,
            components: p.grants.components,
            needs_password_reset: p.needs_password_reset,
            credential_state,
            reset_requested_at: p.reset_requested_at,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub token: String,
    pub needs_password_reset: bool,
}

#[derive(Debug, Serialize)]
pub struct AllowedPermission {
    pub resource: String,
    pub action: String,
    pub description: String,
}

impl From<Permission> for AllowedPermission {
    fn from(p: Permission) -> Self {
        Self {
            description: p.description(),
            resource: p.resource,
            action: p.action,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    #[serde(flatten)]
    pub principal: PrincipalResponse,
    pub allowed: Vec<AllowedPermission>,
}
