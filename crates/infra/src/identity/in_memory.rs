//! In-process identity provider for development and tests.
//!
//! - Credentials are stored as argon2id PHC strings.
//! - Sessions are HS256 JWTs carrying [`SessionClaims`]; sign-out revokes the `jti`.
//! - Reset tokens are random, time-bounded and single-use. Instead of sending
//!   email, issued links are recorded in an outbox.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHasher, PasswordVerifier, Version};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use tracing::{debug, info};
use uuid::Uuid;

use warden_auth::{SessionClaims, normalize_email, validate_claims};
use warden_core::{PrincipalId, SessionId};

use super::IdentityProvider;
use crate::error::ProviderError;

/// Tunables for [`InMemoryIdentityProvider`].
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    pub session_secret: Vec<u8>,
    pub session_ttl: Duration,
    pub reset_token_ttl: Duration,
    /// Argon2 memory cost in KiB.
    pub hash_memory_kib: u32,
    pub hash_iterations: u32,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            session_secret: b"dev-secret".to_vec(),
            session_ttl: Duration::minutes(60),
            reset_token_ttl: Duration::minutes(30),
            hash_memory_kib: 4096,
            hash_iterations: 2,
        }
    }
}

/// A reset link handed to the (simulated) mail channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetNotification {
    pub email: String,
    pub token: String,
    pub link: String,
    pub issued_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct Identity {
    email: String,
    password_hash: String,
}

#[derive(Debug, Clone)]
struct ResetGrant {
    principal_id: PrincipalId,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct State {
    identities: HashMap<PrincipalId, Identity>,
    reset_tokens: HashMap<String, ResetGrant>,
    revoked_sessions: HashSet<SessionId>,
    outbox: Vec<ResetNotification>,
}

impl State {
    fn find_by_email(&self, email: &str) -> Option<(PrincipalId, &Identity)> {
        self.identities
            .iter()
            .find(|(_, identity)| identity.email == email)
            .map(|(id, identity)| (*id, identity))
    }
}

pub struct InMemoryIdentityProvider {
    state: RwLock<State>,
    config: IdentityConfig,
    hasher: Argon2<'static>,
}

impl InMemoryIdentityProvider {
    pub fn new(config: IdentityConfig) -> Result<Self, ProviderError> {
        let params = Params::new(config.hash_memory_kib, config.hash_iterations, 1, None)
            .map_err(|e| ProviderError::Unavailable(format!("invalid argon2 parameters: {e}")))?;
        Ok(Self {
            state: RwLock::new(State::default()),
            hasher: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            config,
        })
    }

    /// Every reset link issued so far, oldest first.
    pub fn outbox(&self) -> Vec<ResetNotification> {
        self.state
            .read()
            .map(|s| s.outbox.clone())
            .unwrap_or_default()
    }

    /// Most recent reset token issued to `email`.
    pub fn latest_reset_token(&self, email: &str) -> Option<String> {
        let email = email.trim().to_lowercase();
        self.outbox()
            .into_iter()
            .rev()
            .find(|n| n.email == email)
            .map(|n| n.token)
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, State>, ProviderError> {
        self.state
            .read()
            .map_err(|_| ProviderError::Unavailable("identity state lock poisoned".into()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, State>, ProviderError> {
        self.state
            .write()
            .map_err(|_| ProviderError::Unavailable("identity state lock poisoned".into()))
    }

    fn hash(&self, password: &str) -> Result<String, ProviderError> {
        let mut salt = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut salt);
        let salt = SaltString::encode_b64(&salt)
            .map_err(|e| ProviderError::Unavailable(format!("salt encoding failed: {e}")))?;
        self.hasher
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| ProviderError::Unavailable(format!("password hashing failed: {e}")))
    }

    fn verify(&self, password: &str, stored: &str) -> bool {
        PasswordHash::new(stored)
            .map(|parsed| self.hasher.verify_password(password.as_bytes(), &parsed).is_ok())
            .unwrap_or(false)
    }

    fn decode_session(&self, credential: &str) -> Result<SessionClaims, ProviderError> {
        // Time checks are done by `validate_claims`, not by the JWT layer.
        let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;

        jsonwebtoken::decode::<SessionClaims>(
            credential,
            &DecodingKey::from_secret(&self.config.session_secret),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|_| ProviderError::Unauthorized)
    }

    fn mint_session(&self, sub: PrincipalId) -> Result<String, ProviderError> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub,
            jti: SessionId::new(),
            issued_at: now,
            expires_at: now + self.config.session_ttl,
        };
        jsonwebtoken::encode(
            &Header::new(jsonwebtoken::Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.config.session_secret),
        )
        .map_err(|e| ProviderError::Unavailable(format!("session signing failed: {e}")))
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn authenticate(&self, credential: &str) -> Result<PrincipalId, ProviderError> {
        let claims = self.decode_session(credential)?;
        validate_claims(&claims, Utc::now()).map_err(|_| ProviderError::Unauthorized)?;

        let state = self.read()?;
        if state.revoked_sessions.contains(&claims.jti) {
            return Err(ProviderError::Unauthorized);
        }
        if !state.identities.contains_key(&claims.sub) {
            return Err(ProviderError::Unauthorized);
        }
        Ok(claims.sub)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<String, ProviderError> {
        let email = email.trim().to_lowercase();
        let (id, stored_hash) = {
            let state = self.read()?;
            let (id, identity) = state
                .find_by_email(&email)
                .ok_or(ProviderError::Unauthorized)?;
            (id, identity.password_hash.clone())
        };

        if !self.verify(password, &stored_hash) {
            debug!(principal_id = %id, "sign-in rejected");
            return Err(ProviderError::Unauthorized);
        }
        self.mint_session(id)
    }

    async fn sign_out(&self, credential: &str) -> Result<(), ProviderError> {
        let claims = self.decode_session(credential)?;
        self.write()?.revoked_sessions.insert(claims.jti);
        Ok(())
    }

    async fn set_credential(&self, id: PrincipalId, new_password: &str) -> Result<(), ProviderError> {
        let hash = self.hash(new_password)?;
        let mut state = self.write()?;
        let identity = state.identities.get_mut(&id).ok_or(ProviderError::NotFound)?;
        identity.password_hash = hash;
        Ok(())
    }

    async fn issue_reset_token(&self, email: &str, return_url: &str) -> Result<(), ProviderError> {
        let email = email.trim().to_lowercase();
        let now = Utc::now();
        let token = Uuid::new_v4().simple().to_string();

        let mut state = self.write()?;
        let (principal_id, _) = state.find_by_email(&email).ok_or(ProviderError::NotFound)?;
        state.reset_tokens.insert(
            token.clone(),
            ResetGrant {
                principal_id,
                expires_at: now + self.config.reset_token_ttl,
            },
        );
        state.outbox.push(ResetNotification {
            email,
            link: format!("{return_url}#access_token={token}&type=recovery"),
            token,
            issued_at: now,
        });

        info!(%principal_id, "reset link issued");
        Ok(())
    }

    async fn redeem_reset_token(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<PrincipalId, ProviderError> {
        let now = Utc::now();
        {
            let state = self.read()?;
            let grant = state
                .reset_tokens
                .get(token)
                .ok_or(ProviderError::InvalidOrExpiredToken)?;
            if now >= grant.expires_at {
                return Err(ProviderError::InvalidOrExpiredToken);
            }
        }

        let hash = self.hash(new_password)?;

        let mut state = self.write()?;
        // Re-check under the write lock: a concurrent redemption may have won.
        let grant = state
            .reset_tokens
            .remove(token)
            .ok_or(ProviderError::InvalidOrExpiredToken)?;
        if now >= grant.expires_at {
            return Err(ProviderError::InvalidOrExpiredToken);
        }

        let identity = state
            .identities
            .get_mut(&grant.principal_id)
            .ok_or(ProviderError::InvalidOrExpiredToken)?;
        identity.password_hash = hash;

        // Redemption invalidates every other outstanding token for this principal.
        state
            .reset_tokens
            .retain(|_, g| g.principal_id != grant.principal_id);

        Ok(grant.principal_id)
    }

    async fn provision_identity(
        &self,
        email: &str,
        password: &str,
    ) -> Result<PrincipalId, ProviderError> {
        let email = normalize_email(email).map_err(|e| ProviderError::Conflict(e.to_string()))?;
        let hash = self.hash(password)?;

        let mut state = self.write()?;
        if state.find_by_email(&email).is_some() {
            return Err(ProviderError::Conflict("email already registered".into()));
        }
        let id = PrincipalId::new();
        state.identities.insert(
            id,
            Identity {
                email,
                password_hash: hash,
            },
        );
        Ok(id)
    }

    async fn deprovision_identity(&self, id: PrincipalId) -> Result<(), ProviderError> {
        let mut state = self.write()?;
        state.identities.remove(&id).ok_or(ProviderError::NotFound)?;
        state.reset_tokens.retain(|_, g| g.principal_id != id);
        Ok(())
    }
}
