use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

use warden_auth::{Principal, PrincipalPatch, Role, RoleRecord, builtin_roles};
use warden_core::PrincipalId;

use super::DirectoryStore;
use crate::error::StoreError;

#[derive(Debug, Default)]
struct Tables {
    principals: BTreeMap<PrincipalId, Principal>,
    roles: BTreeMap<Role, RoleRecord>,
}

/// In-memory directory store.
///
/// One `RwLock` guards both tables; every write (including a patch) happens
/// under a single write guard.
#[derive(Debug)]
pub struct InMemoryDirectoryStore {
    inner: RwLock<Tables>,
}

impl Default for InMemoryDirectoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDirectoryStore {
    /// Store seeded with the built-in roles.
    pub fn new() -> Self {
        Self::with_roles(builtin_roles())
    }

    pub fn with_roles(roles: impl IntoIterator<Item = RoleRecord>) -> Self {
        let roles = roles.into_iter().map(|r| (r.name.clone(), r)).collect();
        Self {
            inner: RwLock::new(Tables {
                principals: BTreeMap::new(),
                roles,
            }),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Unavailable("directory lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Unavailable("directory lock poisoned".into()))
    }
}

#[async_trait]
impl DirectoryStore for InMemoryDirectoryStore {
    async fn list(&self) -> Result<Vec<Principal>, StoreError> {
        let mut all: Vec<Principal> = self.read()?.principals.values().cloned().collect();
        all.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(all)
    }

    async fn get(&self, id: PrincipalId) -> Result<Option<Principal>, StoreError> {
        Ok(self.read()?.principals.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, StoreError> {
        let email = email.trim().to_lowercase();
        Ok(self
            .read()?
            .principals
            .values()
            .find(|p| p.email == email)
            .cloned())
    }

    async fn insert(&self, principal: Principal) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        if tables.principals.contains_key(&principal.id) {
            return Err(StoreError::Conflict("principal id already exists".into()));
        }
        if tables.principals.values().any(|p| p.email == principal.email) {
            return Err(StoreError::Conflict("email already registered".into()));
        }
        if !tables.roles.contains_key(&principal.role) {
            return Err(StoreError::Invalid(format!("unknown role '{}'", principal.role)));
        }
        tables.principals.insert(principal.id, principal);
        Ok(())
    }

    async fn update(&self, id: PrincipalId, patch: PrincipalPatch) -> Result<Principal, StoreError> {
        let mut tables = self.write()?;
        if let Some(role) = &patch.role {
            if !tables.roles.contains_key(role) {
                return Err(StoreError::Invalid(format!("unknown role '{role}'")));
            }
        }
        let principal = tables.principals.get_mut(&id).ok_or(StoreError::NotFound)?;

        // Apply to a copy so a rejected patch leaves the row untouched.
        let mut next = principal.clone();
        patch
            .apply_to(&mut next, Utc::now())
            .map_err(|e| StoreError::Invalid(e.to_string()))?;
        *principal = next.clone();
        Ok(next)
    }

    async fn delete(&self, id: PrincipalId) -> Result<(), StoreError> {
        self.write()?
            .principals
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn roles(&self) -> Result<Vec<RoleRecord>, StoreError> {
        Ok(self.read()?.roles.values().cloned().collect())
    }

    async fn role(&self, name: &Role) -> Result<Option<RoleRecord>, StoreError> {
        Ok(self.read()?.roles.get(name).cloned())
    }
}
