//! Directory store: principal rows and the role catalogue.

pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;

use async_trait::async_trait;

use warden_auth::{Principal, PrincipalPatch, Role, RoleRecord};
use warden_core::PrincipalId;

use crate::error::StoreError;

pub use in_memory::InMemoryDirectoryStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresDirectoryStore;

/// Persistence for principals and roles.
///
/// `update` is a single atomic partial update of one row: fields absent from the
/// patch are never written, so concurrent updates to different fields don't
/// clobber each other.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    /// All principals, ordered by email.
    async fn list(&self) -> Result<Vec<Principal>, StoreError>;

    async fn get(&self, id: PrincipalId) -> Result<Option<Principal>, StoreError>;

    /// Lookup by normalized (lower-case) email.
    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, StoreError>;

    /// Insert a new row. Duplicate id or email → `Conflict`.
    async fn insert(&self, principal: Principal) -> Result<(), StoreError>;

    /// Apply `patch` and return the updated row. Unknown id → `NotFound`.
    async fn update(&self, id: PrincipalId, patch: PrincipalPatch) -> Result<Principal, StoreError>;

    /// Unknown id → `NotFound`.
    async fn delete(&self, id: PrincipalId) -> Result<(), StoreError>;

    async fn roles(&self) -> Result<Vec<RoleRecord>, StoreError>;

    async fn role(&self, name: &Role) -> Result<Option<RoleRecord>, StoreError>;
}
