//! Infrastructure layer: identity provider, directory store, and the services
//! that coordinate them.

pub mod accounts;
pub mod directory;
pub mod error;
pub mod identity;
pub mod lifecycle;

#[cfg(test)]
mod integration_tests;

pub use accounts::{AccountDirectory, NewAccount};
pub use directory::{DirectoryStore, InMemoryDirectoryStore};
#[cfg(feature = "postgres")]
pub use directory::PostgresDirectoryStore;
pub use error::{ProviderError, ServiceError, StoreError};
pub use identity::{IdentityConfig, IdentityProvider, InMemoryIdentityProvider, ResetNotification};
pub use lifecycle::CredentialLifecycle;
