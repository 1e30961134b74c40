//! Service wiring: identity provider, directory store, policy table, and the
//! lifecycle / account services built over them.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use warden_auth::{PasswordPolicy, PolicyTable};
use warden_infra::{
    AccountDirectory, CredentialLifecycle, DirectoryStore, IdentityConfig, IdentityProvider,
    InMemoryDirectoryStore, InMemoryIdentityProvider,
};

use crate::authz::Guard;
use crate::config::ApiConfig;

#[derive(Clone)]
pub struct AppServices {
    pub provider: Arc<dyn IdentityProvider>,
    pub store: Arc<dyn DirectoryStore>,
    pub policy_table: Arc<PolicyTable>,
    pub lifecycle: CredentialLifecycle,
    pub accounts: AccountDirectory,
    pub reset_return_url: String,
}

impl AppServices {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        store: Arc<dyn DirectoryStore>,
        policy_table: PolicyTable,
        password_policy: PasswordPolicy,
        reset_return_url: impl Into<String>,
    ) -> Self {
        let reset_return_url = reset_return_url.into();
        let lifecycle = CredentialLifecycle::new(provider.clone(), store.clone(), password_policy);
        let accounts = AccountDirectory::new(
            provider.clone(),
            store.clone(),
            lifecycle.clone(),
            reset_return_url.clone(),
        );
        Self {
            provider,
            store,
            policy_table: Arc::new(policy_table),
            lifecycle,
            accounts,
            reset_return_url,
        }
    }

    /// Wire services from configuration and seed the bootstrap admin, if any.
    pub async fn from_config(config: &ApiConfig) -> anyhow::Result<Self> {
        let provider = InMemoryIdentityProvider::new(IdentityConfig {
            session_secret: config.session_secret.clone().into_bytes(),
            session_ttl: config.session_ttl,
            reset_token_ttl: config.reset_token_ttl,
            ..IdentityConfig::default()
        })
        .context("failed to initialize identity provider")?;

        let store = build_store(config).await?;

        let policy_table = match &config.policy_table_path {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read policy table {}", path.display()))?;
                let table = PolicyTable::from_json(&json)
                    .with_context(|| format!("invalid policy table {}", path.display()))?;
                info!(path = %path.display(), rules = table.rules().len(), "policy table loaded");
                table
            }
            None => PolicyTable::standard(),
        };

        let services = Self::new(
            Arc::new(provider),
            store,
            policy_table,
            PasswordPolicy::with_min_length(config.password_min_length),
            config.reset_return_url.clone(),
        );

        if let Some(admin) = &config.bootstrap_admin {
            let principal = services
                .accounts
                .bootstrap_admin(&admin.email, "Administrator", &admin.password)
                .await
                .context("failed to seed bootstrap admin")?;
            info!(principal_id = %principal.id, "bootstrap admin ready");
        }

        Ok(services)
    }

    pub fn guard(&self) -> Guard {
        Guard::new(
            self.provider.clone(),
            self.store.clone(),
            self.policy_table.clone(),
        )
    }
}

#[cfg(feature = "postgres")]
async fn build_store(config: &ApiConfig) -> anyhow::Result<Arc<dyn DirectoryStore>> {
    match &config.database_url {
        Some(url) => {
            let store = warden_infra::PostgresDirectoryStore::connect(url)
                .await
                .context("failed to connect directory store")?;
            info!("using postgres directory store");
            Ok(Arc::new(store))
        }
        None => Ok(Arc::new(InMemoryDirectoryStore::new())),
    }
}

#[cfg(not(feature = "postgres"))]
async fn build_store(config: &ApiConfig) -> anyhow::Result<Arc<dyn DirectoryStore>> {
    if config.database_url.is_some() {
        tracing::warn!("DATABASE_URL set but built without the postgres feature; using in-memory store");
    }
    Ok(Arc::new(InMemoryDirectoryStore::new()))
}
