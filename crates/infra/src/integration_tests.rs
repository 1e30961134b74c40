//! Service-level tests over the in-memory backends.
//!
//! Verifies:
//! - Account creation lands in `ResetRequired` and compensates on failure
//! - Reset tokens are single-use, expire, and never mutate state when rejected
//! - A credential change whose flag update fails surfaces `InconsistentState`
//! - Delete ordering and partial-failure reporting

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::Duration;

    use warden_auth::{
        CredentialState, PasswordPolicy, PasswordRule, PolicyTable, Principal, PrincipalPatch,
        Role, RoleRecord,
    };
    use warden_core::PrincipalId;

    use crate::accounts::{AccountDirectory, NewAccount};
    use crate::directory::{DirectoryStore, InMemoryDirectoryStore};
    use crate::error::{ProviderError, ServiceError, StoreError};
    use crate::identity::{IdentityConfig, IdentityProvider, InMemoryIdentityProvider};
    use crate::lifecycle::CredentialLifecycle;

    const RETURN_URL: &str = "https://app.example.com/reset-password";
    const PASSWORD: &str = "Initial#Pass9";
    const NEW_PASSWORD: &str = "Brand#New9pw";

    fn outage() -> StoreError {
        StoreError::Unavailable("injected".into())
    }

    #[derive(Default)]
    struct FlakyStore {
        inner: InMemoryDirectoryStore,
        fail_insert: AtomicBool,
        fail_update: AtomicBool,
        fail_delete: AtomicBool,
        // Simulates an admin forcing a reset right after a lookup returns.
        force_reset_after_get: AtomicBool,
    }

    #[async_trait]
    impl DirectoryStore for FlakyStore {
        async fn list(&self) -> Result<Vec<Principal>, StoreError> {
            self.inner.list().await
        }

        async fn get(&self, id: PrincipalId) -> Result<Option<Principal>, StoreError> {
            let found = self.inner.get(id).await?;
            if found.is_some() && self.force_reset_after_get.swap(false, Ordering::SeqCst) {
                let force = PrincipalPatch {
                    needs_password_reset: Some(true),
                    ..Default::default()
                };
                self.inner.update(id, force).await?;
            }
            Ok(found)
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, StoreError> {
            self.inner.find_by_email(email).await
        }

        async fn insert(&self, principal: Principal) -> Result<(), StoreError> {
            if self.fail_insert.load(Ordering::SeqCst) {
                return Err(outage());
            }
            self.inner.insert(principal).await
        }

        async fn update(
            &self,
            id: PrincipalId,
            patch: PrincipalPatch,
        ) -> Result<Principal, StoreError> {
            if self.fail_update.load(Ordering::SeqCst) {
                return Err(outage());
            }
            self.inner.update(id, patch).await
        }

        async fn delete(&self, id: PrincipalId) -> Result<(), StoreError> {
            if self.fail_delete.load(Ordering::SeqCst) {
                return Err(outage());
            }
            self.inner.delete(id).await
        }

        async fn roles(&self) -> Result<Vec<RoleRecord>, StoreError> {
            self.inner.roles().await
        }

        async fn role(&self, name: &Role) -> Result<Option<RoleRecord>, StoreError> {
            self.inner.role(name).await
        }
    }

    struct FlakyProvider {
        inner: InMemoryIdentityProvider,
        fail_deprovision: AtomicBool,
        provisioned_passwords: Mutex<Vec<String>>,
    }

    impl FlakyProvider {
        fn provisioned_passwords(&self) -> Vec<String> {
            self.provisioned_passwords.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl IdentityProvider for FlakyProvider {
        async fn authenticate(&self, credential: &str) -> Result<PrincipalId, ProviderError> {
            self.inner.authenticate(credential).await
        }

        async fn sign_in(&self, email: &str, password: &str) -> Result<String, ProviderError> {
            self.inner.sign_in(email, password).await
        }

        async fn sign_out(&self, credential: &str) -> Result<(), ProviderError> {
            self.inner.sign_out(credential).await
        }

        async fn set_credential(
            &self,
            id: PrincipalId,
            new_password: &str,
        ) -> Result<(), ProviderError> {
            self.inner.set_credential(id, new_password).await
        }

        async fn issue_reset_token(
            &self,
            email: &str,
            return_url: &str,
        ) -> Result<(), ProviderError> {
            self.inner.issue_reset_token(email, return_url).await
        }

        async fn redeem_reset_token(
            &self,
            token: &str,
            new_password: &str,
        ) -> Result<PrincipalId, ProviderError> {
            self.inner.redeem_reset_token(token, new_password).await
        }

        async fn provision_identity(
            &self,
            email: &str,
            password: &str,
        ) -> Result<PrincipalId, ProviderError> {
            self.provisioned_passwords
                .lock()
                .unwrap()
                .push(password.to_string());
            self.inner.provision_identity(email, password).await
        }

        async fn deprovision_identity(&self, id: PrincipalId) -> Result<(), ProviderError> {
            if self.fail_deprovision.load(Ordering::SeqCst) {
                return Err(ProviderError::Unavailable("injected".into()));
            }
            self.inner.deprovision_identity(id).await
        }
    }

    struct Harness {
        provider: Arc<FlakyProvider>,
        store: Arc<FlakyStore>,
        lifecycle: CredentialLifecycle,
        accounts: AccountDirectory,
    }

    impl Harness {
        fn new() -> Self {
            Self::with_config(IdentityConfig::default())
        }

        fn with_config(config: IdentityConfig) -> Self {
            let provider = Arc::new(FlakyProvider {
                inner: InMemoryIdentityProvider::new(config).unwrap(),
                fail_deprovision: AtomicBool::new(false),
                provisioned_passwords: Mutex::new(Vec::new()),
            });
            let store = Arc::new(FlakyStore::default());
            let lifecycle = CredentialLifecycle::new(
                provider.clone(),
                store.clone(),
                PasswordPolicy::default(),
            );
            let accounts =
                AccountDirectory::new(provider.clone(), store.clone(), lifecycle.clone(), RETURN_URL);
            Self {
                provider,
                store,
                lifecycle,
                accounts,
            }
        }

        async fn create(&self, email: &str, role: Role) -> Principal {
            self.accounts
                .create(NewAccount {
                    email: email.into(),
                    display_name: "Test User".into(),
                    role,
                    initial_password: Some(PASSWORD.into()),
                    grants: Default::default(),
                })
                .await
                .unwrap()
        }

        async fn stored(&self, id: PrincipalId) -> Principal {
            self.store.get(id).await.unwrap().unwrap()
        }

        fn latest_token(&self, email: &str) -> String {
            self.provider.inner.latest_reset_token(email).unwrap()
        }

        fn sent(&self) -> usize {
            self.provider.inner.outbox().len()
        }

        async fn can_sign_in(&self, email: &str, password: &str) -> bool {
            self.provider.sign_in(email, password).await.is_ok()
        }
    }

    // --- account creation ---

    #[tokio::test]
    async fn created_account_requires_reset_and_gets_a_link() {
        let h = Harness::new();
        let created = h
            .accounts
            .create(NewAccount {
                email: "New.User@Example.com".into(),
                display_name: "New User".into(),
                role: Role::MEMBER,
                initial_password: None,
                grants: Default::default(),
            })
            .await
            .unwrap();

        assert_eq!(created.email, "new.user@example.com");
        assert_eq!(created.credential_state(), CredentialState::ResetRequired);
        assert_eq!(h.stored(created.id).await, created);

        let sent = h.provider.inner.outbox();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].email, "new.user@example.com");
        assert!(sent[0].link.starts_with(RETURN_URL));
    }

    #[tokio::test]
    async fn generated_temporary_passwords_satisfy_the_policy() {
        let h = Harness::new();
        for i in 0..40 {
            h.accounts
                .create(NewAccount {
                    email: format!("temp{i}@example.com"),
                    display_name: "Temp User".into(),
                    role: Role::VIEWER,
                    initial_password: None,
                    grants: Default::default(),
                })
                .await
                .unwrap();
        }

        let passwords = h.provider.provisioned_passwords();
        assert_eq!(passwords.len(), 40);
        for password in &passwords {
            let result = warden_auth::evaluate(password);
            assert!(result.valid, "{password} -> {:?}", result.violations);
        }
    }

    #[tokio::test]
    async fn weak_initial_password_rejected_before_provisioning() {
        let h = Harness::new();
        let err = h
            .accounts
            .create(NewAccount {
                email: "weak@example.com".into(),
                display_name: "Weak".into(),
                role: Role::VIEWER,
                initial_password: Some("abc12345".into()),
                grants: Default::default(),
            })
            .await
            .unwrap_err();

        let result = match err {
            ServiceError::PolicyViolation(result) => result,
            other => panic!("expected policy violation, got {other:?}"),
        };
        assert!(!result.valid);
        assert!(!h.can_sign_in("weak@example.com", "abc12345").await);
        assert!(h.store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_role_is_a_validation_error() {
        let h = Harness::new();
        let err = h
            .accounts
            .create(NewAccount {
                email: "x@example.com".into(),
                display_name: "X".into(),
                role: Role::new("auditor"),
                initial_password: None,
                grants: Default::default(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(h.sent(), 0);
    }

    #[tokio::test]
    async fn duplicate_email_is_a_validation_error() {
        let h = Harness::new();
        h.create("dup@example.com", Role::MEMBER).await;
        let err = h
            .accounts
            .create(NewAccount {
                email: "DUP@example.com".into(),
                display_name: "Dup".into(),
                role: Role::MEMBER,
                initial_password: None,
                grants: Default::default(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn failed_insert_deprovisions_identity() {
        let h = Harness::new();
        h.store.fail_insert.store(true, Ordering::SeqCst);

        let err = h
            .accounts
            .create(NewAccount {
                email: "rollback@example.com".into(),
                display_name: "Rollback".into(),
                role: Role::MEMBER,
                initial_password: Some(PASSWORD.into()),
                grants: Default::default(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Store(_)));
        assert!(!h.can_sign_in("rollback@example.com", PASSWORD).await);
        assert_eq!(h.sent(), 0);
    }

    #[tokio::test]
    async fn failed_compensation_is_inconsistent_state() {
        let h = Harness::new();
        h.store.fail_insert.store(true, Ordering::SeqCst);
        h.provider.fail_deprovision.store(true, Ordering::SeqCst);

        let err = h
            .accounts
            .create(NewAccount {
                email: "orphan@example.com".into(),
                display_name: "Orphan".into(),
                role: Role::MEMBER,
                initial_password: Some(PASSWORD.into()),
                grants: Default::default(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::InconsistentState(_)));
    }

    #[tokio::test]
    async fn viewer_without_grants_reaches_dashboard_but_not_users() {
        let h = Harness::new();
        let viewer = h.create("viewer@example.com", Role::VIEWER).await;
        let table = PolicyTable::standard();

        assert!(table.can_access(Some(&viewer), "dashboard", "access"));
        assert!(!table.can_access(Some(&viewer), "users", "read"));
    }

    // --- self-service reset ---

    #[tokio::test]
    async fn reset_request_for_unknown_or_inactive_email_is_silent() {
        let h = Harness::new();
        let p = h.create("idle@example.com", Role::VIEWER).await;
        let before = h.sent();

        h.accounts
            .update(
                p.id,
                PrincipalPatch {
                    active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        h.lifecycle.request_reset("ghost@example.com", RETURN_URL).await.unwrap();
        h.lifecycle.request_reset("idle@example.com", RETURN_URL).await.unwrap();
        h.lifecycle.request_reset("not-an-email", RETURN_URL).await.unwrap();
        assert_eq!(h.sent(), before);
    }

    #[tokio::test]
    async fn reset_request_marks_normal_principal_pending() {
        let h = Harness::new();
        let p = h.create("pending@example.com", Role::MEMBER).await;
        h.lifecycle.change_password(p.id, NEW_PASSWORD, None).await.unwrap();
        assert_eq!(h.stored(p.id).await.credential_state(), CredentialState::Normal);

        h.lifecycle.request_reset("pending@example.com", RETURN_URL).await.unwrap();

        let stored = h.stored(p.id).await;
        assert_eq!(stored.credential_state(), CredentialState::ResetPending);
        // The existing password keeps working while a reset is pending.
        assert!(h.can_sign_in("pending@example.com", NEW_PASSWORD).await);
    }

    #[tokio::test]
    async fn reset_request_does_not_downgrade_forced_reset() {
        let h = Harness::new();
        let p = h.create("forced@example.com", Role::MEMBER).await;

        h.lifecycle.request_reset("forced@example.com", RETURN_URL).await.unwrap();

        let stored = h.stored(p.id).await;
        assert_eq!(stored.credential_state(), CredentialState::ResetRequired);
        assert!(stored.reset_requested_at.is_none());
    }

    #[tokio::test]
    async fn redeeming_a_token_clears_flags_and_sets_password() {
        let h = Harness::new();
        let p = h.create("redeem@example.com", Role::MEMBER).await;
        let token = h.latest_token("redeem@example.com");

        let id = h
            .lifecycle
            .redeem_reset(&token, NEW_PASSWORD, Some(NEW_PASSWORD))
            .await
            .unwrap();

        assert_eq!(id, p.id);
        assert_eq!(h.stored(p.id).await.credential_state(), CredentialState::Normal);
        assert!(h.can_sign_in("redeem@example.com", NEW_PASSWORD).await);
        assert!(!h.can_sign_in("redeem@example.com", PASSWORD).await);

        let again = h.lifecycle.redeem_reset(&token, "Another#New9", None).await;
        assert_eq!(again, Err(ServiceError::InvalidOrExpiredToken));
    }

    #[tokio::test]
    async fn invalid_token_never_mutates_state() {
        let h = Harness::new();
        let p = h.create("intact@example.com", Role::MEMBER).await;
        let before = h.stored(p.id).await;

        for token in ["", "no-such-token"] {
            let err = h.lifecycle.redeem_reset(token, NEW_PASSWORD, None).await;
            assert_eq!(err, Err(ServiceError::InvalidOrExpiredToken));
        }

        assert_eq!(h.stored(p.id).await, before);
        assert!(h.can_sign_in("intact@example.com", PASSWORD).await);
    }

    #[tokio::test]
    async fn expired_token_never_mutates_state() {
        let h = Harness::with_config(IdentityConfig {
            reset_token_ttl: Duration::zero(),
            ..IdentityConfig::default()
        });
        let p = h.create("expired@example.com", Role::MEMBER).await;
        let before = h.stored(p.id).await;
        let token = h.latest_token("expired@example.com");

        let err = h.lifecycle.redeem_reset(&token, NEW_PASSWORD, None).await;
        assert_eq!(err, Err(ServiceError::InvalidOrExpiredToken));
        assert_eq!(h.stored(p.id).await, before);
        assert!(h.can_sign_in("expired@example.com", PASSWORD).await);
    }

    #[tokio::test]
    async fn local_checks_run_before_the_token_is_spent() {
        let h = Harness::new();
        h.create("checks@example.com", Role::MEMBER).await;
        let token = h.latest_token("checks@example.com");

        let mismatch = h
            .lifecycle
            .redeem_reset(&token, NEW_PASSWORD, Some("Different#9pw"))
            .await;
        assert_eq!(mismatch, Err(ServiceError::ConfirmationMismatch));

        let weak = h.lifecycle.redeem_reset(&token, "abc12345", None).await.unwrap_err();
        let result = match weak {
            ServiceError::PolicyViolation(result) => result,
            other => panic!("expected policy violation, got {other:?}"),
        };
        let policy = PasswordPolicy::default();
        assert_eq!(
            result.violations,
            vec![
                policy.message(PasswordRule::Uppercase),
                policy.message(PasswordRule::Symbol)
            ]
        );

        // Token is still good.
        assert!(h.lifecycle.redeem_reset(&token, NEW_PASSWORD, None).await.is_ok());
    }

    #[tokio::test]
    async fn redeem_with_failed_flag_update_is_inconsistent() {
        let h = Harness::new();
        let p = h.create("half@example.com", Role::MEMBER).await;
        let token = h.latest_token("half@example.com");
        h.store.fail_update.store(true, Ordering::SeqCst);

        let err = h.lifecycle.redeem_reset(&token, NEW_PASSWORD, None).await;
        assert!(matches!(err, Err(ServiceError::InconsistentState(_))));

        // Credential changed, flag did not.
        assert!(h.can_sign_in("half@example.com", NEW_PASSWORD).await);
        assert!(h.stored(p.id).await.needs_password_reset);
    }

    // --- authenticated password change ---

    #[tokio::test]
    async fn change_password_with_failed_flag_update_is_inconsistent() {
        let h = Harness::new();
        let p = h.create("change@example.com", Role::MEMBER).await;
        h.store.fail_update.store(true, Ordering::SeqCst);

        let err = h.lifecycle.change_password(p.id, NEW_PASSWORD, Some(NEW_PASSWORD)).await;
        assert!(matches!(err, Err(ServiceError::InconsistentState(_))));
        assert!(h.can_sign_in("change@example.com", NEW_PASSWORD).await);
    }

    #[tokio::test]
    async fn change_password_clears_a_reset_forced_mid_change() {
        let h = Harness::new();
        let p = h.create("race@example.com", Role::MEMBER).await;
        h.lifecycle.change_password(p.id, NEW_PASSWORD, None).await.unwrap();
        assert_eq!(h.stored(p.id).await.credential_state(), CredentialState::Normal);

        h.store.force_reset_after_get.store(true, Ordering::SeqCst);
        h.lifecycle.change_password(p.id, PASSWORD, None).await.unwrap();

        let stored = h.stored(p.id).await;
        assert_eq!(stored.credential_state(), CredentialState::Normal);
        assert!(h.can_sign_in("race@example.com", PASSWORD).await);
    }

    #[tokio::test]
    async fn change_password_for_unknown_principal_is_not_found() {
        let h = Harness::new();
        let err = h.lifecycle.change_password(PrincipalId::new(), NEW_PASSWORD, None).await;
        assert_eq!(err, Err(ServiceError::NotFound));
    }

    // --- admin updates ---

    #[tokio::test]
    async fn forcing_a_reset_sends_a_link_every_time() {
        let h = Harness::new();
        let p = h.create("force@example.com", Role::MEMBER).await;
        h.lifecycle.change_password(p.id, NEW_PASSWORD, None).await.unwrap();
        let before = h.sent();

        let force = PrincipalPatch {
            needs_password_reset: Some(true),
            ..Default::default()
        };
        let updated = h.accounts.update(p.id, force.clone()).await.unwrap();
        h.accounts.update(p.id, force).await.unwrap();

        assert_eq!(updated.credential_state(), CredentialState::ResetRequired);
        assert_eq!(h.sent(), before + 2);
    }

    #[tokio::test]
    async fn clearing_a_forced_reset_drops_the_pending_request_too() {
        let h = Harness::new();
        let p = h.create("clear@example.com", Role::MEMBER).await;
        h.lifecycle.change_password(p.id, NEW_PASSWORD, None).await.unwrap();
        h.lifecycle.request_reset("clear@example.com", RETURN_URL).await.unwrap();
        assert_eq!(h.stored(p.id).await.credential_state(), CredentialState::ResetPending);

        let forced = h
            .accounts
            .update(
                p.id,
                PrincipalPatch {
                    needs_password_reset: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(forced.credential_state(), CredentialState::ResetRequired);

        let cleared = h
            .accounts
            .update(
                p.id,
                PrincipalPatch {
                    needs_password_reset: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(cleared.credential_state(), CredentialState::Normal);
        assert!(cleared.reset_requested_at.is_none());
        assert_eq!(h.stored(p.id).await, cleared);
    }

    #[tokio::test]
    async fn forcing_a_reset_on_an_inactive_account_sends_nothing() {
        let h = Harness::new();
        let dormant = h.create("dormant@example.com", Role::MEMBER).await;
        let leaving = h.create("leaving@example.com", Role::MEMBER).await;
        h.accounts
            .update(
                dormant.id,
                PrincipalPatch {
                    active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let before = h.sent();

        let force = PrincipalPatch {
            needs_password_reset: Some(true),
            ..Default::default()
        };
        let updated = h.accounts.update(dormant.id, force).await.unwrap();
        assert_eq!(updated.credential_state(), CredentialState::ResetRequired);

        let force_and_deactivate = PrincipalPatch {
            needs_password_reset: Some(true),
            active: Some(false),
            ..Default::default()
        };
        let updated = h.accounts.update(leaving.id, force_and_deactivate).await.unwrap();
        assert!(!updated.active);

        assert_eq!(h.sent(), before);
    }

    #[tokio::test]
    async fn update_rejects_unknown_role_and_missing_principal() {
        let h = Harness::new();
        let p = h.create("upd@example.com", Role::MEMBER).await;

        let err = h
            .accounts
            .update(
                p.id,
                PrincipalPatch {
                    role: Some(Role::new("ghost")),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(err, Err(ServiceError::Validation(_))));

        let err = h.accounts.update(PrincipalId::new(), PrincipalPatch::default()).await;
        assert_eq!(err, Err(ServiceError::NotFound));
    }

    // --- delete ---

    #[tokio::test]
    async fn delete_removes_identity_and_row() {
        let h = Harness::new();
        let admin = h.create("admin@example.com", Role::ADMIN).await;
        let p = h.create("gone@example.com", Role::MEMBER).await;

        h.accounts.delete(admin.id, p.id).await.unwrap();

        assert_eq!(h.store.get(p.id).await.unwrap(), None);
        assert!(!h.can_sign_in("gone@example.com", PASSWORD).await);
    }

    #[tokio::test]
    async fn delete_guards_self_and_unknown_ids() {
        let h = Harness::new();
        let admin = h.create("admin@example.com", Role::ADMIN).await;

        assert!(matches!(
            h.accounts.delete(admin.id, admin.id).await,
            Err(ServiceError::Validation(_))
        ));
        assert_eq!(
            h.accounts.delete(admin.id, PrincipalId::new()).await,
            Err(ServiceError::NotFound)
        );
    }

    #[tokio::test]
    async fn provider_failure_on_delete_leaves_directory_untouched() {
        let h = Harness::new();
        let admin = h.create("admin@example.com", Role::ADMIN).await;
        let p = h.create("kept@example.com", Role::MEMBER).await;
        h.provider.fail_deprovision.store(true, Ordering::SeqCst);

        let err = h.accounts.delete(admin.id, p.id).await;
        assert!(matches!(err, Err(ServiceError::ProviderFailure(_))));
        assert!(h.store.get(p.id).await.unwrap().is_some());
        assert!(h.can_sign_in("kept@example.com", PASSWORD).await);
    }

    #[tokio::test]
    async fn store_failure_after_deprovision_is_inconsistent() {
        let h = Harness::new();
        let admin = h.create("admin@example.com", Role::ADMIN).await;
        let p = h.create("stuck@example.com", Role::MEMBER).await;
        h.store.fail_delete.store(true, Ordering::SeqCst);

        let err = h.accounts.delete(admin.id, p.id).await;
        assert!(matches!(err, Err(ServiceError::InconsistentState(_))));
    }

    #[tokio::test]
    async fn delete_tolerates_identity_already_gone() {
        let h = Harness::new();
        let admin = h.create("admin@example.com", Role::ADMIN).await;
        let p = h.create("half-gone@example.com", Role::MEMBER).await;
        h.provider.inner.deprovision_identity(p.id).await.unwrap();

        h.accounts.delete(admin.id, p.id).await.unwrap();
        assert_eq!(h.store.get(p.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn bootstrap_admin_is_idempotent_and_not_reset_required() {
        let h = Harness::new();
        let first = h
            .accounts
            .bootstrap_admin("root@example.com", "Root", PASSWORD)
            .await
            .unwrap();
        let second = h
            .accounts
            .bootstrap_admin("root@example.com", "Root", PASSWORD)
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert!(first.is_admin());
        assert_eq!(first.credential_state(), CredentialState::Normal);
        assert!(h.can_sign_in("root@example.com", PASSWORD).await);
    }
}
