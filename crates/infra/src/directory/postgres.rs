//! Postgres-backed directory store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Conflict` (message chosen by constraint name) |
//! | Database (foreign key violation) | `23503` | `Invalid` (unknown role) |
//! | Database (check constraint violation) | `23514` | `Invalid` |
//! | Anything else | - | `Unavailable` |
//!
//! Grants are stored as JSONB columns. `update` is one `UPDATE` statement using
//! `COALESCE` per column, so absent patch fields are never written.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tracing::instrument;

use warden_auth::{AccessGrants, Principal, PrincipalPatch, Role, RoleRecord};
use warden_core::PrincipalId;

use super::DirectoryStore;
use crate::error::StoreError;

/// Schema applied by [`PostgresDirectoryStore::migrate`].
pub const SCHEMA: &str = include_str!("../../migrations/0001_directory.sql");

// Constraint names declared in the migration.
const PRINCIPAL_PKEY_CONSTRAINT: &str = "principals_pkey";
const EMAIL_UNIQUE_CONSTRAINT: &str = "principals_email_key";

const PRINCIPAL_COLUMNS: &str = r#"
    id, email, display_name, active, role, menus, sub_menus, components,
    needs_password_reset, reset_requested_at, created_at, updated_at
"#;

#[derive(Debug, Clone)]
pub struct PostgresDirectoryStore {
    pool: Arc<PgPool>,
}

impl PostgresDirectoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect and apply the schema.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }
}

#[async_trait]
impl DirectoryStore for PostgresDirectoryStore {
    #[instrument(skip(self), err)]
    async fn list(&self) -> Result<Vec<Principal>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {PRINCIPAL_COLUMNS} FROM principals ORDER BY email ASC"
        ))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list", e))?;

        rows.iter().map(principal_from_row).collect()
    }

    #[instrument(skip(self), fields(principal_id = %id), err)]
    async fn get(&self, id: PrincipalId) -> Result<Option<Principal>, StoreError> {
        let row = sqlx::query(&format!("SELECT {PRINCIPAL_COLUMNS} FROM principals WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get", e))?;

        row.as_ref().map(principal_from_row).transpose()
    }

    #[instrument(skip(self, email), err)]
    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {PRINCIPAL_COLUMNS} FROM principals WHERE email = $1"
        ))
        .bind(email.trim().to_lowercase())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_by_email", e))?;

        row.as_ref().map(principal_from_row).transpose()
    }

    #[instrument(skip(self, principal), fields(principal_id = %principal.id), err)]
    async fn insert(&self, principal: Principal) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO principals (
                id, email, display_name, active, role, menus, sub_menus, components,
                needs_password_reset, reset_requested_at, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(principal.id.as_uuid())
        .bind(&principal.email)
        .bind(&principal.display_name)
        .bind(principal.active)
        .bind(principal.role.as_str())
        .bind(Json(&principal.grants.menus))
        .bind(Json(&principal.grants.sub_menus))
        .bind(Json(&principal.grants.components))
        .bind(principal.needs_password_reset)
        .bind(principal.reset_requested_at)
        .bind(principal.created_at)
        .bind(principal.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert", e))?;
        Ok(())
    }

    #[instrument(skip(self, patch), fields(principal_id = %id), err)]
    async fn update(&self, id: PrincipalId, patch: PrincipalPatch) -> Result<Principal, StoreError> {
        patch
            .validate()
            .map_err(|e| StoreError::Invalid(e.to_string()))?;

        let display_name = patch.display_name.as_ref().map(|n| n.trim().to_string());
        let (clear_requested, requested_at) = match patch.reset_requested_at {
            Some(value) => (true, value),
            None => (false, None),
        };

        let row = sqlx::query(&format!(
            r#"
            UPDATE principals SET
                display_name         = COALESCE($2, display_name),
                role                 = COALESCE($3, role),
                menus                = COALESCE($4::jsonb, menus),
                sub_menus            = COALESCE($5::jsonb, sub_menus),
                components           = COALESCE($6::jsonb, components),
                active               = COALESCE($7, active),
                needs_password_reset = COALESCE($8, needs_password_reset),
                reset_requested_at   = CASE WHEN $9::boolean THEN $10::timestamptz ELSE reset_requested_at END,
                updated_at           = $11
            WHERE id = $1
            RETURNING {PRINCIPAL_COLUMNS}
            "#
        ))
        .bind(id.as_uuid())
        .bind(display_name)
        .bind(patch.role.as_ref().map(|r| r.as_str().to_string()))
        .bind(patch.menus.as_ref().map(Json))
        .bind(patch.sub_menus.as_ref().map(Json))
        .bind(patch.components.as_ref().map(Json))
        .bind(patch.active)
        .bind(patch.needs_password_reset)
        .bind(clear_requested)
        .bind(requested_at)
        .bind(Utc::now())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update", e))?;

        match row {
            Some(row) => principal_from_row(&row),
            None => Err(StoreError::NotFound),
        }
    }

    #[instrument(skip(self), fields(principal_id = %id), err)]
    async fn delete(&self, id: PrincipalId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM principals WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn roles(&self) -> Result<Vec<RoleRecord>, StoreError> {
        let rows = sqlx::query("SELECT name, description FROM roles ORDER BY name ASC")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("roles", e))?;

        rows.iter().map(role_from_row).collect()
    }

    #[instrument(skip(self), fields(role = %name), err)]
    async fn role(&self, name: &Role) -> Result<Option<RoleRecord>, StoreError> {
        let row = sqlx::query("SELECT name, description FROM roles WHERE name = $1")
            .bind(name.as_str())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("role", e))?;

        row.as_ref().map(role_from_row).transpose()
    }
}

fn principal_from_row(row: &PgRow) -> Result<Principal, StoreError> {
    let get_err = |e: sqlx::Error| map_sqlx_error("decode principal", e);

    let id: uuid::Uuid = row.try_get("id").map_err(get_err)?;
    let role: String = row.try_get("role").map_err(get_err)?;
    let menus: Json<BTreeSet<String>> = row.try_get("menus").map_err(get_err)?;
    let sub_menus: Json<BTreeMap<String, BTreeSet<String>>> =
        row.try_get("sub_menus").map_err(get_err)?;
    let components: Json<BTreeSet<String>> = row.try_get("components").map_err(get_err)?;
    let reset_requested_at: Option<DateTime<Utc>> =
        row.try_get("reset_requested_at").map_err(get_err)?;

    Ok(Principal {
        id: PrincipalId::from_uuid(id),
        email: row.try_get("email").map_err(get_err)?,
        display_name: row.try_get("display_name").map_err(get_err)?,
        active: row.try_get("active").map_err(get_err)?,
        role: Role::new(role),
        grants: AccessGrants {
            menus: menus.0,
            sub_menus: sub_menus.0,
            components: components.0,
        },
        needs_password_reset: row.try_get("needs_password_reset").map_err(get_err)?,
        reset_requested_at,
        created_at: row.try_get("created_at").map_err(get_err)?,
        updated_at: row.try_get("updated_at").map_err(get_err)?,
    })
}

fn role_from_row(row: &PgRow) -> Result<RoleRecord, StoreError> {
    let name: String = row
        .try_get("name")
        .map_err(|e| map_sqlx_error("decode role", e))?;
    let description: String = row
        .try_get("description")
        .map_err(|e| map_sqlx_error("decode role", e))?;
    Ok(RoleRecord::new(Role::new(name), description))
}

fn conflict_message(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some(EMAIL_UNIQUE_CONSTRAINT) => "email already registered",
        Some(PRINCIPAL_PKEY_CONSTRAINT) => "principal id already exists",
        _ => "record already exists",
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Conflict(conflict_message(db_err.constraint()).into()),
                Some("23503") | Some("23514") => StoreError::Invalid(msg),
                _ => StoreError::Unavailable(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Unavailable(format!("connection pool closed in {operation}"))
        }
        sqlx::Error::RowNotFound => StoreError::NotFound,
        _ => StoreError::Unavailable(format!("sqlx error in {operation}: {err}")),
    }
}
