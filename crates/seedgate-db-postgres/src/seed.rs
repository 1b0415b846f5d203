//! Identity seeding: default tenant, user, Owner role and organization space.
//!
//! Mirrors what the target application expects to find after a first boot.
//! Every step is check-then-insert, and the whole batch runs inside one
//! transaction: either all missing rows land together or none do.

use chrono::Utc;
use sqlx_core::query::query;
use sqlx_core::query_scalar::query_scalar;
use sqlx_postgres::{PgPool, PgTransaction};
use tracing::{info, warn};
use uuid::Uuid;

use seedgate_config::IdentityConfig;

use crate::error::{is_undefined_table, PostgresError, Result};

/// Permissions granted to the seeded Owner role.
const OWNER_PERMISSIONS: [&str; 8] = [
    "admin",
    "assistants",
    "services",
    "collections",
    "insights",
    "AI",
    "editor",
    "websites",
];

/// What a seeding pass changed, per table.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedOutcome {
    pub tenant_created: bool,
    pub user_created: bool,
    pub role_created: bool,
    pub role_assigned: bool,
    pub space_created: bool,
}

impl SeedOutcome {
    /// True when every row already existed.
    pub fn is_noop(&self) -> bool {
        !(self.tenant_created
            || self.user_created
            || self.role_created
            || self.role_assigned
            || self.space_created)
    }
}

/// Seeds the default tenant and user inside a single transaction.
///
/// Returns `Ok(None)` without touching the database when the identity
/// configuration is incomplete; a partially configured identity counts as
/// "not requested".
///
/// The transaction commits only after every step succeeds; on any error it
/// rolls back on drop and no rows from this pass survive.
pub async fn seed_identity(
    pool: &PgPool,
    identity: &IdentityConfig,
) -> Result<Option<SeedOutcome>> {
    let (Some(tenant_name), Some(quota_limit), Some(user_name), Some(user_email), Some(password)) = (
        identity.tenant_name.as_deref(),
        identity.tenant_quota_limit,
        identity.user_name.as_deref(),
        identity.user_email.as_deref(),
        identity.user_password.as_deref(),
    ) else {
        warn!(
            "One or more identity settings are missing. \
             Skipping creation of default tenant and user"
        );
        return Ok(None);
    };

    let mut tx = pool.begin().await?;
    let mut outcome = SeedOutcome::default();

    let seeded = async {
        let tenant_id = ensure_tenant(&mut tx, tenant_name, quota_limit, &mut outcome).await?;
        let user_id = ensure_user(
            &mut tx,
            tenant_id,
            user_name,
            user_email,
            password,
            &mut outcome,
        )
        .await?;
        let role_id = ensure_owner_role(&mut tx, &mut outcome).await?;
        ensure_role_assignment(&mut tx, user_id, role_id, &mut outcome).await?;
        ensure_org_space(&mut tx, tenant_id, &mut outcome).await?;
        Ok::<(), PostgresError>(())
    }
    .await;

    match seeded {
        Ok(()) => {}
        Err(PostgresError::Connection(ref source)) if is_undefined_table(source) => {
            return Err(PostgresError::seed(
                "target schema is missing a required table; have migrations been applied?",
            ));
        }
        Err(error) => return Err(error),
    }

    tx.commit().await?;

    if outcome.is_noop() {
        info!(
            tenant = tenant_name,
            user = user_email,
            "Default tenant and user already present"
        );
    } else {
        info!(
            tenant = tenant_name,
            user = user_email,
            "Default tenant and user are set up"
        );
    }

    Ok(Some(outcome))
}

async fn ensure_tenant(
    tx: &mut PgTransaction<'_>,
    name: &str,
    quota_limit: i64,
    outcome: &mut SeedOutcome,
) -> Result<Uuid> {
    let existing: Option<Uuid> = query_scalar("SELECT id FROM tenants WHERE name = $1")
        .bind(name)
        .fetch_optional(&mut **tx)
        .await?;

    if let Some(id) = existing {
        info!(tenant = name, "Tenant already exists. Using existing tenant");
        return Ok(id);
    }

    let id: Uuid = query_scalar(
        "INSERT INTO tenants (name, quota_limit, state) VALUES ($1, $2, 'active') RETURNING id",
    )
    .bind(name)
    .bind(quota_limit)
    .fetch_one(&mut **tx)
    .await?;

    outcome.tenant_created = true;
    Ok(id)
}

async fn ensure_user(
    tx: &mut PgTransaction<'_>,
    tenant_id: Uuid,
    name: &str,
    email: &str,
    password: &str,
    outcome: &mut SeedOutcome,
) -> Result<Uuid> {
    let existing: Option<Uuid> =
        query_scalar("SELECT id FROM users WHERE email = $1 AND tenant_id = $2")
            .bind(email)
            .bind(tenant_id)
            .fetch_optional(&mut **tx)
            .await?;

    if let Some(id) = existing {
        info!(user = email, "User already exists. Using existing user");
        return Ok(id);
    }

    let (salt, hashed) = salt_and_hash(password)?;
    let id: Uuid = query_scalar(
        "INSERT INTO users (username, email, password, salt, tenant_id, used_tokens, state) \
         VALUES ($1, $2, $3, $4, $5, 0, 'active') RETURNING id",
    )
    .bind(name)
    .bind(email)
    .bind(hashed)
    .bind(salt)
    .bind(tenant_id)
    .fetch_one(&mut **tx)
    .await?;

    outcome.user_created = true;
    Ok(id)
}

async fn ensure_owner_role(tx: &mut PgTransaction<'_>, outcome: &mut SeedOutcome) -> Result<Uuid> {
    let existing: Option<Uuid> = query_scalar("SELECT id FROM predefined_roles WHERE name = $1")
        .bind("Owner")
        .fetch_optional(&mut **tx)
        .await?;

    if let Some(id) = existing {
        return Ok(id);
    }

    let permissions: Vec<String> = OWNER_PERMISSIONS.iter().map(ToString::to_string).collect();
    let id: Uuid = query_scalar(
        "INSERT INTO predefined_roles (name, permissions) VALUES ($1, $2) RETURNING id",
    )
    .bind("Owner")
    .bind(permissions)
    .fetch_one(&mut **tx)
    .await?;

    outcome.role_created = true;
    Ok(id)
}

async fn ensure_role_assignment(
    tx: &mut PgTransaction<'_>,
    user_id: Uuid,
    role_id: Uuid,
    outcome: &mut SeedOutcome,
) -> Result<()> {
    let existing: Option<i32> = query_scalar(
        "SELECT 1 FROM users_predefined_roles WHERE user_id = $1 AND predefined_role_id = $2",
    )
    .bind(user_id)
    .bind(role_id)
    .fetch_optional(&mut **tx)
    .await?;

    if existing.is_some() {
        return Ok(());
    }

    query("INSERT INTO users_predefined_roles (user_id, predefined_role_id) VALUES ($1, $2)")
        .bind(user_id)
        .bind(role_id)
        .execute(&mut **tx)
        .await?;

    outcome.role_assigned = true;
    Ok(())
}

/// One organization-wide space per tenant, identified by `user_id IS NULL`
/// and `tenant_space_id IS NULL`.
async fn ensure_org_space(
    tx: &mut PgTransaction<'_>,
    tenant_id: Uuid,
    outcome: &mut SeedOutcome,
) -> Result<()> {
    let existing: Option<Uuid> = query_scalar(
        "SELECT id FROM spaces \
         WHERE tenant_id = $1 AND user_id IS NULL AND tenant_space_id IS NULL",
    )
    .bind(tenant_id)
    .fetch_optional(&mut **tx)
    .await?;

    if existing.is_some() {
        return Ok(());
    }

    let now = Utc::now();
    query(
        "INSERT INTO spaces \
         (id, name, description, tenant_id, user_id, tenant_space_id, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, NULL, NULL, $5, $5)",
    )
    .bind(Uuid::new_v4())
    .bind("Organization space")
    .bind("Shared knowledge for the whole tenant")
    .bind(tenant_id)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    outcome.space_created = true;
    Ok(())
}

/// Generates a bcrypt salt and hash, both in the `$2b$12$...` form the
/// target application stores and verifies.
fn salt_and_hash(password: &str) -> Result<(String, String)> {
    let parts = bcrypt::hash_with_result(password, bcrypt::DEFAULT_COST)
        .map_err(|e| PostgresError::seed(format!("Failed to hash password: {e}")))?;
    let hashed = parts.format_for_version(bcrypt::Version::TwoB);
    let salt = format!("$2b${:02}${}", bcrypt::DEFAULT_COST, parts.get_salt());
    Ok((salt, hashed))
}
