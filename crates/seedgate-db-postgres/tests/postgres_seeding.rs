//! Seeding tests against a live PostgreSQL server.
//!
//! Ignored by default. Point `SEEDGATE_TEST_DATABASE_URL` at a scratch
//! database and run:
//!
//! ```text
//! cargo test -p seedgate-db-postgres -- --ignored
//! ```

use std::time::Duration;

use sqlx_postgres::PgPool;
use uuid::Uuid;

use seedgate_config::{DatabaseConfig, IdentityConfig};
use seedgate_core::{ReadinessGate, RetryPolicy};
use seedgate_db_postgres::{create_pool, seed_identity, PgProbe};

fn test_config() -> DatabaseConfig {
    let url = std::env::var("SEEDGATE_TEST_DATABASE_URL")
        .expect("set SEEDGATE_TEST_DATABASE_URL to run the ignored database tests");
    DatabaseConfig {
        url: Some(url),
        ..DatabaseConfig::default()
    }
}

/// Pared-down copy of the tables the target application's migrations create.
async fn create_schema(pool: &PgPool) {
    let ddl = [
        "CREATE TABLE IF NOT EXISTS tenants (
             id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
             name TEXT NOT NULL,
             quota_limit BIGINT NOT NULL,
             state TEXT NOT NULL
         )",
        "CREATE TABLE IF NOT EXISTS users (
             id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
             username TEXT NOT NULL,
             email TEXT NOT NULL,
             password TEXT NOT NULL,
             salt TEXT NOT NULL,
             tenant_id UUID NOT NULL,
             used_tokens BIGINT NOT NULL,
             state TEXT NOT NULL
         )",
        "CREATE TABLE IF NOT EXISTS predefined_roles (
             id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
             name TEXT NOT NULL,
             permissions TEXT[] NOT NULL
         )",
        "CREATE TABLE IF NOT EXISTS users_predefined_roles (
             user_id UUID NOT NULL,
             predefined_role_id UUID NOT NULL
         )",
        "CREATE TABLE IF NOT EXISTS spaces (
             id UUID PRIMARY KEY,
             name TEXT NOT NULL,
             description TEXT,
             tenant_id UUID NOT NULL,
             user_id UUID,
             tenant_space_id UUID,
             created_at TIMESTAMPTZ NOT NULL,
             updated_at TIMESTAMPTZ NOT NULL
         )",
        "CREATE UNIQUE INDEX IF NOT EXISTS users_email_unique ON users (email)",
    ];
    for statement in ddl {
        sqlx_core::query::query(statement)
            .execute(pool)
            .await
            .unwrap();
    }
}

#[tokio::test]
#[ignore]
async fn seeds_once_then_converges() {
    let config = test_config();

    let gate = ReadinessGate::new(RetryPolicy::bounded(
        5,
        Duration::from_secs(1),
        Duration::from_secs(2),
    ));
    gate.wait(&PgProbe::new(&config)).await.unwrap();

    let pool = create_pool(&config).await.unwrap();
    create_schema(&pool).await;

    // Unique names keep reruns against the same database honest.
    let suffix = Uuid::new_v4();
    let identity = IdentityConfig {
        tenant_name: Some(format!("Tenant {suffix}")),
        tenant_quota_limit: Some(10_737_418_240),
        user_name: Some("admin".into()),
        user_email: Some(format!("admin+{suffix}@example.com")),
        user_password: Some("seedgate-test".into()),
    };

    let first = seed_identity(&pool, &identity).await.unwrap().unwrap();
    assert!(first.tenant_created);
    assert!(first.user_created);
    assert!(first.role_assigned);
    assert!(first.space_created);

    let second = seed_identity(&pool, &identity).await.unwrap().unwrap();
    assert!(second.is_noop());
}

#[tokio::test]
#[ignore]
async fn failed_user_insert_rolls_back_the_tenant() {
    let config = test_config();
    let pool = create_pool(&config).await.unwrap();
    create_schema(&pool).await;

    let suffix = Uuid::new_v4();
    let email = format!("admin+{suffix}@example.com");
    let first = IdentityConfig {
        tenant_name: Some(format!("Tenant {suffix}")),
        tenant_quota_limit: Some(10_737_418_240),
        user_name: Some("admin".into()),
        user_email: Some(email.clone()),
        user_password: Some("seedgate-test".into()),
    };
    seed_identity(&pool, &first).await.unwrap().unwrap();

    // Same email under a fresh tenant: the tenant insert succeeds, then the
    // user insert hits the unique email index and the transaction rolls back.
    let conflicting_tenant = format!("Tenant {suffix} (conflict)");
    let second = IdentityConfig {
        tenant_name: Some(conflicting_tenant.clone()),
        ..first
    };
    seed_identity(&pool, &second).await.unwrap_err();

    let leftover: Option<Uuid> =
        sqlx_core::query_scalar::query_scalar("SELECT id FROM tenants WHERE name = $1")
            .bind(&conflicting_tenant)
            .fetch_optional(&pool)
            .await
            .unwrap();
    assert_eq!(leftover, None);
}

#[tokio::test]
#[ignore]
async fn incomplete_identity_is_skipped() {
    let config = test_config();
    let pool = create_pool(&config).await.unwrap();

    let identity = IdentityConfig {
        tenant_name: Some("Tenant without user".into()),
        ..IdentityConfig::default()
    };

    assert_eq!(seed_identity(&pool, &identity).await.unwrap(), None);
}
