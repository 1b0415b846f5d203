//! Database gate followed by identity seeding.

use anyhow::{bail, Context, Result};

use seedgate_config::AppConfig;
use seedgate_core::ReadinessGate;
use seedgate_db_postgres::{create_pool, seed_identity, PgProbe};

use crate::output::print_success;

pub async fn execute(config: &AppConfig) -> Result<()> {
    let Some(database) = config.database.as_ref() else {
        bail!("seed-db requires a [database] section in the configuration");
    };

    let gate = ReadinessGate::new(database.wait_policy());
    gate.wait(&PgProbe::new(database))
        .await
        .context("database never became ready")?;

    let pool = create_pool(database)
        .await
        .context("creating connection pool")?;

    match seed_identity(&pool, &database.identity).await? {
        Some(outcome) if outcome.is_noop() => {
            print_success("Identity already seeded; nothing to do");
        }
        Some(_) => print_success("Default tenant and user are set up"),
        None => print_success("Identity seeding skipped (settings incomplete)"),
    }
    Ok(())
}
