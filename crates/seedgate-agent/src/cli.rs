use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "seedgate")]
#[command(about = "Readiness-gated bootstrap agent — wait, reconcile, seed, idle")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (TOML)
    #[arg(short, long, global = true, env = "SEEDGATE_CONFIG")]
    pub config: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Wait for the API, run startup actions, reconcile resources, then idle
    Run(RunArgs),
    /// Wait for the API health endpoint, then exit
    Wait,
    /// Wait for PostgreSQL, then seed the default tenant and user
    SeedDb,
    /// Show what a run would change without applying anything
    Plan,
}

#[derive(clap::Args)]
pub struct RunArgs {
    /// Exit after reconciliation instead of idling
    #[arg(long)]
    pub oneshot: bool,
}
