pub mod cli;
pub mod commands;
pub mod observability;
pub mod output;
pub mod signals;

pub use cli::{Cli, Commands};
pub use observability::{apply_logging_level, init_tracing};
