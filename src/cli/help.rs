//! CLI help: stable command names for logging.

use crate::cli::parse::Commands;

/// Command name string used in log records (e.g. "emit", "import").
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Emit { .. } => "emit",
        Commands::Import { .. } => "import",
        Commands::Check { .. } => "check",
        Commands::Config => "config",
    }
}
