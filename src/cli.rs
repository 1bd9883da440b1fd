//! CLI domain: parse, route, help and output only.
//! No editing logic of its own; the route table dispatches to the tree, emitter and importer.

mod help;
mod output;
mod parse;
mod route;

pub use help::command_name;
pub use output::map_error;
pub use parse::{Cli, Commands};
pub use route::RunContext;
