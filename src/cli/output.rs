//! CLI output: error mapping from domain errors to the CLI surface.

use crate::error::ApiError;

/// Map domain errors to a string for CLI output.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::Snapshot(msg) => format!("Invalid input file: {}", msg),
        other => other.to_string(),
    }
}
