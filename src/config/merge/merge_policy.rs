//! Merge rules: defaults, override order, conflict handling.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("indent", crate::config::default_indent())?
        .set_default(
            "large_deletion_threshold",
            crate::config::default_large_deletion_threshold() as i64,
        )?
        .set_default("import.unsupported_placeholders", true)
}
