//! CLI input validation functions.
//!
//! These validators are used by clap's `value_parser` attribute to validate
//! user input at parse time, providing immediate feedback for invalid values.

use crate::validation::fields;

/// Validate a catalog directory setting.
///
/// Delegates to `commands::init` so `init` and the config file share the
/// same rules.
pub fn validate_catalog_dir(s: &str) -> Result<String, String> {
    use crate::commands::init;

    let trimmed = s.trim();
    init::validate_relative_dir(trimmed)?;
    Ok(trimmed.to_string())
}

/// Validate a CSV name argument.
///
/// CSV names are Kubernetes object names, e.g. `etcdoperator.v0.9.4`.
pub fn validate_csv_name(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    fields::validate_object_name("csv", trimmed).map_err(|issue| issue.message)?;
    Ok(trimmed.to_string())
}

/// Validate a channel name argument.
pub fn validate_channel_name(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    fields::validate_channel_name(trimmed).map_err(|issue| issue.message)?;
    Ok(trimmed.to_string())
}

/// Validate a catalog search query.
pub fn validate_query(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err("Search query cannot be empty".to_string());
    }
    Ok(trimmed.to_string())
}
