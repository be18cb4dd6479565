//! Runtime configuration for the command-line front end.
//!
//! Every value has a built-in default and can be overridden through an
//! environment variable.

use std::path::PathBuf;

use anyhow::Context;
use ban_chess::RuleConfig;

/// Log filter used when neither `BANCHESS_LOG` nor `RUST_LOG` is set.
const DEFAULT_LOG_FILTER: &str = "warn";

/// Get the tracing filter directive.
///
/// Priority:
/// 1. `BANCHESS_LOG` env variable if set
/// 2. `RUST_LOG` env variable if set
/// 3. `warn` as fallback
pub fn get_log_filter() -> String {
    if let Ok(filter) = std::env::var("BANCHESS_LOG") {
        return filter;
    }
    if let Ok(filter) = std::env::var("RUST_LOG") {
        return filter;
    }

    DEFAULT_LOG_FILTER.to_string()
}

/// Get the path of a JSON rule file, if one is configured via
/// `BANCHESS_RULES`.
pub fn get_rules_path() -> Option<PathBuf> {
    std::env::var("BANCHESS_RULES").ok().map(PathBuf::from)
}

/// Load the rule configuration.
///
/// Priority:
/// 1. The JSON file named by `BANCHESS_RULES`, missing keys taking defaults
/// 2. `RuleConfig::default()` (every automatic draw rule enabled)
pub fn load_rules() -> anyhow::Result<RuleConfig> {
    match get_rules_path() {
        Some(path) => load_rules_from(&path),
        None => Ok(RuleConfig::default()),
    }
}

pub fn load_rules_from(path: &std::path::Path) -> anyhow::Result<RuleConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read rules from {}", path.display()))?;
    RuleConfig::from_json(&text)
        .with_context(|| format!("invalid rules in {}", path.display()))
}
