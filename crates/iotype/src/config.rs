// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime configuration.
//!
//! A single process-wide [`RuntimeConfig`] is held in an `ArcSwap`, so reads
//! are an atomic load and replacing it never blocks readers.
//!
//! Only construction-time checks are configurable. Validation of values and
//! state objects during serialization always runs.
//!
//! # Example
//!
//! ```
//! use iotype::config::{self, RuntimeConfig};
//!
//! config::install(RuntimeConfig {
//!     assertions: true,
//!     ..RuntimeConfig::default()
//! });
//! assert!(config::current().assertions);
//! ```

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};

/// Environment variable overriding [`RuntimeConfig::assertions`].
pub const ASSERTIONS_ENV: &str = "IOTYPE_ASSERTIONS";

/// Suffix every type name must end with (before any `<` or `(`).
pub const TYPE_NAME_SUFFIX: &str = "IO";

/// Name of the root descriptor.
pub const ROOT_TYPE_NAME: &str = "ObjectIO";

/// Process-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Run development-mode checks when descriptors are built.
    #[serde(default = "default_assertions")]
    pub assertions: bool,

    /// Emit a trace line on every parametric cache hit.
    #[serde(default)]
    pub log_cache_hits: bool,
}

fn default_assertions() -> bool {
    cfg!(debug_assertions)
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            assertions: default_assertions(),
            log_cache_hits: false,
        }
    }
}

impl RuntimeConfig {
    /// Defaults, with [`ASSERTIONS_ENV`] applied when set to a recognized value.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var(ASSERTIONS_ENV) {
            match parse_flag(&raw) {
                Some(flag) => config.assertions = flag,
                None => log::warn!("[iotype] ignoring {}={:?}", ASSERTIONS_ENV, raw),
            }
        }
        config
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

fn slot() -> &'static ArcSwap<RuntimeConfig> {
    static CONFIG: OnceLock<ArcSwap<RuntimeConfig>> = OnceLock::new();
    CONFIG.get_or_init(|| ArcSwap::from_pointee(RuntimeConfig::from_env()))
}

/// Current configuration.
pub fn current() -> Arc<RuntimeConfig> {
    slot().load_full()
}

/// Replace the process-wide configuration.
pub fn install(config: RuntimeConfig) {
    slot().store(Arc::new(config));
}

/// Shorthand for `current().assertions`.
pub fn assertions_enabled() -> bool {
    slot().load().assertions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_flag_accepts_common_spellings() {
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag(" TRUE "), Some(true));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config: RuntimeConfig = serde_json::from_str("{}").expect("parse");
        assert_eq!(config, RuntimeConfig::default());

        let config: RuntimeConfig =
            serde_json::from_str(r#"{"assertions": false, "log_cache_hits": true}"#)
                .expect("parse");
        assert!(!config.assertions);
        assert!(config.log_cache_hits);
    }
}
