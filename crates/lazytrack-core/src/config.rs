//! Per-thread engine configuration.
//!
//! Graphs are confined to one unit of work on one thread, so configuration
//! is installed per thread rather than process-wide.

use crate::error::ConfigLoadError;
use serde::{Deserialize, Serialize};
use std::cell::Cell;

thread_local! {
    static CURRENT: Cell<TrackConfig> = const { Cell::new(TrackConfig::DEFAULT) };
}

///
/// TrackConfig
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackConfig {
    /// Policy used when tracking is started without an explicit one.
    pub compare_old_value: bool,

    /// Route engine events to the observability sink.
    pub emit_events: bool,
}

impl TrackConfig {
    pub const DEFAULT: Self = Self {
        compare_old_value: false,
        emit_events: true,
    };

    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigLoadError> {
        Ok(toml::from_str(source)?)
    }
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Configuration in effect on this thread.
#[must_use]
pub fn current() -> TrackConfig {
    CURRENT.with(Cell::get)
}

/// Install `config` for this thread and return the one it replaces.
pub fn install(config: TrackConfig) -> TrackConfig {
    CURRENT.with(|cell| cell.replace(config))
}

/// Run `f` with `config` installed, restoring the previous configuration
/// afterwards (including on unwind).
pub fn with_config<R>(config: TrackConfig, f: impl FnOnce() -> R) -> R {
    struct Guard(TrackConfig);

    impl Drop for Guard {
        fn drop(&mut self) {
            install(self.0);
        }
    }

    let _guard = Guard(install(config));

    f()
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{AssertUnwindSafe, catch_unwind};

    #[test]
    fn empty_document_yields_defaults() {
        let config = TrackConfig::from_toml_str("").expect("empty config should parse");

        assert_eq!(config, TrackConfig::default());
        assert!(!config.compare_old_value);
        assert!(config.emit_events);
    }

    #[test]
    fn document_overrides_selected_keys() {
        let config = TrackConfig::from_toml_str("compare_old_value = true\n")
            .expect("config should parse");

        assert!(config.compare_old_value);
        assert!(config.emit_events);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = TrackConfig::from_toml_str("compare = true\n")
            .expect_err("unknown key should be rejected");

        assert!(err.to_string().contains("invalid tracking configuration"));
    }

    #[test]
    fn with_config_restores_on_return_and_unwind() {
        let custom = TrackConfig {
            compare_old_value: true,
            emit_events: false,
        };
        let before = current();

        let seen = with_config(custom, current);
        assert_eq!(seen, custom);
        assert_eq!(current(), before);

        let panicked = catch_unwind(AssertUnwindSafe(|| {
            with_config(custom, || panic!("intentional panic for guard test"));
        }))
        .is_err();
        assert!(panicked);
        assert_eq!(current(), before);
    }
}
