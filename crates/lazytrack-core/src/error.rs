use crate::model::{LazyShape, Shape};
use thiserror::Error as ThisError;

///
/// SupplyError
///
/// Opaque failure raised by a supplier or entry source while producing a
/// value. The engine never inspects it; it is carried to the caller.
///

pub type SupplyError = Box<dyn std::error::Error + Send + Sync + 'static>;

///
/// TrackError
///
/// Every failure the engine can surface. Configuration and capability
/// errors indicate a declaration mistake and are never retried.
///

#[remain::sorted]
#[derive(Debug, ThisError)]
pub enum TrackError {
    #[error("type '{type_path}' does not implement the {capability} capability")]
    CapabilityMismatch {
        type_path: &'static str,
        capability: &'static str,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("supplier for '{target}' failed: {source}")]
    Supply {
        target: String,
        #[source]
        source: SupplyError,
    },
}

impl TrackError {
    /// Construct a capability mismatch for a node type.
    pub(crate) const fn capability_mismatch(
        type_path: &'static str,
        capability: &'static str,
    ) -> Self {
        Self::CapabilityMismatch {
            type_path,
            capability,
        }
    }

    /// Wrap a supplier failure with the attribute or entry it was producing.
    pub(crate) fn supply(target: impl Into<String>, source: SupplyError) -> Self {
        Self::Supply {
            target: target.into(),
            source,
        }
    }

    /// Returns `true` for declaration mistakes (configuration or capability).
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Config(_) | Self::CapabilityMismatch { .. })
    }
}

///
/// ConfigError
///
/// Fatal declaration errors. Each variant names the owner type path and the
/// attribute so the offending declaration can be found without inspecting
/// the graph.
///

#[remain::sorted]
#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ConfigError {
    #[error("no supplier is configured for lazy attribute '{owner}.{attribute}' by '{factory}'")]
    MissingSupplier {
        owner: &'static str,
        attribute: &'static str,
        factory: &'static str,
    },

    #[error("attribute '{owner}.{attribute}' is not declared lazy")]
    NotLazy {
        owner: &'static str,
        attribute: &'static str,
    },

    #[error("attribute '{owner}.{attribute}' is declared {declared} but yielded {found}")]
    ShapeMismatch {
        owner: &'static str,
        attribute: &'static str,
        declared: Shape,
        found: &'static str,
    },

    #[error(
        "factory '{factory}' produced a {found} supplier for {expected} attribute '{owner}.{attribute}'"
    )]
    SupplierShapeMismatch {
        owner: &'static str,
        attribute: &'static str,
        factory: &'static str,
        expected: LazyShape,
        found: LazyShape,
    },

    #[error("attribute index {index} is not readable on '{owner}' ({declared} declared)")]
    UnknownAttribute {
        owner: &'static str,
        index: usize,
        declared: usize,
    },

    #[error("attribute '{owner}.{attribute}' (index {index}) is not readable")]
    UnreadableAttribute {
        owner: &'static str,
        attribute: &'static str,
        index: usize,
    },
}

///
/// ConfigLoadError
///

#[derive(Debug, ThisError)]
pub enum ConfigLoadError {
    #[error("invalid tracking configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_name_owner_and_attribute() {
        let err = TrackError::from(ConfigError::ShapeMismatch {
            owner: "billing::Invoice",
            attribute: "lines",
            declared: Shape::OrderedCollection,
            found: "single value",
        });

        let message = err.to_string();
        assert!(message.contains("billing::Invoice.lines"));
        assert!(message.contains("ordered collection"));
        assert!(err.is_configuration());
    }

    #[test]
    fn supply_errors_keep_their_source() {
        let source: SupplyError = "connection reset".into();
        let err = TrackError::supply("billing::Invoice.lines", source);

        assert!(!err.is_configuration());
        let inner = std::error::Error::source(&err).expect("supply error should carry a source");
        assert_eq!(inner.to_string(), "connection reset");
    }

    #[test]
    fn unreadable_attribute_names_owner_and_attribute() {
        let err = TrackError::from(ConfigError::UnreadableAttribute {
            owner: "billing::Invoice",
            attribute: "lines",
            index: 2,
        });

        assert_eq!(
            err.to_string(),
            "attribute 'billing::Invoice.lines' (index 2) is not readable"
        );
        assert!(err.is_configuration());
    }
}
