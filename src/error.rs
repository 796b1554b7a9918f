//! Error types for recorrer.
//!
//! All fallible operations return `Result<T, RouteError>` instead of
//! panicking. Invalid user input (weights, node ids) is rejected at the
//! mutation boundary with no state change; anything else indicates a broken
//! invariant and carries the `Internal` variant.

use thiserror::Error;

use crate::graph::NodeId;

/// Result type alias for recorrer operations.
pub type RouteResult<T> = Result<T, RouteError>;

/// Unified error type for all recorrer operations.
///
/// # Design
///
/// Errors fall into two groups:
/// 1. Boundary rejections (`UnknownNode`, `UnknownEdge`, `InvalidWeight`) —
///    recoverable, the graph is untouched, the caller is notified.
/// 2. Everything else — instance/config problems, I/O, or a violated
///    internal invariant that must stop the session rather than produce a
///    wrong route.
#[derive(Debug, Error)]
pub enum RouteError {
    // ===== Boundary Rejections =====
    /// Operation referenced a node id that does not exist.
    #[error("unknown node id {node_id}")]
    UnknownNode {
        /// The offending node id.
        node_id: NodeId,
    },

    /// Weight update referenced a `(from, to)` pair with no edge.
    #[error("no edge from node {from} to node {to}")]
    UnknownEdge {
        /// Source node id of the missing edge.
        from: NodeId,
        /// Target node id of the missing edge.
        to: NodeId,
    },

    /// Supplied edge weight is negative, non-finite, or unparseable.
    #[error("invalid edge weight: {message}")]
    InvalidWeight {
        /// Description of why the weight was rejected.
        message: String,
    },

    // ===== Instance / Configuration Errors =====
    /// Instance document failed semantic validation.
    #[error("instance error: {message}")]
    Instance {
        /// Description of the instance problem.
        message: String,
    },

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Field-level validation error.
    #[error("validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    // ===== I/O Errors =====
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    // ===== Invariant Violations =====
    /// Internal invariant violated; fail fast rather than return a wrong
    /// route.
    #[error("internal invariant violated: {message}")]
    Internal {
        /// Description of the broken invariant.
        message: String,
    },
}

impl RouteError {
    /// Create an `UnknownNode` error.
    #[must_use]
    pub const fn unknown_node(node_id: NodeId) -> Self {
        Self::UnknownNode { node_id }
    }

    /// Create an `InvalidWeight` error for a negative value.
    #[must_use]
    pub fn negative_weight(weight: f64) -> Self {
        Self::InvalidWeight {
            message: format!("{weight} is negative"),
        }
    }

    /// Create an `InvalidWeight` error for a non-finite value.
    #[must_use]
    pub fn non_finite_weight(weight: f64) -> Self {
        Self::InvalidWeight {
            message: format!("{weight} is not a finite number"),
        }
    }

    /// Create an `InvalidWeight` error for text that does not parse as a
    /// real number.
    #[must_use]
    pub fn weight_parse(raw: impl Into<String>) -> Self {
        Self::InvalidWeight {
            message: format!("'{}' is not a number", raw.into()),
        }
    }

    /// Create an instance error with a message.
    #[must_use]
    pub fn instance(message: impl Into<String>) -> Self {
        Self::Instance {
            message: message.into(),
        }
    }

    /// Create a serialization error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    /// Create an internal invariant-violation error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Check whether this error is a boundary rejection: the graph is
    /// unchanged and the caller may simply report and continue.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::UnknownNode { .. } | Self::UnknownEdge { .. } | Self::InvalidWeight { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_classification() {
        assert!(RouteError::unknown_node(7).is_rejection());
        assert!(RouteError::UnknownEdge { from: 1, to: 2 }.is_rejection());
        assert!(RouteError::negative_weight(-1.0).is_rejection());

        assert!(!RouteError::instance("bad").is_rejection());
        assert!(!RouteError::internal("broken").is_rejection());
        assert!(!RouteError::serialization("oops").is_rejection());
    }

    #[test]
    fn test_unknown_node_display() {
        let err = RouteError::unknown_node(42);
        let msg = err.to_string();
        assert!(msg.contains("unknown node"));
        assert!(msg.contains("42"));
    }

    #[test]
    fn test_unknown_edge_display() {
        let err = RouteError::UnknownEdge { from: 3, to: 9 };
        let msg = err.to_string();
        assert!(msg.contains("no edge"));
        assert!(msg.contains('3'));
        assert!(msg.contains('9'));
    }

    #[test]
    fn test_negative_weight_display() {
        let err = RouteError::negative_weight(-2.5);
        let msg = err.to_string();
        assert!(msg.contains("invalid edge weight"));
        assert!(msg.contains("-2.5"));
        assert!(msg.contains("negative"));
    }

    #[test]
    fn test_non_finite_weight_display() {
        let err = RouteError::non_finite_weight(f64::NAN);
        let msg = err.to_string();
        assert!(msg.contains("invalid edge weight"));
        assert!(msg.contains("not a finite number"));
    }

    #[test]
    fn test_weight_parse_display() {
        let err = RouteError::weight_parse("abc");
        let msg = err.to_string();
        assert!(msg.contains("invalid edge weight"));
        assert!(msg.contains("'abc'"));
        assert!(msg.contains("not a number"));
    }

    #[test]
    fn test_instance_display() {
        let err = RouteError::instance("node ids must start at 1");
        let msg = err.to_string();
        assert!(msg.contains("instance error"));
        assert!(msg.contains("node ids must start at 1"));
    }

    #[test]
    fn test_internal_display() {
        let err = RouteError::internal("adjacency index out of sync");
        let msg = err.to_string();
        assert!(msg.contains("internal invariant violated"));
        assert!(msg.contains("adjacency index"));
    }

    #[test]
    fn test_serialization_display() {
        let err = RouteError::serialization("journal export failed");
        let msg = err.to_string();
        assert!(msg.contains("serialization error"));
        assert!(msg.contains("journal export failed"));
    }

    #[test]
    fn test_io_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing file");
        let err: RouteError = io_err.into();
        assert!(!err.is_rejection());
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_error_debug() {
        let err = RouteError::weight_parse("x");
        let debug = format!("{err:?}");
        assert!(debug.contains("InvalidWeight"));
    }
}
