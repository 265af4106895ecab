//! Core error types for linq-rs.
//!
//! This module provides the [`LinqError`] enum covering every failure the
//! query compiler can surface. All compiler errors are raised synchronously
//! at compile time, carry the offending construct, and are never retried
//! internally — a failed compilation produces no partial SQL text.

use thiserror::Error;

/// The primary error type for linq-rs.
///
/// The first four variants form the compiler's failure taxonomy: they
/// indicate a query shape outside the supported sublanguage or a
/// misconfigured mapping, and must be fixed by the caller before retrying.
/// [`DatabaseError`](Self::DatabaseError) belongs to the execution boundary
/// and is never produced by compilation itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinqError {
    // ── Compilation errors ───────────────────────────────────────────

    /// An expression node outside the translatable sublanguage was
    /// encountered while rendering a predicate or projection.
    #[error("Unsupported expression node kind: {node_kind}")]
    UnsupportedExpression {
        /// The name of the untranslatable node kind (e.g. "Arith").
        node_kind: String,
    },

    /// A projection shape the join or group planner cannot map to columns.
    #[error("Unsupported projection: {reason}")]
    UnsupportedProjection {
        /// Which projection member caused the failure, and why.
        reason: String,
    },

    /// A key-dependent operation was attempted on an entity with no marked
    /// primary key member (or with more than one).
    #[error("Entity '{entity}' has no usable primary key")]
    MissingPrimaryKey {
        /// The entity type name.
        entity: String,
    },

    /// A configuration value (e.g. a naming convention name) is outside the
    /// recognized set.
    #[error("Invalid configuration value: {value}")]
    InvalidConfiguration {
        /// The rejected value.
        value: String,
    },

    // ── Execution boundary ───────────────────────────────────────────

    /// A database error reported by the execution collaborator.
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl LinqError {
    /// Creates an [`UnsupportedExpression`](Self::UnsupportedExpression)
    /// error for the given node kind.
    pub fn unsupported_expression(node_kind: impl Into<String>) -> Self {
        Self::UnsupportedExpression {
            node_kind: node_kind.into(),
        }
    }

    /// Creates an [`UnsupportedProjection`](Self::UnsupportedProjection)
    /// error with the given reason.
    pub fn unsupported_projection(reason: impl Into<String>) -> Self {
        Self::UnsupportedProjection {
            reason: reason.into(),
        }
    }

    /// Returns `true` if this error indicates a query shape the compiler
    /// rejected (as opposed to an execution failure).
    pub const fn is_compile_error(&self) -> bool {
        !matches!(self, Self::DatabaseError(_))
    }
}

/// A convenience type alias for `Result<T, LinqError>`.
pub type LinqResult<T> = Result<T, LinqError>;
