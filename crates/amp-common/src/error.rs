//! Error types for the API management operator
//!
//! Errors are structured with fields to aid debugging in production.
//! Each variant carries the object or handle it concerns so a caller can
//! decide between requeueing and giving up.

use std::fmt;

use thiserror::Error;

/// Which side of a mutator call an object handle was passed as
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectRole {
    /// The last-observed object, mutated in place
    Existing,
    /// The freshly built target object
    Desired,
}

impl fmt::Display for ObjectRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Existing => f.write_str("existing"),
            Self::Desired => f.write_str("desired"),
        }
    }
}

/// Main error type for operator operations
#[derive(Debug, Error)]
pub enum Error {
    /// An object handle is not of the concrete type a mutator operates on
    #[error("type mismatch for {role} object: {found} is not a {expected}")]
    TypeMismatch {
        /// Which handle failed the check
        role: ObjectRole,
        /// Concrete type the mutator expected
        expected: String,
        /// Concrete type that was actually passed
        found: String,
    },

    /// A structural precondition that holds by construction was found false
    ///
    /// This points at a defect in the code that built the object, not at the
    /// cluster state. Retrying cannot fix it.
    #[error("invariant violation for {object}: {message}")]
    InvariantViolation {
        /// Identifier of the offending object (e.g. "DeploymentConfig/zync")
        object: String,
        /// Description of the violated invariant
        message: String,
    },

    /// Serialization/deserialization error
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of what failed
        message: String,
        /// The resource kind being serialized (if known)
        kind: Option<String>,
    },

    /// Manifest template rendering error
    #[error("template error: {message}")]
    Template {
        /// Description of what failed
        message: String,
    },

    /// Internal/operational error
    #[error("internal error [{context}]: {message}")]
    Internal {
        /// Description of what failed
        message: String,
        /// Context where the error occurred (e.g., "mutator", "cli")
        context: String,
    },
}

impl Error {
    /// Create a type mismatch error for the given handle
    pub fn type_mismatch(
        role: ObjectRole,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            role,
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create an invariant violation error for an object
    pub fn invariant_violation(object: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::InvariantViolation {
            object: object.into(),
            message: msg.into(),
        }
    }

    /// Create a serialization error with the given message
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: None,
        }
    }

    /// Create a serialization error with resource kind context
    pub fn serialization_for_kind(kind: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: Some(kind.into()),
        }
    }

    /// Create a template error with the given message
    pub fn template(msg: impl Into<String>) -> Self {
        Self::Template {
            message: msg.into(),
        }
    }

    /// Create an internal error with context
    pub fn internal_with_context(context: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Internal {
            message: msg.into(),
            context: context.into(),
        }
    }

    /// Check if this error is retryable
    ///
    /// A type mismatch may come from a stale cache entry and is worth another
    /// pass. Invariant violations, serialization and template errors need a
    /// code or config fix.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::TypeMismatch { .. } => true,
            Error::InvariantViolation { .. } => false,
            Error::Serialization { .. } => false,
            Error::Template { .. } => false,
            Error::Internal { .. } => true,
        }
    }

    /// Check if this error must stop the process
    ///
    /// Callers must never requeue a fatal error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::InvariantViolation { .. })
    }

    /// Get the object identifier if this error is about a specific object
    pub fn object(&self) -> Option<&str> {
        match self {
            Error::InvariantViolation { object, .. } => Some(object),
            _ => None,
        }
    }

    /// Get the context if this error has one
    pub fn context(&self) -> Option<&str> {
        match self {
            Error::Internal { context, .. } => Some(context),
            _ => None,
        }
    }
}
