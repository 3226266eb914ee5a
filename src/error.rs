//! Error types for relq.

use crate::ast::ops::OpKind;
use crate::dialect::Dialect;
use std::fmt;
use thiserror::Error;

/// A construct that one dialect cannot express.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unsupported {
    pub kind: OpKind,
    pub dialect: Dialect,
    pub reason: String,
}

impl fmt::Display for Unsupported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is not supported by {}", self.kind, self.dialect)?;
        if !self.reason.is_empty() {
            write!(f, ": {}", self.reason)?;
        }
        Ok(())
    }
}

/// The main error type for relq operations.
#[derive(Debug, Error)]
pub enum RelqError {
    /// Arguments did not match the operation's signature or integrity rules.
    #[error("Type error in {op} (argument '{arg}'): {reason}")]
    Type {
        op: OpKind,
        arg: String,
        reason: String,
    },

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(Unsupported),

    /// The operation is supported, but not with this argument shape.
    #[error("Unsupported argument: {0}")]
    UnsupportedArgument(Unsupported),

    /// A logical type the dialect has no DDL form for.
    #[error("Type {ty} has no {dialect} representation")]
    UnsupportedBackendType { ty: String, dialect: Dialect },

    #[error("Cannot map {dialect} type '{raw}': {reason}")]
    TypeMapping {
        raw: String,
        dialect: Dialect,
        reason: String,
    },

    #[error("Expression depth {depth} exceeds the limit of {limit}")]
    ExpressionTooDeep { depth: usize, limit: usize },

    /// Malformed plan document.
    #[error("Plan error: {0}")]
    Plan(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RelqError {
    pub fn type_error(op: OpKind, arg: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Type {
            op,
            arg: arg.into(),
            reason: reason.into(),
        }
    }

    pub fn unsupported(kind: OpKind, dialect: Dialect, reason: impl Into<String>) -> Self {
        Self::UnsupportedOperation(Unsupported {
            kind,
            dialect,
            reason: reason.into(),
        })
    }

    pub fn unsupported_arg(kind: OpKind, dialect: Dialect, reason: impl Into<String>) -> Self {
        Self::UnsupportedArgument(Unsupported {
            kind,
            dialect,
            reason: reason.into(),
        })
    }

    pub fn backend_type(ty: impl fmt::Display, dialect: Dialect) -> Self {
        Self::UnsupportedBackendType {
            ty: ty.to_string(),
            dialect,
        }
    }

    pub fn type_mapping(
        raw: impl Into<String>,
        dialect: Dialect,
        reason: impl Into<String>,
    ) -> Self {
        Self::TypeMapping {
            raw: raw.into(),
            dialect,
            reason: reason.into(),
        }
    }

    pub fn plan(message: impl Into<String>) -> Self {
        Self::Plan(message.into())
    }

    /// The structured denial carried by unsupported-operation and -argument errors.
    pub fn as_unsupported(&self) -> Option<&Unsupported> {
        match self {
            Self::UnsupportedOperation(u) | Self::UnsupportedArgument(u) => Some(u),
            _ => None,
        }
    }
}

/// Result type alias for relq operations.
pub type RelqResult<T> = Result<T, RelqError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ops::Func;

    #[test]
    fn test_error_display() {
        let err = RelqError::unsupported(OpKind::Call(Func::Levenshtein), Dialect::Impala, "");
        assert_eq!(
            err.to_string(),
            "Unsupported operation: Levenshtein is not supported by impala"
        );

        let err = RelqError::type_error(OpKind::Filter, "predicate", "expected boolean, got int64");
        assert_eq!(
            err.to_string(),
            "Type error in Filter (argument 'predicate'): expected boolean, got int64"
        );
    }

    #[test]
    fn test_as_unsupported() {
        let err = RelqError::unsupported_arg(OpKind::Sample, Dialect::Impala, "seed");
        let u = err.as_unsupported().unwrap();
        assert_eq!(u.kind, OpKind::Sample);
        assert_eq!(u.dialect, Dialect::Impala);
        assert!(RelqError::plan("x").as_unsupported().is_none());
    }
}
