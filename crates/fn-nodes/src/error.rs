//! Error types for node operations.

use crate::expr::ExprError;
use fn_core::error::CoreError;
use thiserror::Error;

/// Errors raised by node construction, parameter editing and per-tick updates.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NodeError {
    #[error("Division by zero: {what}")]
    DivideByZero { what: &'static str },

    #[error("Invalid parameter {name} = {value:?}: {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: &'static str,
    },

    #[error("Unknown node type: {0}")]
    UnknownNodeType(String),

    #[error("Expression error: {0}")]
    Expression(#[from] ExprError),

    #[error("Non-finite value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Port layout mismatch: {what}")]
    Layout { what: &'static str },
}

pub type NodeResult<T> = Result<T, NodeError>;

impl NodeError {
    pub(crate) fn invalid(name: &str, value: &str, reason: &'static str) -> Self {
        NodeError::InvalidParameter {
            name: name.to_string(),
            value: value.to_string(),
            reason,
        }
    }

    /// Errors that a tick can recover from by holding the node's previous output.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            NodeError::DivideByZero { .. } | NodeError::Expression(_) | NodeError::NonFinite { .. }
        )
    }
}

impl From<CoreError> for NodeError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::NonFinite { what, value } => NodeError::NonFinite { what, value },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = NodeError::DivideByZero { what: "merge rate" };
        assert!(err.to_string().contains("merge rate"));
    }

    #[test]
    fn error_conversion() {
        let core_err = CoreError::NonFinite {
            what: "test",
            value: f64::INFINITY,
        };
        let node_err: NodeError = core_err.into();
        assert!(matches!(node_err, NodeError::NonFinite { .. }));
        assert!(node_err.is_recoverable());
    }

    #[test]
    fn unknown_type_is_not_recoverable() {
        assert!(!NodeError::UnknownNodeType("Valve".into()).is_recoverable());
    }
}
