//! Error taxonomy for store access, schema lookup and transfer validation.
//!
//! Inside the transfer engine every variant except [`Error::Validation`] is
//! caught per item and turned into a report entry. Inside the sync controller
//! refresh errors are logged and the binding keeps its last good value.

use thiserror::Error;

use crate::entities::attrs::AttrKind;
use crate::entities::instance::NodeHandle;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("attribute not found: {node}.{attr}")]
    NotFound { node: String, attr: String },

    #[error("unsupported value type for {attr}: {kind}")]
    UnsupportedType { attr: String, kind: String },

    #[error("type mismatch on {attr}: expected {expected:?}, got {found}")]
    TypeMismatch {
        attr: String,
        expected: AttrKind,
        found: String,
    },

    #[error("attribute is read-only: {node}.{attr} ({reason})")]
    ReadOnly {
        node: String,
        attr: String,
        reason: String,
    },

    #[error("invalid request: {0}")]
    Validation(String),

    #[error("unknown entity type: {0}")]
    UnknownType(String),

    #[error("handle does not resolve to a live node: {0}")]
    StaleHandle(NodeHandle),

    #[error("store rejected {node}.{attr}: {reason}")]
    Rejected {
        node: String,
        attr: String,
        reason: String,
    },
}

impl Error {
    pub fn not_found(node: &str, attr: &str) -> Self {
        Error::NotFound {
            node: node.to_string(),
            attr: attr.to_string(),
        }
    }

    pub fn read_only(node: &str, attr: &str, reason: impl Into<String>) -> Self {
        Error::ReadOnly {
            node: node.to_string(),
            attr: attr.to_string(),
            reason: reason.into(),
        }
    }

    pub fn rejected(node: &str, attr: &str, reason: impl Into<String>) -> Self {
        Error::Rejected {
            node: node.to_string(),
            attr: attr.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
