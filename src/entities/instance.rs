//! Live entity identity.
//!
//! A [`NodeHandle`] survives renames; the display name does not. Every store
//! call addresses a node by the name resolved from its handle at call time,
//! never by a cached name.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entity_type::EntityType;

/// Rename-stable node identifier (the host's node UUID).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeHandle(pub Uuid);

impl NodeHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One displayed light in a sync session.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityInstance {
    pub handle: NodeHandle,
    pub entity_type: EntityType,
    /// Current shape node name, refreshed on rename.
    pub display_name: String,
    /// Parent transform name, used as the panel label.
    pub transform_name: String,
    /// Parent transform node, when the host exposes one.
    pub transform_handle: Option<NodeHandle>,
}

impl EntityInstance {
    pub fn new(handle: NodeHandle, entity_type: EntityType, display_name: impl Into<String>) -> Self {
        let display_name = display_name.into();
        Self {
            handle,
            entity_type,
            transform_name: display_name.clone(),
            transform_handle: None,
            display_name,
        }
    }
}
