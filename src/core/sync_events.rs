//! Events the sync controller emits to the UI layer.
//!
//! # Ordering
//! Within one notification, events come out in the order the controller
//! processed them: a rebuild emits `EntityAdded` per light, then one
//! `SessionRebuilt`. A delete emits exactly one `EntityRemoved`.

use crate::entities::{AttrDef, AttrValue, EntityType, NodeHandle};

#[derive(Clone, Debug, PartialEq)]
pub enum SyncEvent {
    /// A light joined the session (on open or rebuild).
    EntityAdded {
        handle: NodeHandle,
        entity_type: EntityType,
        name: String,
    },
    /// A light was deleted in the host and its bindings were disposed.
    EntityRemoved { handle: NodeHandle, name: String },
    /// Display names changed; bindings are untouched.
    EntityRenamed {
        handle: NodeHandle,
        name: String,
        transform_name: String,
    },
    /// A binding re-read its value from the store. `handle` is the light,
    /// also for bindings on its parent transform.
    BindingRefreshed {
        handle: NodeHandle,
        def: &'static AttrDef,
        value: AttrValue,
    },
    /// A full dispose/enumerate/rebuild finished.
    SessionRebuilt { entities: usize, bindings: usize },
}

impl SyncEvent {
    /// Handle of the entity this event concerns, if any.
    pub fn handle(&self) -> Option<NodeHandle> {
        match self {
            SyncEvent::EntityAdded { handle, .. }
            | SyncEvent::EntityRemoved { handle, .. }
            | SyncEvent::EntityRenamed { handle, .. }
            | SyncEvent::BindingRefreshed { handle, .. } => Some(*handle),
            SyncEvent::SessionRebuilt { .. } => None,
        }
    }
}
