//! Entities module - attribute model, light catalog and identity types.
//!
//! Nothing here touches the live store; these are the static and
//! value-level types the sync controller and transfer engine share.

pub mod attr_schemas;
pub mod attrs;
pub mod entity_type;
pub mod instance;
pub mod registry;

pub use attrs::{AttrBounds, AttrDef, AttrKind, AttrSchema, AttrValue, Attrs};
pub use entity_type::{EntityType, LightFamily};
pub use instance::{EntityInstance, NodeHandle};
pub use registry::SchemaRegistry;
