//! Descriptor → control spec mapping.
//!
//! # Kinds
//! - `Boolean` → [`ControlSpec::Toggle`]
//! - `Scalar` → [`ControlSpec::Numeric`], seeded with resolved bounds
//! - anything else (colors) → no control. Callers treat `None` as a valid,
//!   silent outcome.

use log::debug;
use serde::Serialize;

use crate::core::proxy::LiveAttr;
use crate::core::store::AttributeStore;
use crate::entities::{AttrDef, AttrKind, EntityType, NodeHandle, SchemaRegistry};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "control", rename_all = "snake_case")]
pub enum ControlSpec {
    Toggle {
        attr: &'static str,
        label: String,
    },
    Numeric {
        attr: &'static str,
        label: String,
        min: f64,
        max: f64,
    },
}

impl ControlSpec {
    pub fn attr(&self) -> &'static str {
        match self {
            ControlSpec::Toggle { attr, .. } | ControlSpec::Numeric { attr, .. } => attr,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            ControlSpec::Toggle { label, .. } | ControlSpec::Numeric { label, .. } => label,
        }
    }
}

/// Build the control for one descriptor. `bounds` is only read for scalars.
pub fn build_control(def: &AttrDef, bounds: (f64, f64)) -> Option<ControlSpec> {
    match def.kind {
        AttrKind::Boolean => Some(ControlSpec::Toggle {
            attr: def.name,
            label: nice_name(def.name),
        }),
        AttrKind::Scalar => Some(ControlSpec::Numeric {
            attr: def.name,
            label: nice_name(def.name),
            min: bounds.0,
            max: bounds.1,
        }),
        AttrKind::VectorTriple => None,
    }
}

/// Controls for every displayable attribute the live node actually has,
/// in schema order. Attributes missing on the node are skipped.
pub fn panel_for<S: AttributeStore + ?Sized>(
    store: &S,
    registry: &SchemaRegistry,
    handle: NodeHandle,
    entity_type: EntityType,
    sentinel: f64,
) -> Vec<ControlSpec> {
    let mut out = Vec::new();
    for def in registry.lookup(entity_type).iter().filter(|d| d.is_display()) {
        let attr = LiveAttr::new(handle, def);
        let bounds = match def.kind {
            AttrKind::Scalar => match attr.bounds_with(store, sentinel) {
                Ok(b) => b,
                Err(e) => {
                    debug!("No control for {}: {}", def.name, e);
                    continue;
                }
            },
            _ => {
                if let Err(e) = attr.get(store) {
                    debug!("No control for {}: {}", def.name, e);
                    continue;
                }
                (-sentinel, sentinel)
            }
        };
        out.extend(build_control(def, bounds));
    }
    out
}

/// Display label from an attribute name: `aiShadowDensity` → `Ai Shadow Density`.
pub fn nice_name(attr: &str) -> String {
    let mut out = String::with_capacity(attr.len() + 4);
    for (i, c) in attr.chars().enumerate() {
        if i == 0 {
            out.extend(c.to_uppercase());
        } else {
            if c.is_uppercase() {
                out.push(' ');
            }
            out.push(c);
        }
    }
    out
}
