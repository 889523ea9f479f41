//! Live entity proxy: kind-aware access to one (node, attribute) pair.
//!
//! The node name is resolved from the handle on every call, so a proxy
//! stays valid across renames and fails with `StaleHandle` after deletion.

use log::trace;

use super::store::AttributeStore;
use crate::entities::{AttrDef, AttrValue, NodeHandle};
use crate::error::{Error, Result};

/// Range substituted when the store declares no bound in a direction.
pub const DEFAULT_BOUND: f64 = 10000.0;

#[derive(Debug, Clone, Copy)]
pub struct LiveAttr<'d> {
    pub handle: NodeHandle,
    pub def: &'d AttrDef,
}

impl<'d> LiveAttr<'d> {
    pub fn new(handle: NodeHandle, def: &'d AttrDef) -> Self {
        Self { handle, def }
    }

    pub fn node_name<S: AttributeStore + ?Sized>(&self, store: &S) -> Result<String> {
        store.name_of(self.handle)
    }

    pub fn get<S: AttributeStore + ?Sized>(&self, store: &S) -> Result<AttrValue> {
        let node = self.node_name(store)?;
        let value = store.get(&node, self.def.name)?;
        trace!("get {}.{} = {:?}", node, self.def.name, value);
        Ok(value)
    }

    /// Write through to the store. Mistyped values never reach the store;
    /// a store-level rejection surfaces as [`Error::ReadOnly`].
    pub fn set<S: AttributeStore + ?Sized>(&self, store: &mut S, value: &AttrValue) -> Result<()> {
        if !self.def.kind.accepts(value) {
            return Err(Error::TypeMismatch {
                attr: self.def.name.to_string(),
                expected: self.def.kind,
                found: value.type_name().to_string(),
            });
        }
        let node = self.node_name(store)?;
        trace!("set {}.{} = {:?}", node, self.def.name, value);
        store.set(&node, self.def.name, value).map_err(|e| match e {
            Error::Rejected { node, attr, reason } => Error::ReadOnly { node, attr, reason },
            other => other,
        })
    }

    /// Numeric bounds with the default sentinel range filling missing directions.
    pub fn bounds<S: AttributeStore + ?Sized>(&self, store: &S) -> Result<(f64, f64)> {
        self.bounds_with(store, DEFAULT_BOUND)
    }

    pub fn bounds_with<S: AttributeStore + ?Sized>(&self, store: &S, sentinel: f64) -> Result<(f64, f64)> {
        let node = self.node_name(store)?;
        Ok(store.bounds(&node, self.def.name)?.resolve(sentinel))
    }
}
