//! Transfer engine: copy attribute values from one light to many.
//!
//! Per destination, independently:
//! 1. list the destination's live attributes (not just its nominal schema)
//! 2. resolve each requested name: verbatim first, then an alias partner
//!    present on the destination, else `NotApplicable`
//! 3. read the source under the requested name, coerce by live kind, write
//!    under the resolved name
//!
//! Item failures land in the report and never stop the batch. Nothing is
//! rolled back: earlier destinations keep their writes.

use std::sync::Arc;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::store::AttributeStore;
use crate::entities::{AttrValue, NodeHandle, SchemaRegistry};
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub source: NodeHandle,
    pub attributes: Vec<String>,
    pub destinations: Vec<NodeHandle>,
}

impl TransferRequest {
    pub fn new(source: NodeHandle, attributes: Vec<String>, destinations: Vec<NodeHandle>) -> Self {
        Self {
            source,
            attributes,
            destinations,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FailureReason {
    /// Neither the name nor an alias partner exists on the destination.
    NotApplicable,
    /// Source value kind cannot be coerced (e.g. strings).
    UnsupportedType(String),
    /// The store refused the read or the write.
    StoreRejected(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferFailure {
    pub destination: NodeHandle,
    pub attr: String,
    pub reason: FailureReason,
}

/// Per-item outcomes. Successes are keyed by the requested attribute name,
/// even when an alias partner was written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransferReport {
    pub successes: Vec<(NodeHandle, String)>,
    pub failures: Vec<TransferFailure>,
}

impl TransferReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn fail(&mut self, destination: NodeHandle, attr: &str, reason: FailureReason) {
        warn!("transfer {} -> {}: {:?}", attr, destination, reason);
        self.failures.push(TransferFailure {
            destination,
            attr: attr.to_string(),
            reason,
        });
    }
}

/// Stateless apart from the shared registry.
#[derive(Debug, Clone)]
pub struct TransferEngine {
    registry: Arc<SchemaRegistry>,
}

impl TransferEngine {
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self { registry }
    }

    /// Run a transfer. Only a malformed request is an `Err`; everything else
    /// is reported per item.
    pub fn transfer<S: AttributeStore + ?Sized>(&self, store: &mut S, request: &TransferRequest) -> Result<TransferReport> {
        let source = validate(store, request)?;
        let mut report = TransferReport::default();

        for &dest in &request.destinations {
            let (dest_name, live) = match store.name_of(dest).and_then(|n| {
                let attrs = store.list_attributes(&n)?;
                Ok((n, attrs))
            }) {
                Ok(found) => found,
                Err(e) => {
                    for attr in &request.attributes {
                        report.fail(dest, attr, FailureReason::StoreRejected(e.to_string()));
                    }
                    continue;
                }
            };

            for attr in &request.attributes {
                let Some(write_name) = self.resolve_name(attr, &live) else {
                    report.fail(dest, attr, FailureReason::NotApplicable);
                    continue;
                };
                match copy_value(store, &source, attr, &dest_name, &write_name) {
                    Ok(()) => {
                        debug!("{}.{} -> {}.{}", source, attr, dest_name, write_name);
                        report.successes.push((dest, attr.clone()));
                    }
                    Err(reason) => report.fail(dest, attr, reason),
                }
            }
        }

        info!(
            "Transfer from {}: {} copied, {} failed",
            source,
            report.successes.len(),
            report.failures.len()
        );
        Ok(report)
    }

    /// Name to write on a destination exposing `live`, if any.
    fn resolve_name(&self, attr: &str, live: &[String]) -> Option<String> {
        if live.iter().any(|a| a == attr) {
            return Some(attr.to_string());
        }
        self.registry
            .alias_partners(attr)
            .into_iter()
            .find(|p| live.iter().any(|a| a == p))
            .map(str::to_string)
    }
}

fn validate<S: AttributeStore + ?Sized>(store: &S, request: &TransferRequest) -> Result<String> {
    if request.attributes.is_empty() {
        return Err(Error::Validation("no attributes requested".into()));
    }
    if request.attributes.iter().any(|a| a.trim().is_empty()) {
        return Err(Error::Validation("blank attribute name".into()));
    }
    if request.destinations.is_empty() {
        return Err(Error::Validation("no destinations".into()));
    }
    store
        .name_of(request.source)
        .map_err(|e| Error::Validation(format!("source is not a live node: {e}")))
}

fn copy_value<S: AttributeStore + ?Sized>(
    store: &mut S,
    source: &str,
    read_name: &str,
    dest: &str,
    write_name: &str,
) -> std::result::Result<(), FailureReason> {
    let rejected = |e: Error| FailureReason::StoreRejected(e.to_string());

    let value = store.get(source, read_name).map_err(rejected)?;
    if let AttrValue::Str(_) = value {
        return Err(FailureReason::UnsupportedType(value.type_name().to_string()));
    }
    // A Vec3 set is one compound write of all three channels
    store.set(dest, write_name, &value).map_err(rejected)
}

/// Live attributes of `node` that some registered schema knows, in host order.
/// This is what the copy tool offers for a source light.
pub fn transferable_attributes<S: AttributeStore + ?Sized>(
    store: &S,
    registry: &SchemaRegistry,
    node: &str,
) -> Result<Vec<String>> {
    Ok(store
        .list_attributes(node)?
        .into_iter()
        .filter(|a| registry.knows_attribute(a))
        .collect())
}
