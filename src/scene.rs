//! In-memory scene: a self-contained [`AttributeStore`] + [`NotificationService`].
//!
//! Backs the `lightrig` binary (scene snapshots saved as JSON) and every
//! test in the crate. Behaves like a live DCC scene in the ways the core
//! cares about:
//! - writes clamp to declared bounds and refuse locked attributes
//! - every accepted write queues an attribute-change notification
//! - renames and deletes notify subscribers keyed by handle
//! - node creation notifies population subscribers
//!
//! Transforms are optional nodes of type `transform`. A shape names its parent
//! in `transform`; when a node of that name exists, its `visibility` is live.
//!
//! Subscribe/unsubscribe calls are counted so lifecycle bugs show up in tests.
//!
//! # File format
//! ```json
//! { "nodes": [
//!   { "uuid": "...", "name": "key", "transform": "", "type": "transform",
//!     "attrs": { "visibility": { "Bool": true } } },
//!   { "uuid": "...", "name": "keyShape", "transform": "key",
//!     "type": "pointLight", "attrs": { "intensity": { "Float": 1.0 } },
//!     "bounds": { "intensity": { "min": 0.0, "max": null } }, "locked": [] } ] }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::core::store::{AttributeStore, Notification, NotificationKind, NotificationService, SubscriptionId};
use crate::entities::{AttrBounds, AttrValue, Attrs, EntityType, NodeHandle};
use crate::error::{Error, Result};

const TRANSFORM_TYPE: &str = "transform";

/// One live node as stored in a scene file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneNode {
    #[serde(default)]
    pub uuid: NodeHandle,
    pub name: String,
    pub transform: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub attrs: Attrs,
    #[serde(default)]
    pub bounds: IndexMap<String, AttrBounds>,
    #[serde(default)]
    pub locked: Vec<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SceneFile {
    nodes: Vec<SceneNode>,
}

#[derive(Debug, Clone, PartialEq)]
enum Watch {
    Attr(NodeHandle, String),
    Deleted(NodeHandle),
    Renamed(NodeHandle),
    Population,
}

/// Subscription bookkeeping counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubscriptionStats {
    pub subscribed: usize,
    pub unsubscribed: usize,
}

#[derive(Debug, Default)]
pub struct MemoryScene {
    nodes: IndexMap<NodeHandle, SceneNode>,
    watches: BTreeMap<SubscriptionId, Watch>,
    next_sub: u64,
    queue: Vec<Notification>,
    stats: SubscriptionStats,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Scene files ==========

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let file: SceneFile = serde_json::from_str(json).context("Failed to parse scene JSON")?;
        let mut scene = Self::new();
        for node in file.nodes {
            scene.nodes.insert(node.uuid, node);
        }
        Ok(scene)
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        let file = SceneFile {
            nodes: self.nodes.values().cloned().collect(),
        };
        serde_json::to_string_pretty(&file).context("Failed to serialize scene")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scene file: {}", path.display()))?;
        Self::from_json(&json)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        std::fs::write(path, self.to_json()?)
            .with_context(|| format!("Failed to write scene file: {}", path.display()))
    }

    // ========== Scene editing (host-side actions) ==========

    /// Create a light node. Notifies population subscribers.
    pub fn add_node(&mut self, name: &str, transform: &str, entity_type: EntityType) -> NodeHandle {
        self.add_raw_node(name, transform, entity_type.type_name())
    }

    /// Create a node of any host type, including ones the registry does not know.
    pub fn add_raw_node(&mut self, name: &str, transform: &str, node_type: &str) -> NodeHandle {
        let handle = NodeHandle::new();
        self.nodes.insert(
            handle,
            SceneNode {
                uuid: handle,
                name: name.to_string(),
                transform: transform.to_string(),
                node_type: node_type.to_string(),
                attrs: Attrs::new(),
                bounds: IndexMap::new(),
                locked: Vec::new(),
            },
        );
        self.notify(|w| matches!(w, Watch::Population), NotificationKind::PopulationChanged);
        handle
    }

    /// Create a transform node with `visibility` on. Add it before its shape.
    pub fn add_transform(&mut self, name: &str) -> NodeHandle {
        let handle = self.add_raw_node(name, "", TRANSFORM_TYPE);
        self.add_attr(handle, "visibility", AttrValue::Bool(true));
        handle
    }

    pub fn add_attr(&mut self, handle: NodeHandle, attr: &str, value: AttrValue) {
        if let Some(node) = self.nodes.get_mut(&handle) {
            node.attrs.set(attr, value);
        }
    }

    /// Drop an attribute from a live node (e.g. an extension attribute being removed).
    pub fn remove_attr(&mut self, handle: NodeHandle, attr: &str) {
        if let Some(node) = self.nodes.get_mut(&handle) {
            node.attrs.remove(attr);
        }
    }

    pub fn set_bounds(&mut self, handle: NodeHandle, attr: &str, bounds: AttrBounds) {
        if let Some(node) = self.nodes.get_mut(&handle) {
            node.bounds.insert(attr.to_string(), bounds);
        }
    }

    pub fn lock_attr(&mut self, handle: NodeHandle, attr: &str) {
        if let Some(node) = self.nodes.get_mut(&handle) {
            node.locked.push(attr.to_string());
        }
    }

    /// Rename the shape node. Notifies rename subscribers.
    pub fn rename(&mut self, handle: NodeHandle, new_name: &str) {
        let Some(node) = self.nodes.get_mut(&handle) else {
            return;
        };
        node.name = new_name.to_string();
        self.notify(|w| *w == Watch::Renamed(handle), NotificationKind::Renamed);
    }

    /// Rename the parent transform of shape `handle`. The shape is renamed
    /// alongside, as hosts do.
    pub fn rename_transform(&mut self, handle: NodeHandle, new_name: &str) {
        let Some(node) = self.nodes.get_mut(&handle) else {
            return;
        };
        let old = std::mem::replace(&mut node.transform, new_name.to_string());
        let parent = self
            .nodes
            .values()
            .find(|n| n.uuid != handle && n.name == old && n.node_type == TRANSFORM_TYPE)
            .map(|n| n.uuid);
        if let Some(parent) = parent {
            self.rename(parent, new_name);
        }
        self.rename(handle, &format!("{new_name}Shape"));
    }

    /// Delete a node. Notifies delete subscribers, then retires the node-level
    /// watches. Attribute watches on it go quiet until their owner unsubscribes.
    pub fn delete(&mut self, handle: NodeHandle) {
        if self.nodes.shift_remove(&handle).is_some() {
            self.notify(|w| *w == Watch::Deleted(handle), NotificationKind::Deleted);
            self.watches
                .retain(|_, w| !matches!(w, Watch::Deleted(h) | Watch::Renamed(h) if *h == handle));
        }
    }

    /// Fire an attribute-change notification without changing the value.
    pub fn touch(&mut self, handle: NodeHandle, attr: &str) {
        self.notify_attr(handle, attr);
    }

    // ========== Inspection ==========

    pub fn value(&self, node: &str, attr: &str) -> Option<AttrValue> {
        self.find(node).and_then(|n| n.attrs.get(attr).cloned())
    }

    pub fn node(&self, handle: NodeHandle) -> Option<&SceneNode> {
        self.nodes.get(&handle)
    }

    pub fn handles(&self) -> impl Iterator<Item = NodeHandle> + '_ {
        self.nodes.keys().copied()
    }

    pub fn stats(&self) -> SubscriptionStats {
        self.stats
    }

    pub fn active_subscriptions(&self) -> usize {
        self.watches.len()
    }

    /// Active subscriptions that refer to `handle`.
    pub fn subscriptions_on(&self, handle: NodeHandle) -> usize {
        self.watches
            .values()
            .filter(|w| match w {
                Watch::Attr(h, _) | Watch::Deleted(h) | Watch::Renamed(h) => *h == handle,
                Watch::Population => false,
            })
            .count()
    }

    // ========== Internals ==========

    fn find(&self, name: &str) -> Option<&SceneNode> {
        self.nodes.values().find(|n| n.name == name)
    }

    fn find_mut(&mut self, name: &str) -> Option<&mut SceneNode> {
        self.nodes.values_mut().find(|n| n.name == name)
    }

    fn node_or_err(&self, name: &str, attr: &str) -> Result<&SceneNode> {
        self.find(name).ok_or_else(|| Error::not_found(name, attr))
    }

    fn notify(&mut self, pred: impl Fn(&Watch) -> bool, kind: NotificationKind) {
        let ids: Vec<SubscriptionId> = self
            .watches
            .iter()
            .filter(|(_, w)| pred(w))
            .map(|(id, _)| *id)
            .collect();
        for subscription in ids {
            self.queue.push(Notification {
                subscription,
                kind: kind.clone(),
            });
        }
    }

    fn notify_attr(&mut self, handle: NodeHandle, attr: &str) {
        self.notify(
            |w| matches!(w, Watch::Attr(h, a) if *h == handle && a == attr),
            NotificationKind::AttributeChanged { attr: attr.to_string() },
        );
    }

    fn watch(&mut self, watch: Watch) -> SubscriptionId {
        self.next_sub += 1;
        let id = SubscriptionId(self.next_sub);
        self.watches.insert(id, watch);
        self.stats.subscribed += 1;
        id
    }

    fn live(&self, handle: NodeHandle) -> Result<&SceneNode> {
        self.nodes.get(&handle).ok_or(Error::StaleHandle(handle))
    }
}

/// Convert `value` to the representation already stored, or refuse.
fn coerce_for_store(node: &str, attr: &str, current: &AttrValue, value: &AttrValue) -> Result<AttrValue> {
    match (current, value) {
        (AttrValue::Int(_), AttrValue::Float(v)) => Ok(AttrValue::Int(v.round() as i64)),
        (AttrValue::Float(_), AttrValue::Int(v)) => Ok(AttrValue::Float(*v as f64)),
        (c, v) if std::mem::discriminant(c) == std::mem::discriminant(v) => Ok(v.clone()),
        (c, v) => match c.kind() {
            Some(expected) => Err(Error::TypeMismatch {
                attr: attr.to_string(),
                expected,
                found: v.type_name().to_string(),
            }),
            None => Err(Error::rejected(
                node,
                attr,
                format!("cannot set {} from {}", c.type_name(), v.type_name()),
            )),
        },
    }
}

/// Clamp numeric values into `bounds`. Inverted bounds (from a hand-edited
/// scene file) refuse the write.
fn clamp(node: &str, attr: &str, value: AttrValue, bounds: Option<&AttrBounds>) -> Result<AttrValue> {
    let Some(b) = bounds else {
        return Ok(value);
    };
    let lo = b.min.unwrap_or(f64::NEG_INFINITY);
    let hi = b.max.unwrap_or(f64::INFINITY);
    if lo.is_nan() || hi.is_nan() || lo > hi {
        return Err(Error::rejected(node, attr, format!("invalid bounds [{lo}, {hi}]")));
    }
    Ok(match value {
        AttrValue::Float(v) => AttrValue::Float(v.clamp(lo, hi)),
        AttrValue::Int(v) => AttrValue::Int((v as f64).clamp(lo, hi).round() as i64),
        other => other,
    })
}

impl AttributeStore for MemoryScene {
    fn get(&self, node: &str, attr: &str) -> Result<AttrValue> {
        self.node_or_err(node, attr)?
            .attrs
            .get(attr)
            .cloned()
            .ok_or_else(|| Error::not_found(node, attr))
    }

    fn set(&mut self, node: &str, attr: &str, value: &AttrValue) -> Result<()> {
        let target = self.find_mut(node).ok_or_else(|| Error::not_found(node, attr))?;
        if target.locked.iter().any(|l| l == attr) {
            return Err(Error::read_only(node, attr, "attribute is locked"));
        }
        let current = target.attrs.get(attr).ok_or_else(|| Error::not_found(node, attr))?;
        let coerced = coerce_for_store(node, attr, current, value)?;
        let stored = clamp(node, attr, coerced, target.bounds.get(attr))?;
        debug!("{}.{} <- {:?}", node, attr, stored);
        target.attrs.set(attr, stored);
        let handle = target.uuid;
        self.notify_attr(handle, attr);
        Ok(())
    }

    fn bounds(&self, node: &str, attr: &str) -> Result<AttrBounds> {
        let n = self.node_or_err(node, attr)?;
        if !n.attrs.contains(attr) {
            return Err(Error::not_found(node, attr));
        }
        Ok(n.bounds.get(attr).copied().unwrap_or_default())
    }

    fn list_attributes(&self, node: &str) -> Result<Vec<String>> {
        Ok(self
            .node_or_err(node, "")?
            .attrs
            .keys()
            .map(str::to_string)
            .collect())
    }

    fn node_type(&self, node: &str) -> Result<String> {
        Ok(self.node_or_err(node, "")?.node_type.clone())
    }

    fn list_nodes_of_types(&self, types: &[&str]) -> Vec<String> {
        self.nodes
            .values()
            .filter(|n| types.contains(&n.node_type.as_str()))
            .map(|n| n.name.clone())
            .collect()
    }

    fn parent_of(&self, node: &str) -> Result<String> {
        Ok(self.node_or_err(node, "")?.transform.clone())
    }

    fn handle_of(&self, node: &str) -> Result<NodeHandle> {
        Ok(self.node_or_err(node, "")?.uuid)
    }

    fn name_of(&self, handle: NodeHandle) -> Result<String> {
        Ok(self.live(handle)?.name.clone())
    }
}

impl NotificationService for MemoryScene {
    fn on_attribute_changed(&mut self, node: NodeHandle, attr: &str) -> Result<SubscriptionId> {
        let n = self.live(node)?;
        if !n.attrs.contains(attr) {
            return Err(Error::not_found(&n.name, attr));
        }
        Ok(self.watch(Watch::Attr(node, attr.to_string())))
    }

    fn on_deleted(&mut self, node: NodeHandle) -> Result<SubscriptionId> {
        self.live(node)?;
        Ok(self.watch(Watch::Deleted(node)))
    }

    fn on_renamed(&mut self, node: NodeHandle) -> Result<SubscriptionId> {
        self.live(node)?;
        Ok(self.watch(Watch::Renamed(node)))
    }

    fn on_population_changed(&mut self) -> SubscriptionId {
        self.watch(Watch::Population)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let removed = self.watches.remove(&id).is_some();
        if removed {
            self.stats.unsubscribed += 1;
            // Drop anything still queued for it
            self.queue.retain(|n| n.subscription != id);
        }
        removed
    }

    fn poll(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.queue)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::transfer::{TransferEngine, TransferRequest};
    use crate::entities::SchemaRegistry;

    fn point_light(scene: &mut MemoryScene) -> NodeHandle {
        let h = scene.add_node("keyShape", "key", EntityType::PointLight);
        scene.add_attr(h, "intensity", AttrValue::Float(1.0));
        scene.add_attr(h, "aiSamples", AttrValue::Int(1));
        scene.add_attr(h, "color", AttrValue::Vec3([1.0, 1.0, 1.0]));
        h
    }

    #[test]
    fn test_set_notifies_watchers_in_order() {
        let mut scene = MemoryScene::new();
        let h = point_light(&mut scene);
        let a = scene.on_attribute_changed(h, "intensity").unwrap();
        let b = scene.on_attribute_changed(h, "intensity").unwrap();
        let _other = scene.on_attribute_changed(h, "color").unwrap();

        scene.set("keyShape", "intensity", &AttrValue::Float(2.0)).unwrap();
        let notes = scene.poll();
        let ids: Vec<SubscriptionId> = notes.iter().map(|n| n.subscription).collect();
        assert_eq!(ids, vec![a, b]);
        assert!(scene.poll().is_empty());
    }

    #[test]
    fn test_set_clamps_to_bounds() {
        let mut scene = MemoryScene::new();
        let h = point_light(&mut scene);
        scene.set_bounds(h, "intensity", AttrBounds::new(Some(0.0), Some(5.0)));
        scene.set("keyShape", "intensity", &AttrValue::Float(9.0)).unwrap();
        assert_eq!(scene.value("keyShape", "intensity"), Some(AttrValue::Float(5.0)));
    }

    #[test]
    fn test_set_converts_numeric_representation() {
        let mut scene = MemoryScene::new();
        point_light(&mut scene);
        scene.set("keyShape", "aiSamples", &AttrValue::Float(3.4)).unwrap();
        assert_eq!(scene.value("keyShape", "aiSamples"), Some(AttrValue::Int(3)));
    }

    #[test]
    fn test_set_rejects_wrong_kind() {
        let mut scene = MemoryScene::new();
        point_light(&mut scene);
        let err = scene.set("keyShape", "color", &AttrValue::Float(1.0)).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }

    #[test]
    fn test_subscribe_missing_attribute_fails() {
        let mut scene = MemoryScene::new();
        let h = point_light(&mut scene);
        assert!(scene.on_attribute_changed(h, "coneAngle").is_err());
        assert_eq!(scene.stats().subscribed, 0);
    }

    #[test]
    fn test_unsubscribe_drops_pending() {
        let mut scene = MemoryScene::new();
        let h = point_light(&mut scene);
        let id = scene.on_attribute_changed(h, "intensity").unwrap();
        scene.touch(h, "intensity");
        assert!(scene.unsubscribe(id));
        assert!(!scene.unsubscribe(id));
        assert!(scene.poll().is_empty());
        assert_eq!(scene.stats(), SubscriptionStats { subscribed: 1, unsubscribed: 1 });
    }

    #[test]
    fn test_rename_keeps_handle() {
        let mut scene = MemoryScene::new();
        let h = point_light(&mut scene);
        let id = scene.on_renamed(h).unwrap();
        scene.rename_transform(h, "rim");
        assert_eq!(scene.name_of(h).unwrap(), "rimShape");
        assert_eq!(scene.parent_of("rimShape").unwrap(), "rim");
        assert_eq!(scene.handle_of("rimShape").unwrap(), h);
        assert_eq!(scene.poll(), vec![Notification { subscription: id, kind: NotificationKind::Renamed }]);
    }

    #[test]
    fn test_delete_retires_node_watches() {
        let mut scene = MemoryScene::new();
        let h = point_light(&mut scene);
        let deleted = scene.on_deleted(h).unwrap();
        scene.on_renamed(h).unwrap();
        scene.on_attribute_changed(h, "intensity").unwrap();

        scene.delete(h);
        assert_eq!(scene.poll(), vec![Notification { subscription: deleted, kind: NotificationKind::Deleted }]);
        // Only the attribute watch is left for its owner to release
        assert_eq!(scene.subscriptions_on(h), 1);
        assert_eq!(scene.stats().unsubscribed, 0);
    }

    #[test]
    fn test_population_notifications() {
        let mut scene = MemoryScene::new();
        let id = scene.on_population_changed();
        point_light(&mut scene);
        let notes = scene.poll();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].subscription, id);
        assert_eq!(notes[0].kind, NotificationKind::PopulationChanged);
    }

    #[test]
    fn test_json_round_trip_keeps_handles() {
        let mut scene = MemoryScene::new();
        let h = point_light(&mut scene);
        scene.set_bounds(h, "intensity", AttrBounds::new(Some(0.0), None));

        let loaded = MemoryScene::from_json(&scene.to_json().unwrap()).unwrap();
        assert_eq!(loaded.handle_of("keyShape").unwrap(), h);
        assert_eq!(loaded.value("keyShape", "color"), Some(AttrValue::Vec3([1.0, 1.0, 1.0])));
        assert_eq!(loaded.bounds("keyShape", "intensity").unwrap().min, Some(0.0));
    }

    #[test]
    fn test_set_rejects_inverted_bounds() {
        let mut scene = MemoryScene::new();
        let h = point_light(&mut scene);
        scene.set_bounds(h, "intensity", AttrBounds::new(Some(5.0), Some(0.0)));
        let id = scene.on_attribute_changed(h, "intensity").unwrap();

        let err = scene.set("keyShape", "intensity", &AttrValue::Float(2.0)).unwrap_err();
        assert!(matches!(err, Error::Rejected { .. }));
        assert_eq!(scene.value("keyShape", "intensity"), Some(AttrValue::Float(1.0)));
        assert!(scene.poll().iter().all(|n| n.subscription != id));
    }

    #[test]
    fn test_load_hand_written_scene() {
        let json = r#"{ "nodes": [
            { "name": "key", "transform": "", "type": "transform",
              "attrs": { "visibility": { "Bool": true } } },
            { "name": "keyShape", "transform": "key", "type": "pointLight",
              "attrs": { "intensity": { "Float": 2.0 }, "color": { "Vec3": [1.0, 0.5, 0.25] } },
              "bounds": { "intensity": { "min": 0.0, "max": null } } },
            { "name": "fillShape", "transform": "fill", "type": "pointLight",
              "attrs": { "intensity": { "Float": 1.0 } } }
        ] }"#;
        let mut scene = MemoryScene::from_json(json).unwrap();
        assert_eq!(scene.value("keyShape", "intensity"), Some(AttrValue::Float(2.0)));
        assert_eq!(scene.value("key", "visibility"), Some(AttrValue::Bool(true)));
        assert_eq!(scene.list_attributes("keyShape").unwrap(), vec!["intensity", "color"]);

        let key = scene.handle_of("keyShape").unwrap();
        let fill = scene.handle_of("fillShape").unwrap();
        let report = TransferEngine::new(Arc::new(SchemaRegistry::builtin()))
            .transfer(&mut scene, &TransferRequest::new(key, vec!["intensity".into()], vec![fill]))
            .unwrap();
        assert!(report.is_clean());
        assert_eq!(scene.value("fillShape", "intensity"), Some(AttrValue::Float(2.0)));
    }

    #[test]
    fn test_rename_transform_renames_parent_node() {
        let mut scene = MemoryScene::new();
        let xform = scene.add_transform("key");
        let h = point_light(&mut scene);
        let id = scene.on_renamed(xform).unwrap();

        scene.rename_transform(h, "rim");
        assert_eq!(scene.name_of(xform).unwrap(), "rim");
        assert_eq!(scene.handle_of("rim").unwrap(), xform);
        assert_eq!(scene.value("rim", "visibility"), Some(AttrValue::Bool(true)));
        assert!(scene.poll().iter().any(|n| n.subscription == id));
        // Transforms are not lights
        assert_eq!(scene.list_nodes_of_types(&["pointLight"]), vec!["rimShape"]);
    }

    #[test]
    fn test_list_nodes_of_types() {
        let mut scene = MemoryScene::new();
        point_light(&mut scene);
        scene.add_raw_node("bodyShape", "body", "mesh");
        assert_eq!(scene.list_nodes_of_types(&["pointLight", "spotLight"]), vec!["keyShape"]);
    }
}
