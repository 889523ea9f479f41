//! Synchronization controller: keeps panel bindings in step with the live scene.
//!
//! # Lifecycle
//! - `open()`: subscribe to population changes, enumerate lights, bind
//! - `refresh()`: dispose every binding, re-enumerate, rebuild
//! - `close()`: dispose everything, including the population subscription
//!
//! Per binding: `Unbound -> Bound -> Disposed`. Binding subscribes first and
//! then pulls the initial value; if the pull fails the subscription is
//! released again.
//!
//! # Notifications
//! The host queues notifications; [`SyncController::pump`] drains and handles
//! them in delivery order. Each one runs to completion before the next:
//! - attribute change → full re-read, cached value replaced (last good value
//!   kept on error)
//! - rename → names re-resolved from the handle, no resubscription
//! - delete → every binding of the entity disposed, one `EntityRemoved`
//! - population change → refresh if the recognised light count moved
//!
//! UI edits go straight to the store via [`SyncController::edit`]; the cache
//! only changes when the resulting notification is pumped.
//!
//! # Transform bindings
//! Descriptors from [`SchemaRegistry::transform_defs`] (`visibility`) bind on
//! the light's parent transform, subscribed through the parent's handle. They
//! belong to the light's entry and are disposed with it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use indexmap::IndexMap;
use log::{debug, info, warn};

use super::event_bus::EventBus;
use super::proxy::LiveAttr;
use super::store::{Notification, NotificationKind, SceneHost, SubscriptionId};
use super::sync_events::SyncEvent;
use super::transfer::{TransferEngine, TransferReport, TransferRequest};
use crate::config::Settings;
use crate::entities::{AttrDef, AttrKind, AttrValue, EntityInstance, EntityType, NodeHandle, SchemaRegistry};
use crate::error::{Error, Result};
use crate::widgets::ae::{ControlSpec, build_control};

const VISIBILITY: &str = "visibility";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingState {
    Unbound,
    Bound,
    Disposed,
}

/// Live link between one entity attribute and its cached display value.
/// `handle` is the node read and written: the light shape or its transform.
#[derive(Debug)]
pub struct Binding {
    handle: NodeHandle,
    instance: Weak<RefCell<EntityInstance>>,
    def: &'static AttrDef,
    subscription: Option<SubscriptionId>,
    cached: Option<AttrValue>,
    control: Option<ControlSpec>,
    state: BindingState,
}

impl Binding {
    fn new(instance: &Rc<RefCell<EntityInstance>>, def: &'static AttrDef, handle: NodeHandle) -> Self {
        Self {
            handle,
            instance: Rc::downgrade(instance),
            def,
            subscription: None,
            cached: None,
            control: None,
            state: BindingState::Unbound,
        }
    }

    fn bind<H: SceneHost>(&mut self, host: &mut H, sentinel: f64) -> Result<SubscriptionId> {
        let attr = LiveAttr::new(self.handle, self.def);
        let sub = host.on_attribute_changed(self.handle, self.def.name)?;
        let value = match attr.get(&*host) {
            Ok(v) => v,
            Err(e) => {
                host.unsubscribe(sub);
                return Err(e);
            }
        };
        let bounds = match self.def.kind {
            AttrKind::Scalar => attr.bounds_with(&*host, sentinel).unwrap_or((-sentinel, sentinel)),
            _ => (-sentinel, sentinel),
        };
        self.control = build_control(self.def, bounds);
        self.cached = Some(value);
        self.subscription = Some(sub);
        self.state = BindingState::Bound;
        Ok(sub)
    }

    fn refresh<H: SceneHost>(&mut self, host: &H) -> Result<AttrValue> {
        let value = LiveAttr::new(self.handle, self.def).get(host)?;
        self.cached = Some(value.clone());
        Ok(value)
    }

    /// Release the subscription. False if the binding was not bound.
    fn dispose<H: SceneHost>(&mut self, host: &mut H) -> bool {
        if self.state != BindingState::Bound {
            return false;
        }
        if let Some(sub) = self.subscription.take() {
            host.unsubscribe(sub);
        }
        self.state = BindingState::Disposed;
        true
    }

    pub fn def(&self) -> &'static AttrDef {
        self.def
    }

    pub fn handle(&self) -> NodeHandle {
        self.handle
    }

    pub fn attr(&self) -> &'static str {
        self.def.name
    }

    pub fn cached(&self) -> Option<&AttrValue> {
        self.cached.as_ref()
    }

    pub fn control(&self) -> Option<&ControlSpec> {
        self.control.as_ref()
    }

    pub fn state(&self) -> BindingState {
        self.state
    }

    pub fn subscription(&self) -> Option<SubscriptionId> {
        self.subscription
    }

    /// Owning instance, while it is still in the session.
    pub fn instance(&self) -> Option<Rc<RefCell<EntityInstance>>> {
        self.instance.upgrade()
    }
}

struct SessionEntry {
    instance: Rc<RefCell<EntityInstance>>,
    bindings: Vec<Binding>,
    /// Rename and delete subscriptions.
    node_subs: [SubscriptionId; 2],
}

/// Displayed entities and their bindings.
#[derive(Default)]
pub struct SyncSession {
    entries: IndexMap<NodeHandle, SessionEntry>,
    population: Option<SubscriptionId>,
}

impl SyncSession {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn handles(&self) -> impl Iterator<Item = NodeHandle> + '_ {
        self.entries.keys().copied()
    }

    pub fn binding_count(&self) -> usize {
        self.entries.values().map(|e| e.bindings.len()).sum()
    }
}

#[derive(Debug, Clone, Copy)]
enum Route {
    Attr { handle: NodeHandle, index: usize },
    Renamed(NodeHandle),
    Deleted(NodeHandle),
    Population,
}

pub struct SyncController<H: SceneHost> {
    host: H,
    registry: Arc<SchemaRegistry>,
    settings: Settings,
    session: SyncSession,
    routes: HashMap<SubscriptionId, Route>,
    bus: EventBus,
    open: bool,
}

impl<H: SceneHost> SyncController<H> {
    pub fn new(host: H, registry: Arc<SchemaRegistry>, settings: Settings) -> Self {
        let bus = EventBus::with_limit(settings.event_queue_limit);
        Self {
            host,
            registry,
            settings,
            session: SyncSession::default(),
            routes: HashMap::new(),
            bus,
            open: false,
        }
    }

    // ========== Session lifecycle ==========

    /// Build the session. Opening an open session refreshes it.
    pub fn open(&mut self) {
        if self.open {
            self.refresh();
            return;
        }
        let id = self.host.on_population_changed();
        self.routes.insert(id, Route::Population);
        self.session.population = Some(id);
        self.open = true;
        self.rebuild();
    }

    /// Dispose all, re-enumerate, rebuild.
    pub fn refresh(&mut self) {
        if !self.open {
            debug!("refresh on closed session ignored");
            return;
        }
        self.dispose_all();
        self.rebuild();
    }

    pub fn close(&mut self) {
        self.dispose_all();
        if let Some(id) = self.session.population.take() {
            self.routes.remove(&id);
            self.host.unsubscribe(id);
        }
        self.open = false;
        debug!("session closed");
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    // ========== Notifications ==========

    /// Drain host notifications and handle them in order. Returns how many were seen.
    pub fn pump(&mut self) -> usize {
        let notes = self.host.poll();
        let count = notes.len();
        for note in notes {
            self.handle(note);
        }
        count
    }

    pub fn handle(&mut self, note: Notification) {
        let Some(route) = self.routes.get(&note.subscription).copied() else {
            debug!("notification for released subscription {:?}", note.subscription);
            return;
        };
        match (route, note.kind) {
            (Route::Attr { handle, index }, NotificationKind::AttributeChanged { .. }) => {
                self.refresh_binding(handle, index)
            }
            (Route::Renamed(handle), NotificationKind::Renamed) => self.entity_renamed(handle),
            (Route::Deleted(handle), NotificationKind::Deleted) => self.entity_deleted(handle),
            (Route::Population, NotificationKind::PopulationChanged) => self.population_changed(),
            (route, kind) => warn!("unexpected {:?} on {:?}", kind, route),
        }
    }

    // ========== Edits ==========

    /// Write-through edit. The cached value is not touched here.
    pub fn edit(&mut self, handle: NodeHandle, attr: &str, value: &AttrValue) -> Result<()> {
        let entry = self.session.entries.get(&handle).ok_or(Error::StaleHandle(handle))?;
        let target = entry
            .bindings
            .iter()
            .find(|b| b.attr() == attr)
            .map(|b| LiveAttr::new(b.handle, b.def))
            .ok_or_else(|| Error::not_found(&entry.instance.borrow().display_name, attr))?;
        target.set(&mut self.host, value)
    }

    /// Toggle the parent transform's visibility. Write-through, like [`Self::edit`].
    pub fn set_visibility(&mut self, handle: NodeHandle, visible: bool) -> Result<()> {
        self.edit(handle, VISIBILITY, &AttrValue::Bool(visible))
    }

    /// Cached transform visibility; `None` when the light has no transform binding.
    pub fn is_visible(&self, handle: NodeHandle) -> Option<bool> {
        match self.cached_value(handle, VISIBILITY)? {
            AttrValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Run a transfer against the host. Destinations in the session pick up
    /// the new values on the next `pump()`.
    pub fn transfer(&mut self, request: &TransferRequest) -> Result<TransferReport> {
        TransferEngine::new(Arc::clone(&self.registry)).transfer(&mut self.host, request)
    }

    // ========== Accessors ==========

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn session(&self) -> &SyncSession {
        &self.session
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Direct host access, for host-side actions (creating, renaming nodes).
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn instance(&self, handle: NodeHandle) -> Option<EntityInstance> {
        self.session.entries.get(&handle).map(|e| e.instance.borrow().clone())
    }

    /// Instances in enumeration order.
    pub fn instances(&self) -> Vec<EntityInstance> {
        self.session
            .entries
            .values()
            .map(|e| e.instance.borrow().clone())
            .collect()
    }

    pub fn bindings(&self, handle: NodeHandle) -> &[Binding] {
        self.session
            .entries
            .get(&handle)
            .map(|e| e.bindings.as_slice())
            .unwrap_or(&[])
    }

    pub fn cached_value(&self, handle: NodeHandle, attr: &str) -> Option<&AttrValue> {
        self.bindings(handle).iter().find(|b| b.attr() == attr)?.cached()
    }

    // ========== Internals ==========

    /// Live lights of recognised types, in host order.
    fn candidates(&self) -> Vec<(String, EntityType)> {
        let types: Vec<&str> = EntityType::all().iter().map(EntityType::type_name).collect();
        let mut out = Vec::new();
        for node in self.host.list_nodes_of_types(&types) {
            let entity_type = match self.host.node_type(&node).and_then(|t| t.parse::<EntityType>()) {
                Ok(t) => t,
                Err(e) => {
                    warn!("skipping {}: {}", node, e);
                    continue;
                }
            };
            if self.settings.strict_schema {
                if let Err(e) = self.registry.lookup_strict(entity_type) {
                    warn!("skipping {}: {}", node, e);
                    continue;
                }
            }
            out.push((node, entity_type));
        }
        out
    }

    fn rebuild(&mut self) {
        for (name, entity_type) in self.candidates() {
            if let Err(e) = self.build_entity(&name, entity_type) {
                warn!("cannot bind {}: {}", name, e);
            }
        }
        let (entities, bindings) = (self.session.len(), self.session.binding_count());
        info!("session rebuilt: {} lights, {} bindings", entities, bindings);
        self.bus.emit(SyncEvent::SessionRebuilt { entities, bindings });
    }

    fn build_entity(&mut self, name: &str, entity_type: EntityType) -> Result<()> {
        let handle = self.host.handle_of(name)?;
        if self.session.entries.contains_key(&handle) {
            debug!("{} already in session", name);
            return Ok(());
        }

        let mut instance = EntityInstance::new(handle, entity_type, name);
        instance.transform_name = self.host.parent_of(name).unwrap_or_else(|_| name.to_string());
        // Shapes without a separate parent node get no transform bindings
        instance.transform_handle = self
            .host
            .handle_of(&instance.transform_name)
            .ok()
            .filter(|t| *t != handle);
        let transform = instance.transform_handle;
        let instance = Rc::new(RefCell::new(instance));

        let renamed = self.host.on_renamed(handle)?;
        let deleted = match self.host.on_deleted(handle) {
            Ok(id) => id,
            Err(e) => {
                self.host.unsubscribe(renamed);
                return Err(e);
            }
        };

        let mut bindings = Vec::new();
        let (light_defs, transform_defs) = (self.registry.lookup(entity_type), self.registry.transform_defs());
        self.bind_defs(&instance, handle, light_defs, &mut bindings);
        if let Some(transform) = transform {
            self.bind_defs(&instance, transform, transform_defs, &mut bindings);
        }
        self.routes.insert(renamed, Route::Renamed(handle));
        self.routes.insert(deleted, Route::Deleted(handle));

        debug!("bound {} ({}) with {} bindings", name, entity_type, bindings.len());
        self.session.entries.insert(
            handle,
            SessionEntry {
                instance,
                bindings,
                node_subs: [renamed, deleted],
            },
        );
        self.bus.emit(SyncEvent::EntityAdded {
            handle,
            entity_type,
            name: name.to_string(),
        });
        Ok(())
    }

    /// Bind the displayable `defs` on `target`, appending to `bindings`.
    fn bind_defs(
        &mut self,
        instance: &Rc<RefCell<EntityInstance>>,
        target: NodeHandle,
        defs: &'static [AttrDef],
        bindings: &mut Vec<Binding>,
    ) {
        let handle = instance.borrow().handle;
        for def in defs.iter().filter(|d| d.is_display()) {
            let mut binding = Binding::new(instance, def, target);
            match binding.bind(&mut self.host, self.settings.default_bound) {
                Ok(sub) => {
                    self.routes.insert(
                        sub,
                        Route::Attr {
                            handle,
                            index: bindings.len(),
                        },
                    );
                    bindings.push(binding);
                }
                // Optional attributes (plugin not loaded, older nodes) are normal
                Err(e) => debug!("{}.{} not bound: {}", instance.borrow().display_name, def.name, e),
            }
        }
    }

    fn dispose_all(&mut self) {
        let entries: Vec<SessionEntry> = self.session.entries.drain(..).map(|(_, e)| e).collect();
        for entry in entries {
            self.dispose_entry(entry, true);
        }
    }

    /// Dispose every binding of one entity. Node-level subscriptions are
    /// only released when the node still exists.
    fn dispose_entry(&mut self, mut entry: SessionEntry, release_node_subs: bool) -> usize {
        let mut released = 0;
        for binding in &mut entry.bindings {
            if let Some(sub) = binding.subscription {
                self.routes.remove(&sub);
            }
            if binding.dispose(&mut self.host) {
                released += 1;
            }
        }
        for sub in entry.node_subs {
            self.routes.remove(&sub);
            if release_node_subs {
                self.host.unsubscribe(sub);
            }
        }
        released
    }

    fn refresh_binding(&mut self, handle: NodeHandle, index: usize) {
        let Some(binding) = self
            .session
            .entries
            .get_mut(&handle)
            .and_then(|e| e.bindings.get_mut(index))
        else {
            return;
        };
        match binding.refresh(&self.host) {
            Ok(value) => self.bus.emit(SyncEvent::BindingRefreshed {
                handle,
                def: binding.def(),
                value,
            }),
            Err(e) => warn!("refresh {} failed, keeping last value: {}", binding.attr(), e),
        }
    }

    fn entity_renamed(&mut self, handle: NodeHandle) {
        let Some(entry) = self.session.entries.get(&handle) else {
            return;
        };
        let name = match self.host.name_of(handle) {
            Ok(n) => n,
            Err(e) => {
                warn!("rename of {} unresolved: {}", handle, e);
                return;
            }
        };
        let transform_name = self.host.parent_of(&name).unwrap_or_else(|_| name.clone());
        {
            let mut instance = entry.instance.borrow_mut();
            debug!("renamed {} -> {}", instance.display_name, name);
            instance.display_name = name.clone();
            instance.transform_name = transform_name.clone();
        }
        self.bus.emit(SyncEvent::EntityRenamed {
            handle,
            name,
            transform_name,
        });
    }

    fn entity_deleted(&mut self, handle: NodeHandle) {
        let Some(entry) = self.session.entries.shift_remove(&handle) else {
            return;
        };
        let name = entry.instance.borrow().display_name.clone();
        // The host has already retired the node-level subscriptions
        let released = self.dispose_entry(entry, false);
        info!("{} deleted, {} bindings disposed", name, released);
        self.bus.emit(SyncEvent::EntityRemoved { handle, name });
    }

    fn population_changed(&mut self) {
        if !self.settings.refresh_on_population_change {
            debug!("population change ignored by settings");
            return;
        }
        let live = self.candidates().len();
        if live == self.session.len() {
            debug!("population change with same light count ({})", live);
            return;
        }
        info!("light count {} -> {}, refreshing", self.session.len(), live);
        self.refresh();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::{AttributeStore, NotificationService};
    use crate::entities::AttrBounds;
    use crate::entities::attr_schemas::POINT_SCHEMA;
    use crate::scene::MemoryScene;

    /// Point light with three displayable attributes present.
    fn point_light(scene: &mut MemoryScene, shape: &str, transform: &str) -> NodeHandle {
        let h = scene.add_node(shape, transform, EntityType::PointLight);
        scene.add_attr(h, "color", AttrValue::Vec3([1.0, 1.0, 1.0]));
        scene.add_attr(h, "intensity", AttrValue::Float(1.0));
        scene.add_attr(h, "emitDiffuse", AttrValue::Bool(true));
        // Transfer-only, never bound
        scene.add_attr(h, "decayRate", AttrValue::Int(2));
        h
    }

    fn controller(scene: MemoryScene) -> SyncController<MemoryScene> {
        let mut ctl = SyncController::new(scene, Arc::new(SchemaRegistry::builtin()), Settings::default());
        ctl.open();
        ctl.bus().poll();
        ctl
    }

    fn scene_with_key() -> (MemoryScene, NodeHandle) {
        let mut scene = MemoryScene::new();
        let h = point_light(&mut scene, "keyShape", "key");
        scene.add_raw_node("bodyShape", "body", "mesh");
        // Creation notifications predate the session
        scene.poll();
        (scene, h)
    }

    #[test]
    fn test_open_binds_present_display_attributes() {
        let (scene, h) = scene_with_key();
        let mut ctl = SyncController::new(scene, Arc::new(SchemaRegistry::builtin()), Settings::default());
        ctl.open();

        let attrs: Vec<&str> = ctl.bindings(h).iter().map(Binding::attr).collect();
        assert_eq!(attrs, vec!["color", "intensity", "emitDiffuse"]);
        assert!(ctl.bindings(h).iter().all(|b| b.state() == BindingState::Bound));
        assert_eq!(ctl.cached_value(h, "intensity"), Some(&AttrValue::Float(1.0)));

        let inst = ctl.instance(h).unwrap();
        assert_eq!(inst.display_name, "keyShape");
        assert_eq!(inst.transform_name, "key");

        let events = ctl.bus().poll();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], SyncEvent::EntityAdded { handle, .. } if handle == h));
        assert_eq!(events[1], SyncEvent::SessionRebuilt { entities: 1, bindings: 3 });

        // 3 attributes + rename + delete + population
        assert_eq!(ctl.host().active_subscriptions(), 6);
    }

    #[test]
    fn test_controls_built_from_bounds() {
        let (mut scene, h) = scene_with_key();
        scene.set_bounds(h, "intensity", AttrBounds::new(Some(0.0), Some(5.0)));
        let ctl = controller(scene);

        let b = &ctl.bindings(h)[1];
        assert!(matches!(b.control(), Some(ControlSpec::Numeric { max, .. }) if *max == 5.0));
        // Color has no control but is still bound
        assert_eq!(ctl.bindings(h)[0].control(), None);
    }

    #[test]
    fn test_attribute_change_refreshes_cache() {
        let (scene, h) = scene_with_key();
        let mut ctl = controller(scene);

        ctl.host_mut().set("keyShape", "intensity", &AttrValue::Float(3.0)).unwrap();
        assert_eq!(ctl.pump(), 1);
        assert_eq!(ctl.cached_value(h, "intensity"), Some(&AttrValue::Float(3.0)));
        assert_eq!(
            ctl.bus().poll(),
            vec![SyncEvent::BindingRefreshed {
                handle: h,
                def: POINT_SCHEMA.get("intensity").unwrap(),
                value: AttrValue::Float(3.0)
            }]
        );
    }

    #[test]
    fn test_edit_is_write_through() {
        let (mut scene, h) = scene_with_key();
        scene.set_bounds(h, "intensity", AttrBounds::new(Some(0.0), Some(5.0)));
        let mut ctl = controller(scene);

        ctl.edit(h, "intensity", &AttrValue::Float(9.0)).unwrap();
        // No optimistic update
        assert_eq!(ctl.cached_value(h, "intensity"), Some(&AttrValue::Float(1.0)));
        ctl.pump();
        // Display reflects what the store accepted
        assert_eq!(ctl.cached_value(h, "intensity"), Some(&AttrValue::Float(5.0)));
    }

    #[test]
    fn test_edit_errors() {
        let (scene, h) = scene_with_key();
        let mut ctl = controller(scene);

        let err = ctl.edit(h, "emitDiffuse", &AttrValue::Float(1.0)).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
        assert!(matches!(
            ctl.edit(h, "decayRate", &AttrValue::Int(1)),
            Err(Error::NotFound { .. })
        ));
        let ghost = NodeHandle::new();
        assert_eq!(ctl.edit(ghost, "intensity", &AttrValue::Float(1.0)), Err(Error::StaleHandle(ghost)));
    }

    #[test]
    fn test_refresh_failure_keeps_last_value() {
        let (scene, h) = scene_with_key();
        let mut ctl = controller(scene);

        ctl.host_mut().remove_attr(h, "intensity");
        ctl.host_mut().touch(h, "intensity");
        ctl.pump();

        assert_eq!(ctl.cached_value(h, "intensity"), Some(&AttrValue::Float(1.0)));
        assert!(ctl.bus().poll().is_empty());
    }

    #[test]
    fn test_rename_keeps_bindings_and_subscriptions() {
        let (scene, h) = scene_with_key();
        let mut ctl = controller(scene);
        let before = ctl.host().stats();

        ctl.host_mut().rename_transform(h, "rim");
        ctl.pump();

        assert_eq!(ctl.host().stats(), before);
        assert_eq!(ctl.bindings(h).len(), 3);
        let inst = ctl.instance(h).unwrap();
        assert_eq!(inst.display_name, "rimShape");
        assert_eq!(inst.transform_name, "rim");

        // Back-reference sees the new name
        let owner = ctl.bindings(h)[0].instance().unwrap();
        assert_eq!(owner.borrow().display_name, "rimShape");

        // Writes target the current name
        ctl.edit(h, "intensity", &AttrValue::Float(2.5)).unwrap();
        assert_eq!(ctl.host().value("rimShape", "intensity"), Some(AttrValue::Float(2.5)));
    }

    #[test]
    fn test_delete_disposes_all_bindings_once() {
        let (mut scene, key) = scene_with_key();
        let fill = point_light(&mut scene, "fillShape", "fill");
        scene.poll();
        let mut ctl = controller(scene);
        let n = ctl.bindings(key).len();
        let before = ctl.host().stats().unsubscribed;
        let weak = Rc::downgrade(&ctl.bindings(key)[0].instance().unwrap());

        ctl.host_mut().delete(key);
        ctl.pump();

        let removed: Vec<SyncEvent> = ctl
            .bus()
            .poll()
            .into_iter()
            .filter(|e| matches!(e, SyncEvent::EntityRemoved { .. }))
            .collect();
        assert_eq!(
            removed,
            vec![SyncEvent::EntityRemoved {
                handle: key,
                name: "keyShape".into()
            }]
        );
        assert_eq!(ctl.host().stats().unsubscribed - before, n);
        assert_eq!(ctl.host().subscriptions_on(key), 0);
        assert!(ctl.instance(key).is_none());
        assert!(weak.upgrade().is_none());

        // The other light is untouched
        assert_eq!(ctl.bindings(fill).len(), 3);
        assert_eq!(ctl.host().subscriptions_on(fill), 5);
    }

    #[test]
    fn test_population_change_picks_up_new_light() {
        let (scene, _) = scene_with_key();
        let mut ctl = controller(scene);

        let fill = point_light(ctl.host_mut(), "fillShape", "fill");
        ctl.pump();

        assert_eq!(ctl.session().len(), 2);
        assert_eq!(ctl.bindings(fill).len(), 3);
        let events = ctl.bus().poll();
        assert_eq!(events.last(), Some(&SyncEvent::SessionRebuilt { entities: 2, bindings: 6 }));
    }

    #[test]
    fn test_population_change_same_count_no_refresh() {
        let (scene, _) = scene_with_key();
        let mut ctl = controller(scene);
        let before = ctl.host().stats();

        ctl.host_mut().add_raw_node("propShape", "prop", "mesh");
        ctl.pump();

        assert_eq!(ctl.host().stats(), before);
        assert!(ctl.bus().poll().is_empty());
    }

    #[test]
    fn test_population_change_disabled() {
        let (scene, _) = scene_with_key();
        let settings = Settings {
            refresh_on_population_change: false,
            ..Settings::default()
        };
        let mut ctl = SyncController::new(scene, Arc::new(SchemaRegistry::builtin()), settings);
        ctl.open();

        point_light(ctl.host_mut(), "fillShape", "fill");
        ctl.pump();
        assert_eq!(ctl.session().len(), 1);

        ctl.refresh();
        assert_eq!(ctl.session().len(), 2);
    }

    #[test]
    fn test_refresh_rebuilds_without_leaks() {
        let (scene, h) = scene_with_key();
        let mut ctl = controller(scene);
        let active = ctl.host().active_subscriptions();

        ctl.refresh();
        ctl.refresh();

        assert_eq!(ctl.host().active_subscriptions(), active);
        assert_eq!(ctl.bindings(h).len(), 3);
    }

    #[test]
    fn test_close_releases_everything() {
        let (scene, h) = scene_with_key();
        let mut ctl = controller(scene);
        ctl.close();

        assert!(!ctl.is_open());
        assert_eq!(ctl.host().active_subscriptions(), 0);
        assert!(ctl.bindings(h).is_empty());
        let stats = ctl.host().stats();
        assert_eq!(stats.subscribed, stats.unsubscribed);
    }

    #[test]
    fn test_unregistered_type_lenient_and_strict() {
        let registry = Arc::new(SchemaRegistry::new().with(EntityType::PointLight, &POINT_SCHEMA));
        let build = |strict: bool| {
            let (mut scene, _) = scene_with_key();
            let spot = scene.add_node("spotShape", "spot", EntityType::SpotLight);
            scene.add_attr(spot, "intensity", AttrValue::Float(1.0));
            let settings = Settings {
                strict_schema: strict,
                ..Settings::default()
            };
            let mut ctl = SyncController::new(scene, Arc::clone(&registry), settings);
            ctl.open();
            (ctl, spot)
        };

        let (lenient, spot) = build(false);
        assert_eq!(lenient.session().len(), 2);
        assert!(lenient.bindings(spot).is_empty());

        let (strict, spot) = build(true);
        assert_eq!(strict.session().len(), 1);
        assert!(strict.instance(spot).is_none());
    }

    #[test]
    fn test_transfer_refreshes_destination_bindings() {
        let (mut scene, key) = scene_with_key();
        let fill = point_light(&mut scene, "fillShape", "fill");
        scene.poll();
        let mut ctl = controller(scene);
        ctl.edit(key, "intensity", &AttrValue::Float(4.0)).unwrap();
        ctl.pump();

        let report = ctl
            .transfer(&TransferRequest::new(key, vec!["intensity".into()], vec![fill]))
            .unwrap();
        assert!(report.is_clean());
        ctl.pump();
        assert_eq!(ctl.cached_value(fill, "intensity"), Some(&AttrValue::Float(4.0)));
    }

    fn scene_with_transform() -> (MemoryScene, NodeHandle, NodeHandle) {
        let mut scene = MemoryScene::new();
        let xform = scene.add_transform("key");
        let h = point_light(&mut scene, "keyShape", "key");
        scene.poll();
        (scene, h, xform)
    }

    #[test]
    fn test_visibility_bound_through_parent() {
        let (scene, h, xform) = scene_with_transform();
        let mut ctl = controller(scene);

        let attrs: Vec<&str> = ctl.bindings(h).iter().map(Binding::attr).collect();
        assert_eq!(attrs, vec!["color", "intensity", "emitDiffuse", "visibility"]);
        assert_eq!(ctl.bindings(h)[3].handle(), xform);
        assert!(matches!(ctl.bindings(h)[3].control(), Some(ControlSpec::Toggle { .. })));
        assert_eq!(ctl.instance(h).unwrap().transform_handle, Some(xform));
        assert_eq!(ctl.is_visible(h), Some(true));
        // Subscribed on the transform, not on the shape
        assert_eq!(ctl.host().subscriptions_on(xform), 1);
        assert_eq!(ctl.host().subscriptions_on(h), 5);

        ctl.host_mut().set("key", "visibility", &AttrValue::Bool(false)).unwrap();
        assert_eq!(ctl.pump(), 1);
        assert_eq!(ctl.is_visible(h), Some(false));
        let events = ctl.bus().poll();
        assert!(matches!(
            events.as_slice(),
            [SyncEvent::BindingRefreshed { handle, def, value: AttrValue::Bool(false) }]
                if *handle == h && def.name == "visibility"
        ));
    }

    #[test]
    fn test_set_visibility_is_write_through() {
        let (scene, h, _) = scene_with_transform();
        let mut ctl = controller(scene);

        ctl.set_visibility(h, false).unwrap();
        assert_eq!(ctl.is_visible(h), Some(true));
        ctl.pump();
        assert_eq!(ctl.is_visible(h), Some(false));
        assert_eq!(ctl.host().value("key", "visibility"), Some(AttrValue::Bool(false)));

        // Still addressed by handle after the transform is renamed
        ctl.host_mut().rename_transform(h, "rim");
        ctl.pump();
        ctl.set_visibility(h, true).unwrap();
        assert_eq!(ctl.host().value("rim", "visibility"), Some(AttrValue::Bool(true)));
    }

    #[test]
    fn test_visibility_needs_transform_node() {
        let (scene, h) = scene_with_key();
        let mut ctl = controller(scene);

        assert_eq!(ctl.instance(h).unwrap().transform_handle, None);
        assert_eq!(ctl.is_visible(h), None);
        assert!(matches!(ctl.set_visibility(h, false), Err(Error::NotFound { .. })));
    }

    #[test]
    fn test_delete_releases_transform_binding() {
        let (scene, h, xform) = scene_with_transform();
        let mut ctl = controller(scene);
        let n = ctl.bindings(h).len();
        let before = ctl.host().stats().unsubscribed;

        ctl.host_mut().delete(h);
        ctl.pump();

        assert_eq!(n, 4);
        assert_eq!(ctl.host().stats().unsubscribed - before, n);
        assert_eq!(ctl.host().subscriptions_on(xform), 0);
        assert_eq!(ctl.host().subscriptions_on(h), 0);
    }
}
