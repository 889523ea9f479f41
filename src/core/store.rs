//! Seams to the host application: live attribute store and change notifications.
//!
//! Both are consumed, never implemented, by the core. The host owns the nodes;
//! names passed here are current node names, resolved from a [`NodeHandle`]
//! right before each call.
//!
//! Notifications are queued by the service and pulled with
//! [`NotificationService::poll`], in delivery order. A [`Notification`] names
//! only the subscription it was raised for; the subscriber keeps the mapping
//! from id to (node, attribute).

use serde::{Deserialize, Serialize};

use crate::entities::{AttrBounds, AttrValue, NodeHandle};
use crate::error::Result;

/// Read/write access to live node attributes.
pub trait AttributeStore {
    /// Current value; [`Error::NotFound`](crate::error::Error::NotFound) if the attribute is absent.
    fn get(&self, node: &str, attr: &str) -> Result<AttrValue>;

    /// Write a value. The store may clamp it, or reject it as read-only or mistyped.
    fn set(&mut self, node: &str, attr: &str, value: &AttrValue) -> Result<()>;

    /// Declared numeric bounds, per direction.
    fn bounds(&self, node: &str, attr: &str) -> Result<AttrBounds>;

    /// Attribute names present on the live node, in host order.
    fn list_attributes(&self, node: &str) -> Result<Vec<String>>;

    /// Host type name of the node (e.g. `"pointLight"`).
    fn node_type(&self, node: &str) -> Result<String>;

    /// Names of all live nodes whose type is one of `types`.
    fn list_nodes_of_types(&self, types: &[&str]) -> Vec<String>;

    /// Name of the parent (transform) node.
    fn parent_of(&self, node: &str) -> Result<String>;

    fn handle_of(&self, node: &str) -> Result<NodeHandle>;

    /// Current name for a handle; [`Error::StaleHandle`](crate::error::Error::StaleHandle) once deleted.
    fn name_of(&self, handle: NodeHandle) -> Result<String>;
}

/// Disposable subscription token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubscriptionId(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub enum NotificationKind {
    AttributeChanged { attr: String },
    Renamed,
    Deleted,
    /// Nodes were created or an undo changed the node population.
    PopulationChanged,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub subscription: SubscriptionId,
    pub kind: NotificationKind,
}

/// Subscription primitives. Subscriptions are keyed by handle, so they
/// survive renames.
///
/// Node-level subscriptions (`on_deleted`, `on_renamed`) are retired by the
/// service once their node is deleted; the delete notification itself is
/// still delivered. Attribute subscriptions stay active until unsubscribed.
pub trait NotificationService {
    fn on_attribute_changed(&mut self, node: NodeHandle, attr: &str) -> Result<SubscriptionId>;

    fn on_deleted(&mut self, node: NodeHandle) -> Result<SubscriptionId>;

    fn on_renamed(&mut self, node: NodeHandle) -> Result<SubscriptionId>;

    fn on_population_changed(&mut self) -> SubscriptionId;

    /// Release a subscription. Returns false if it was not active.
    fn unsubscribe(&mut self, id: SubscriptionId) -> bool;

    /// Drain pending notifications in delivery order.
    fn poll(&mut self) -> Vec<Notification>;
}

/// A host that provides both seams, as the sync controller needs.
pub trait SceneHost: AttributeStore + NotificationService {}

impl<T: AttributeStore + NotificationService> SceneHost for T {}
