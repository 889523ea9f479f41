//! Core engine modules - store seams, proxy, sync, transfer, events
//!
//! Independent of any UI; everything reaches the scene through the
//! [`store`] traits.

pub mod event_bus;
pub mod proxy;
pub mod store;
pub mod sync;
pub mod sync_events;
pub mod transfer;

// Re-exports for convenience
pub use event_bus::{EventBus, ListenerId};
pub use proxy::{DEFAULT_BOUND, LiveAttr};
pub use store::{AttributeStore, Notification, NotificationKind, NotificationService, SceneHost, SubscriptionId};
pub use sync::{Binding, BindingState, SyncController, SyncSession};
pub use sync_events::SyncEvent;
pub use transfer::{FailureReason, TransferEngine, TransferFailure, TransferReport, TransferRequest, transferable_attributes};
