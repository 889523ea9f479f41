//! LIGHTRIG - light attribute sync and transfer library
//!
//! Re-exports all modules for use by the binary target.

// Core engine (store seams, sync, transfer, events)
pub mod core;

// App modules
pub mod cli;
pub mod config;
pub mod entities;
pub mod error;
pub mod paths;
pub mod scene;
pub mod widgets;

// Re-export commonly used types from core
pub use core::event_bus::EventBus;
pub use core::store::{AttributeStore, NotificationService, SceneHost};
pub use core::sync::SyncController;
pub use core::sync_events::SyncEvent;
pub use core::transfer::{TransferEngine, TransferReport, TransferRequest};

// Re-export entities
pub use entities::{AttrValue, EntityType, NodeHandle, SchemaRegistry};
pub use error::{Error, Result};
pub use scene::MemoryScene;
