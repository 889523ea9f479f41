//! Event bus between the sync controller and the UI layer.
//!
//! Architecture:
//! - Listeners subscribe with callbacks (invoked immediately on emit)
//! - emit() invokes listeners AND queues the event for deferred processing
//! - poll() returns queued events for batch processing in the UI loop
//!
//! Listener order: FIFO (first-subscribed, first-called).
//! Listeners get a [`ListenerId`] back and can be removed individually.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, RwLock};

use log::warn;

use super::sync_events::SyncEvent;

/// Default maximum events in queue before oldest are evicted
pub const MAX_QUEUE_SIZE: usize = 1000;

type Callback = Arc<dyn Fn(&SyncEvent) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Pub/sub bus with a bounded deferred queue.
///
/// Cloning shares listeners and queue, so the UI can hold its own handle.
#[derive(Clone)]
pub struct EventBus {
    listeners: Arc<RwLock<Vec<(ListenerId, Callback)>>>,
    queue: Arc<Mutex<VecDeque<SyncEvent>>>,
    next_id: Arc<Mutex<u64>>,
    limit: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_limit(MAX_QUEUE_SIZE)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            listeners: Arc::new(RwLock::new(Vec::new())),
            queue: Arc::new(Mutex::new(VecDeque::new())),
            next_id: Arc::new(Mutex::new(0)),
            limit: limit.max(1),
        }
    }

    /// Register a listener, called synchronously on every emit.
    pub fn subscribe<F>(&self, callback: F) -> ListenerId
    where
        F: Fn(&SyncEvent) + Send + Sync + 'static,
    {
        let id = {
            let mut next = self.next_id.lock().unwrap_or_else(|e| e.into_inner());
            *next += 1;
            ListenerId(*next)
        };
        self.listeners
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, Arc::new(callback)));
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write().unwrap_or_else(|e| e.into_inner());
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    /// Invoke listeners immediately, then queue for poll().
    pub fn emit(&self, event: SyncEvent) {
        // Clone the list so a listener may subscribe/unsubscribe without deadlocking
        let listeners: Vec<Callback> = self
            .listeners
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();
        for cb in listeners {
            cb(&event);
        }

        let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
        if queue.len() >= self.limit {
            let evict_count = (queue.len() / 2).max(1);
            warn!("EventBus queue full ({} events), evicting oldest {}", queue.len(), evict_count);
            queue.drain(0..evict_count);
        }
        queue.push_back(event);
    }

    /// Take all queued events, oldest first.
    pub fn poll(&self) -> Vec<SyncEvent> {
        self.queue
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .drain(..)
            .collect()
    }

    pub fn pending(&self) -> usize {
        self.queue.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}
