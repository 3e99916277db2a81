//! Host event subscriptions
//!
//! Subscriptions are acquired as [`Subscription`] guards and released when the
//! guard drops, so every acquisition made while mounting is undone on teardown
//! and on early-return paths alike.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostEvent {
    /// Viewport size and pixel density changes
    Resize,
    /// Swallow file drags that land outside the viewer
    DragSuppression,
}

#[derive(Debug, Default)]
struct Registry {
    next_id: u64,
    active: HashMap<u64, HostEvent>,
}

/// Shared record of live subscriptions, consulted by the host when routing events
#[derive(Debug, Clone, Default)]
pub struct EventHub {
    registry: Rc<RefCell<Registry>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, event: HostEvent) -> Subscription {
        let mut registry = self.registry.borrow_mut();
        registry.next_id += 1;
        let id = registry.next_id;
        registry.active.insert(id, event);
        log::debug!("Subscribed to {:?} ({})", event, id);

        Subscription {
            id,
            event,
            registry: Rc::downgrade(&self.registry),
        }
    }

    pub fn is_subscribed(&self, event: HostEvent) -> bool {
        self.count(event) > 0
    }

    pub fn count(&self, event: HostEvent) -> usize {
        self.registry
            .borrow()
            .active
            .values()
            .filter(|&&e| e == event)
            .count()
    }

    pub fn total(&self) -> usize {
        self.registry.borrow().active.len()
    }
}

/// Live subscription; unsubscribes on drop
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    event: HostEvent,
    registry: Weak<RefCell<Registry>>,
}

impl Subscription {
    pub fn event(&self) -> HostEvent {
        self.event
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().active.remove(&self.id);
            log::debug!("Unsubscribed from {:?} ({})", self.event, self.id);
        }
    }
}
