//! Synchronous publish/subscribe.
//!
//! [`Observer`] is a cheaply cloneable handle to a shared subscriber list. Every clone notifies
//! the same subscribers, so the state machine can keep one handle while renderers, the caret,
//! and tests subscribe through another.
//!
//! `notify` snapshots the subscriber list before iterating, which makes it safe for a handler to
//! subscribe or unsubscribe (itself or others) while an event is being delivered:
//!
//! - a handler removed mid-delivery is not called for the in-flight event;
//! - a handler added mid-delivery only receives later events.
//!
//! # Example
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use typing_core::Observer;
//!
//! let bus: Observer<u32> = Observer::new();
//! let seen = Rc::new(Cell::new(0));
//! let seen_clone = seen.clone();
//!
//! let subscription = bus.subscribe(move |value| seen_clone.set(seen_clone.get() + *value));
//! bus.notify(&2);
//! subscription.unsubscribe();
//! bus.notify(&5);
//!
//! assert_eq!(seen.get(), 2);
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// Identifier of a registered handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler<T> = Rc<RefCell<dyn FnMut(&T)>>;

struct Registry<T> {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Handler<T>)>,
}

impl<T> Registry<T> {
    fn contains(&self, id: SubscriptionId) -> bool {
        self.subscribers.iter().any(|(sid, _)| *sid == id)
    }

    fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }
}

/// Synchronous multicast notification bus.
pub struct Observer<T> {
    registry: Rc<RefCell<Registry<T>>>,
}

impl<T> Observer<T> {
    /// Create a bus with no subscribers.
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                next_id: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Register `handler`. Handlers are invoked in subscription order.
    pub fn subscribe<F>(&self, handler: F) -> Subscription<T>
    where
        F: FnMut(&T) + 'static,
    {
        let mut registry = self.registry.borrow_mut();
        let id = SubscriptionId(registry.next_id);
        registry.next_id += 1;
        registry.subscribers.push((id, Rc::new(RefCell::new(handler))));

        Subscription {
            id,
            registry: Rc::downgrade(&self.registry),
        }
    }

    /// Remove a handler. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.registry.borrow_mut().remove(id)
    }

    /// Deliver `value` to every current subscriber.
    pub fn notify(&self, value: &T) {
        let snapshot: Vec<(SubscriptionId, Handler<T>)> = self
            .registry
            .borrow()
            .subscribers
            .iter()
            .map(|(id, handler)| (*id, handler.clone()))
            .collect();

        for (id, handler) in snapshot {
            if !self.registry.borrow().contains(id) {
                continue;
            }
            match handler.try_borrow_mut() {
                Ok(mut handler) => (&mut *handler)(value),
                Err(_) => {
                    tracing::warn!(?id, "skipping re-entrant notification handler");
                }
            }
        }
    }

    /// Number of registered handlers.
    pub fn subscriber_count(&self) -> usize {
        self.registry.borrow().subscribers.len()
    }
}

impl<T> Default for Observer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Observer<T> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
        }
    }
}

impl<T> fmt::Debug for Observer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Handle returned by [`Observer::subscribe`].
///
/// Dropping the handle does not unsubscribe; call [`Subscription::unsubscribe`].
#[must_use = "keep the subscription to be able to unsubscribe later"]
pub struct Subscription<T> {
    id: SubscriptionId,
    registry: Weak<RefCell<Registry<T>>>,
}

impl<T> Subscription<T> {
    /// Identifier usable with [`Observer::unsubscribe`].
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Remove the handler. Returns `false` if it was already removed or the bus is gone.
    pub fn unsubscribe(self) -> bool {
        match self.registry.upgrade() {
            Some(registry) => registry.borrow_mut().remove(self.id),
            None => false,
        }
    }
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
