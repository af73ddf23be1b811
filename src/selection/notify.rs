// ============================================================================
// spark-selection - Selection Notifications
// Events emitted by the store and the sinks that receive them
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Event name emitted when an identifier is selected.
pub const ADD_EVENT: &str = "addToGlobalSelected";

/// Event name emitted when an identifier is deselected.
pub const DELETE_EVENT: &str = "deleteFromGlobalSelected";

// =============================================================================
// SELECTION EVENT
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectionEvent<K, I> {
    Added { owner: K, id: I },
    Removed { owner: K, id: I },
}

impl<K, I> SelectionEvent<K, I> {
    /// The wire name listeners key on.
    pub fn name(&self) -> &'static str {
        match self {
            SelectionEvent::Added { .. } => ADD_EVENT,
            SelectionEvent::Removed { .. } => DELETE_EVENT,
        }
    }

    pub fn owner(&self) -> &K {
        match self {
            SelectionEvent::Added { owner, .. } | SelectionEvent::Removed { owner, .. } => owner,
        }
    }

    pub fn id(&self) -> &I {
        match self {
            SelectionEvent::Added { id, .. } | SelectionEvent::Removed { id, .. } => id,
        }
    }

    pub fn is_added(&self) -> bool {
        matches!(self, SelectionEvent::Added { .. })
    }
}

// =============================================================================
// SINKS
// =============================================================================

/// Receiver of selection events.
///
/// Implemented for any `Fn(&SelectionEvent<K, I>)`, so a closure can be
/// passed wherever a sink is expected.
pub trait SelectionSink<K, I> {
    fn emit(&self, event: &SelectionEvent<K, I>);
}

impl<K, I, F> SelectionSink<K, I> for F
where
    F: Fn(&SelectionEvent<K, I>),
{
    fn emit(&self, event: &SelectionEvent<K, I>) {
        self(event)
    }
}

/// Sink that drops everything.
pub struct NoopSink;

impl<K, I> SelectionSink<K, I> for NoopSink {
    fn emit(&self, _event: &SelectionEvent<K, I>) {}
}

/// Sink that records every event it receives. Clones share the log.
pub struct EventLog<K, I> {
    events: Rc<RefCell<Vec<SelectionEvent<K, I>>>>,
}

impl<K: Clone, I: Clone> EventLog<K, I> {
    pub fn new() -> Self {
        Self {
            events: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn events(&self) -> Vec<SelectionEvent<K, I>> {
        self.events.borrow().clone()
    }

    /// Event names in arrival order.
    pub fn names(&self) -> Vec<&'static str> {
        self.events.borrow().iter().map(SelectionEvent::name).collect()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drain the log.
    pub fn take(&self) -> Vec<SelectionEvent<K, I>> {
        self.events.take()
    }
}

impl<K: Clone, I: Clone> Default for EventLog<K, I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, I> Clone for EventLog<K, I> {
    fn clone(&self) -> Self {
        Self {
            events: self.events.clone(),
        }
    }
}

impl<K: Clone, I: Clone> SelectionSink<K, I> for EventLog<K, I> {
    fn emit(&self, event: &SelectionEvent<K, I>) {
        self.events.borrow_mut().push(event.clone());
    }
}

// =============================================================================
// SINK REGISTRY
// =============================================================================

/// Store-wide sinks, keyed by registration id.
pub(crate) struct SinkRegistry<K, I> {
    next_id: Cell<u64>,
    sinks: RefCell<Vec<(u64, Rc<dyn SelectionSink<K, I>>)>>,
}

impl<K, I> SinkRegistry<K, I> {
    pub(crate) fn new() -> Self {
        Self {
            next_id: Cell::new(0),
            sinks: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn add(&self, sink: Rc<dyn SelectionSink<K, I>>) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.sinks.borrow_mut().push((id, sink));
        id
    }

    pub(crate) fn remove(&self, id: u64) {
        self.sinks.borrow_mut().retain(|(sink_id, _)| *sink_id != id);
    }

    /// Copy of the current sinks, so a sink may (un)subscribe while being
    /// notified.
    pub(crate) fn snapshot(&self) -> Vec<Rc<dyn SelectionSink<K, I>>> {
        self.sinks
            .borrow()
            .iter()
            .map(|(_, sink)| sink.clone())
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.sinks.borrow().len()
    }
}

// =============================================================================
// SUBSCRIPTION
// =============================================================================

/// Keeps a store-wide sink registered. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes its sink immediately"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub(crate) fn new(unsubscribe: impl FnOnce() + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    pub fn unsubscribe(mut self) {
        if let Some(f) = self.unsubscribe.take() {
            f();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(f) = self.unsubscribe.take() {
            f();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}
