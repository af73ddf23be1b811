// ============================================================================
// spark-selection - SelectionStore
// Owner-keyed selection sets with a derived flattened view
// ============================================================================
//
// Layout:
//
//   owners: ReactiveMap<K, ReactiveSet<I>>   (shared with the derived)
//   selection: Derived<Vec<I>>               (flatten of every set)
//   sinks: store-wide SelectionSinks
//
// Every mutation runs inside `batch` so effects observing the store run once,
// after the owners map is no longer borrowed. Sinks are notified after the
// batch, for the same reason.
// ============================================================================

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use tracing::{debug, trace};

use super::notify::{SelectionEvent, SelectionSink, SinkRegistry, Subscription};
use super::options::StoreOptions;
use super::snapshot::SelectionSnapshot;
use super::SelectionKey;
use crate::collections::{ReactiveMap, ReactiveSet};
use crate::primitives::derived::{derived, Derived};
use crate::reactivity::batching::batch;

type Owners<K, I> = ReactiveMap<K, ReactiveSet<I>>;

struct StoreInner<K: SelectionKey, I: SelectionKey> {
    owners: Rc<RefCell<Owners<K, I>>>,
    selection: Derived<Vec<I>>,
    sinks: SinkRegistry<K, I>,
    options: StoreOptions,
}

/// Selection state keyed by owner.
///
/// Cheap to clone; clones share state.
///
/// # Example
///
/// ```
/// use spark_selection::{EventLog, SelectionStore};
///
/// let store: SelectionStore<&str, u32> = SelectionStore::new();
/// let log: EventLog<&str, u32> = EventLog::new();
///
/// store.add_with("list", 7, Some(&log));
/// store.add("grid", 9);
/// store.remove("list", 7);
///
/// assert_eq!(store.selected_all(), vec![9]);
/// assert_eq!(log.names(), vec!["addToGlobalSelected"]);
/// ```
pub struct SelectionStore<K: SelectionKey, I: SelectionKey> {
    inner: Rc<StoreInner<K, I>>,
}

impl<K: SelectionKey, I: SelectionKey> Clone for SelectionStore<K, I> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<K: SelectionKey, I: SelectionKey> SelectionStore<K, I> {
    pub fn new() -> Self {
        Self::with_options(StoreOptions::default())
    }

    pub fn with_options(options: StoreOptions) -> Self {
        let owners: Rc<RefCell<Owners<K, I>>> = Rc::new(RefCell::new(ReactiveMap::new()));
        let selection = derived({
            let owners = owners.clone();
            move || flatten(&owners.borrow())
        });

        Self {
            inner: Rc::new(StoreInner {
                owners,
                selection,
                sinks: SinkRegistry::new(),
                options,
            }),
        }
    }

    pub fn options(&self) -> StoreOptions {
        self.inner.options
    }

    // =========================================================================
    // MUTATORS
    // =========================================================================

    /// Select `id` under `owner`. Returns true if it was not selected yet.
    pub fn add(&self, owner: K, id: I) -> bool {
        self.add_with(owner, id, None)
    }

    /// Like `add`, additionally emitting `addToGlobalSelected` to `sink`.
    pub fn add_with(&self, owner: K, id: I, sink: Option<&dyn SelectionSink<K, I>>) -> bool {
        let inserted = self.mutate(|owners| {
            owners
                .get_or_insert_with(owner.clone(), ReactiveSet::new)
                .insert(id.clone())
        });
        debug!(?owner, ?id, inserted, "selection add");
        self.emit(SelectionEvent::Added { owner, id }, inserted, sink);
        inserted
    }

    /// Deselect `id` under `owner`. Unknown owners and ids are no-ops.
    /// Returns true if it was selected.
    pub fn remove(&self, owner: K, id: I) -> bool {
        self.remove_with(owner, id, None)
    }

    /// Like `remove`, additionally emitting `deleteFromGlobalSelected` to
    /// `sink`.
    pub fn remove_with(&self, owner: K, id: I, sink: Option<&dyn SelectionSink<K, I>>) -> bool {
        let prune = self.inner.options.prune_empty_owners;
        let removed = self.mutate(|owners| {
            let Some(set) = owners.get_mut(&owner) else {
                return false;
            };
            let removed = set.remove(&id);
            if removed && prune && set.raw().is_empty() {
                owners.remove(&owner);
            }
            removed
        });
        debug!(?owner, ?id, removed, "selection remove");
        self.emit(SelectionEvent::Removed { owner, id }, removed, sink);
        removed
    }

    /// Flip `id` under `owner`. Returns whether it is selected afterwards.
    pub fn toggle(&self, owner: K, id: I) -> bool {
        let selected = self
            .inner
            .owners
            .borrow()
            .raw()
            .get(&owner)
            .is_some_and(|set| set.raw().contains(&id));
        if selected {
            self.remove(owner, id);
        } else {
            self.add(owner, id);
        }
        !selected
    }

    /// Deselect everything under `owner`, emitting one removal per id.
    /// Returns how many ids were removed.
    pub fn clear_owner(&self, owner: &K) -> usize {
        let prune = self.inner.options.prune_empty_owners;
        let removed: Vec<I> = self.mutate(|owners| {
            let Some(set) = owners.get_mut(owner) else {
                return Vec::new();
            };
            let ids: Vec<I> = set.raw().iter().cloned().collect();
            set.clear();
            if prune {
                owners.remove(owner);
            }
            ids
        });
        debug!(?owner, count = removed.len(), "selection clear owner");
        for id in &removed {
            self.emit(
                SelectionEvent::Removed {
                    owner: owner.clone(),
                    id: id.clone(),
                },
                true,
                None,
            );
        }
        removed.len()
    }

    /// Deselect everything, emitting one removal per `(owner, id)`.
    pub fn clear(&self) -> usize {
        let prune = self.inner.options.prune_empty_owners;
        let removed: Vec<(K, I)> = self.mutate(|owners| {
            let pairs: Vec<(K, I)> = owners
                .raw()
                .iter()
                .flat_map(|(owner, set)| {
                    set.raw().iter().map(move |id| (owner.clone(), id.clone()))
                })
                .collect();
            if prune {
                owners.clear();
            } else {
                let keys: Vec<K> = owners.raw().keys().cloned().collect();
                for key in &keys {
                    if let Some(set) = owners.get_mut(key) {
                        set.clear();
                    }
                }
            }
            pairs
        });
        debug!(count = removed.len(), "selection clear");
        for (owner, id) in &removed {
            self.emit(
                SelectionEvent::Removed {
                    owner: owner.clone(),
                    id: id.clone(),
                },
                true,
                None,
            );
        }
        removed.len()
    }

    /// Drop owner entries whose sets are empty. Returns how many were
    /// dropped.
    pub fn prune_empty(&self) -> usize {
        let dropped = self.mutate(|owners| {
            let before = owners.raw().len();
            owners.retain(|_, set| !set.raw().is_empty());
            before - owners.raw().len()
        });
        if dropped > 0 {
            debug!(dropped, "pruned empty owners");
        }
        dropped
    }

    fn mutate<R>(&self, f: impl FnOnce(&mut Owners<K, I>) -> R) -> R {
        batch(|| f(&mut self.inner.owners.borrow_mut()))
    }

    fn emit(
        &self,
        event: SelectionEvent<K, I>,
        changed: bool,
        sink: Option<&dyn SelectionSink<K, I>>,
    ) {
        if !changed && !self.inner.options.notify_unchanged {
            return;
        }
        trace!(event = event.name(), "emitting selection event");
        if let Some(sink) = sink {
            sink.emit(&event);
        }
        for sink in self.inner.sinks.snapshot() {
            sink.emit(&event);
        }
    }

    // =========================================================================
    // READS
    // =========================================================================

    /// Every selected id across owners, in unspecified order. An id selected
    /// under several owners appears once per owner.
    pub fn selected_all(&self) -> Vec<I> {
        self.inner.selection.get()
    }

    /// Every selected id, deduplicated.
    pub fn selected_unique(&self) -> HashSet<I> {
        self.inner.selection.with(|ids| ids.iter().cloned().collect())
    }

    /// The derived flattened selection, for composing further deriveds.
    pub fn selection(&self) -> Derived<Vec<I>> {
        self.inner.selection.clone()
    }

    pub fn is_selected(&self, owner: &K, id: &I) -> bool {
        self.inner
            .owners
            .borrow()
            .get(owner)
            .is_some_and(|set| set.contains(id))
    }

    pub fn selected_for(&self, owner: &K) -> Vec<I> {
        self.inner
            .owners
            .borrow()
            .get(owner)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Owner keys with an entry (including empty ones unless pruned).
    pub fn owners(&self) -> Vec<K> {
        self.inner.owners.borrow().keys().cloned().collect()
    }

    pub fn owner_count(&self) -> usize {
        self.inner.owners.borrow().len()
    }

    /// Total selections, counting an id once per owner.
    pub fn len(&self) -> usize {
        self.inner.selection.with(Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // =========================================================================
    // SUBSCRIPTIONS
    // =========================================================================

    /// Register a sink for every add/remove on this store.
    pub fn subscribe(&self, sink: impl SelectionSink<K, I> + 'static) -> Subscription {
        let id = self.inner.sinks.add(Rc::new(sink));
        debug!(sink = id, "selection sink subscribed");
        let weak = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.sinks.remove(id);
                debug!(sink = id, "selection sink unsubscribed");
            }
        })
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.sinks.len()
    }
}

// =============================================================================
// SINGLE-SET MODE
// =============================================================================

impl<K: SelectionKey + Default, I: SelectionKey> SelectionStore<K, I> {
    /// `add` under the default owner key.
    pub fn add_global(&self, id: I) -> bool {
        self.add(K::default(), id)
    }

    /// `remove` under the default owner key.
    pub fn remove_global(&self, id: I) -> bool {
        self.remove(K::default(), id)
    }
}

// =============================================================================
// SNAPSHOTS
// =============================================================================

impl<K: SelectionKey + Ord, I: SelectionKey + Ord> SelectionStore<K, I> {
    /// Copy the current state. Does not track.
    pub fn snapshot(&self) -> SelectionSnapshot<K, I> {
        let owners = self.inner.owners.borrow();
        let owners = owners
            .raw()
            .iter()
            .map(|(owner, set)| {
                let mut ids: Vec<I> = set.raw().iter().cloned().collect();
                ids.sort();
                (owner.clone(), ids)
            })
            .collect();
        SelectionSnapshot { owners }
    }

    pub fn from_snapshot(snapshot: &SelectionSnapshot<K, I>, options: StoreOptions) -> Self {
        let store = Self::with_options(options);
        store.restore(snapshot);
        store
    }

    /// Replace the whole state with `snapshot`. Restoring is not a selection
    /// gesture: sinks are not notified, reactive readers are.
    pub fn restore(&self, snapshot: &SelectionSnapshot<K, I>) {
        let prune = self.inner.options.prune_empty_owners;
        self.mutate(|owners| {
            owners.clear();
            for (owner, ids) in &snapshot.owners {
                if prune && ids.is_empty() {
                    continue;
                }
                owners.insert(owner.clone(), ids.iter().cloned().collect());
            }
        });
        debug!(
            owners = snapshot.owner_count(),
            ids = snapshot.len(),
            "selection restored"
        );
    }
}

impl<K: SelectionKey, I: SelectionKey> Default for SelectionStore<K, I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: SelectionKey, I: SelectionKey> std::fmt::Debug for SelectionStore<K, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionStore")
            .field("owners", &*self.inner.owners.borrow())
            .field("options", &self.inner.options)
            .field("subscribers", &self.inner.sinks.len())
            .finish()
    }
}

fn flatten<K: SelectionKey, I: SelectionKey>(owners: &Owners<K, I>) -> Vec<I> {
    owners
        .values()
        .flat_map(|set| set.iter().cloned())
        .collect()
}
