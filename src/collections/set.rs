// ============================================================================
// spark-selection - ReactiveSet
// A HashSet with per-item reactivity; the storage of one owner's selection
// ============================================================================

use std::borrow::Borrow;
use std::collections::hash_set::Iter;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::rc::Rc;

use super::{bump, store};
use crate::core::types::SourceInner;
use crate::reactivity::tracking::track_read;

/// A reactive HashSet.
///
/// - `contains(&x)` tracks `x` alone once `x` has a signal
/// - `iter()` tracks every insert and removal
/// - `len()` tracks the size
///
/// # Example
///
/// ```
/// use spark_selection::collections::ReactiveSet;
///
/// let mut ids: ReactiveSet<String> = ReactiveSet::new();
/// assert!(ids.insert("a".to_string()));
/// assert!(!ids.insert("a".to_string()));
/// assert!(ids.contains("a"));
/// assert_eq!(ids.len(), 1);
/// ```
pub struct ReactiveSet<T>
where
    T: Eq + Hash + Clone + 'static,
{
    data: HashSet<T>,

    /// true while the item is present
    item_signals: HashMap<T, Rc<SourceInner<bool>>>,

    version: Rc<SourceInner<u64>>,
    size: Rc<SourceInner<usize>>,
}

impl<T> ReactiveSet<T>
where
    T: Eq + Hash + Clone + 'static,
{
    pub fn new() -> Self {
        Self::from_data(HashSet::new())
    }

    fn from_data(data: HashSet<T>) -> Self {
        let len = data.len();
        Self {
            data,
            item_signals: HashMap::new(),
            version: Rc::new(SourceInner::new(0)),
            size: Rc::new(SourceInner::new(len)),
        }
    }

    fn item_signal(&mut self, item: &T) -> Rc<SourceInner<bool>> {
        if let Some(sig) = self.item_signals.get(item) {
            return sig.clone();
        }
        let sig = Rc::new(SourceInner::new(self.data.contains(item)));
        self.item_signals.insert(item.clone(), sig.clone());
        sig
    }

    fn structure_changed(&self) {
        store(&self.size, self.data.len());
        bump(&self.version);
    }

    /// Number of items; tracks the size signal.
    pub fn len(&self) -> usize {
        track_read(self.size.clone());
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Membership test. Tracks the item's own signal if it has one,
    /// otherwise the version signal (so a later insert is seen).
    pub fn contains<Q>(&self, item: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.item_signals.get(item) {
            Some(sig) => track_read(sig.clone()),
            None => track_read(self.version.clone()),
        }
        self.data.contains(item)
    }

    /// Like `contains`, but creates the item signal so later checks only
    /// wake on this item.
    pub fn contains_tracked(&mut self, item: &T) -> bool {
        let sig = self.item_signal(item);
        track_read(sig);
        self.data.contains(item)
    }

    /// Returns true if the item was newly inserted.
    pub fn insert(&mut self, item: T) -> bool {
        if !self.data.insert(item.clone()) {
            return false;
        }
        let sig = self.item_signal(&item);
        store(&sig, true);
        self.structure_changed();
        true
    }

    /// Returns true if the item was present.
    pub fn remove<Q>(&mut self, item: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if !self.data.remove(item) {
            return false;
        }
        if let Some(sig) = self.item_signals.remove(item) {
            store(&sig, false);
        }
        self.structure_changed();
        true
    }

    pub fn clear(&mut self) {
        if self.data.is_empty() {
            return;
        }
        for (_, sig) in self.item_signals.drain() {
            store(&sig, false);
        }
        self.data.clear();
        self.structure_changed();
    }

    /// Iterate; tracks the version signal.
    pub fn iter(&self) -> Iter<'_, T> {
        track_read(self.version.clone());
        self.data.iter()
    }

    /// The underlying set, without tracking.
    pub fn raw(&self) -> &HashSet<T> {
        &self.data
    }
}

impl<T> Default for ReactiveSet<T>
where
    T: Eq + Hash + Clone + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for ReactiveSet<T>
where
    T: Eq + Hash + Clone + 'static,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_data(iter.into_iter().collect())
    }
}

impl<T> Clone for ReactiveSet<T>
where
    T: Eq + Hash + Clone + 'static,
{
    /// Same items, fresh signals.
    fn clone(&self) -> Self {
        Self::from_data(self.data.clone())
    }
}

impl<T> std::fmt::Debug for ReactiveSet<T>
where
    T: Eq + Hash + Clone + std::fmt::Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.data.iter()).finish()
    }
}
