// ============================================================================
// spark-selection - ReactiveMap
// A HashMap with per-key reactivity; maps owner keys to selection sets
// ============================================================================

use std::borrow::Borrow;
use std::collections::hash_map::{Iter, Keys, Values};
use std::collections::HashMap;
use std::hash::Hash;
use std::rc::Rc;

use super::{bump, store};
use crate::core::types::SourceInner;
use crate::reactivity::tracking::track_read;

/// A reactive HashMap.
///
/// Key signals fire when a key is inserted, replaced or removed. Mutating a
/// value in place through `get_mut` or `get_or_insert_with` notifies nobody
/// about that value: values that need it (such as `ReactiveSet`) carry their
/// own signals.
///
/// # Example
///
/// ```
/// use spark_selection::collections::ReactiveMap;
///
/// let mut owners: ReactiveMap<String, u32> = ReactiveMap::new();
/// owners.insert("list-a".to_string(), 1);
/// *owners.get_or_insert_with("list-b".to_string(), || 0) += 5;
///
/// assert_eq!(owners.get("list-b"), Some(&5));
/// assert_eq!(owners.len(), 2);
/// ```
pub struct ReactiveMap<K, V>
where
    K: Eq + Hash + Clone + 'static,
{
    data: HashMap<K, V>,

    /// Incremented when the key's entry is inserted, replaced or removed
    key_signals: HashMap<K, Rc<SourceInner<u64>>>,

    version: Rc<SourceInner<u64>>,
    size: Rc<SourceInner<usize>>,
}

impl<K, V> ReactiveMap<K, V>
where
    K: Eq + Hash + Clone + 'static,
{
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            key_signals: HashMap::new(),
            version: Rc::new(SourceInner::new(0)),
            size: Rc::new(SourceInner::new(0)),
        }
    }

    fn touch_key(&mut self, key: &K) {
        match self.key_signals.get(key) {
            Some(sig) => bump(sig),
            None => {
                let sig = Rc::new(SourceInner::new(0));
                self.key_signals.insert(key.clone(), sig);
            }
        }
    }

    fn structure_changed(&self) {
        store(&self.size, self.data.len());
        bump(&self.version);
    }

    /// Number of entries; tracks the size signal.
    pub fn len(&self) -> usize {
        track_read(self.size.clone());
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Look up a key. Tracks the key's signal if it exists, otherwise the
    /// version signal so a later insert is seen.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.key_signals.get(key) {
            Some(sig) => track_read(sig.clone()),
            None => track_read(self.version.clone()),
        }
        self.data.get(key)
    }

    /// Mutable access without tracking or notification.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.data.get_mut(key)
    }

    /// Mutable access to the entry for `key`, creating it with `make` if
    /// absent. Creation notifies the key, size and version signals.
    pub fn get_or_insert_with(&mut self, key: K, make: impl FnOnce() -> V) -> &mut V {
        if !self.data.contains_key(&key) {
            self.data.insert(key.clone(), make());
            self.touch_key(&key);
            self.structure_changed();
        }
        match self.data.get_mut(&key) {
            Some(value) => value,
            None => unreachable!("entry was inserted above"),
        }
    }

    /// Insert or replace, returning the previous value. Always notifies.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let old = self.data.insert(key.clone(), value);
        self.touch_key(&key);
        if old.is_none() {
            self.structure_changed();
        }
        old
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let value = self.data.remove(key)?;
        if let Some(sig) = self.key_signals.remove(key) {
            bump(&sig);
        }
        self.structure_changed();
        Some(value)
    }

    /// Keep only the entries for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&K, &V) -> bool) {
        let dropped: Vec<K> = self
            .data
            .iter()
            .filter(|(k, v)| !keep(k, v))
            .map(|(k, _)| k.clone())
            .collect();
        if dropped.is_empty() {
            return;
        }
        for key in &dropped {
            self.data.remove(key);
            if let Some(sig) = self.key_signals.remove(key) {
                bump(&sig);
            }
        }
        self.structure_changed();
    }

    pub fn clear(&mut self) {
        if self.data.is_empty() {
            return;
        }
        for (_, sig) in self.key_signals.drain() {
            bump(&sig);
        }
        self.data.clear();
        self.structure_changed();
    }

    /// Tracks the version signal.
    pub fn keys(&self) -> Keys<'_, K, V> {
        track_read(self.version.clone());
        self.data.keys()
    }

    /// Tracks the version signal.
    pub fn values(&self) -> Values<'_, K, V> {
        track_read(self.version.clone());
        self.data.values()
    }

    /// Tracks the version signal.
    pub fn iter(&self) -> Iter<'_, K, V> {
        track_read(self.version.clone());
        self.data.iter()
    }

    /// The underlying map, without tracking.
    pub fn raw(&self) -> &HashMap<K, V> {
        &self.data
    }
}

impl<K, V> Default for ReactiveMap<K, V>
where
    K: Eq + Hash + Clone + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> std::fmt::Debug for ReactiveMap<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug + 'static,
    V: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.data.iter()).finish()
    }
}
