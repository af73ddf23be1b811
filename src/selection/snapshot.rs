// ============================================================================
// spark-selection - Selection Snapshots
// Plain, ordered copies of a store for persistence and debugging
// ============================================================================

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SnapshotError};

/// An owner-ordered copy of a store. Ids within an owner are sorted.
///
/// Serializes as `{"owners": {"<owner>": ["id", ...]}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSnapshot<K: Ord, I> {
    pub owners: BTreeMap<K, Vec<I>>,
}

impl<K: Ord, I> Default for SelectionSnapshot<K, I> {
    fn default() -> Self {
        Self {
            owners: BTreeMap::new(),
        }
    }
}

impl<K: Ord, I: Ord> SelectionSnapshot<K, I> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a selection, keeping ids sorted and unique.
    pub fn insert(&mut self, owner: K, id: I) -> bool {
        let ids = self.owners.entry(owner).or_default();
        match ids.binary_search(&id) {
            Ok(_) => false,
            Err(at) => {
                ids.insert(at, id);
                true
            }
        }
    }

    pub fn owner_count(&self) -> usize {
        self.owners.len()
    }

    /// Total selections across owners.
    pub fn len(&self) -> usize {
        self.owners.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, owner: &K, id: &I) -> bool {
        self.owners
            .get(owner)
            .is_some_and(|ids| ids.binary_search(id).is_ok())
    }

    /// Every `(owner, id)` pair in order.
    pub fn pairs(&self) -> impl Iterator<Item = (&K, &I)> {
        self.owners
            .iter()
            .flat_map(|(owner, ids)| ids.iter().map(move |id| (owner, id)))
    }
}

impl<K, I> SelectionSnapshot<K, I>
where
    K: Ord + Serialize,
    I: Serialize,
{
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|source| SnapshotError::Encode {
            what: "selection snapshot",
            source,
        })
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|source| SnapshotError::Encode {
            what: "selection snapshot",
            source,
        })
    }
}

impl<K, I> SelectionSnapshot<K, I>
where
    K: Ord + DeserializeOwned,
    I: Ord + DeserializeOwned,
{
    /// Decode a snapshot. Ids are re-sorted and deduplicated, so hand-written
    /// documents need not be canonical.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut snapshot: Self =
            serde_json::from_str(json).map_err(|source| SnapshotError::Decode {
                what: "selection snapshot",
                source,
            })?;
        for ids in snapshot.owners.values_mut() {
            ids.sort();
            ids.dedup();
        }
        Ok(snapshot)
    }
}

impl<K: Ord, I: Ord> FromIterator<(K, I)> for SelectionSnapshot<K, I> {
    fn from_iter<T: IntoIterator<Item = (K, I)>>(iter: T) -> Self {
        let mut snapshot = Self::new();
        for (owner, id) in iter {
            snapshot.insert(owner, id);
        }
        snapshot
    }
}
