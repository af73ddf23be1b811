// ============================================================================
// spark-selection - SelectionState
// The store and markers handed to collaborators as one value
// ============================================================================

use super::markers::AuxiliaryMarkers;
use super::options::StoreOptions;
use super::store::SelectionStore;
use super::SelectionKey;

/// Shared selection state. Cloning shares both parts.
#[derive(Clone, Debug)]
pub struct SelectionState<K: SelectionKey = String, I: SelectionKey = String> {
    pub selection: SelectionStore<K, I>,
    pub markers: AuxiliaryMarkers,
}

impl<K: SelectionKey, I: SelectionKey> SelectionState<K, I> {
    pub fn new() -> Self {
        Self::with_options(StoreOptions::default())
    }

    pub fn with_options(options: StoreOptions) -> Self {
        Self {
            selection: SelectionStore::with_options(options),
            markers: AuxiliaryMarkers::new(),
        }
    }
}

impl<K: SelectionKey, I: SelectionKey> Default for SelectionState<K, I> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let state: SelectionState = SelectionState::new();
        let other = state.clone();

        other.selection.add("tags".into(), "t1".into());
        other.markers.set_search_term("foo");

        assert_eq!(state.selection.selected_all(), vec!["t1".to_string()]);
        assert_eq!(state.markers.search_term().as_deref(), Some("foo"));
    }

    #[test]
    fn options_reach_the_store() {
        let state: SelectionState<u8, u8> =
            SelectionState::with_options(StoreOptions::new().with_prune_empty_owners(true));
        assert!(state.selection.options().prune_empty_owners);
    }
}
