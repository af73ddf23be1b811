// ============================================================================
// spark-selection - Store Options
// ============================================================================

use serde::{Deserialize, Serialize};

/// Behavior switches for a `SelectionStore`.
///
/// Deserializes from a partial document; missing fields take their defaults:
///
/// ```
/// use spark_selection::StoreOptions;
///
/// let opts: StoreOptions = serde_json::from_str(r#"{"prune_empty_owners": true}"#).unwrap();
/// assert!(opts.prune_empty_owners);
/// assert!(opts.notify_unchanged);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreOptions {
    /// Drop an owner's entry once its last id is removed.
    pub prune_empty_owners: bool,

    /// Notify sinks even when an add/remove leaves the state unchanged
    /// (re-adding a selected id, removing an absent one).
    pub notify_unchanged: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            prune_empty_owners: false,
            notify_unchanged: true,
        }
    }
}

impl StoreOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prune_empty_owners(mut self, prune: bool) -> Self {
        self.prune_empty_owners = prune;
        self
    }

    pub fn with_notify_unchanged(mut self, notify: bool) -> Self {
        self.notify_unchanged = notify;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = StoreOptions::default();
        assert!(!opts.prune_empty_owners);
        assert!(opts.notify_unchanged);
    }

    #[test]
    fn builders_chain() {
        let opts = StoreOptions::new()
            .with_prune_empty_owners(true)
            .with_notify_unchanged(false);
        assert_eq!(
            opts,
            StoreOptions {
                prune_empty_owners: true,
                notify_unchanged: false,
            }
        );
    }

    #[test]
    fn empty_document_is_default() {
        let opts: StoreOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts, StoreOptions::default());
    }
}
