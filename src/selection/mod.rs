// ============================================================================
// spark-selection - Selection
// Owner-keyed selection store, its notifications and auxiliary markers
// ============================================================================

pub mod markers;
pub mod notify;
pub mod options;
pub mod snapshot;
pub mod state;
pub mod store;

use std::fmt::Debug;
use std::hash::Hash;

pub use markers::AuxiliaryMarkers;
pub use notify::{
    EventLog, NoopSink, SelectionEvent, SelectionSink, Subscription, ADD_EVENT, DELETE_EVENT,
};
pub use options::StoreOptions;
pub use snapshot::SelectionSnapshot;
pub use state::SelectionState;
pub use store::SelectionStore;

/// Bound shared by owner keys and selected ids.
pub trait SelectionKey: Eq + Hash + Clone + Debug + 'static {}

impl<T: Eq + Hash + Clone + Debug + 'static> SelectionKey for T {}
