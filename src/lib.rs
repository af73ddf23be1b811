// ============================================================================
// spark-selection - Reactive Selection State for Rust
// ============================================================================
//
// Owner-keyed selection sets, a derived flattened selection, add/remove
// notifications and two auxiliary markers, built on a small single-threaded
// signals core.
// ============================================================================

#[macro_use]
mod macros;

pub mod collections;
pub mod core;
pub mod error;
pub mod primitives;
pub mod reactivity;
pub mod selection;

// Re-export core items at crate root
pub use core::constants;
pub use core::context::{is_batching, is_tracking, with_context, write_version, ReactiveContext};
pub use core::types::{default_equals, AnyReaction, AnySource, EqualsFn, SourceInner};

// Primitives
pub use primitives::derived::{derived, derived_with_equals, Derived};
pub use primitives::effect::{effect, Effect};
pub use primitives::signal::{signal, signal_with_equals, Signal};

// Reactivity
pub use reactivity::batching::{batch, peek, tick, untrack};
pub use reactivity::scheduling::flush_effects;

// Collections
pub use collections::{ReactiveMap, ReactiveSet};

// Selection
pub use error::SnapshotError;
pub use selection::{
    AuxiliaryMarkers, EventLog, NoopSink, SelectionEvent, SelectionKey, SelectionSink,
    SelectionSnapshot, SelectionState, SelectionStore, StoreOptions, Subscription, ADD_EVENT,
    DELETE_EVENT,
};

// =============================================================================
// TESTS
// =============================================================================
