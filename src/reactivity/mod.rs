// ============================================================================
// spark-selection - Reactivity
// Tracking, scheduling and batching for the reactive graph
// ============================================================================

pub mod batching;
pub mod scheduling;
pub mod tracking;

pub use batching::{batch, peek, tick, untrack};
pub use scheduling::flush_effects;
pub use tracking::{is_dirty, mark_reactions, notify_write, track_read};
