// ============================================================================
// spark-selection - Core Module
// Node traits, flags and the thread-local context of the reactive graph
// ============================================================================

pub mod constants;
pub mod context;
pub mod types;

pub use constants::*;
pub use context::{is_batching, is_tracking, with_context, write_version, ReactiveContext};
pub use types::{
    default_equals, same_node, AnyReaction, AnySource, DepList, EqualsFn, ReactionList,
    SourceInner,
};
