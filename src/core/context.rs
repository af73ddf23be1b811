// ============================================================================
// spark-selection - Reactive Context
// Thread-local state for the currently running reaction and the effect queue
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::types::{same_node, AnyReaction, AnySource};

// =============================================================================
// REACTIVE CONTEXT
// =============================================================================

/// Per-thread reactive state.
///
/// Everything reactive in this crate is `Rc`-based, so one context per
/// thread is the whole world a graph can see.
pub struct ReactiveContext {
    /// Reaction whose body is executing right now
    active_reaction: RefCell<Option<Weak<dyn AnyReaction>>>,

    /// Inside `untrack()`
    untracking: Cell<bool>,

    /// Bumped on every value change anywhere on this thread
    write_version: Cell<u64>,

    /// Sources read by the active reaction during this run
    new_deps: RefCell<Vec<Rc<dyn AnySource>>>,

    /// Nesting depth of `batch()`
    batch_depth: Cell<u32>,

    /// Effects waiting for the next flush
    pending_effects: RefCell<Vec<Weak<dyn AnyReaction>>>,

    /// A flush is in progress
    flushing: Cell<bool>,
}

impl ReactiveContext {
    pub fn new() -> Self {
        Self {
            active_reaction: RefCell::new(None),
            untracking: Cell::new(false),
            write_version: Cell::new(1),
            new_deps: RefCell::new(Vec::new()),
            batch_depth: Cell::new(0),
            pending_effects: RefCell::new(Vec::new()),
            flushing: Cell::new(false),
        }
    }

    // =========================================================================
    // REACTION TRACKING
    // =========================================================================

    /// Set the active reaction, returning the previous one
    pub fn set_active_reaction(
        &self,
        reaction: Option<Weak<dyn AnyReaction>>,
    ) -> Option<Weak<dyn AnyReaction>> {
        self.active_reaction.replace(reaction)
    }

    pub fn active_reaction(&self) -> Option<Rc<dyn AnyReaction>> {
        self.active_reaction.borrow().as_ref().and_then(Weak::upgrade)
    }

    pub fn has_active_reaction(&self) -> bool {
        self.active_reaction.borrow().is_some()
    }

    /// Set untracking mode, returning the previous value
    pub fn set_untracking(&self, value: bool) -> bool {
        self.untracking.replace(value)
    }

    pub fn is_untracking(&self) -> bool {
        self.untracking.get()
    }

    // =========================================================================
    // VERSIONS
    // =========================================================================

    pub fn increment_write_version(&self) -> u64 {
        let v = self.write_version.get() + 1;
        self.write_version.set(v);
        v
    }

    pub fn get_write_version(&self) -> u64 {
        self.write_version.get()
    }

    // =========================================================================
    // DEPENDENCY COLLECTION
    // =========================================================================

    /// Swap out the collected deps, returning the old list
    pub fn swap_new_deps(&self, deps: Vec<Rc<dyn AnySource>>) -> Vec<Rc<dyn AnySource>> {
        self.new_deps.replace(deps)
    }

    /// Record a read, ignoring repeats within the same run
    pub fn add_new_dep(&self, source: Rc<dyn AnySource>) {
        let mut deps = self.new_deps.borrow_mut();
        if !deps.iter().any(|dep| same_node(dep, &source)) {
            deps.push(source);
        }
    }

    // =========================================================================
    // BATCHING & SCHEDULING
    // =========================================================================

    /// Returns the new depth
    pub fn enter_batch(&self) -> u32 {
        let depth = self.batch_depth.get() + 1;
        self.batch_depth.set(depth);
        depth
    }

    /// Returns the new depth
    pub fn exit_batch(&self) -> u32 {
        let depth = self.batch_depth.get().saturating_sub(1);
        self.batch_depth.set(depth);
        depth
    }

    pub fn is_batching(&self) -> bool {
        self.batch_depth.get() > 0
    }

    pub fn add_pending_effect(&self, effect: Weak<dyn AnyReaction>) {
        self.pending_effects.borrow_mut().push(effect);
    }

    pub fn take_pending_effects(&self) -> Vec<Weak<dyn AnyReaction>> {
        self.pending_effects.replace(Vec::new())
    }

    /// Set flushing mode, returning the previous value
    pub fn set_flushing(&self, value: bool) -> bool {
        self.flushing.replace(value)
    }

    pub fn is_flushing(&self) -> bool {
        self.flushing.get()
    }
}

impl Default for ReactiveContext {
    fn default() -> Self {
        Self::new()
    }
}

thread_local! {
    static CONTEXT: ReactiveContext = ReactiveContext::new();
}

/// Access the thread-local reactive context.
pub fn with_context<R>(f: impl FnOnce(&ReactiveContext) -> R) -> R {
    CONTEXT.with(f)
}

/// Inside a reaction and not untracking
pub fn is_tracking() -> bool {
    with_context(|ctx| ctx.has_active_reaction() && !ctx.is_untracking())
}

pub fn is_batching() -> bool {
    with_context(|ctx| ctx.is_batching())
}

pub fn write_version() -> u64 {
    with_context(|ctx| ctx.get_write_version())
}
