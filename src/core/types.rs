// ============================================================================
// spark-selection - Type Definitions
// Type-erased node traits and the plain value source
// ============================================================================

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::constants::*;

// =============================================================================
// NODE IDENTITY
// =============================================================================

/// Identity comparison for graph nodes behind trait objects.
///
/// Compares the data pointer only, so the same allocation seen through
/// different vtables still counts as one node.
pub fn same_node<A: ?Sized, B: ?Sized>(a: &Rc<A>, b: &Rc<B>) -> bool {
    Rc::as_ptr(a) as *const () == Rc::as_ptr(b) as *const ()
}

// =============================================================================
// EDGE LISTS
// =============================================================================
//
// Sources keep weak edges to the reactions reading them, reactions keep
// strong edges to their sources. Reads of either list always go through a
// collected Vec so callers can mutate the graph while walking it.
// =============================================================================

/// Weak back-edges from a source to the reactions that depend on it.
#[derive(Default)]
pub struct ReactionList {
    edges: RefCell<Vec<Weak<dyn AnyReaction>>>,
}

impl ReactionList {
    pub fn push(&self, reaction: Weak<dyn AnyReaction>) {
        self.edges.borrow_mut().push(reaction);
    }

    /// Remove one reaction (and any dead edges found along the way).
    pub fn remove(&self, reaction: &Rc<dyn AnyReaction>) {
        self.edges.borrow_mut().retain(|weak| match weak.upgrade() {
            Some(rc) => !same_node(&rc, reaction),
            None => false,
        });
    }

    /// Upgrade every live edge, pruning dead ones.
    pub fn live(&self) -> Vec<Rc<dyn AnyReaction>> {
        let mut edges = self.edges.borrow_mut();
        let mut live = Vec::with_capacity(edges.len());
        edges.retain(|weak| match weak.upgrade() {
            Some(rc) => {
                live.push(rc);
                true
            }
            None => false,
        });
        live
    }

    pub fn len(&self) -> usize {
        self.edges.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Strong edges from a reaction to the sources it read on its last run.
#[derive(Default)]
pub struct DepList {
    edges: RefCell<Vec<Rc<dyn AnySource>>>,
}

impl DepList {
    /// Swap in a new dependency list, returning the previous one.
    pub fn replace(&self, deps: Vec<Rc<dyn AnySource>>) -> Vec<Rc<dyn AnySource>> {
        self.edges.replace(deps)
    }

    pub fn snapshot(&self) -> Vec<Rc<dyn AnySource>> {
        self.edges.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.edges.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// TYPE-ERASED TRAITS
// =============================================================================

/// Type-erased view of anything that can be read inside a reaction.
///
/// Implemented by `SourceInner<T>` and `DerivedInner<T>`.
pub trait AnySource: Any {
    fn flags(&self) -> u32;

    fn set_flags(&self, flags: u32);

    /// Global write version at which this node's value last changed
    fn write_version(&self) -> u64;

    fn set_write_version(&self, version: u64);

    /// Reactions currently depending on this source
    fn reactions(&self) -> &ReactionList;

    fn is_derived(&self) -> bool {
        self.flags() & DERIVED != 0
    }

    fn is_dirty(&self) -> bool {
        self.flags() & DIRTY != 0
    }

    fn is_maybe_dirty(&self) -> bool {
        self.flags() & MAYBE_DIRTY != 0
    }

    fn is_clean(&self) -> bool {
        self.flags() & CLEAN != 0
    }

    fn mark_clean(&self) {
        self.set_flags((self.flags() & STATUS_MASK) | CLEAN);
    }

    fn as_any(&self) -> &dyn Any;

    /// The reaction side of a derived; `None` for plain sources.
    fn as_derived_reaction(&self) -> Option<Rc<dyn AnyReaction>> {
        None
    }
}

/// Type-erased view of anything that re-runs when its sources change.
///
/// Implemented by `DerivedInner<T>` and `EffectInner`.
pub trait AnyReaction: Any {
    fn flags(&self) -> u32;

    fn set_flags(&self, flags: u32);

    /// Global write version observed when the reaction last ran
    fn run_version(&self) -> u64;

    fn set_run_version(&self, version: u64);

    /// Sources read during the last run
    fn deps(&self) -> &DepList;

    /// Re-run the reaction. Returns true if a derived's value changed.
    fn update(&self) -> bool;

    fn is_derived(&self) -> bool {
        self.flags() & DERIVED != 0
    }

    fn is_effect(&self) -> bool {
        self.flags() & EFFECT != 0
    }

    fn is_dirty(&self) -> bool {
        self.flags() & DIRTY != 0
    }

    fn is_maybe_dirty(&self) -> bool {
        self.flags() & MAYBE_DIRTY != 0
    }

    fn is_clean(&self) -> bool {
        self.flags() & CLEAN != 0
    }

    fn is_destroyed(&self) -> bool {
        self.flags() & DESTROYED != 0
    }

    fn mark_clean(&self) {
        self.set_flags((self.flags() & STATUS_MASK) | CLEAN);
    }

    fn as_any(&self) -> &dyn Any;

    /// The source side of a derived; `None` for effects.
    fn as_derived_source(&self) -> Option<Rc<dyn AnySource>>;
}

// =============================================================================
// SOURCE INNER
// =============================================================================

/// Equality function used to decide whether a write is a change
pub type EqualsFn<T> = fn(&T, &T) -> bool;

pub fn default_equals<T: PartialEq>(a: &T, b: &T) -> bool {
    a == b
}

/// The data behind a `Signal<T>` and behind every per-item signal of the
/// reactive collections.
///
/// `set` only swaps the value; stamping the write version and waking
/// reactions is the caller's job (see `notify_write`).
pub struct SourceInner<T> {
    flags: Cell<u32>,
    value: RefCell<T>,
    write_version: Cell<u64>,
    reactions: ReactionList,
    equals: EqualsFn<T>,
}

impl<T> SourceInner<T> {
    pub fn new(value: T) -> Self
    where
        T: PartialEq,
    {
        Self::new_with_equals(value, default_equals)
    }

    pub fn new_with_equals(value: T, equals: EqualsFn<T>) -> Self {
        Self {
            flags: Cell::new(SOURCE | CLEAN),
            value: RefCell::new(value),
            write_version: Cell::new(0),
            reactions: ReactionList::default(),
            equals,
        }
    }

    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.value.borrow().clone()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value.borrow())
    }

    /// Replace the value. Returns false when `equals` says nothing changed.
    pub fn set(&self, value: T) -> bool {
        if (self.equals)(&self.value.borrow(), &value) {
            return false;
        }
        *self.value.borrow_mut() = value;
        true
    }

    /// Mutate in place. Always counts as a change.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.value.borrow_mut());
    }
}

impl<T: 'static> AnySource for SourceInner<T> {
    fn flags(&self) -> u32 {
        self.flags.get()
    }

    fn set_flags(&self, flags: u32) {
        self.flags.set(flags);
    }

    fn write_version(&self) -> u64 {
        self.write_version.get()
    }

    fn set_write_version(&self, version: u64) {
        self.write_version.set(version);
    }

    fn reactions(&self) -> &ReactionList {
        &self.reactions
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
