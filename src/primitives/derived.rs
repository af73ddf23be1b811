// ============================================================================
// spark-selection - Derived Values
// Lazy cached computations that recompute when their sources change
// ============================================================================
//
// A derived is both a source (it can be read and has readers) and a
// reaction (it reads other sources and can be marked dirty).
// ============================================================================

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::core::constants::*;
use crate::core::context::with_context;
use crate::core::types::{default_equals, AnyReaction, AnySource, DepList, EqualsFn, ReactionList};
use crate::reactivity::tracking::{refresh_derived, run_tracked, track_read};

// =============================================================================
// DERIVED INNER
// =============================================================================

pub struct DerivedInner<T> {
    flags: Cell<u32>,
    compute_fn: Box<dyn Fn() -> T>,

    /// Cached value; `None` until the first read
    value: RefCell<Option<T>>,
    equals: EqualsFn<T>,

    write_version: Cell<u64>,
    run_version: Cell<u64>,

    reactions: ReactionList,
    deps: DepList,

    self_ref: Weak<DerivedInner<T>>,
}

impl<T: Clone + 'static> DerivedInner<T> {
    pub fn new_with_equals<F>(compute_fn: F, equals: EqualsFn<T>) -> Rc<Self>
    where
        F: Fn() -> T + 'static,
    {
        Rc::new_cyclic(|self_ref| Self {
            flags: Cell::new(DERIVED | SOURCE | DIRTY),
            compute_fn: Box::new(compute_fn),
            value: RefCell::new(None),
            equals,
            write_version: Cell::new(0),
            run_version: Cell::new(0),
            reactions: ReactionList::default(),
            deps: DepList::default(),
            self_ref: self_ref.clone(),
        })
    }

    pub fn is_initialized(&self) -> bool {
        self.value.borrow().is_some()
    }

    /// Run the computation under tracking. Returns true if the cached value
    /// changed (the first computation always counts as a change).
    pub fn compute(&self) -> bool {
        let Some(this) = self.self_ref.upgrade() else {
            return false;
        };
        let reaction: Rc<dyn AnyReaction> = this;
        let new_value = run_tracked(&reaction, || (self.compute_fn)());

        let first = !self.is_initialized();
        let changed = match self.value.borrow().as_ref() {
            Some(current) => !(self.equals)(current, &new_value),
            None => true,
        };
        if changed {
            *self.value.borrow_mut() = Some(new_value);
            // A first value is stamped with the current version, never a
            // newer one than the reader computing it.
            let version = with_context(|ctx| {
                if first {
                    ctx.get_write_version()
                } else {
                    ctx.increment_write_version()
                }
            });
            self.write_version.set(version);
        }
        changed
    }

    fn with_value<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        if !self.is_initialized() {
            self.compute();
        }
        let value = self.value.borrow();
        match value.as_ref() {
            Some(v) => f(v),
            None => unreachable!("derived value is set by its first computation"),
        }
    }
}

impl<T: Clone + 'static> AnySource for DerivedInner<T> {
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

    fn as_derived_reaction(&self) -> Option<Rc<dyn AnyReaction>> {
        self.self_ref.upgrade().map(|rc| rc as Rc<dyn AnyReaction>)
    }
}

impl<T: Clone + 'static> AnyReaction for DerivedInner<T> {
    fn flags(&self) -> u32 {
        self.flags.get()
    }

    fn set_flags(&self, flags: u32) {
        self.flags.set(flags);
    }

    fn run_version(&self) -> u64 {
        self.run_version.get()
    }

    fn set_run_version(&self, version: u64) {
        self.run_version.set(version);
    }

    fn deps(&self) -> &DepList {
        &self.deps
    }

    fn update(&self) -> bool {
        self.compute()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_derived_source(&self) -> Option<Rc<dyn AnySource>> {
        self.self_ref.upgrade().map(|rc| rc as Rc<dyn AnySource>)
    }
}

// =============================================================================
// DERIVED<T>
// =============================================================================

/// A read-only value computed from other reactive values.
///
/// Computes on first read, caches, and recomputes on the next read after
/// any source it read has changed.
///
/// # Example
///
/// ```
/// use spark_selection::{derived, signal};
///
/// let term = signal(String::from("foo"));
/// let upper = derived({
///     let term = term.clone();
///     move || term.get().to_uppercase()
/// });
/// assert_eq!(upper.get(), "FOO");
///
/// term.set(String::from("bar"));
/// assert_eq!(upper.get(), "BAR");
/// ```
#[derive(Clone)]
pub struct Derived<T> {
    inner: Rc<DerivedInner<T>>,
}

impl<T: Clone + 'static> Derived<T> {
    pub fn get(&self) -> T {
        self.with(T::clone)
    }

    /// Read through a closure without cloning the cached value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let source = self.as_any_source();
        refresh_derived(&source);
        track_read(source);
        self.inner.with_value(f)
    }

    pub fn inner(&self) -> &Rc<DerivedInner<T>> {
        &self.inner
    }

    pub fn as_any_source(&self) -> Rc<dyn AnySource> {
        self.inner.clone()
    }
}

impl<T> std::fmt::Debug for Derived<T>
where
    T: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Derived")
            .field("value", &self.inner.value.borrow())
            .finish()
    }
}

/// Create a derived value.
pub fn derived<T, F>(compute_fn: F) -> Derived<T>
where
    T: Clone + PartialEq + 'static,
    F: Fn() -> T + 'static,
{
    derived_with_equals(compute_fn, default_equals)
}

/// Create a derived value with a custom equality function.
pub fn derived_with_equals<T, F>(compute_fn: F, equals: EqualsFn<T>) -> Derived<T>
where
    T: Clone + 'static,
    F: Fn() -> T + 'static,
{
    Derived {
        inner: DerivedInner::new_with_equals(compute_fn, equals),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal;

    #[test]
    fn caches_until_a_source_changes() {
        let computes = Rc::new(Cell::new(0));
        let a = signal(1);
        let doubled = derived({
            let (a, computes) = (a.clone(), computes.clone());
            move || {
                computes.set(computes.get() + 1);
                a.get() * 2
            }
        });

        assert_eq!(computes.get(), 0);
        assert_eq!(doubled.get(), 2);
        assert_eq!(doubled.get(), 2);
        assert_eq!(computes.get(), 1);

        a.set(5);
        assert_eq!(doubled.get(), 10);
        assert_eq!(computes.get(), 2);
    }

    #[test]
    fn unchanged_intermediate_skips_downstream() {
        let downstream_runs = Rc::new(Cell::new(0));
        let a = signal(3);
        let clamped = derived({
            let a = a.clone();
            move || a.get().clamp(0, 10)
        });
        let label = derived({
            let (clamped, runs) = (clamped.clone(), downstream_runs.clone());
            move || {
                runs.set(runs.get() + 1);
                format!("{}", clamped.get())
            }
        });

        assert_eq!(label.get(), "3");
        a.set(3);
        a.set(3);
        assert_eq!(label.get(), "3");
        assert_eq!(downstream_runs.get(), 1);

        a.set(50);
        a.set(60);
        assert_eq!(label.get(), "10");
        assert_eq!(downstream_runs.get(), 2);

        // 60 -> 70 still clamps to 10: `label` must not recompute.
        a.set(70);
        assert_eq!(label.get(), "10");
        assert_eq!(downstream_runs.get(), 2);
    }

    #[test]
    fn diamond_dependency() {
        let a = signal(1);
        let b = derived({
            let a = a.clone();
            move || a.get() + 10
        });
        let c = derived({
            let a = a.clone();
            move || a.get() * 10
        });
        let d = derived({
            let (b, c) = (b.clone(), c.clone());
            move || b.get() + c.get()
        });

        assert_eq!(d.get(), 21);
        a.set(2);
        assert_eq!(d.get(), 32);
    }

    #[test]
    #[should_panic(expected = "Cannot write to signals inside a derived")]
    fn writing_inside_derived_panics() {
        let a = signal(0);
        let bad = derived({
            let a = a.clone();
            move || {
                a.set(1);
                0
            }
        });
        bad.get();
    }
}
