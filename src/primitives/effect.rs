// ============================================================================
// spark-selection - Effects
// Side effects that re-run synchronously when what they read changes
// ============================================================================

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::core::constants::*;
use crate::core::types::{AnyReaction, AnySource, DepList};
use crate::reactivity::tracking::{remove_reactions, run_tracked};

/// Effect body
pub type EffectFn = Box<dyn FnMut()>;

pub struct EffectInner {
    flags: Cell<u32>,
    run_version: Cell<u64>,

    /// Taken out while running so the body may re-enter the graph freely
    func: RefCell<Option<EffectFn>>,
    deps: DepList,

    self_ref: Weak<EffectInner>,
}

impl EffectInner {
    pub fn new(func: EffectFn) -> Rc<Self> {
        Rc::new_cyclic(|self_ref| Self {
            flags: Cell::new(EFFECT | DIRTY),
            run_version: Cell::new(0),
            func: RefCell::new(Some(func)),
            deps: DepList::default(),
            self_ref: self_ref.clone(),
        })
    }

    /// Stop the effect for good and detach it from its sources.
    pub fn destroy(&self) {
        if self.is_destroyed() {
            return;
        }
        self.set_flags(self.flags() | DESTROYED);
        if let Some(this) = self.self_ref.upgrade() {
            remove_reactions(&(this as Rc<dyn AnyReaction>));
        }
        self.func.borrow_mut().take();
    }
}

impl AnyReaction for EffectInner {
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
        if self.is_destroyed() {
            return false;
        }
        let Some(this) = self.self_ref.upgrade() else {
            return false;
        };
        let Some(mut func) = self.func.borrow_mut().take() else {
            // Already running further up the stack
            return false;
        };

        // Clean before running: writes made by the body re-dirty it.
        self.mark_clean();
        let reaction: Rc<dyn AnyReaction> = this;
        run_tracked(&reaction, || func());

        if !self.is_destroyed() {
            *self.func.borrow_mut() = Some(func);
        }
        false
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_derived_source(&self) -> Option<Rc<dyn AnySource>> {
        None
    }
}

/// Handle to a running effect. Dropping it (or calling `dispose`) stops
/// the effect.
pub struct Effect {
    inner: Rc<EffectInner>,
}

impl Effect {
    pub fn inner(&self) -> &Rc<EffectInner> {
        &self.inner
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.is_destroyed()
    }

    pub fn dispose(&self) {
        self.inner.destroy();
    }
}

impl Drop for Effect {
    fn drop(&mut self) {
        self.inner.destroy();
    }
}

impl std::fmt::Debug for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Effect")
            .field("deps", &self.inner.deps.len())
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}

/// Run `f` now and again, synchronously, whenever anything it read changes.
///
/// # Example
///
/// ```
/// use spark_selection::{effect, signal};
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let term = signal(String::from("a"));
/// let seen = Rc::new(RefCell::new(Vec::new()));
///
/// let watcher = effect({
///     let (term, seen) = (term.clone(), seen.clone());
///     move || seen.borrow_mut().push(term.get())
/// });
///
/// term.set(String::from("b"));
/// drop(watcher);
/// term.set(String::from("c"));
///
/// assert_eq!(*seen.borrow(), vec!["a", "b"]);
/// ```
pub fn effect<F>(f: F) -> Effect
where
    F: FnMut() + 'static,
{
    let inner = EffectInner::new(Box::new(f));
    inner.update();
    Effect { inner }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{derived, signal};

    #[test]
    fn effect_runs_immediately_and_on_change() {
        let runs = Rc::new(Cell::new(0));
        let a = signal(1);
        let _e = effect({
            let (a, runs) = (a.clone(), runs.clone());
            move || {
                let _ = a.get();
                runs.set(runs.get() + 1);
            }
        });
        assert_eq!(runs.get(), 1);

        a.set(2);
        a.set(2);
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn dispose_detaches_from_sources() {
        let a = signal(1);
        let e = effect({
            let a = a.clone();
            move || {
                let _ = a.get();
            }
        });
        assert_eq!(a.inner().reactions().len(), 1);

        e.dispose();
        assert!(e.is_destroyed());
        assert!(a.inner().reactions().is_empty());
    }

    #[test]
    fn effect_over_derived_skips_unchanged_values() {
        let runs = Rc::new(Cell::new(0));
        let a = signal(4);
        let even = derived({
            let a = a.clone();
            move || a.get() % 2 == 0
        });
        let _e = effect({
            let (even, runs) = (even.clone(), runs.clone());
            move || {
                let _ = even.get();
                runs.set(runs.get() + 1);
            }
        });
        assert_eq!(runs.get(), 1);

        a.set(6);
        assert_eq!(runs.get(), 1);

        a.set(7);
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn derived_refreshed_during_a_run_is_not_newer_than_it() {
        let runs = Rc::new(Cell::new(0));
        let trigger = signal(0);
        let a = signal(1);
        let parity = derived({
            let a = a.clone();
            move || a.get() % 2
        });
        let _e = effect({
            let (trigger, parity, runs) = (trigger.clone(), parity.clone(), runs.clone());
            move || {
                let _ = trigger.get();
                let _ = parity.get();
                runs.set(runs.get() + 1);
            }
        });
        assert_eq!(runs.get(), 1);

        crate::batch(|| {
            trigger.set(1);
            a.set(2);
        });
        assert_eq!(runs.get(), 2);

        a.set(4);
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn dependencies_follow_branches() {
        let use_left = signal(true);
        let left = signal(1);
        let right = signal(2);
        let last = Rc::new(Cell::new(0));

        let _e = effect({
            let (use_left, left, right, last) =
                (use_left.clone(), left.clone(), right.clone(), last.clone());
            move || {
                let v = if use_left.get() { left.get() } else { right.get() };
                last.set(v);
            }
        });
        assert_eq!(last.get(), 1);

        use_left.set(false);
        assert_eq!(last.get(), 2);
        assert!(left.inner().reactions().is_empty());

        right.set(20);
        assert_eq!(last.get(), 20);
    }
}
