// ============================================================================
// spark-selection - Batching
// Group several writes into one effect flush, and read without tracking
// ============================================================================

use crate::core::context::with_context;
use crate::reactivity::scheduling::flush_effects;

/// Run `f` with effect flushing deferred until the outermost batch ends.
///
/// Every store mutation runs inside a batch, so effects never observe a
/// store while its internal borrows are held.
///
/// # Example
///
/// ```
/// use spark_selection::{batch, effect, signal};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let a = signal(1);
/// let b = signal(2);
/// let runs = Rc::new(Cell::new(0));
///
/// let _effect = effect({
///     let (a, b, runs) = (a.clone(), b.clone(), runs.clone());
///     move || {
///         let _ = a.get() + b.get();
///         runs.set(runs.get() + 1);
///     }
/// });
/// assert_eq!(runs.get(), 1);
///
/// batch(|| {
///     a.set(10);
///     b.set(20);
/// });
/// assert_eq!(runs.get(), 2);
/// ```
pub fn batch<T>(f: impl FnOnce() -> T) -> T {
    with_context(|ctx| ctx.enter_batch());

    // Exits the batch even if `f` panics
    struct BatchGuard;

    impl Drop for BatchGuard {
        fn drop(&mut self) {
            if with_context(|ctx| ctx.exit_batch()) == 0 {
                flush_effects();
            }
        }
    }

    let _guard = BatchGuard;
    f()
}

/// Read signals without registering them as dependencies.
///
/// # Example
///
/// ```
/// use spark_selection::{effect, signal, untrack};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let tracked = signal(1);
/// let ignored = signal(2);
/// let runs = Rc::new(Cell::new(0));
///
/// let _effect = effect({
///     let (tracked, ignored, runs) = (tracked.clone(), ignored.clone(), runs.clone());
///     move || {
///         let _ = tracked.get();
///         let _ = untrack(|| ignored.get());
///         runs.set(runs.get() + 1);
///     }
/// });
///
/// ignored.set(20);
/// assert_eq!(runs.get(), 1);
///
/// tracked.set(10);
/// assert_eq!(runs.get(), 2);
/// ```
pub fn untrack<T>(f: impl FnOnce() -> T) -> T {
    let prev = with_context(|ctx| ctx.set_untracking(true));

    struct UntrackGuard {
        prev: bool,
    }

    impl Drop for UntrackGuard {
        fn drop(&mut self) {
            with_context(|ctx| ctx.set_untracking(self.prev));
        }
    }

    let _guard = UntrackGuard { prev };
    f()
}

/// Alias for `untrack()`.
pub fn peek<T>(f: impl FnOnce() -> T) -> T {
    untrack(f)
}

/// Flush pending effects now.
pub fn tick() {
    flush_effects();
}
