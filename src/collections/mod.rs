// ============================================================================
// spark-selection - Reactive Collections
// Sets and maps with per-item, structural and size reactivity
// ============================================================================
//
// Each collection exposes three levels of tracking:
//
// 1. Per-item/key signals: only wake readers of that element
// 2. Version signal: wakes iterators on any insert/remove
// 3. Size signal: wakes readers of len()
// ============================================================================

mod map;
mod set;

use std::rc::Rc;

use crate::core::types::SourceInner;
use crate::reactivity::tracking::notify_write;

pub use map::ReactiveMap;
pub use set::ReactiveSet;

/// Increment a counter signal and notify its readers.
fn bump(counter: &Rc<SourceInner<u64>>) {
    counter.update(|n| *n = n.wrapping_add(1));
    notify_write(counter.clone());
}

/// Store a value into an internal signal, notifying only on change.
fn store<T: PartialEq + 'static>(sig: &Rc<SourceInner<T>>, value: T) {
    if sig.set(value) {
        notify_write(sig.clone());
    }
}
