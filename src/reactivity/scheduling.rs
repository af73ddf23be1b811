// ============================================================================
// spark-selection - Effect Scheduling
// Queueing dirty effects and flushing them synchronously
// ============================================================================

use std::rc::Rc;

use tracing::trace;

use crate::core::context::with_context;
use crate::core::types::AnyReaction;
use crate::reactivity::tracking::is_dirty;

/// Upper bound on flush rounds before we assume an effect feeds itself.
const MAX_FLUSH_ROUNDS: u32 = 1000;

/// Queue an effect; flush right away unless a batch or flush is running.
pub fn schedule_effect(effect: Rc<dyn AnyReaction>) {
    let should_flush = with_context(|ctx| {
        ctx.add_pending_effect(Rc::downgrade(&effect));
        !ctx.is_batching() && !ctx.is_flushing()
    });

    if should_flush {
        flush_effects();
    }
}

/// Run every queued effect that is still dirty, including effects queued
/// by the effects being run.
///
/// A no-op when called while a flush is already in progress; the outer
/// flush picks the new work up.
///
/// # Panics
/// When effects keep re-queueing each other for `MAX_FLUSH_ROUNDS` rounds.
pub fn flush_effects() {
    if with_context(|ctx| ctx.is_flushing()) {
        return;
    }

    struct FlushGuard;

    impl Drop for FlushGuard {
        fn drop(&mut self) {
            with_context(|ctx| ctx.set_flushing(false));
        }
    }

    with_context(|ctx| ctx.set_flushing(true));
    let _guard = FlushGuard;

    let mut rounds = 0;
    loop {
        let pending = with_context(|ctx| ctx.take_pending_effects());
        if pending.is_empty() {
            break;
        }

        rounds += 1;
        if rounds > MAX_FLUSH_ROUNDS {
            panic!(
                "Maximum update depth exceeded. This can happen when an effect \
                 continuously triggers itself."
            );
        }
        trace!(round = rounds, pending = pending.len(), "flushing effects");

        for weak in pending {
            let Some(effect) = weak.upgrade() else {
                continue;
            };
            if effect.is_destroyed() {
                continue;
            }
            if is_dirty(&*effect) {
                effect.update();
            } else {
                effect.mark_clean();
            }
        }
    }
}
