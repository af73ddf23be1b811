// ============================================================================
// spark-selection - Dependency Tracking
// Recording reads inside reactions and propagating writes through the graph
// ============================================================================
//
// Borrow discipline: edge lists are always copied out before the graph is
// mutated (collect-then-mutate), so marking a reaction never overlaps a
// RefCell borrow on the list that led to it.
// ============================================================================

use std::rc::{Rc, Weak};

use crate::core::constants::*;
use crate::core::context::with_context;
use crate::core::types::{same_node, AnyReaction, AnySource};
use crate::reactivity::scheduling::schedule_effect;

// =============================================================================
// TRACK READ
// =============================================================================

/// Record `source` as a dependency of the running reaction, if any.
pub fn track_read(source: Rc<dyn AnySource>) {
    with_context(|ctx| {
        if ctx.is_untracking() {
            return;
        }
        let Some(reaction) = ctx.active_reaction() else {
            return;
        };
        if reaction.flags() & REACTION_IS_UPDATING != 0 {
            ctx.add_new_dep(source);
        }
    });
}

// =============================================================================
// RUN TRACKED
// =============================================================================

/// Run `f` as the body of `reaction`, then rewire the reaction's
/// dependency edges to exactly the sources `f` read.
pub fn run_tracked<R>(reaction: &Rc<dyn AnyReaction>, f: impl FnOnce() -> R) -> R {
    struct RunGuard {
        reaction: Rc<dyn AnyReaction>,
        prev_reaction: Option<Weak<dyn AnyReaction>>,
        prev_deps: Vec<Rc<dyn AnySource>>,
        prev_untracking: bool,
    }

    impl Drop for RunGuard {
        fn drop(&mut self) {
            let collected = with_context(|ctx| {
                ctx.set_active_reaction(self.prev_reaction.take());
                ctx.set_untracking(self.prev_untracking);
                // Stamped at the end: deriveds refreshed during the run are
                // not newer than the run that read them.
                self.reaction.set_run_version(ctx.get_write_version());
                ctx.swap_new_deps(std::mem::take(&mut self.prev_deps))
            });
            let flags = self.reaction.flags() & !REACTION_IS_UPDATING;
            self.reaction.set_flags(flags);
            install_dependencies(&self.reaction, collected);
        }
    }

    let guard = with_context(|ctx| RunGuard {
        reaction: reaction.clone(),
        prev_reaction: ctx.set_active_reaction(Some(Rc::downgrade(reaction))),
        prev_deps: ctx.swap_new_deps(Vec::new()),
        prev_untracking: ctx.set_untracking(false),
    });
    reaction.set_flags(reaction.flags() | REACTION_IS_UPDATING);

    let result = f();
    drop(guard);
    result
}

/// Replace a reaction's dependency edges, unsubscribing from sources it no
/// longer reads and subscribing to the new ones.
pub fn install_dependencies(reaction: &Rc<dyn AnyReaction>, new_deps: Vec<Rc<dyn AnySource>>) {
    let old_deps = reaction.deps().replace(new_deps.clone());

    for dep in &old_deps {
        if !new_deps.iter().any(|d| same_node(d, dep)) {
            dep.reactions().remove(reaction);
        }
    }
    for dep in &new_deps {
        if !old_deps.iter().any(|d| same_node(d, dep)) {
            dep.reactions().push(Rc::downgrade(reaction));
        }
    }
}

/// Drop every dependency edge of a reaction (used on disposal).
pub fn remove_reactions(reaction: &Rc<dyn AnyReaction>) {
    for dep in reaction.deps().replace(Vec::new()) {
        dep.reactions().remove(reaction);
    }
}

// =============================================================================
// NOTIFY WRITE
// =============================================================================

/// Stamp a fresh write version on `source` and mark everything downstream.
///
/// # Panics
/// When called from inside a derived's computation.
pub fn notify_write(source: Rc<dyn AnySource>) {
    let version = with_context(|ctx| {
        if let Some(reaction) = ctx.active_reaction() {
            if reaction.is_derived() && !ctx.is_untracking() {
                panic!(
                    "Cannot write to signals inside a derived. \
                     Deriveds should be pure computations with no side effects."
                );
            }
        }
        ctx.increment_write_version()
    });
    source.set_write_version(version);
    mark_reactions(source, DIRTY);
}

// =============================================================================
// MARK REACTIONS
// =============================================================================

/// Mark the reactions of `source` with `status`.
///
/// Direct readers get `status`; readers of a derived further down get
/// MAYBE_DIRTY. Effects that were clean are queued. DIRTY is never
/// downgraded. Iterative so deep derived chains cannot overflow the stack.
pub fn mark_reactions(source: Rc<dyn AnySource>, status: u32) {
    let mut effects: Vec<Rc<dyn AnyReaction>> = Vec::new();
    let mut stack: Vec<(Rc<dyn AnySource>, u32)> = vec![(source, status)];

    while let Some((current, status)) = stack.pop() {
        for reaction in current.reactions().live() {
            let flags = reaction.flags();
            if flags & DESTROYED != 0 {
                continue;
            }

            let was_clean = flags & (DIRTY | MAYBE_DIRTY) == 0;
            if flags & DIRTY == 0 {
                set_signal_status(&*reaction, status);
            }
            if !was_clean {
                continue;
            }

            if let Some(derived) = reaction.as_derived_source() {
                stack.push((derived, MAYBE_DIRTY));
            } else if reaction.is_effect() {
                effects.push(reaction);
            }
        }
    }

    for effect in effects {
        schedule_effect(effect);
    }
}

/// Replace the status bits of a reaction.
pub fn set_signal_status(target: &dyn AnyReaction, status: u32) {
    target.set_flags((target.flags() & STATUS_MASK) | status);
}

// =============================================================================
// DIRTY CHECKING
// =============================================================================

/// Whether a reaction has to re-run.
///
/// MAYBE_DIRTY reactions first bring their derived dependencies up to date,
/// then re-run only if some dependency was written after their last run.
pub fn is_dirty(reaction: &dyn AnyReaction) -> bool {
    let flags = reaction.flags();
    if flags & DIRTY != 0 {
        return true;
    }
    if flags & MAYBE_DIRTY == 0 {
        return false;
    }

    let seen = reaction.run_version();
    for dep in reaction.deps().snapshot() {
        if dep.is_derived() {
            refresh_derived(&dep);
        }
        if dep.write_version() > seen {
            return true;
        }
    }
    false
}

/// Bring a derived up to date, recomputing only if needed.
pub fn refresh_derived(source: &Rc<dyn AnySource>) {
    if source.is_clean() {
        return;
    }
    let Some(reaction) = source.as_derived_reaction() else {
        return;
    };
    if is_dirty(&*reaction) {
        reaction.update();
    }
    reaction.mark_clean();
}
