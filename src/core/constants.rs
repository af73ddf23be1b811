// ============================================================================
// spark-selection - Constants
// Flag constants for node kinds and node states in the reactive graph
// ============================================================================

// =============================================================================
// NODE KIND FLAGS
// =============================================================================

/// Source node (plain reactive value)
pub const SOURCE: u32 = 1 << 0;

/// Derived node (cached computation, both source and reaction)
pub const DERIVED: u32 = 1 << 1;

/// Effect node (side effect, reaction only)
pub const EFFECT: u32 = 1 << 2;

// =============================================================================
// NODE STATE FLAGS
// =============================================================================

/// Node is up-to-date
pub const CLEAN: u32 = 1 << 10;

/// Node definitely needs to re-run
pub const DIRTY: u32 = 1 << 11;

/// An upstream derived changed; re-run only if its value actually moved
pub const MAYBE_DIRTY: u32 = 1 << 12;

/// Reaction is currently executing its body
pub const REACTION_IS_UPDATING: u32 = 1 << 13;

/// Effect has been disposed and must never run again
pub const DESTROYED: u32 = 1 << 14;

// =============================================================================
// STATUS MASK
// =============================================================================

/// Clears CLEAN, DIRTY and MAYBE_DIRTY while keeping every other bit
pub const STATUS_MASK: u32 = !(DIRTY | MAYBE_DIRTY | CLEAN);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_are_distinct() {
        let all_flags = [
            SOURCE,
            DERIVED,
            EFFECT,
            CLEAN,
            DIRTY,
            MAYBE_DIRTY,
            REACTION_IS_UPDATING,
            DESTROYED,
        ];

        for (i, &a) in all_flags.iter().enumerate() {
            for &b in &all_flags[i + 1..] {
                assert_eq!(a & b, 0, "flags overlap: {:b} & {:b}", a, b);
            }
        }
    }

    #[test]
    fn status_mask_keeps_kind_bits() {
        let flags = DERIVED | DIRTY | REACTION_IS_UPDATING;
        let cleared = flags & STATUS_MASK;

        assert_eq!(cleared & DIRTY, 0);
        assert_ne!(cleared & DERIVED, 0);
        assert_ne!(cleared & REACTION_IS_UPDATING, 0);
    }
}
