// ============================================================================
// spark-selection - Primitives
// Signals, deriveds and effects
// ============================================================================

pub mod derived;
pub mod effect;
pub mod signal;

pub use derived::{derived, derived_with_equals, Derived, DerivedInner};
pub use effect::{effect, Effect, EffectFn, EffectInner};
pub use signal::{signal, signal_with_equals, Signal};
