// ============================================================================
// spark-selection - Ergonomic Macros
// ============================================================================

/// Clone handles into a move closure.
///
/// # Usage
///
/// ```rust
/// use spark_selection::{cloned, derived, SelectionStore};
///
/// let store: SelectionStore<String, String> = SelectionStore::new();
/// let count = derived(cloned!(store => move || store.selected_all().len()));
///
/// store.add("list".to_string(), "a".to_string());
/// assert_eq!(count.get(), 1);
/// ```
#[macro_export]
macro_rules! cloned {
    ($($n:ident),+ => $e:expr) => {
        {
            $( let $n = $n.clone(); )+
            $e
        }
    };
}
