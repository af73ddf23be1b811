// ============================================================================
// spark-selection - Auxiliary Markers
// Last-deleted tag and current search term
// ============================================================================

use crate::primitives::signal::Signal;

/// Two independent latest-value cells. Clones share state.
///
/// Both are reactive: effects and deriveds that read a marker re-run when it
/// changes. Writing the value a marker already holds notifies nobody.
#[derive(Clone)]
pub struct AuxiliaryMarkers {
    tag_deleted: Signal<Option<String>>,
    search_term: Signal<Option<String>>,
}

impl AuxiliaryMarkers {
    pub fn new() -> Self {
        Self {
            tag_deleted: Signal::new(None),
            search_term: Signal::new(None),
        }
    }

    /// Record the id of the tag deleted last. Returns true if it changed.
    pub fn set_tag_deleted(&self, tag: impl Into<String>) -> bool {
        self.tag_deleted.set(Some(tag.into()))
    }

    pub fn tag_deleted(&self) -> Option<String> {
        self.tag_deleted.get()
    }

    pub fn clear_tag_deleted(&self) -> bool {
        self.tag_deleted.set(None)
    }

    pub fn set_search_term(&self, term: impl Into<String>) -> bool {
        self.search_term.set(Some(term.into()))
    }

    pub fn search_term(&self) -> Option<String> {
        self.search_term.get()
    }

    pub fn clear_search_term(&self) -> bool {
        self.search_term.set(None)
    }

    pub fn tag_deleted_signal(&self) -> &Signal<Option<String>> {
        &self.tag_deleted
    }

    pub fn search_term_signal(&self) -> &Signal<Option<String>> {
        &self.search_term
    }
}

impl Default for AuxiliaryMarkers {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AuxiliaryMarkers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuxiliaryMarkers")
            .field("tag_deleted", &self.tag_deleted.inner().get())
            .field("search_term", &self.search_term.inner().get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn start_unset() {
        let markers = AuxiliaryMarkers::new();
        assert_eq!(markers.tag_deleted(), None);
        assert_eq!(markers.search_term(), None);
    }

    #[test]
    fn markers_are_independent() {
        let markers = AuxiliaryMarkers::new();
        markers.set_search_term("foo");
        markers.set_tag_deleted("t1");

        assert_eq!(markers.search_term().as_deref(), Some("foo"));
        assert_eq!(markers.tag_deleted().as_deref(), Some("t1"));

        markers.clear_tag_deleted();
        assert_eq!(markers.search_term().as_deref(), Some("foo"));
        assert_eq!(markers.tag_deleted(), None);
    }

    #[test]
    fn same_value_is_not_a_change() {
        let markers = AuxiliaryMarkers::new();
        assert!(markers.set_search_term("q"));
        assert!(!markers.set_search_term("q"));
        assert!(markers.clear_search_term());
        assert!(!markers.clear_search_term());
    }

    #[test]
    fn effects_see_search_changes() {
        let markers = AuxiliaryMarkers::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let _e = effect({
            let (markers, seen) = (markers.clone(), seen.clone());
            move || seen.borrow_mut().push(markers.search_term())
        });

        markers.set_search_term("a");
        markers.set_tag_deleted("unrelated");
        markers.clear_search_term();

        assert_eq!(*seen.borrow(), vec![None, Some("a".to_string()), None]);
    }
}
