use spark_selection::{
    batch, cloned, derived, effect, EventLog, SelectionEvent, SelectionSink, SelectionState,
    SelectionStore, StoreOptions, ADD_EVENT, DELETE_EVENT,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

type Store = SelectionStore<String, String>;

fn s(v: &str) -> String {
    v.to_string()
}

fn sorted(mut v: Vec<String>) -> Vec<String> {
    v.sort();
    v
}

#[test]
fn test_selection_flows_through_shared_state() {
    let state: SelectionState = SelectionState::new();
    let list_view = state.clone();
    let toolbar = state.clone();

    list_view.selection.add(s("list"), s("a"));
    list_view.selection.add(s("list"), s("b"));

    assert_eq!(sorted(toolbar.selection.selected_all()), vec![s("a"), s("b")]);
    assert!(toolbar.selection.is_selected(&s("list"), &s("a")));
}

#[test]
fn test_effect_tracks_flattened_selection() {
    let store = Store::new();
    let counts = Rc::new(RefCell::new(Vec::new()));

    let _e = effect(cloned!(store, counts => move || {
        counts.borrow_mut().push(store.len());
    }));

    store.add(s("a"), s("1"));
    store.add(s("a"), s("1"));
    store.add(s("b"), s("2"));
    store.remove(s("a"), s("1"));
    store.remove(s("a"), s("1"));

    assert_eq!(*counts.borrow(), vec![0, 1, 2, 1]);
}

#[test]
fn test_batched_mutations_rerun_effect_once() {
    let store = Store::new();
    let runs = Rc::new(Cell::new(0));

    let _e = effect(cloned!(store, runs => move || {
        let _ = store.selected_all();
        runs.set(runs.get() + 1);
    }));

    batch(|| {
        store.add(s("a"), s("1"));
        store.add(s("b"), s("2"));
        store.add(s("c"), s("3"));
    });

    assert_eq!(runs.get(), 2);
    assert_eq!(store.len(), 3);
}

#[test]
fn test_per_owner_reader_ignores_other_owners() {
    let store = Store::new();
    store.add(s("watched"), s("x"));
    let runs = Rc::new(Cell::new(0));

    let _e = effect(cloned!(store, runs => move || {
        let _ = store.is_selected(&s("watched"), &s("x"));
        runs.set(runs.get() + 1);
    }));

    store.add(s("other"), s("y"));
    assert_eq!(runs.get(), 1);

    store.remove(s("watched"), s("x"));
    assert_eq!(runs.get(), 2);
}

#[test]
fn test_derived_filters_selection_by_search_term() {
    let state: SelectionState = SelectionState::new();
    let visible = derived(cloned!(state => move || {
        let term = state.markers.search_term().unwrap_or_default();
        let mut ids: Vec<String> = state
            .selection
            .selected_all()
            .into_iter()
            .filter(|id| id.contains(&term))
            .collect();
        ids.sort();
        ids
    }));

    state.selection.add(s("tags"), s("rust"));
    state.selection.add(s("tags"), s("ruby"));
    state.selection.add(s("tags"), s("go"));
    assert_eq!(visible.get().len(), 3);

    state.markers.set_search_term("ru");
    assert_eq!(visible.get(), vec![s("ruby"), s("rust")]);

    state.markers.set_tag_deleted("go");
    state.selection.remove(s("tags"), s("ruby"));
    assert_eq!(visible.get(), vec![s("rust")]);
}

#[test]
fn test_sinks_receive_event_names() {
    let store = Store::new();
    let names = Rc::new(RefCell::new(Vec::new()));
    let sink = cloned!(names => move |event: &SelectionEvent<String, String>| {
        names.borrow_mut().push(event.name());
    });

    store.add_with(s("o"), s("1"), Some(&sink));
    store.remove_with(s("o"), s("1"), Some(&sink));

    assert_eq!(*names.borrow(), vec!["addToGlobalSelected", "deleteFromGlobalSelected"]);
}

#[test]
fn test_absent_sink_is_skipped() {
    let store = Store::new();
    assert!(store.add_with(s("o"), s("1"), None));
    assert!(store.remove_with(s("o"), s("1"), None));
    assert!(store.is_empty());
}

#[test]
fn test_per_call_and_store_sinks_both_fire() {
    let store = Store::new();
    let global: EventLog<String, String> = EventLog::new();
    let local: EventLog<String, String> = EventLog::new();
    let _sub = store.subscribe(global.clone());

    store.add_with(s("o"), s("1"), Some(&local as &dyn SelectionSink<String, String>));
    store.add(s("o"), s("2"));

    assert_eq!(local.names(), vec![ADD_EVENT]);
    assert_eq!(global.names(), vec![ADD_EVENT, ADD_EVENT]);
}

#[test]
fn test_sink_sees_post_mutation_state() {
    let store = Store::new();
    let observed = Rc::new(RefCell::new(Vec::new()));
    let _sub = store.subscribe(cloned!(store, observed => move |event: &SelectionEvent<String, String>| {
        observed
            .borrow_mut()
            .push((event.name(), store.is_selected(event.owner(), event.id())));
    }));

    store.add(s("o"), s("1"));
    store.remove(s("o"), s("1"));

    assert_eq!(
        *observed.borrow(),
        vec![(ADD_EVENT, true), (DELETE_EVENT, false)]
    );
}

#[test]
fn test_sink_can_unsubscribe_itself() {
    let store = Store::new();
    let slot: Rc<RefCell<Option<spark_selection::Subscription>>> = Rc::new(RefCell::new(None));
    let hits = Rc::new(Cell::new(0));

    let sub = store.subscribe(cloned!(slot, hits => move |_: &SelectionEvent<String, String>| {
        hits.set(hits.get() + 1);
        slot.borrow_mut().take();
    }));
    *slot.borrow_mut() = Some(sub);

    store.add(s("o"), s("1"));
    store.add(s("o"), s("2"));

    assert_eq!(hits.get(), 1);
    assert_eq!(store.subscriber_count(), 0);
}

#[test]
fn test_pruning_store_forgets_owners() {
    let store = Store::with_options(StoreOptions::new().with_prune_empty_owners(true));
    let owners = Rc::new(RefCell::new(Vec::new()));
    let _e = effect(cloned!(store, owners => move || {
        owners.borrow_mut().push(store.owner_count());
    }));

    store.add(s("a"), s("1"));
    store.toggle(s("a"), s("1"));
    store.add(s("b"), s("1"));
    store.clear_owner(&s("b"));

    assert_eq!(*owners.borrow(), vec![0, 1, 0, 1, 0]);
}
