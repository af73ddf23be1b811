use proptest::prelude::*;
use spark_selection::{SelectionSnapshot, SelectionStore, StoreOptions};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone)]
enum Op {
    Add(u8, u8),
    Remove(u8, u8),
    Toggle(u8, u8),
    ClearOwner(u8),
}

fn op() -> impl Strategy<Value = Op> {
    let owner = 0u8..4;
    let id = 0u8..8;
    prop_oneof![
        (owner.clone(), id.clone()).prop_map(|(o, i)| Op::Add(o, i)),
        (owner.clone(), id.clone()).prop_map(|(o, i)| Op::Remove(o, i)),
        (owner.clone(), id).prop_map(|(o, i)| Op::Toggle(o, i)),
        owner.prop_map(Op::ClearOwner),
    ]
}

/// Plain model: owner -> ids.
fn apply(model: &mut BTreeMap<u8, BTreeSet<u8>>, op: &Op) {
    match *op {
        Op::Add(o, i) => {
            model.entry(o).or_default().insert(i);
        }
        Op::Remove(o, i) => {
            if let Some(ids) = model.get_mut(&o) {
                ids.remove(&i);
            }
        }
        Op::Toggle(o, i) => {
            let ids = model.entry(o).or_default();
            if !ids.remove(&i) {
                ids.insert(i);
            }
        }
        Op::ClearOwner(o) => {
            if let Some(ids) = model.get_mut(&o) {
                ids.clear();
            }
        }
    }
}

fn run(store: &SelectionStore<u8, u8>, op: &Op) {
    match *op {
        Op::Add(o, i) => {
            store.add(o, i);
        }
        Op::Remove(o, i) => {
            store.remove(o, i);
        }
        Op::Toggle(o, i) => {
            store.toggle(o, i);
        }
        Op::ClearOwner(o) => {
            store.clear_owner(&o);
        }
    }
}

proptest! {
    #[test]
    fn store_matches_model(ops in prop::collection::vec(op(), 0..64)) {
        let store: SelectionStore<u8, u8> = SelectionStore::new();
        let mut model = BTreeMap::new();

        for op in &ops {
            run(&store, op);
            apply(&mut model, op);
        }

        let mut expected: Vec<u8> = model.values().flatten().copied().collect();
        expected.sort();
        let mut actual = store.selected_all();
        actual.sort();
        prop_assert_eq!(actual, expected);

        for (owner, ids) in &model {
            for id in ids {
                prop_assert!(store.is_selected(owner, id));
            }
        }
    }

    #[test]
    fn add_is_idempotent(owner in 0u8..4, id in any::<u8>(), repeats in 1usize..5) {
        let store: SelectionStore<u8, u8> = SelectionStore::new();
        for _ in 0..repeats {
            store.add(owner, id);
        }
        prop_assert_eq!(store.selected_all(), vec![id]);
    }

    #[test]
    fn remove_without_add_changes_nothing(
        seed in prop::collection::vec((0u8..4, 0u8..8), 0..16),
        owner in 0u8..4,
        id in 8u8..16,
    ) {
        let store: SelectionStore<u8, u8> = SelectionStore::new();
        for (o, i) in &seed {
            store.add(*o, *i);
        }
        let before = store.snapshot();
        prop_assert!(!store.remove(owner, id));
        prop_assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn snapshot_json_round_trip(ops in prop::collection::vec(op(), 0..32)) {
        let store: SelectionStore<String, u8> = SelectionStore::new();
        for op in &ops {
            if let Op::Add(o, i) = *op {
                store.add(format!("owner-{o}"), i);
            }
        }

        let json = store.snapshot().to_json().unwrap();
        let decoded: SelectionSnapshot<String, u8> = SelectionSnapshot::from_json(&json).unwrap();
        let restored = SelectionStore::from_snapshot(&decoded, StoreOptions::default());

        let mut a = store.selected_all();
        let mut b = restored.selected_all();
        a.sort();
        b.sort();
        prop_assert_eq!(a, b);
        prop_assert_eq!(restored.snapshot(), store.snapshot());
    }
}
