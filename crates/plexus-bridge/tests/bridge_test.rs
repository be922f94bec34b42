use std::sync::Arc;

use plexus_bridge::BridgeIndex;
use plexus_core::traits::IBridgeIndex;
use plexus_core::types::{BridgeMapping, RelationType, Weight};

fn seeded() -> BridgeIndex {
    let index = BridgeIndex::new();
    index.register_chunk("c1".into());
    index.register_node("n1".into());
    index
        .upsert_mapping(BridgeMapping::new(
            "c1",
            "n1",
            RelationType::Defines,
            Weight::new(0.5),
            Weight::new(1.0),
        ))
        .unwrap();
    index
}

#[test]
fn concurrent_deltas_serialize_without_lost_updates() {
    // +0.1 and -0.05 from 0.5 must land on exactly 0.55, whichever order
    // the threads run in. A lost update would leave 0.60, 0.45, or 0.50.
    let index = Arc::new(seeded());

    let a = Arc::clone(&index);
    let b = Arc::clone(&index);
    let t1 = std::thread::spawn(move || {
        a.update_weight(&"c1".into(), &"n1".into(), RelationType::Defines, 0.1)
            .unwrap();
    });
    let t2 = std::thread::spawn(move || {
        b.update_weight(&"c1".into(), &"n1".into(), RelationType::Defines, -0.05)
            .unwrap();
    });
    t1.join().unwrap();
    t2.join().unwrap();

    let links = index.get_nodes_for_chunk(&"c1".into()).unwrap();
    assert!(
        (links[0].weight.value() - 0.55).abs() < 1e-9,
        "expected 0.55, got {}",
        links[0].weight.value()
    );
}

#[test]
fn many_concurrent_increments_all_apply() {
    let index = Arc::new(seeded());
    let handles: Vec<_> = (0..16)
        .map(|_| {
            let index = Arc::clone(&index);
            std::thread::spawn(move || {
                index
                    .update_weight(&"c1".into(), &"n1".into(), RelationType::Defines, 0.01)
                    .unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    let links = index.get_nodes_for_chunk(&"c1".into()).unwrap();
    assert!((links[0].weight.value() - 0.66).abs() < 1e-9);
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        // Bounds hold after any update, adversarial deltas included.
        #[test]
        fn weight_stays_bounded(deltas in prop::collection::vec(-10.0f64..10.0, 1..50)) {
            let index = seeded();
            for delta in deltas {
                let w = index
                    .update_weight(&"c1".into(), &"n1".into(), RelationType::Defines, delta)
                    .unwrap();
                prop_assert!((0.0..=1.0).contains(&w.value()));
            }
        }

        #[test]
        fn nan_free_under_extreme_deltas(delta in prop::num::f64::NORMAL) {
            let index = seeded();
            let w = index
                .update_weight(&"c1".into(), &"n1".into(), RelationType::Defines, delta)
                .unwrap();
            prop_assert!(w.value().is_finite());
        }
    }
}
