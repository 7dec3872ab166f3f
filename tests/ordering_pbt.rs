mod common;

use common::{child_names, family, instrument, SessionBuilder};
use phetio_lib::core::{AnyIOType, Assertions, Builtins, TypeRegistry};
use phetio_lib::data::Color;
use proptest::prelude::*;
use serde_json::json;

const NAMES: [&str; 6] = ["A", "B", "C", "D", "E", "F"];

prop_compose! {
    fn arb_index_state(max_children: usize)(
        count in 1..=max_children
    )(
        indices in prop::collection::vec(prop::option::of(0..count as u64), count),
        count in Just(count)
    ) -> (usize, Vec<Option<u64>>) {
        (count, indices)
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn test_applying_indices_keeps_a_permutation(
        (count, indices) in arb_index_state(NAMES.len()),
        apply_zero_index in any::<bool>()
    ) {
        let session = SessionBuilder::new()
            .with_config(|config| config.state.apply_zero_index = apply_zero_index)
            .build();
        let (parent, children) = family(&NAMES[..count]);
        instrument(&session, &children);

        let entries: Vec<(String, serde_json::Value)> = children
            .iter()
            .zip(&indices)
            .map(|(child, index)| (format!("sim.{}", child.name()), json!({ "index": index })))
            .collect();
        session
            .set_state_in_order(entries.iter().map(|(id, state)| (id.as_str(), state)))
            .unwrap();

        let mut order = child_names(&parent);
        prop_assert_eq!(order.len(), count);
        order.sort();
        let expected: Vec<String> = NAMES[..count].iter().map(|n| n.to_string()).collect();
        prop_assert_eq!(order, expected);
    }

    #[test]
    fn test_single_entry_lands_at_its_index(
        count in 2..=NAMES.len(),
        seed in any::<prop::sample::Index>(),
        target in any::<prop::sample::Index>()
    ) {
        let session = SessionBuilder::new()
            .with_config(|config| config.state.apply_zero_index = true)
            .build();
        let (parent, children) = family(&NAMES[..count]);
        instrument(&session, &children);
        let moved = &children[seed.index(count)];
        let index = target.index(count);

        let id = format!("sim.{}", moved.name());
        session
            .set_state_in_order([(id.as_str(), &json!({ "index": index }))])
            .unwrap();
        prop_assert_eq!(parent.index_of_child(moved), Some(index));
    }

    #[test]
    fn test_color_construction_clamps(
        r in -1000.0f64..1000.0,
        g in -1000.0f64..1000.0,
        b in -1000.0f64..1000.0,
        a in -5.0f64..5.0
    ) {
        let mut registry = TypeRegistry::new();
        let builtins = Builtins::register(&mut registry).unwrap();
        let color = Color::new(r, g, b, a);
        prop_assert!((0.0..=1.0).contains(&color.alpha()));

        let state = builtins.color.to_state_object(&color, Assertions::Enabled).unwrap();
        prop_assert!(builtins.color.validate_state(&state).is_ok());
        let restored = builtins.color.from_state_object(&state, Assertions::Enabled).unwrap();
        prop_assert_eq!(restored, color);
    }
}
