mod common;

use common::SessionBuilder;
use phetio_lib::core::{AnyIOType, Assertions, Field, IOType, Method, StateObject};
use phetio_lib::data::{Bounds3, Color, Dimension3};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Default, Clone, PartialEq)]
struct Badge {
    secret_name: String,
    secret_name_but_public_state: String,
    visible_count: f64,
}

fn badge_io(session: &phetio_lib::PhetioSession) -> Rc<IOType<Badge>> {
    let builtins = session.builtins();
    IOType::<Badge>::builder("BadgeIO")
        .documentation("A badge with a private name")
        .field(Field::value(
            "_secretName",
            &builtins.string,
            |badge: &Badge| badge.secret_name.clone(),
            |badge: &mut Badge, value: String| badge.secret_name = value,
        ))
        .field(Field::value(
            "secretNameButPublicState",
            &builtins.string,
            |badge: &Badge| badge.secret_name_but_public_state.clone(),
            |badge: &mut Badge, value: String| badge.secret_name_but_public_state = value,
        ))
        .field(Field::read_only("visibleCount", &builtins.number, |badge: &Badge| {
            badge.visible_count
        }))
        .method(
            "rename",
            Method::new(
                builtins.void.erased(),
                vec![builtins.string.erased()],
                |badge: &mut Badge, args: &[StateObject], _| {
                    badge.secret_name = args[0].as_str().unwrap_or_default().to_string();
                    Ok(StateObject::Null)
                },
            ),
        )
        .default_constructor()
        .build()
}

#[test]
fn test_wire_keys_are_declared_not_derived() {
    let mut session = SessionBuilder::new().build();
    let io_type = badge_io(&session);
    session.register_type(&io_type).unwrap();

    let badge = Badge {
        secret_name: "alpha".to_string(),
        secret_name_but_public_state: "beta".to_string(),
        visible_count: 2.0,
    };
    let state = io_type.to_state_object(&badge, Assertions::Enabled).unwrap();
    assert_eq!(
        state,
        json!({
            "_secretName": "alpha",
            "secretNameButPublicState": "beta",
            "visibleCount": 2.0,
        })
    );

    let mut restored = Badge::default();
    io_type
        .apply_state(&mut restored, &state, Assertions::Enabled)
        .unwrap();
    assert_eq!(restored.secret_name, "alpha");
    assert_eq!(restored.secret_name_but_public_state, "beta");
    // Read-only fields are serialized but never written back.
    assert_eq!(restored.visible_count, 0.0);

    let created = io_type
        .from_state_object(&state, Assertions::Enabled)
        .unwrap();
    assert_eq!(created.secret_name, "alpha");
}

#[test]
fn test_session_state_round_trip_for_custom_type() {
    let mut session = SessionBuilder::new().build();
    let io_type = badge_io(&session);
    session.register_type(&io_type).unwrap();

    let badge = Rc::new(RefCell::new(Badge {
        secret_name: "one".to_string(),
        ..Default::default()
    }));
    session
        .register_instance("sim.badge", &io_type, badge.clone())
        .unwrap();

    let saved = session.get_state().unwrap();
    session
        .invoke("sim.badge", "rename", &[json!("two")])
        .unwrap();
    assert_eq!(badge.borrow().secret_name, "two");

    session.set_state(&saved).unwrap();
    assert_eq!(badge.borrow().secret_name, "one");
}

#[test]
fn test_unknown_key_in_state() {
    let mut session = SessionBuilder::new().build();
    let io_type = badge_io(&session);
    session.register_type(&io_type).unwrap();
    let mut badge = Badge::default();
    let state = json!({
        "_secretName": "a",
        "secretNameButPublicState": "b",
        "secretName": "typo",
    });

    assert!(io_type
        .apply_state(&mut badge, &state, Assertions::Enabled)
        .unwrap_err()
        .is_assertion());

    io_type
        .apply_state(&mut badge, &state, Assertions::Disabled)
        .unwrap();
    assert_eq!(badge.secret_name, "a");
}

#[test]
fn test_api_lists_schema_and_methods() {
    let mut session = SessionBuilder::new().build();
    let io_type = badge_io(&session);
    session.register_type(&io_type).unwrap();

    let api = session.api();
    let badge = &api["BadgeIO"];
    assert_eq!(badge.ancestry, vec!["BadgeIO", "ObjectIO"]);
    assert!(badge.methods.contains_key("rename"));
    let schema = serde_json::to_value(&badge.state_schema).unwrap();
    assert_eq!(schema["_secretName"], "StringIO");
    assert!(session.get_type("BadgeIO").unwrap().is_subtype_of("ObjectIO"));
}

#[test]
fn test_value_types_round_trip_through_session() {
    let session = SessionBuilder::new().build();
    let builtins = session.builtins();

    let color = Rc::new(RefCell::new(Color::new(10.0, 20.0, 30.0, 0.5)));
    let bounds = Rc::new(RefCell::new(Bounds3::NOTHING));
    let size = Rc::new(RefCell::new(Dimension3::new(1.0, f64::INFINITY, 3.0)));
    session
        .register_instance("sim.color", &builtins.color, color.clone())
        .unwrap();
    session
        .register_instance("sim.bounds", &builtins.bounds3, bounds.clone())
        .unwrap();
    session
        .register_instance("sim.size", &builtins.dimension3, size.clone())
        .unwrap();

    let saved = session.get_state().unwrap();
    assert_eq!(saved["sim.bounds"]["minX"], "POSITIVE_INFINITY");
    assert_eq!(saved["sim.size"]["height"], "POSITIVE_INFINITY");

    *color.borrow_mut() = Color::WHITE;
    *bounds.borrow_mut() = Bounds3::EVERYTHING;
    *size.borrow_mut() = Dimension3::default();
    session.set_state(&saved).unwrap();

    assert_eq!(*color.borrow(), Color::new(10.0, 20.0, 30.0, 0.5));
    assert_eq!(*bounds.borrow(), Bounds3::NOTHING);
    assert_eq!(*size.borrow(), Dimension3::new(1.0, f64::INFINITY, 3.0));
}
