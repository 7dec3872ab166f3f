//! Builtin IOTypes shared by every session.

pub mod color;
pub mod event;
pub mod math;
pub mod parametric;
pub mod primitives;

pub use parametric::{array_io, function_io, function_type_name, nullable_io};
pub use primitives::{NEGATIVE_INFINITY, POSITIVE_INFINITY};

use crate::callbacks::CallbackId;
use crate::error::Result;
use crate::indexed_node::node_io;
use crate::io_type::IOType;
use crate::registry::TypeRegistry;
use crate::scene::Node;
use phetio_data::{Bounds3, Color, Dimension3, NativeEvent, Vector3};
use std::rc::Rc;

/// Typed handles to the builtin types, all registered in one registry.
pub struct Builtins {
    pub object: Rc<IOType<()>>,
    pub void: Rc<IOType<()>>,
    pub number: Rc<IOType<f64>>,
    pub boolean: Rc<IOType<bool>>,
    pub string: Rc<IOType<String>>,
    pub infinite_number: Rc<IOType<f64>>,
    pub nullable_number: Rc<IOType<Option<f64>>>,
    pub nullable_boolean: Rc<IOType<Option<bool>>>,
    pub nullable_string: Rc<IOType<Option<String>>>,
    pub validation_errors: Rc<IOType<Vec<Option<String>>>>,
    /// `FunctionIO(NullableIO<NumberIO>)=>VoidIO`, the `linkIndex` listener.
    pub index_listener: Rc<IOType<CallbackId>>,
    pub vector3: Rc<IOType<Vector3>>,
    pub bounds3: Rc<IOType<Bounds3>>,
    pub dimension3: Rc<IOType<Dimension3>>,
    pub color: Rc<IOType<Color>>,
    pub event: Rc<IOType<NativeEvent>>,
    pub node: Rc<IOType<Node>>,
}

impl Builtins {
    pub fn register(registry: &mut TypeRegistry) -> Result<Self> {
        let object = primitives::object_io();
        let void = primitives::void_io();
        let number = primitives::number_io();
        let boolean = primitives::boolean_io();
        let string = primitives::string_io();
        let infinite_number = primitives::infinite_number_io();
        for leaf in [&object, &void] {
            registry.register(leaf)?;
        }
        registry.register(&number)?;
        registry.register(&boolean)?;
        registry.register(&string)?;
        registry.register(&infinite_number)?;

        let nullable_number = nullable_io(registry, &number)?;
        let nullable_boolean = nullable_io(registry, &boolean)?;
        let nullable_string = nullable_io(registry, &string)?;
        let validation_errors = array_io(registry, &nullable_string)?;
        let index_listener =
            function_io(registry, &void.erased(), &[nullable_number.erased()])?;

        let vector3 = math::vector3_io(&number);
        let bounds3 = math::bounds3_io(&infinite_number);
        let dimension3 = math::dimension3_io(&infinite_number);
        let color = color::color_io(&number);
        let event = event::event_io(&event::EventFieldTypes {
            number: nullable_number.erased(),
            boolean: nullable_boolean.erased(),
            string: nullable_string.erased(),
        });
        let node = node_io();
        registry.register(&vector3)?;
        registry.register(&bounds3)?;
        registry.register(&dimension3)?;
        registry.register(&color)?;
        registry.register(&event)?;
        registry.register(&node)?;
        tracing::debug!(types = registry.len(), "Registered builtin IOTypes");

        Ok(Self {
            object,
            void,
            number,
            boolean,
            string,
            infinite_number,
            nullable_number,
            nullable_boolean,
            nullable_string,
            validation_errors,
            index_listener,
            vector3,
            bounds3,
            dimension3,
            color,
            event,
            node,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io_type::AnyIOType;

    #[test]
    fn test_builtins_register_once() {
        let mut registry = TypeRegistry::new();
        let builtins = Builtins::register(&mut registry).unwrap();
        assert!(registry.contains("NullableIO<StringIO>"));
        assert!(registry.contains("ArrayIO<NullableIO<StringIO>>"));
        assert!(registry.contains("FunctionIO(NullableIO<NumberIO>)=>VoidIO"));
        assert!(registry.contains("EventIO"));
        assert_eq!(builtins.color.type_name(), "ColorIO");
        assert!(Builtins::register(&mut registry).is_err());
    }

    #[test]
    fn test_every_builtin_descends_from_object() {
        let mut registry = TypeRegistry::new();
        Builtins::register(&mut registry).unwrap();
        for name in registry.type_names() {
            let io_type = registry.get(name).unwrap();
            assert!(io_type.is_subtype_of("ObjectIO"), "{name}");
        }
    }
}
