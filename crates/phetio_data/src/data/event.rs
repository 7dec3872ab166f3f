use serde::{Deserialize, Serialize};

/// Snapshot of a native input event.
///
/// Mirrors the union of the fields populated by mouse, pointer, touch,
/// wheel, gesture and keyboard events. Each event kind fills a different
/// subset, so every field is optional and absent fields serialize as `null`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NativeEvent {
    pub constructor_name: Option<String>,
    pub alt_key: Option<bool>,
    pub button: Option<i32>,
    pub char_code: Option<u32>,
    pub client_x: Option<f64>,
    pub client_y: Option<f64>,
    pub code: Option<String>,
    pub ctrl_key: Option<bool>,
    pub delta_mode: Option<u32>,
    pub delta_x: Option<f64>,
    pub delta_y: Option<f64>,
    pub delta_z: Option<f64>,
    pub key: Option<String>,
    pub key_code: Option<u32>,
    pub meta_key: Option<bool>,
    pub page_x: Option<f64>,
    pub page_y: Option<f64>,
    pub pointer_id: Option<i64>,
    pub pointer_type: Option<String>,
    /// Id of the element the pointer came from or moved to.
    pub related_target: Option<String>,
    pub scale: Option<f64>,
    pub shift_key: Option<bool>,
    /// Id of the element the event was dispatched to.
    pub target: Option<String>,
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub which: Option<u32>,
}

impl NativeEvent {
    /// Wire names of every field, in declaration order.
    pub const FIELD_NAMES: [&'static str; 25] = [
        "constructorName",
        "altKey",
        "button",
        "charCode",
        "clientX",
        "clientY",
        "code",
        "ctrlKey",
        "deltaMode",
        "deltaX",
        "deltaY",
        "deltaZ",
        "key",
        "keyCode",
        "metaKey",
        "pageX",
        "pageY",
        "pointerId",
        "pointerType",
        "relatedTarget",
        "scale",
        "shiftKey",
        "target",
        "type",
        "which",
    ];

    /// A `pointerdown` from a mouse at the given client coordinates.
    #[must_use]
    pub fn pointer_down(pointer_id: i64, client_x: f64, client_y: f64) -> Self {
        Self {
            constructor_name: Some("PointerEvent".to_string()),
            event_type: Some("pointerdown".to_string()),
            pointer_id: Some(pointer_id),
            pointer_type: Some("mouse".to_string()),
            button: Some(0),
            client_x: Some(client_x),
            client_y: Some(client_y),
            ..Default::default()
        }
    }

    /// A `keydown` for the given key.
    #[must_use]
    pub fn key_down(key: &str, code: &str) -> Self {
        Self {
            constructor_name: Some("KeyboardEvent".to_string()),
            event_type: Some("keydown".to_string()),
            key: Some(key.to_string()),
            code: Some(code.to_string()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_field_serializes() {
        let json = serde_json::to_value(NativeEvent::key_down("a", "KeyA")).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), NativeEvent::FIELD_NAMES.len());
        for name in NativeEvent::FIELD_NAMES {
            assert!(object.contains_key(name), "missing {name}");
        }
        assert_eq!(object["type"], "keydown");
        assert!(object["clientX"].is_null());
    }
}
