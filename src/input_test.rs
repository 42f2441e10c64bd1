use serde_json::json;

use super::*;

// =============================================================
// Modifiers
// =============================================================

#[test]
fn modifiers_default_all_false() {
    let m = Modifiers::default();
    assert!(!m.shift);
    assert!(!m.ctrl);
    assert!(!m.alt);
    assert!(!m.meta);
    assert!(!m.command());
}

#[test]
fn command_is_ctrl_or_meta() {
    assert!(Modifiers { ctrl: true, ..Default::default() }.command());
    assert!(Modifiers { meta: true, ..Default::default() }.command());
    assert!(!Modifiers { shift: true, alt: true, ..Default::default() }.command());
}

#[test]
fn modifiers_missing_fields_default() {
    let m: Modifiers = serde_json::from_value(json!({ "shift": true })).unwrap();
    assert!(m.shift);
    assert!(!m.ctrl);
}

// =============================================================
// Button
// =============================================================

#[test]
fn button_default_is_primary() {
    assert_eq!(Button::default(), Button::Primary);
}

#[test]
fn button_serde_names() {
    assert_eq!(serde_json::to_value(Button::Secondary).unwrap(), json!("secondary"));
    let b: Button = serde_json::from_value(json!("middle")).unwrap();
    assert_eq!(b, Button::Middle);
}

// =============================================================
// KeyEvent
// =============================================================

#[test]
fn key_match_ignores_case() {
    let k = KeyEvent::new("Z", Modifiers::default());
    assert!(k.is("z"));
    assert!(!k.is("y"));
}

// =============================================================
// InputEvent
// =============================================================

#[test]
fn pointer_event_deserializes_with_defaults() {
    let ev: InputEvent = serde_json::from_value(json!({ "type": "pointer_down", "x": 4.0, "y": 5.0 })).unwrap();
    assert_eq!(ev, InputEvent::PointerDown(PointerEvent::primary(4.0, 5.0)));
}

#[test]
fn key_event_deserializes() {
    let ev: InputEvent =
        serde_json::from_value(json!({ "type": "key_down", "key": "z", "modifiers": { "ctrl": true } })).unwrap();
    let InputEvent::KeyDown(key) = ev else {
        panic!("expected key_down");
    };
    assert!(key.modifiers.ctrl);
    assert!(key.is("z"));
}

#[test]
fn wheel_event_deserializes() {
    let ev: InputEvent =
        serde_json::from_value(json!({ "type": "wheel", "x": 1.0, "y": 2.0, "dx": 0.0, "dy": -3.0 })).unwrap();
    let InputEvent::Wheel(wheel) = ev else {
        panic!("expected wheel");
    };
    assert_eq!(wheel.screen(), Point::new(1.0, 2.0));
    assert!((wheel.dy + 3.0).abs() < f64::EPSILON);
}
