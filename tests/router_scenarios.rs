use floating_lyric::channel::MethodCall;
use floating_lyric::config::AppConfig;
use floating_lyric::context::OverlayContext;
use floating_lyric::overlay::style::Argb;
use floating_lyric::overlay::{DragOutcome, OverlayStyle, PositionOffset, TouchEvent};
use floating_lyric::platform::{HeadlessBackend, HeadlessProbe, SurfaceOp};
use serde_json::json;

fn setup() -> (OverlayContext, HeadlessProbe) {
    let backend = HeadlessBackend::new();
    let probe = backend.probe();
    let context = OverlayContext::with_backend(Box::new(backend), &AppConfig::default());
    (context, probe)
}

fn call(context: &OverlayContext, method: &str, args: serde_json::Value) -> serde_json::Value {
    context
        .handle_method_call(&MethodCall::new(method, args))
        .to_json()
}

#[test]
fn partial_style_update_keeps_absent_fields() {
    let (context, probe) = setup();
    call(&context, "show", json!({ "text": "Track A" }));

    let before = probe.rendered_style().unwrap();
    call(&context, "updateStyle", json!({ "fontSize": 24 }));

    let after = context.state().unwrap().style;
    assert_eq!(after.font_size, 24.0);
    assert_eq!(after.text_color, before.text_color);
    assert_eq!(after.background_color, before.background_color);
    assert_eq!(after.corner_radius, before.corner_radius);
    assert_eq!(after.padding_horizontal, before.padding_horizontal);
    assert_eq!(after.padding_vertical, before.padding_vertical);
}

#[test]
fn update_text_before_show_renders_nothing() {
    let (context, probe) = setup();
    assert_eq!(
        call(&context, "updateText", json!({ "text": "x" })),
        json!({ "success": false })
    );
    assert!(probe.ops().is_empty());
}

#[test]
fn show_without_permission_fails_and_stays_hidden() {
    let (context, probe) = setup();
    probe.set_permission(false);

    let response = call(&context, "show", json!({ "text": "x" }));
    assert_eq!(response["errorCode"], "NO_PERMISSION");
    assert!(!context.state().unwrap().visible);
    assert_eq!(probe.attach_count(), 0);
}

#[test]
fn sub_threshold_gesture_is_a_tap() {
    let (context, probe) = setup();
    call(&context, "show", json!({}));
    probe.clear_ops();

    assert_eq!(context.handle_touch(TouchEvent::down(100.0, 100.0)), DragOutcome::Pressed);
    assert_eq!(context.handle_touch(TouchEvent::moved(105.0, 96.0)), DragOutcome::Tracking);
    assert_eq!(context.handle_touch(TouchEvent::moved(110.0, 110.0)), DragOutcome::Tracking);
    assert_eq!(context.handle_touch(TouchEvent::up(110.0, 110.0)), DragOutcome::Tap);

    assert!(probe.ops().is_empty());
    assert_eq!(context.state().unwrap().position, PositionOffset::new(0, 100));
}

#[test]
fn over_threshold_gesture_moves_by_displacement() {
    let (context, _) = setup();
    call(&context, "show", json!({}));

    context.handle_touch(TouchEvent::down(100.0, 100.0));
    context.handle_touch(TouchEvent::moved(111.0, 100.0));
    context.handle_touch(TouchEvent::moved(140.7, 60.2));
    let released = context.handle_touch(TouchEvent::up(140.7, 60.2));

    assert_eq!(released, DragOutcome::DragEnded);
    // (40.7, -39.8) truncates toward zero
    assert_eq!(context.state().unwrap().position, PositionOffset::new(40, 61));
}

#[test]
fn hide_when_hidden_succeeds() {
    let (context, probe) = setup();
    assert_eq!(call(&context, "hide", json!(null)), json!({ "success": true }));
    assert!(probe.ops().is_empty());
}

#[test]
fn repeated_show_keeps_one_surface() {
    let (context, probe) = setup();
    call(&context, "show", json!({ "text": "a" }));
    call(&context, "show", json!({ "text": "b" }));
    call(&context, "show", json!({ "text": "c" }));

    assert_eq!(probe.attach_count(), 1);
    assert_eq!(probe.rendered_text(), "c");
    assert_eq!(context.state().unwrap().current_text, "c");
}

#[test]
fn sequential_style_updates_combine() {
    let (context, _) = setup();
    call(&context, "show", json!({}));
    call(&context, "updateStyle", json!({ "fontSize": 20 }));
    call(&context, "updateStyle", json!({ "textColor": 0xFF00FF00u32 }));

    let style = context.state().unwrap().style;
    assert_eq!(style.font_size, 20.0);
    assert_eq!(style.text_color, Argb(0xFF00_FF00));
}

#[test]
fn style_groups_are_rendered_selectively() {
    let (context, probe) = setup();
    call(&context, "show", json!({}));
    probe.clear_ops();

    call(&context, "updateStyle", json!({ "paddingVertical": 2.5 }));
    match probe.ops().as_slice() {
        [SurfaceOp::Style(changes)] => {
            assert!(changes.padding);
            assert!(!changes.font_size && !changes.text_color && !changes.background);
        }
        other => panic!("unexpected ops {:?}", other),
    }
}

#[test]
fn show_after_hide_starts_from_defaults() {
    let (context, probe) = setup();
    call(&context, "show", json!({ "text": "a", "cornerRadius": 2 }));
    context.handle_touch(TouchEvent::down(0.0, 0.0));
    context.handle_touch(TouchEvent::moved(50.0, 50.0));
    context.handle_touch(TouchEvent::up(50.0, 50.0));
    call(&context, "hide", json!({}));

    call(&context, "show", json!({ "text": "b" }));
    assert_eq!(probe.rendered_position(), Some(PositionOffset::new(0, 100)));
    assert_eq!(probe.rendered_style().unwrap().corner_radius, 16.0);
}

#[test]
fn unknown_method_is_not_implemented() {
    let (context, _) = setup();
    assert_eq!(
        call(&context, "setOpacity", json!({})),
        json!({ "notImplemented": true })
    );
}

#[test]
fn style_while_hidden_applies_on_next_show() {
    let (context, probe) = setup();
    context
        .update_style(&OverlayStyle {
            background_color: Some(Argb(0x8011_2233)),
            ..Default::default()
        })
        .unwrap();
    call(&context, "show", json!({}));
    assert_eq!(
        probe.rendered_style().unwrap().background_color,
        Argb(0x8011_2233)
    );
}
