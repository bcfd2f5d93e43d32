use floating_lyric::config::AppConfig;
use floating_lyric::context::OverlayContext;
use floating_lyric::overlay::placement::{gravity, WindowType, WRAP_CONTENT};
use floating_lyric::overlay::style::Argb;
use floating_lyric::overlay::{OverlayStyle, PositionOffset, TouchEvent};
use floating_lyric::platform::android::AndroidOverlay;
use floating_lyric::testing::{FakeWindowHost, HostCall};

fn setup(sdk: i32) -> (OverlayContext, FakeWindowHost) {
    let host = FakeWindowHost::new(sdk, 3.0);
    let backend = AndroidOverlay::new(host.clone());
    let context = OverlayContext::with_backend(Box::new(backend), &AppConfig::default());
    (context, host)
}

#[test]
fn show_adds_one_top_centered_window() {
    let (context, host) = setup(34);
    context.invoke_json("show", r#"{"text":"Track A"}"#);
    context.invoke_json("show", r#"{"text":"Track B"}"#);

    assert_eq!(host.attached_views(), 1);
    let calls = host.calls();
    match &calls[0] {
        HostCall::AddView { view, params } => {
            assert_eq!(view.text, "Track A");
            // 20dp / 10dp at density 3
            assert_eq!(view.padding_horizontal_px, 60);
            assert_eq!(view.padding_vertical_px, 30);
            assert_eq!(view.elevation_px, 36.0);
            assert_eq!(params.window_type, WindowType::ApplicationOverlay);
            assert_eq!(params.width, WRAP_CONTENT);
            assert_eq!(params.gravity, gravity::TOP | gravity::CENTER_HORIZONTAL);
            assert_eq!(params.position, PositionOffset::new(0, 100));
        }
        other => panic!("Expected AddView, got {:?}", other),
    }
    assert_eq!(calls[1], HostCall::SetText("Track B".to_string()));
}

#[test]
fn show_without_overlay_permission() {
    let (context, host) = setup(34);
    host.set_can_draw(false);

    let response = context.invoke_json("show", r#"{"text":"x"}"#);
    assert!(response.contains("NO_PERMISSION"));
    assert!(host.calls().is_empty());

    assert_eq!(
        context.invoke_json("requestPermission", ""),
        r#"{"success":false}"#
    );
    assert_eq!(host.calls(), vec![HostCall::OpenSettings]);
}

#[test]
fn add_view_failure_reports_show_failed() {
    let (context, host) = setup(34);
    host.fail_next_add_view();

    let response = context.invoke_json("show", "{}");
    assert!(response.contains("SHOW_FAILED"));
    assert!(response.contains("BadTokenException"));
    assert!(!context.state().unwrap().visible);
}

#[test]
fn drag_updates_window_layout() {
    let (context, host) = setup(34);
    context.invoke_json("show", "{}");
    host.clear_calls();

    context.handle_touch(TouchEvent::down(500.0, 800.0));
    context.handle_touch(TouchEvent::moved(470.0, 900.0));
    context.handle_touch(TouchEvent::moved(450.0, 1000.0));
    context.handle_touch(TouchEvent::up(450.0, 1000.0));

    let layouts: Vec<PositionOffset> = host
        .calls()
        .iter()
        .filter_map(|call| match call {
            HostCall::UpdateLayout(params) => Some(params.position),
            _ => None,
        })
        .collect();
    assert_eq!(
        layouts,
        vec![PositionOffset::new(-30, 200), PositionOffset::new(-50, 300)]
    );
    assert_eq!(host.last_position(), Some(PositionOffset::new(-50, 300)));
}

#[test]
fn style_update_converts_dp_and_keeps_font_in_sp() {
    let (context, host) = setup(34);
    context.invoke_json("show", "{}");
    host.clear_calls();

    context
        .update_style(&OverlayStyle {
            font_size: Some(20.0),
            background_color: Some(Argb(0x8000_0000)),
            padding_horizontal: Some(8.0),
            ..Default::default()
        })
        .unwrap();

    assert_eq!(
        host.calls(),
        vec![
            HostCall::SetTextSize(20.0),
            HostCall::SetBackground {
                color: Argb(0x8000_0000),
                corner_radius_px: 48.0
            },
            HostCall::SetPadding {
                horizontal_px: 24,
                vertical_px: 30
            },
        ]
    );
}

#[test]
fn hide_removes_the_window() {
    let (context, host) = setup(25);
    context.invoke_json("show", "{}");
    assert_eq!(context.invoke_json("hide", ""), r#"{"success":true}"#);
    assert_eq!(host.attached_views(), 0);
    // hiding again touches nothing
    host.clear_calls();
    context.invoke_json("hide", "");
    assert!(host.calls().is_empty());
}
