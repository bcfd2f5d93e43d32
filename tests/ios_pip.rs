use floating_lyric::config::AppConfig;
use floating_lyric::context::OverlayContext;
use floating_lyric::overlay::{DragOutcome, HostEvent, HostEventOutcome, OverlayEvent, TouchEvent};
use std::path::Path;

use floating_lyric::error::HostError;
use floating_lyric::overlay::Argb;
use floating_lyric::platform::ios::{post_host_event, LabelSpec, PipHost, PipOverlay};
use floating_lyric::testing::{FakePipHost, ManualScheduler, PipCall};

fn setup() -> (OverlayContext, FakePipHost, ManualScheduler) {
    let host = FakePipHost::new();
    let scheduler = ManualScheduler::new();
    let config = AppConfig::default();
    let backend = PipOverlay::new(
        host.clone(),
        scheduler.clone(),
        config.pip.clone(),
        std::env::temp_dir(),
    );
    let context = OverlayContext::with_backend(Box::new(backend), &config);
    (context, host, scheduler)
}

/// Deliver will-start and run the scheduled injection.
fn start_session(context: &OverlayContext, scheduler: &ManualScheduler) {
    context.handle_host_event(HostEvent::PipWillStart);
    for (_, event) in scheduler.take() {
        context.handle_host_event(event);
    }
}

#[test]
fn permission_is_always_granted() {
    let (context, _, _) = setup();
    assert_eq!(context.invoke_json("hasPermission", ""), r#"{"success":true}"#);
    assert_eq!(context.invoke_json("requestPermission", ""), r#"{"success":true}"#);
}

#[test]
fn show_injects_label_after_will_start() {
    let (context, host, scheduler) = setup();
    assert_eq!(
        context.invoke_json("show", r#"{"text":"Track A"}"#),
        r#"{"success":true}"#
    );
    assert_eq!(host.label_text(), None);

    start_session(&context, &scheduler);
    assert_eq!(host.label_text().as_deref(), Some("Track A"));

    context.invoke_json("updateText", r#"{"text":"Line 2"}"#);
    assert_eq!(host.label_text().as_deref(), Some("Line 2"));
}

#[test]
fn pip_close_emits_on_close_and_resets() {
    let (context, host, scheduler) = setup();
    let mut events = context.subscribe_events();
    context.invoke_json("show", r#"{"text":"Track A","fontSize":30}"#);
    start_session(&context, &scheduler);

    assert_eq!(
        context.handle_host_event(HostEvent::PipDidStop),
        HostEventOutcome::SurfaceClosed
    );
    assert_eq!(events.try_recv().unwrap(), OverlayEvent::Close);

    let state = context.state().unwrap();
    assert!(!state.visible);
    assert_eq!(state.style.font_size, 16.0);
    assert_eq!(host.label_text(), None);
    assert_eq!(
        context.invoke_json("updateText", r#"{"text":"x"}"#),
        r#"{"success":false}"#
    );
}

#[test]
fn failed_start_marks_hidden_without_event() {
    let (context, _, _) = setup();
    let mut events = context.subscribe_events();
    context.invoke_json("show", "{}");

    context.handle_host_event(HostEvent::PipFailedToStart {
        reason: "audio session inactive".to_string(),
    });
    assert!(!context.state().unwrap().visible);
    assert!(events.try_recv().is_err());
}

#[test]
fn unsupported_device_reports_show_failed() {
    let (context, host, _) = setup();
    host.set_supported(false);
    assert!(context.invoke_json("show", "{}").contains("SHOW_FAILED"));
}

#[test]
fn hide_stops_pip() {
    let (context, host, scheduler) = setup();
    context.invoke_json("show", "{}");
    start_session(&context, &scheduler);
    host.clear_calls();

    assert_eq!(context.invoke_json("hide", ""), r#"{"success":true}"#);
    assert_eq!(host.calls(), vec![PipCall::StopPip, PipCall::Pause]);
}

#[test]
fn touches_are_ignored() {
    let (context, _, _) = setup();
    context.invoke_json("show", "{}");
    assert_eq!(
        context.handle_touch(TouchEvent::down(1.0, 1.0)),
        DragOutcome::Ignored
    );
}

#[test]
fn show_waits_until_pip_is_possible() {
    let (context, host, scheduler) = setup();
    host.set_possible(false);
    assert_eq!(context.invoke_json("show", r#"{"text":"Track A"}"#), r#"{"success":true}"#);
    assert!(!host.calls().contains(&PipCall::StartPip));

    host.set_possible(true);
    for (_, event) in scheduler.take() {
        context.handle_host_event(event);
    }
    assert!(host.calls().contains(&PipCall::StartPip));

    start_session(&context, &scheduler);
    assert_eq!(host.label_text().as_deref(), Some("Track A"));
}

/// Host whose controller reports failure from inside `startPictureInPicture`.
struct FailingStartHost {
    inner: FakePipHost,
    callbacks: ManualScheduler,
}

impl PipHost for FailingStartHost {
    fn is_pip_supported(&self) -> bool {
        self.inner.is_pip_supported()
    }

    fn prepare_player(&mut self, video: &Path) -> Result<(), HostError> {
        self.inner.prepare_player(video)
    }

    fn play(&mut self) -> Result<(), HostError> {
        self.inner.play()
    }

    fn pause(&mut self) -> Result<(), HostError> {
        self.inner.pause()
    }

    fn is_pip_possible(&self) -> bool {
        self.inner.is_pip_possible()
    }

    fn start_pip(&mut self) -> Result<(), HostError> {
        self.inner.start_pip()?;
        post_host_event(
            &self.callbacks,
            HostEvent::PipFailedToStart {
                reason: "media services reset".to_string(),
            },
        );
        Ok(())
    }

    fn stop_pip(&mut self) -> Result<(), HostError> {
        self.inner.stop_pip()
    }

    fn is_pip_active(&self) -> bool {
        self.inner.is_pip_active()
    }

    fn inject_label(&mut self, label: &LabelSpec) -> Result<bool, HostError> {
        self.inner.inject_label(label)
    }

    fn remove_label(&mut self) -> Result<(), HostError> {
        self.inner.remove_label()
    }

    fn set_label_text(&mut self, text: &str) -> Result<(), HostError> {
        self.inner.set_label_text(text)
    }

    fn set_label_font_size(&mut self, size: f32) -> Result<(), HostError> {
        self.inner.set_label_font_size(size)
    }

    fn set_label_text_color(&mut self, color: Argb) -> Result<(), HostError> {
        self.inner.set_label_text_color(color)
    }

    fn set_label_background(&mut self, color: Argb, corner_radius: f32) -> Result<(), HostError> {
        self.inner.set_label_background(color, corner_radius)
    }
}

#[test]
fn controller_callback_during_start_is_delivered_after_show_returns() {
    let callbacks = ManualScheduler::new();
    let host = FailingStartHost {
        inner: FakePipHost::new(),
        callbacks: callbacks.clone(),
    };
    let config = AppConfig::default();
    let backend = PipOverlay::new(
        host,
        ManualScheduler::new(),
        config.pip.clone(),
        std::env::temp_dir(),
    );
    let context = OverlayContext::with_backend(Box::new(backend), &config);

    assert_eq!(context.invoke_json("show", "{}"), r#"{"success":true}"#);
    assert!(context.state().unwrap().visible);

    let pending = callbacks.take();
    assert_eq!(pending.len(), 1);
    for (_, event) in pending {
        assert_eq!(
            context.handle_host_event(event),
            HostEventOutcome::SurfaceFailed
        );
    }
    assert!(!context.state().unwrap().visible);
}
