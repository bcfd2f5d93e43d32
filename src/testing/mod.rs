//! Testability harness: in-memory stand-ins for the platform hosts.
//!
//! The fakes record every call and share their state through `Arc<Mutex<_>>`,
//! so a test can keep a clone for inspection after handing the original to an
//! adapter. Failures are injected through the same handle.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::error::HostError;
use crate::overlay::placement::LayoutParams;
use crate::overlay::style::Argb;
use crate::overlay::HostEvent;
use crate::platform::android::{ViewSpec, WindowHost};
use crate::platform::ios::{EventScheduler, LabelSpec, PipHost};

fn lock<T>(state: &Mutex<T>) -> MutexGuard<'_, T> {
    state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

// ============================================================================
// Android window host
// ============================================================================

/// Call recorded by [`FakeWindowHost`].
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    AddView {
        view: ViewSpec,
        params: LayoutParams,
    },
    RemoveView,
    UpdateLayout(LayoutParams),
    SetText(String),
    SetTextSize(f32),
    SetTextColor(Argb),
    SetBackground {
        color: Argb,
        corner_radius_px: f32,
    },
    SetPadding {
        horizontal_px: i32,
        vertical_px: i32,
    },
    OpenSettings,
}

#[derive(Debug)]
struct WindowState {
    calls: Vec<HostCall>,
    can_draw: bool,
    fail_add_view: bool,
}

/// Window manager stand-in with a togglable overlay permission.
#[derive(Debug, Clone)]
pub struct FakeWindowHost {
    sdk_int: i32,
    density: f32,
    state: Arc<Mutex<WindowState>>,
}

impl FakeWindowHost {
    pub fn new(sdk_int: i32, density: f32) -> Self {
        Self {
            sdk_int,
            density,
            state: Arc::new(Mutex::new(WindowState {
                calls: Vec::new(),
                can_draw: true,
                fail_add_view: false,
            })),
        }
    }

    pub fn calls(&self) -> Vec<HostCall> {
        lock(&self.state).calls.clone()
    }

    pub fn clear_calls(&self) {
        lock(&self.state).calls.clear();
    }

    pub fn set_can_draw(&self, granted: bool) {
        lock(&self.state).can_draw = granted;
    }

    /// Make the next `addView` throw, like a `BadTokenException`.
    pub fn fail_next_add_view(&self) {
        lock(&self.state).fail_add_view = true;
    }

    /// Number of views currently attached to the window manager.
    pub fn attached_views(&self) -> usize {
        let state = lock(&self.state);
        let added = state
            .calls
            .iter()
            .filter(|call| matches!(call, HostCall::AddView { .. }))
            .count();
        let removed = state
            .calls
            .iter()
            .filter(|call| matches!(call, HostCall::RemoveView))
            .count();
        added.saturating_sub(removed)
    }

    /// Last position pushed through `addView` or `updateViewLayout`.
    pub fn last_position(&self) -> Option<crate::overlay::PositionOffset> {
        lock(&self.state)
            .calls
            .iter()
            .rev()
            .find_map(|call| match call {
                HostCall::AddView { params, .. } | HostCall::UpdateLayout(params) => {
                    Some(params.position)
                }
                _ => None,
            })
    }

    fn record(&self, call: HostCall) -> Result<(), HostError> {
        lock(&self.state).calls.push(call);
        Ok(())
    }
}

impl WindowHost for FakeWindowHost {
    fn sdk_int(&self) -> i32 {
        self.sdk_int
    }

    fn density(&self) -> f32 {
        self.density
    }

    fn can_draw_overlays(&self) -> Result<bool, HostError> {
        Ok(lock(&self.state).can_draw)
    }

    fn open_overlay_settings(&mut self) -> Result<(), HostError> {
        self.record(HostCall::OpenSettings)
    }

    fn add_view(&mut self, view: &ViewSpec, params: &LayoutParams) -> Result<(), HostError> {
        let mut state = lock(&self.state);
        if state.fail_add_view {
            state.fail_add_view = false;
            return Err(HostError::call("addView", "BadTokenException"));
        }
        state.calls.push(HostCall::AddView {
            view: view.clone(),
            params: *params,
        });
        Ok(())
    }

    fn remove_view(&mut self) -> Result<(), HostError> {
        self.record(HostCall::RemoveView)
    }

    fn update_view_layout(&mut self, params: &LayoutParams) -> Result<(), HostError> {
        self.record(HostCall::UpdateLayout(*params))
    }

    fn set_text(&mut self, text: &str) -> Result<(), HostError> {
        self.record(HostCall::SetText(text.to_string()))
    }

    fn set_text_size(&mut self, sp: f32) -> Result<(), HostError> {
        self.record(HostCall::SetTextSize(sp))
    }

    fn set_text_color(&mut self, color: Argb) -> Result<(), HostError> {
        self.record(HostCall::SetTextColor(color))
    }

    fn set_background(&mut self, color: Argb, corner_radius_px: f32) -> Result<(), HostError> {
        self.record(HostCall::SetBackground {
            color,
            corner_radius_px,
        })
    }

    fn set_padding(&mut self, horizontal_px: i32, vertical_px: i32) -> Result<(), HostError> {
        self.record(HostCall::SetPadding {
            horizontal_px,
            vertical_px,
        })
    }
}

// ============================================================================
// iOS PiP host
// ============================================================================

/// Call recorded by [`FakePipHost`].
#[derive(Debug, Clone, PartialEq)]
pub enum PipCall {
    PreparePlayer(PathBuf),
    Play,
    Pause,
    StartPip,
    StopPip,
    InjectLabel(LabelSpec),
    RemoveLabel,
    SetText(String),
    SetFontSize(f32),
    SetTextColor(Argb),
    SetBackground { color: Argb, corner_radius: f32 },
}

#[derive(Debug)]
struct PipState {
    calls: Vec<PipCall>,
    supported: bool,
    possible: bool,
    active: bool,
    window_available: bool,
    label: Option<LabelSpec>,
}

/// PiP stand-in. `start_pip` activates the session immediately; the
/// delegate callbacks are fed separately by the test.
#[derive(Debug, Clone)]
pub struct FakePipHost {
    state: Arc<Mutex<PipState>>,
}

impl FakePipHost {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(PipState {
                calls: Vec::new(),
                supported: true,
                possible: true,
                active: false,
                window_available: true,
                label: None,
            })),
        }
    }

    pub fn calls(&self) -> Vec<PipCall> {
        lock(&self.state).calls.clone()
    }

    pub fn clear_calls(&self) {
        lock(&self.state).calls.clear();
    }

    pub fn set_supported(&self, supported: bool) {
        lock(&self.state).supported = supported;
    }

    /// Whether the controller can start PiP right now.
    pub fn set_possible(&self, possible: bool) {
        lock(&self.state).possible = possible;
    }

    pub fn set_active(&self, active: bool) {
        lock(&self.state).active = active;
    }

    pub fn set_window_available(&self, available: bool) {
        lock(&self.state).window_available = available;
    }

    /// Text of the label currently in the PiP window.
    pub fn label_text(&self) -> Option<String> {
        lock(&self.state).label.as_ref().map(|label| label.text.clone())
    }

    fn record(&self, call: PipCall) -> Result<(), HostError> {
        lock(&self.state).calls.push(call);
        Ok(())
    }

    fn with_label(&self, call: PipCall, f: impl FnOnce(&mut LabelSpec)) -> Result<(), HostError> {
        let mut state = lock(&self.state);
        let label = state.label.as_mut().ok_or(HostError::Unavailable {
            what: "PiP label",
        })?;
        f(label);
        state.calls.push(call);
        Ok(())
    }
}

impl Default for FakePipHost {
    fn default() -> Self {
        Self::new()
    }
}

impl PipHost for FakePipHost {
    fn is_pip_supported(&self) -> bool {
        lock(&self.state).supported
    }

    fn prepare_player(&mut self, video: &std::path::Path) -> Result<(), HostError> {
        self.record(PipCall::PreparePlayer(video.to_path_buf()))
    }

    fn play(&mut self) -> Result<(), HostError> {
        self.record(PipCall::Play)
    }

    fn pause(&mut self) -> Result<(), HostError> {
        self.record(PipCall::Pause)
    }

    fn is_pip_possible(&self) -> bool {
        lock(&self.state).possible
    }

    fn start_pip(&mut self) -> Result<(), HostError> {
        let mut state = lock(&self.state);
        state.active = true;
        state.calls.push(PipCall::StartPip);
        Ok(())
    }

    fn stop_pip(&mut self) -> Result<(), HostError> {
        let mut state = lock(&self.state);
        state.active = false;
        state.calls.push(PipCall::StopPip);
        Ok(())
    }

    fn is_pip_active(&self) -> bool {
        lock(&self.state).active
    }

    fn inject_label(&mut self, label: &LabelSpec) -> Result<bool, HostError> {
        let mut state = lock(&self.state);
        if !state.window_available {
            return Ok(false);
        }
        state.label = Some(label.clone());
        state.calls.push(PipCall::InjectLabel(label.clone()));
        Ok(true)
    }

    fn remove_label(&mut self) -> Result<(), HostError> {
        let mut state = lock(&self.state);
        state.label = None;
        state.calls.push(PipCall::RemoveLabel);
        Ok(())
    }

    fn set_label_text(&mut self, text: &str) -> Result<(), HostError> {
        self.with_label(PipCall::SetText(text.to_string()), |label| {
            label.text = text.to_string();
        })
    }

    fn set_label_font_size(&mut self, size: f32) -> Result<(), HostError> {
        self.with_label(PipCall::SetFontSize(size), |label| label.font_size = size)
    }

    fn set_label_text_color(&mut self, color: Argb) -> Result<(), HostError> {
        self.with_label(PipCall::SetTextColor(color), |label| label.text_color = color)
    }

    fn set_label_background(&mut self, color: Argb, corner_radius: f32) -> Result<(), HostError> {
        self.with_label(
            PipCall::SetBackground {
                color,
                corner_radius,
            },
            |label| {
                label.background_color = color;
                label.corner_radius = corner_radius;
            },
        )
    }
}

// ============================================================================
// Scheduler
// ============================================================================

/// Scheduler that only queues; the test decides when events fire.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    pending: Arc<Mutex<Vec<(Duration, HostEvent)>>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Vec<(Duration, HostEvent)> {
        lock(&self.pending).clone()
    }

    /// Drain everything scheduled so far, in order.
    pub fn take(&self) -> Vec<(Duration, HostEvent)> {
        std::mem::take(&mut *lock(&self.pending))
    }
}

impl EventScheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, event: HostEvent) {
        lock(&self.pending).push((delay, event));
    }
}
