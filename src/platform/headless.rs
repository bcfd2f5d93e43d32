use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::HostError;
use crate::overlay::{
    OverlayBackend, OverlaySurface, PermissionGate, PositionOffset, ResolvedStyle, StyleChanges,
};

/// Operation recorded by the headless backend.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    Attach {
        text: String,
        position: PositionOffset,
    },
    Detach,
    Position(PositionOffset),
    Text(String),
    Style(StyleChanges),
    OpenPermissionSettings,
}

/// Surface operation that can be made to fail once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    Attach,
    Detach,
    Position,
    Text,
    Style,
    PermissionSettings,
}

#[derive(Debug)]
struct HeadlessState {
    ops: Vec<SurfaceOp>,
    attached: bool,
    permission_granted: bool,
    fail_next: Option<FailPoint>,
    text: String,
    style: Option<ResolvedStyle>,
    position: Option<PositionOffset>,
}

/// Inspection/injection handle shared with a [`HeadlessBackend`].
#[derive(Debug, Clone)]
pub struct HeadlessProbe {
    state: Arc<Mutex<HeadlessState>>,
}

impl HeadlessProbe {
    fn lock(&self) -> MutexGuard<'_, HeadlessState> {
        // The probe is diagnostic; a poisoned lock still holds usable data.
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub fn ops(&self) -> Vec<SurfaceOp> {
        self.lock().ops.clone()
    }

    pub fn clear_ops(&self) {
        self.lock().ops.clear();
    }

    pub fn attach_count(&self) -> usize {
        self.lock()
            .ops
            .iter()
            .filter(|op| matches!(op, SurfaceOp::Attach { .. }))
            .count()
    }

    pub fn is_attached(&self) -> bool {
        self.lock().attached
    }

    pub fn rendered_text(&self) -> String {
        self.lock().text.clone()
    }

    pub fn rendered_style(&self) -> Option<ResolvedStyle> {
        self.lock().style
    }

    pub fn rendered_position(&self) -> Option<PositionOffset> {
        self.lock().position
    }

    pub fn set_permission(&self, granted: bool) {
        self.lock().permission_granted = granted;
    }

    pub fn fail_next(&self, point: FailPoint) {
        self.lock().fail_next = Some(point);
    }
}

/// Off-device backend that records operations instead of drawing.
///
/// Used by the CLI harness and by tests; behaves like a draggable overlay
/// whose permission can be toggled.
pub struct HeadlessBackend {
    probe: HeadlessProbe,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self {
            probe: HeadlessProbe {
                state: Arc::new(Mutex::new(HeadlessState {
                    ops: Vec::new(),
                    attached: false,
                    permission_granted: true,
                    fail_next: None,
                    text: String::new(),
                    style: None,
                    position: None,
                })),
            },
        }
    }

    pub fn probe(&self) -> HeadlessProbe {
        self.probe.clone()
    }

    fn check(state: &mut HeadlessState, point: FailPoint, operation: &'static str) -> Result<(), HostError> {
        if state.fail_next == Some(point) {
            state.fail_next = None;
            return Err(HostError::call(operation, "simulated host failure"));
        }
        Ok(())
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlaySurface for HeadlessBackend {
    fn attach(
        &mut self,
        text: &str,
        style: &ResolvedStyle,
        position: PositionOffset,
    ) -> Result<(), HostError> {
        let mut state = self.probe.lock();
        Self::check(&mut state, FailPoint::Attach, "attach")?;
        state.ops.push(SurfaceOp::Attach {
            text: text.to_string(),
            position,
        });
        state.attached = true;
        state.text = text.to_string();
        state.style = Some(*style);
        state.position = Some(position);
        tracing::debug!(text, x = position.x, y = position.y, "[Headless] attach");
        Ok(())
    }

    fn detach(&mut self) -> Result<(), HostError> {
        let mut state = self.probe.lock();
        Self::check(&mut state, FailPoint::Detach, "detach")?;
        if state.attached {
            state.ops.push(SurfaceOp::Detach);
            state.attached = false;
            state.position = None;
        }
        Ok(())
    }

    fn update_position(&mut self, position: PositionOffset) -> Result<(), HostError> {
        let mut state = self.probe.lock();
        Self::check(&mut state, FailPoint::Position, "update_position")?;
        state.ops.push(SurfaceOp::Position(position));
        state.position = Some(position);
        Ok(())
    }

    fn update_text(&mut self, text: &str) -> Result<(), HostError> {
        let mut state = self.probe.lock();
        Self::check(&mut state, FailPoint::Text, "update_text")?;
        state.ops.push(SurfaceOp::Text(text.to_string()));
        state.text = text.to_string();
        Ok(())
    }

    fn update_style(
        &mut self,
        style: &ResolvedStyle,
        changes: StyleChanges,
    ) -> Result<(), HostError> {
        let mut state = self.probe.lock();
        Self::check(&mut state, FailPoint::Style, "update_style")?;
        state.ops.push(SurfaceOp::Style(changes));
        state.style = Some(*style);
        Ok(())
    }

    fn is_attached(&self) -> bool {
        self.probe.lock().attached
    }

    fn supports_drag(&self) -> bool {
        true
    }
}

impl PermissionGate for HeadlessBackend {
    fn has_permission(&self) -> bool {
        self.probe.lock().permission_granted
    }

    fn request_permission(&mut self) -> Result<bool, HostError> {
        let mut state = self.probe.lock();
        if state.permission_granted {
            return Ok(true);
        }
        Self::check(&mut state, FailPoint::PermissionSettings, "open_settings")?;
        state.ops.push(SurfaceOp::OpenPermissionSettings);
        Ok(false)
    }
}

impl OverlayBackend for HeadlessBackend {
    fn name(&self) -> &'static str {
        "headless"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StyleConfig;

    #[test]
    fn test_detach_when_detached_is_noop() {
        let mut backend = HeadlessBackend::new();
        assert!(backend.detach().is_ok());
        assert!(backend.probe().ops().is_empty());
    }

    #[test]
    fn test_fail_point_fires_once() {
        let mut backend = HeadlessBackend::new();
        let probe = backend.probe();
        probe.fail_next(FailPoint::Attach);
        let style = StyleConfig::default().resolved();
        assert!(backend.attach("a", &style, PositionOffset::default()).is_err());
        assert!(backend.attach("a", &style, PositionOffset::default()).is_ok());
        assert_eq!(probe.attach_count(), 1);
    }

    #[test]
    fn test_request_permission_when_denied_opens_settings() {
        let mut backend = HeadlessBackend::new();
        let probe = backend.probe();
        probe.set_permission(false);
        assert_eq!(backend.request_permission(), Ok(false));
        assert_eq!(probe.ops(), vec![SurfaceOp::OpenPermissionSettings]);
    }
}
