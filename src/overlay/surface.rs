//! Capability interfaces implemented by each platform adapter.

use crate::error::HostError;

use super::events::{HostEvent, HostEventOutcome};
use super::placement::PositionOffset;
use super::style::{ResolvedStyle, StyleChanges};

/// A positionable, restyleable text surface drawn outside the app window.
///
/// All methods are called from the router with its state lock held, so
/// implementations see a single serialized command stream.
pub trait OverlaySurface: Send {
    /// Create the surface and show it with the given content.
    fn attach(
        &mut self,
        text: &str,
        style: &ResolvedStyle,
        position: PositionOffset,
    ) -> Result<(), HostError>;

    /// Remove the surface. Must succeed when nothing is attached.
    fn detach(&mut self) -> Result<(), HostError>;

    fn update_position(&mut self, position: PositionOffset) -> Result<(), HostError>;

    fn update_text(&mut self, text: &str) -> Result<(), HostError>;

    /// Re-render only the groups flagged in `changes`.
    fn update_style(&mut self, style: &ResolvedStyle, changes: StyleChanges)
        -> Result<(), HostError>;

    fn is_attached(&self) -> bool;

    /// Whether touch input on the surface is routed back for dragging.
    fn supports_drag(&self) -> bool {
        false
    }

    fn on_host_event(&mut self, _event: &HostEvent) -> HostEventOutcome {
        HostEventOutcome::Ignored
    }
}

/// Gate for the OS "draw over other apps" capability.
///
/// Implementations re-query the OS on every call.
pub trait PermissionGate: Send {
    fn has_permission(&self) -> bool;

    /// Returns `true` if already granted; otherwise starts the OS flow and
    /// returns `false` (the user must finish it manually).
    fn request_permission(&mut self) -> Result<bool, HostError>;
}

/// A platform adapter: surface plus permission gate.
pub trait OverlayBackend: OverlaySurface + PermissionGate {
    fn name(&self) -> &'static str;

    /// `Err` with the reason when the platform host could not be reached.
    fn availability(&self) -> Result<(), HostError> {
        Ok(())
    }
}
