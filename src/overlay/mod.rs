//! Platform-neutral overlay model.
//!
//! Style merging, router state, the drag state machine, window placement
//! and the capability traits every platform adapter implements.

pub mod drag;
pub mod events;
pub mod placement;
pub mod state;
pub mod style;
pub mod surface;

pub use drag::{DragController, DragOutcome, DragPhase, TouchAction, TouchEvent};
pub use events::{HostEvent, HostEventOutcome, OverlayEvent};
pub use placement::{LayoutParams, PositionOffset, WindowType};
pub use state::OverlayState;
pub use style::{Argb, OverlayStyle, ResolvedStyle, StyleChanges};
pub use surface::{OverlayBackend, OverlaySurface, PermissionGate};
