//! Events crossing the bridge outside the request/response flow.

use serde::{Deserialize, Serialize};

/// Unsolicited event sent from the host to the cross-platform caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method")]
pub enum OverlayEvent {
    /// The PiP window was dismissed by any means
    #[serde(rename = "onClose")]
    Close,
}

/// Lifecycle callback delivered by the platform to the active surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// Deferred PiP start while the controller is not yet possible
    StartPip { attempt: u32 },
    PipWillStart,
    /// Delayed label injection into the PiP window; `attempt` counts retries
    InjectLabel { attempt: u32 },
    PipDidStop,
    PipFailedToStart { reason: String },
}

/// How the surface reacted to a [`HostEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEventOutcome {
    Ignored,
    Handled,
    /// The surface is gone; the caller must resynchronize
    SurfaceClosed,
    /// The surface never came up
    SurfaceFailed,
}
