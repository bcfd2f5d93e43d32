// Public API for the platform shims
// The Kotlin and Swift shims forward every channel call into these functions

use once_cell::sync::Lazy;
use tokio::sync::broadcast;

use crate::channel::{MethodCall, MethodResponse};
use crate::context::OverlayContext;
use crate::overlay::{DragOutcome, HostEvent, HostEventOutcome, OverlayEvent, TouchEvent};

mod streams;

pub use streams::spawn_event_forwarder;

// Re-export error code constants for the shims
pub use crate::error::OverlayErrorCodes;

/// Global OverlayContext instance - the one router per process
///
/// Created on first use. Until the platform hands over its context
/// (`nativeInit` on Android, `floating_lyric_init` on iOS) the backend is
/// unavailable and is rebuilt on each command.
static OVERLAY_CONTEXT: Lazy<OverlayContext> = Lazy::new(OverlayContext::new);

/// Get the version of the overlay core
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Build the platform backend once the host context is in place
///
/// Returns whether the overlay can now be shown.
pub fn prepare_backend() -> bool {
    OVERLAY_CONTEXT.prepare_backend()
}

/// Handle one bridge call
///
/// # Arguments
/// * `method` - Channel method name (`show`, `hide`, ...)
/// * `args_json` - JSON object with the call arguments; empty or `null` for none
///
/// # Returns
/// Encoded response: `{"success":..}`, `{"errorCode":..,"message":..}` or
/// `{"notImplemented":true}`
pub fn invoke_method(method: &str, args_json: &str) -> String {
    OVERLAY_CONTEXT.invoke_json(method, args_json)
}

pub fn handle_method_call(call: &MethodCall) -> MethodResponse {
    OVERLAY_CONTEXT.handle_method_call(call)
}

/// Feed a touch on the overlay view into the drag controller
pub fn handle_touch(event: TouchEvent) -> DragOutcome {
    OVERLAY_CONTEXT.handle_touch(event)
}

/// Deliver a PiP controller lifecycle callback
pub fn handle_host_event(event: HostEvent) -> HostEventOutcome {
    OVERLAY_CONTEXT.handle_host_event(event)
}

/// Subscribe to unsolicited events such as `onClose`
pub fn subscribe_events() -> broadcast::Receiver<OverlayEvent> {
    OVERLAY_CONTEXT.subscribe_events()
}

/// Best-effort teardown when the host engine detaches
pub fn dispose() {
    OVERLAY_CONTEXT.dispose()
}

/// Error code strings, for shims that map them to platform errors
pub fn get_error_codes() -> Vec<&'static str> {
    vec![
        OverlayErrorCodes::NO_PERMISSION,
        OverlayErrorCodes::SHOW_FAILED,
        OverlayErrorCodes::HIDE_FAILED,
        OverlayErrorCodes::UPDATE_FAILED,
        OverlayErrorCodes::UPDATE_STYLE_FAILED,
        OverlayErrorCodes::REQUEST_FAILED,
        OverlayErrorCodes::INVALID_ARGUMENTS,
    ]
}
