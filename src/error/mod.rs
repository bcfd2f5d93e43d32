// Error types for the floating lyric overlay
//
// This module defines the command-level error taxonomy reported back over the
// bridge channel, and the host-level error raised by platform window APIs.

mod host;
mod overlay;

pub use host::HostError;
pub use overlay::{log_overlay_error, OverlayError, OverlayErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling across
/// the bridge channel boundary.
pub trait ErrorCode {
    /// Get the string error code sent to the caller
    fn code(&self) -> &'static str;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
