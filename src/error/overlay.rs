// Overlay command error types and constants

use crate::error::{ErrorCode, HostError};
use std::fmt;
use tracing::error;

/// Overlay error code constants shared with the Dart side
///
/// These constants are the single source of truth for the `errorCode`
/// strings carried by failed bridge channel responses.
pub struct OverlayErrorCodes {}

impl OverlayErrorCodes {
    /// Overlay permission ("draw over other apps") missing
    pub const NO_PERMISSION: &'static str = "NO_PERMISSION";

    /// Attaching the overlay surface failed
    pub const SHOW_FAILED: &'static str = "SHOW_FAILED";

    /// Detaching the overlay surface failed
    pub const HIDE_FAILED: &'static str = "HIDE_FAILED";

    /// Replacing the displayed text failed
    pub const UPDATE_FAILED: &'static str = "UPDATE_FAILED";

    /// Applying a style update failed
    pub const UPDATE_STYLE_FAILED: &'static str = "UPDATE_STYLE_FAILED";

    /// Navigating to the permission settings screen failed
    pub const REQUEST_FAILED: &'static str = "REQUEST_FAILED";

    /// Request payload could not be decoded
    pub const INVALID_ARGUMENTS: &'static str = "INVALID_ARGUMENTS";

    /// Method name is not recognized
    pub const NOT_IMPLEMENTED: &'static str = "NOT_IMPLEMENTED";
}

/// Log an overlay error with structured context
///
/// Emits a single `tracing` error event carrying the error code, the
/// component and the handler the error surfaced in.
pub fn log_overlay_error(err: &OverlayError, context: &str) {
    error!(
        error_code = err.code(),
        component = "OverlayRouter",
        context,
        "{}",
        err.message()
    );
}

/// Errors returned by overlay commands
///
/// Each variant maps to exactly one `errorCode` string on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayError {
    /// Overlay permission not granted
    NoPermission,

    /// Surface could not be attached
    ShowFailed { reason: String },

    /// Surface could not be detached
    HideFailed { reason: String },

    /// Text could not be replaced
    UpdateFailed { reason: String },

    /// Style could not be applied
    UpdateStyleFailed { reason: String },

    /// Settings navigation failed
    RequestFailed { reason: String },

    /// Request JSON was malformed
    InvalidArguments { reason: String },

    /// Unrecognized method name
    NotImplemented { method: String },
}

impl OverlayError {
    /// Build a `ShowFailed` from a host error
    pub fn show_failed(err: impl fmt::Display) -> Self {
        OverlayError::ShowFailed {
            reason: err.to_string(),
        }
    }

    pub fn hide_failed(err: impl fmt::Display) -> Self {
        OverlayError::HideFailed {
            reason: err.to_string(),
        }
    }

    pub fn update_failed(err: impl fmt::Display) -> Self {
        OverlayError::UpdateFailed {
            reason: err.to_string(),
        }
    }

    pub fn update_style_failed(err: impl fmt::Display) -> Self {
        OverlayError::UpdateStyleFailed {
            reason: err.to_string(),
        }
    }

    pub fn request_failed(err: impl fmt::Display) -> Self {
        OverlayError::RequestFailed {
            reason: err.to_string(),
        }
    }
}

impl ErrorCode for OverlayError {
    fn code(&self) -> &'static str {
        match self {
            OverlayError::NoPermission => OverlayErrorCodes::NO_PERMISSION,
            OverlayError::ShowFailed { .. } => OverlayErrorCodes::SHOW_FAILED,
            OverlayError::HideFailed { .. } => OverlayErrorCodes::HIDE_FAILED,
            OverlayError::UpdateFailed { .. } => OverlayErrorCodes::UPDATE_FAILED,
            OverlayError::UpdateStyleFailed { .. } => OverlayErrorCodes::UPDATE_STYLE_FAILED,
            OverlayError::RequestFailed { .. } => OverlayErrorCodes::REQUEST_FAILED,
            OverlayError::InvalidArguments { .. } => OverlayErrorCodes::INVALID_ARGUMENTS,
            OverlayError::NotImplemented { .. } => OverlayErrorCodes::NOT_IMPLEMENTED,
        }
    }

    fn message(&self) -> String {
        match self {
            OverlayError::NoPermission => "Overlay permission not granted".to_string(),
            OverlayError::ShowFailed { reason } => {
                format!("Failed to show floating overlay: {}", reason)
            }
            OverlayError::HideFailed { reason } => {
                format!("Failed to hide floating overlay: {}", reason)
            }
            OverlayError::UpdateFailed { reason } => {
                format!("Failed to update overlay text: {}", reason)
            }
            OverlayError::UpdateStyleFailed { reason } => {
                format!("Failed to update overlay style: {}", reason)
            }
            OverlayError::RequestFailed { reason } => {
                format!("Failed to request overlay permission: {}", reason)
            }
            OverlayError::InvalidArguments { reason } => {
                format!("Invalid method call payload: {}", reason)
            }
            OverlayError::NotImplemented { method } => {
                format!("Method not implemented: {}", method)
            }
        }
    }
}

impl fmt::Display for OverlayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OverlayError ({}): {}", self.code(), self.message())
    }
}

impl std::error::Error for OverlayError {}

impl From<serde_json::Error> for OverlayError {
    fn from(err: serde_json::Error) -> Self {
        OverlayError::InvalidArguments {
            reason: err.to_string(),
        }
    }
}

/// Host errors surfaced outside a specific command default to a show failure;
/// handlers map explicitly where the command is known.
impl From<HostError> for OverlayError {
    fn from(err: HostError) -> Self {
        OverlayError::show_failed(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_error_codes() {
        assert_eq!(OverlayError::NoPermission.code(), "NO_PERMISSION");
        assert_eq!(
            OverlayError::ShowFailed {
                reason: "x".to_string()
            }
            .code(),
            "SHOW_FAILED"
        );
        assert_eq!(OverlayError::hide_failed("x").code(), "HIDE_FAILED");
        assert_eq!(OverlayError::update_failed("x").code(), "UPDATE_FAILED");
        assert_eq!(
            OverlayError::update_style_failed("x").code(),
            "UPDATE_STYLE_FAILED"
        );
        assert_eq!(OverlayError::request_failed("x").code(), "REQUEST_FAILED");
        assert_eq!(
            OverlayError::NotImplemented {
                method: "foo".to_string()
            }
            .code(),
            OverlayErrorCodes::NOT_IMPLEMENTED
        );
    }

    #[test]
    fn test_overlay_error_message_carries_reason() {
        let err = OverlayError::show_failed(HostError::Call {
            operation: "addView",
            details: "BadTokenException".to_string(),
        });
        assert!(err.message().contains("addView"));
        assert!(err.message().contains("BadTokenException"));
        assert!(err.to_string().contains("SHOW_FAILED"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: OverlayError = json_err.into();
        assert_eq!(err.code(), "INVALID_ARGUMENTS");
    }

    #[test]
    fn test_error_code_trait_object() {
        let err: &dyn ErrorCode = &OverlayError::NoPermission;
        assert_eq!(err.code(), OverlayErrorCodes::NO_PERMISSION);
    }
}
