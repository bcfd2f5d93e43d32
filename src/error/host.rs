// Host (platform window API) error type

use std::fmt;

/// Failure raised by a platform host while talking to the OS window system
///
/// Android hosts wrap JNI exceptions, iOS hosts wrap Objective-C nil returns
/// and `NSError`s. Command handlers convert these into [`OverlayError`]
/// variants carrying the command's error code.
///
/// [`OverlayError`]: crate::error::OverlayError
#[derive(Debug, Clone, PartialEq)]
pub enum HostError {
    /// A platform call threw or returned an error
    Call {
        operation: &'static str,
        details: String,
    },

    /// The platform object the call needs does not exist (yet)
    Unavailable { what: &'static str },

    /// The device or OS version lacks the capability
    Unsupported { capability: &'static str },

    /// Host state lock was poisoned
    LockPoisoned { component: &'static str },
}

impl HostError {
    pub fn call(operation: &'static str, details: impl fmt::Display) -> Self {
        HostError::Call {
            operation,
            details: details.to_string(),
        }
    }
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostError::Call { operation, details } => write!(f, "{}: {}", operation, details),
            HostError::Unavailable { what } => write!(f, "{} is not available", what),
            HostError::Unsupported { capability } => {
                write!(f, "{} is not supported on this device", capability)
            }
            HostError::LockPoisoned { component } => {
                write!(f, "Lock poisoned for component: {}", component)
            }
        }
    }
}

impl std::error::Error for HostError {}

impl From<std::io::Error> for HostError {
    fn from(err: std::io::Error) -> Self {
        HostError::call("io", err)
    }
}
