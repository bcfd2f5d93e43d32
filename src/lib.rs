// Floating Lyric Overlay Core
// Command router plus Android system-overlay and iOS Picture-in-Picture adapters

// Module declarations
pub mod api;
pub mod channel;
pub mod config;
pub mod context;
pub mod error;
pub mod overlay;
pub mod platform;
pub mod testing;

// Re-exports for convenience
pub use api::*;

use std::sync::Once;

static LOGGING: Once = Once::new();

/// Initialize logging (Android logcat, tag `FloatingLyric`)
#[cfg(target_os = "android")]
pub fn init_logging() {
    use tracing_subscriber::prelude::*;

    LOGGING.call_once(|| match tracing_android::layer("FloatingLyric") {
        Ok(layer) => {
            let _ = tracing_subscriber::registry().with(layer).try_init();
        }
        Err(err) => eprintln!("FloatingLyric: failed to create logcat layer: {}", err),
    });
}

/// Initialize logging (stderr fmt subscriber)
#[cfg(not(target_os = "android"))]
pub fn init_logging() {
    LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

/// JNI_OnLoad is called when the native library is loaded by Android
#[cfg(target_os = "android")]
#[no_mangle]
pub extern "system" fn JNI_OnLoad(
    _vm: jni::JavaVM,
    _reserved: *mut std::ffi::c_void,
) -> jni::sys::jint {
    init_logging();
    tracing::info!("JNI_OnLoad called - waiting for nativeInit to hand over the context");
    jni::sys::JNI_VERSION_1_6
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging();
        init_logging();
    }
}
