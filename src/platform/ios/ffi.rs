//! C ABI called by the Swift shim.
//!
//! The shim owns the `FlutterMethodChannel`: it forwards each call's method
//! name and JSON-encoded arguments to [`floating_lyric_handle_method_call`]
//! and relays events delivered to the registered handler back to Dart.

use std::ffi::{c_char, c_void, CStr, CString};
use std::ptr;

use dispatch::Queue;
use objc2::MainThreadMarker;
use once_cell::sync::OnceCell;

use crate::channel::MethodResponse;
use crate::error::OverlayError;

use super::objc_host::set_root_view;

/// Receives one JSON-encoded event, e.g. `{"method":"onClose"}`. The string
/// is only valid for the duration of the call.
pub type EventHandler = extern "C" fn(event_json: *const c_char);

static EVENT_FORWARDER: OnceCell<()> = OnceCell::new();

unsafe fn read_str(value: *const c_char) -> Result<String, OverlayError> {
    if value.is_null() {
        return Ok(String::new());
    }
    CStr::from_ptr(value)
        .to_str()
        .map(str::to_string)
        .map_err(|err| OverlayError::InvalidArguments {
            reason: err.to_string(),
        })
}

fn into_c_string(value: String) -> *mut c_char {
    match CString::new(value) {
        Ok(value) => value.into_raw(),
        Err(err) => {
            tracing::error!("[FFI] response contained NUL: {}", err);
            ptr::null_mut()
        }
    }
}

/// Initialize logging, remember the root view hosting the player layer and
/// build the PiP player so the controller is ready by the first `show`.
///
/// # Safety
/// `root_view` must be a valid `UIView *`. Call once, on the main thread,
/// before any method call.
#[no_mangle]
pub unsafe extern "C" fn floating_lyric_init(root_view: *mut c_void) -> bool {
    crate::init_logging();
    let stored = set_root_view(root_view);
    if !stored {
        tracing::warn!("[FFI] root view missing or already set");
    }
    if !crate::api::prepare_backend() {
        tracing::warn!("[FFI] PiP host still unavailable after init");
    }
    stored
}

/// Handle one channel call; returns the JSON response.
///
/// Calls made off the main thread are redispatched to it synchronously.
///
/// # Safety
/// Both arguments must be null or valid NUL-terminated UTF-8. The returned
/// string must be released with [`floating_lyric_string_free`].
#[no_mangle]
pub unsafe extern "C" fn floating_lyric_handle_method_call(
    method: *const c_char,
    args_json: *const c_char,
) -> *mut c_char {
    let (method, args_json) = match (read_str(method), read_str(args_json)) {
        (Ok(method), Ok(args_json)) => (method, args_json),
        (Err(err), _) | (_, Err(err)) => {
            return into_c_string(MethodResponse::from_result(Err(err)).to_json_string());
        }
    };

    let response = if MainThreadMarker::new().is_some() {
        crate::api::invoke_method(&method, &args_json)
    } else {
        Queue::main().exec_sync(move || crate::api::invoke_method(&method, &args_json))
    };
    into_c_string(response)
}

/// Free a string returned by this library.
///
/// # Safety
/// `value` must come from [`floating_lyric_handle_method_call`] and must not
/// be freed twice.
#[no_mangle]
pub unsafe extern "C" fn floating_lyric_string_free(value: *mut c_char) {
    if !value.is_null() {
        drop(CString::from_raw(value));
    }
}

/// Register the event handler. Events are delivered on the main queue.
///
/// Only the first registration takes effect.
#[no_mangle]
pub extern "C" fn floating_lyric_set_event_handler(handler: Option<EventHandler>) -> bool {
    let Some(handler) = handler else {
        return false;
    };

    let mut registered = false;
    EVENT_FORWARDER.get_or_init(|| {
        registered = crate::api::spawn_event_forwarder(crate::api::subscribe_events(), move |event| {
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(err) => {
                    tracing::error!("[FFI] failed to encode event: {}", err);
                    return;
                }
            };
            let Ok(json) = CString::new(json) else {
                return;
            };
            Queue::main().exec_async(move || handler(json.as_ptr()));
        })
        .is_some();
    });
    registered
}
