//! JNI entry points called by the Kotlin shim.
//!
//! `FloatingLyricBridge` is registered by the Flutter plugin; its
//! `MethodChannel` handler forwards every call to `nativeHandleMethodCall`
//! on the main thread. `OverlayTouchListener` is attached to the overlay
//! container and forwards `MotionEvent`s to `nativeOnTouch`.

use jni::objects::{JClass, JObject, JString};
use jni::sys::{jfloat, jint, jstring};
use jni::JNIEnv;
use once_cell::sync::OnceCell;

use crate::channel::MethodResponse;
use crate::error::OverlayError;
use crate::overlay::{DragOutcome, TouchAction, TouchEvent};

use super::init_once;
use super::jni_host::mark_context_ready;

static CONTEXT_INIT: OnceCell<()> = OnceCell::new();

fn read_string(env: &mut JNIEnv<'_>, value: &JString<'_>) -> Result<String, OverlayError> {
    if value.is_null() {
        return Ok(String::new());
    }
    env.get_string(value)
        .map(String::from)
        .map_err(|err| OverlayError::InvalidArguments {
            reason: err.to_string(),
        })
}

fn init_android_context(
    env: &mut JNIEnv<'_>,
    context: &JObject<'_>,
) -> Result<(), jni::errors::Error> {
    let vm = env.get_java_vm()?;
    let app_context = env.new_global_ref(context)?;

    // SAFETY: both pointers stay valid for the life of the process; the
    // global ref is intentionally leaked below.
    unsafe {
        ndk_context::initialize_android_context(
            vm.get_java_vm_pointer().cast(),
            app_context.as_obj().as_raw().cast(),
        );
    }
    std::mem::forget(app_context);
    mark_context_ready();
    tracing::info!("[JNI] Android context initialized");
    Ok(())
}

/// `FloatingLyricBridge.nativeInit(Context)`
///
/// Hands the application context over and builds the window host. Safe to
/// call again after a failure.
#[no_mangle]
pub extern "system" fn Java_com_kikoeru_floatinglyric_FloatingLyricBridge_nativeInit<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    context: JObject<'local>,
) {
    crate::init_logging();

    if let Err(err) = init_once(&CONTEXT_INIT, || init_android_context(&mut env, &context)) {
        tracing::error!("[JNI] Android context init failed: {}", err);
        return;
    }
    if !crate::api::prepare_backend() {
        tracing::warn!("[JNI] window host still unavailable after nativeInit");
    }
}

/// `FloatingLyricBridge.nativeHandleMethodCall(String, String): String`
#[no_mangle]
pub extern "system" fn Java_com_kikoeru_floatinglyric_FloatingLyricBridge_nativeHandleMethodCall<
    'local,
>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    method: JString<'local>,
    args_json: JString<'local>,
) -> jstring {
    let response = match (
        read_string(&mut env, &method),
        read_string(&mut env, &args_json),
    ) {
        (Ok(method), Ok(args_json)) => crate::api::invoke_method(&method, &args_json),
        (Err(err), _) | (_, Err(err)) => MethodResponse::from_result(Err(err)).to_json_string(),
    };

    match env.new_string(response) {
        Ok(value) => value.into_raw(),
        Err(err) => {
            tracing::error!("[JNI] failed to build response string: {}", err);
            std::ptr::null_mut()
        }
    }
}

/// `FloatingLyricBridge.nativeDispose()`
#[no_mangle]
pub extern "system" fn Java_com_kikoeru_floatinglyric_FloatingLyricBridge_nativeDispose<'local>(
    _env: JNIEnv<'local>,
    _class: JClass<'local>,
) {
    crate::api::dispose();
}

/// `OverlayTouchListener.nativeOnTouch(int, float, float): int`
///
/// Returns the [`DragOutcome`] code; the listener consumes the event when
/// the code is non-zero.
#[no_mangle]
pub extern "system" fn Java_com_kikoeru_floatinglyric_OverlayTouchListener_nativeOnTouch<'local>(
    _env: JNIEnv<'local>,
    _this: JObject<'local>,
    action: jint,
    raw_x: jfloat,
    raw_y: jfloat,
) -> jint {
    let Some(action) = TouchAction::from_motion_event(action) else {
        return DragOutcome::Ignored.code();
    };
    let event = TouchEvent {
        action,
        raw_x,
        raw_y,
    };
    crate::api::handle_touch(event).code()
}
