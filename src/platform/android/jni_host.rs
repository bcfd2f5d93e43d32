//! JNI implementation of [`WindowHost`].
//!
//! Every call runs on the Android main thread: commands arrive through
//! `FloatingLyricBridge.nativeHandleMethodCall`, which the Kotlin shim invokes
//! from its `MethodChannel` handler, and touches arrive through
//! `OverlayTouchListener.nativeOnTouch`.

use std::sync::atomic::{AtomicBool, Ordering};

use jni::objects::{GlobalRef, JObject, JString, JValue};
use jni::{JNIEnv, JavaVM};

use crate::error::HostError;
use crate::overlay::placement::{LayoutParams, WRAP_CONTENT};
use crate::overlay::style::Argb;

use super::host::{ViewSpec, WindowHost};

/// Kotlin class whose `onTouch` forwards to `nativeOnTouch`.
const TOUCH_LISTENER_CLASS: &str = "com/kikoeru/floatinglyric/OverlayTouchListener";

/// `android.view.Gravity.CENTER`
const GRAVITY_CENTER: i32 = 0x11;

static CONTEXT_READY: AtomicBool = AtomicBool::new(false);

/// Mark the ndk context as initialized (called from `nativeInit`).
pub(crate) fn mark_context_ready() {
    CONTEXT_READY.store(true, Ordering::SeqCst);
}

struct OverlayViews {
    container: GlobalRef,
    text_view: GlobalRef,
    params: GlobalRef,
}

/// Window host backed by the application `Context` and its `WindowManager`.
pub struct JniWindowHost {
    vm: JavaVM,
    context: GlobalRef,
    window_manager: GlobalRef,
    sdk_int: i32,
    density: f32,
    views: Option<OverlayViews>,
}

impl JniWindowHost {
    /// Build a host from the context handed over in `nativeInit`.
    pub fn from_android_context() -> Result<Self, HostError> {
        if !CONTEXT_READY.load(Ordering::SeqCst) {
            return Err(HostError::Unavailable {
                what: "android context",
            });
        }

        let ctx = ndk_context::android_context();
        // SAFETY: nativeInit stored a valid JavaVM pointer and a global ref to
        // the application context; both outlive the process.
        let vm = unsafe { JavaVM::from_raw(ctx.vm().cast()) }
            .map_err(|err| HostError::call("JavaVM::from_raw", err))?;

        let (context, window_manager, sdk_int, density) = {
            let mut env = vm
                .attach_current_thread()
                .map_err(|err| HostError::call("attach_current_thread", err))?;
            // SAFETY: see above; the pointer is a live global reference.
            let context = unsafe { JObject::from_raw(ctx.context().cast()) };
            let result = Self::query_context(&mut env, &context);
            // The raw context is a global ref owned by nativeInit; never delete it.
            std::mem::forget(context);
            result.map_err(|err| {
                clear_exception(&mut env);
                HostError::call("init", err)
            })?
        };

        tracing::info!(sdk_int, density, "[JniWindowHost] window manager acquired");

        Ok(Self {
            vm,
            context,
            window_manager,
            sdk_int,
            density,
            views: None,
        })
    }

    fn query_context(
        env: &mut JNIEnv<'_>,
        context: &JObject<'_>,
    ) -> jni::errors::Result<(GlobalRef, GlobalRef, i32, f32)> {
        let service_name = env
            .get_static_field(
                "android/content/Context",
                "WINDOW_SERVICE",
                "Ljava/lang/String;",
            )?
            .l()?;
        let window_manager = env
            .call_method(
                context,
                "getSystemService",
                "(Ljava/lang/String;)Ljava/lang/Object;",
                &[JValue::Object(&service_name)],
            )?
            .l()?;
        let sdk_int = env
            .get_static_field("android/os/Build$VERSION", "SDK_INT", "I")?
            .i()?;
        let resources = env
            .call_method(
                context,
                "getResources",
                "()Landroid/content/res/Resources;",
                &[],
            )?
            .l()?;
        let metrics = env
            .call_method(
                &resources,
                "getDisplayMetrics",
                "()Landroid/util/DisplayMetrics;",
                &[],
            )?
            .l()?;
        let density = env.get_field(&metrics, "density", "F")?.f()?;

        Ok((
            env.new_global_ref(context)?,
            env.new_global_ref(&window_manager)?,
            sdk_int,
            density,
        ))
    }

    /// Run `f` inside a local reference frame, converting Java exceptions.
    fn with_env<T>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&mut JNIEnv<'_>) -> jni::errors::Result<T>,
    ) -> Result<T, HostError> {
        let mut env = self
            .vm
            .attach_current_thread()
            .map_err(|err| HostError::call(operation, err))?;
        let result = env.with_local_frame(32, |env| f(env));
        result.map_err(|err| {
            clear_exception(&mut env);
            HostError::call(operation, err)
        })
    }

    fn views(&self) -> Result<&OverlayViews, HostError> {
        self.views.as_ref().ok_or(HostError::Unavailable {
            what: "overlay view",
        })
    }
}

fn clear_exception(env: &mut JNIEnv<'_>) {
    if env.exception_check().unwrap_or(false) {
        let _ = env.exception_describe();
        let _ = env.exception_clear();
    }
}

fn new_layout_params<'local>(
    env: &mut JNIEnv<'local>,
    params: &LayoutParams,
) -> jni::errors::Result<JObject<'local>> {
    let obj = env.new_object(
        "android/view/WindowManager$LayoutParams",
        "(IIIII)V",
        &[
            JValue::Int(params.width),
            JValue::Int(params.height),
            JValue::Int(params.window_type.raw()),
            JValue::Int(params.flags),
            JValue::Int(params.format),
        ],
    )?;
    env.set_field(&obj, "gravity", "I", JValue::Int(params.gravity))?;
    env.set_field(&obj, "x", "I", JValue::Int(params.position.x))?;
    env.set_field(&obj, "y", "I", JValue::Int(params.position.y))?;
    Ok(obj)
}

fn apply_background(
    env: &mut JNIEnv<'_>,
    container: &JObject<'_>,
    color: Argb,
    corner_radius_px: f32,
) -> jni::errors::Result<()> {
    let drawable = env.new_object("android/graphics/drawable/GradientDrawable", "()V", &[])?;
    env.call_method(
        &drawable,
        "setColor",
        "(I)V",
        &[JValue::Int(color.to_color_int())],
    )?;
    env.call_method(
        &drawable,
        "setCornerRadius",
        "(F)V",
        &[JValue::Float(corner_radius_px)],
    )?;
    env.call_method(
        container,
        "setBackground",
        "(Landroid/graphics/drawable/Drawable;)V",
        &[JValue::Object(&drawable)],
    )?;
    Ok(())
}

fn apply_padding(
    env: &mut JNIEnv<'_>,
    container: &JObject<'_>,
    horizontal_px: i32,
    vertical_px: i32,
) -> jni::errors::Result<()> {
    env.call_method(
        container,
        "setPadding",
        "(IIII)V",
        &[
            JValue::Int(horizontal_px),
            JValue::Int(vertical_px),
            JValue::Int(horizontal_px),
            JValue::Int(vertical_px),
        ],
    )?;
    Ok(())
}

fn apply_text(env: &mut JNIEnv<'_>, text_view: &JObject<'_>, text: &str) -> jni::errors::Result<()> {
    let text = env.new_string(text)?;
    env.call_method(
        text_view,
        "setText",
        "(Ljava/lang/CharSequence;)V",
        &[JValue::Object(&text)],
    )?;
    Ok(())
}

fn build_text_view<'local>(
    env: &mut JNIEnv<'local>,
    context: &JObject<'_>,
    view: &ViewSpec,
) -> jni::errors::Result<JObject<'local>> {
    let text_view = env.new_object(
        "android/widget/TextView",
        "(Landroid/content/Context;)V",
        &[JValue::Object(context)],
    )?;
    let appearance = view.appearance;

    env.call_method(
        &text_view,
        "setTextSize",
        "(F)V",
        &[JValue::Float(view.text_size_sp)],
    )?;
    env.call_method(
        &text_view,
        "setTextColor",
        "(I)V",
        &[JValue::Int(view.text_color.to_color_int())],
    )?;
    env.call_method(&text_view, "setGravity", "(I)V", &[JValue::Int(GRAVITY_CENTER)])?;
    env.call_method(
        &text_view,
        "setShadowLayer",
        "(FFFI)V",
        &[
            JValue::Float(appearance.shadow_radius),
            JValue::Float(appearance.shadow_dx),
            JValue::Float(appearance.shadow_dy),
            JValue::Int(appearance.shadow_color.to_color_int()),
        ],
    )?;
    env.call_method(
        &text_view,
        "setMaxLines",
        "(I)V",
        &[JValue::Int(appearance.max_lines as i32)],
    )?;
    let truncate_end = env
        .get_static_field(
            "android/text/TextUtils$TruncateAt",
            "END",
            "Landroid/text/TextUtils$TruncateAt;",
        )?
        .l()?;
    env.call_method(
        &text_view,
        "setEllipsize",
        "(Landroid/text/TextUtils$TruncateAt;)V",
        &[JValue::Object(&truncate_end)],
    )?;
    env.call_method(
        &text_view,
        "setLetterSpacing",
        "(F)V",
        &[JValue::Float(appearance.letter_spacing)],
    )?;
    apply_text(env, &text_view, &view.text)?;
    Ok(text_view)
}

impl WindowHost for JniWindowHost {
    fn sdk_int(&self) -> i32 {
        self.sdk_int
    }

    fn density(&self) -> f32 {
        self.density
    }

    fn can_draw_overlays(&self) -> Result<bool, HostError> {
        self.with_env("canDrawOverlays", |env| {
            env.call_static_method(
                "android/provider/Settings",
                "canDrawOverlays",
                "(Landroid/content/Context;)Z",
                &[JValue::Object(self.context.as_obj())],
            )?
            .z()
        })
    }

    fn open_overlay_settings(&mut self) -> Result<(), HostError> {
        self.with_env("startActivity", |env| {
            let context = self.context.as_obj();
            let action = env
                .get_static_field(
                    "android/provider/Settings",
                    "ACTION_MANAGE_OVERLAY_PERMISSION",
                    "Ljava/lang/String;",
                )?
                .l()?;
            let package = env
                .call_method(context, "getPackageName", "()Ljava/lang/String;", &[])?
                .l()?;
            let package: String = env.get_string(&JString::from(package))?.into();
            let uri_string = env.new_string(format!("package:{}", package))?;
            let uri = env
                .call_static_method(
                    "android/net/Uri",
                    "parse",
                    "(Ljava/lang/String;)Landroid/net/Uri;",
                    &[JValue::Object(&uri_string)],
                )?
                .l()?;
            let intent = env.new_object(
                "android/content/Intent",
                "(Ljava/lang/String;Landroid/net/Uri;)V",
                &[JValue::Object(&action), JValue::Object(&uri)],
            )?;
            let new_task = env
                .get_static_field("android/content/Intent", "FLAG_ACTIVITY_NEW_TASK", "I")?
                .i()?;
            env.call_method(
                &intent,
                "setFlags",
                "(I)Landroid/content/Intent;",
                &[JValue::Int(new_task)],
            )?;
            env.call_method(
                context,
                "startActivity",
                "(Landroid/content/Intent;)V",
                &[JValue::Object(&intent)],
            )?;
            Ok(())
        })
    }

    fn add_view(&mut self, view: &ViewSpec, params: &LayoutParams) -> Result<(), HostError> {
        let views = self.with_env("addView", |env| {
            let context = self.context.as_obj();
            let container = env.new_object(
                "android/widget/FrameLayout",
                "(Landroid/content/Context;)V",
                &[JValue::Object(context)],
            )?;
            apply_background(env, &container, view.background_color, view.corner_radius_px)?;
            apply_padding(
                env,
                &container,
                view.padding_horizontal_px,
                view.padding_vertical_px,
            )?;
            env.call_method(
                &container,
                "setElevation",
                "(F)V",
                &[JValue::Float(view.elevation_px)],
            )?;

            let text_view = build_text_view(env, context, view)?;
            let child_params = env.new_object(
                "android/widget/FrameLayout$LayoutParams",
                "(II)V",
                &[JValue::Int(WRAP_CONTENT), JValue::Int(WRAP_CONTENT)],
            )?;
            env.call_method(
                &container,
                "addView",
                "(Landroid/view/View;Landroid/view/ViewGroup$LayoutParams;)V",
                &[JValue::Object(&text_view), JValue::Object(&child_params)],
            )?;

            let listener = env.new_object(TOUCH_LISTENER_CLASS, "()V", &[])?;
            env.call_method(
                &container,
                "setOnTouchListener",
                "(Landroid/view/View$OnTouchListener;)V",
                &[JValue::Object(&listener)],
            )?;

            let window_params = new_layout_params(env, params)?;
            env.call_method(
                self.window_manager.as_obj(),
                "addView",
                "(Landroid/view/View;Landroid/view/ViewGroup$LayoutParams;)V",
                &[JValue::Object(&container), JValue::Object(&window_params)],
            )?;

            Ok(OverlayViews {
                container: env.new_global_ref(&container)?,
                text_view: env.new_global_ref(&text_view)?,
                params: env.new_global_ref(&window_params)?,
            })
        })?;

        self.views = Some(views);
        Ok(())
    }

    fn remove_view(&mut self) -> Result<(), HostError> {
        let views = self.views()?;
        self.with_env("removeView", |env| {
            env.call_method(
                self.window_manager.as_obj(),
                "removeView",
                "(Landroid/view/View;)V",
                &[JValue::Object(views.container.as_obj())],
            )?;
            Ok(())
        })?;
        self.views = None;
        Ok(())
    }

    fn update_view_layout(&mut self, params: &LayoutParams) -> Result<(), HostError> {
        let views = self.views()?;
        self.with_env("updateViewLayout", |env| {
            let window_params = views.params.as_obj();
            env.set_field(window_params, "x", "I", JValue::Int(params.position.x))?;
            env.set_field(window_params, "y", "I", JValue::Int(params.position.y))?;
            env.call_method(
                self.window_manager.as_obj(),
                "updateViewLayout",
                "(Landroid/view/View;Landroid/view/ViewGroup$LayoutParams;)V",
                &[
                    JValue::Object(views.container.as_obj()),
                    JValue::Object(window_params),
                ],
            )?;
            Ok(())
        })
    }

    fn set_text(&mut self, text: &str) -> Result<(), HostError> {
        let views = self.views()?;
        self.with_env("setText", |env| apply_text(env, views.text_view.as_obj(), text))
    }

    fn set_text_size(&mut self, sp: f32) -> Result<(), HostError> {
        let views = self.views()?;
        self.with_env("setTextSize", |env| {
            env.call_method(
                views.text_view.as_obj(),
                "setTextSize",
                "(F)V",
                &[JValue::Float(sp)],
            )?;
            Ok(())
        })
    }

    fn set_text_color(&mut self, color: Argb) -> Result<(), HostError> {
        let views = self.views()?;
        self.with_env("setTextColor", |env| {
            env.call_method(
                views.text_view.as_obj(),
                "setTextColor",
                "(I)V",
                &[JValue::Int(color.to_color_int())],
            )?;
            Ok(())
        })
    }

    fn set_background(&mut self, color: Argb, corner_radius_px: f32) -> Result<(), HostError> {
        let views = self.views()?;
        self.with_env("setBackground", |env| {
            apply_background(env, views.container.as_obj(), color, corner_radius_px)
        })
    }

    fn set_padding(&mut self, horizontal_px: i32, vertical_px: i32) -> Result<(), HostError> {
        let views = self.views()?;
        self.with_env("setPadding", |env| {
            apply_padding(env, views.container.as_obj(), horizontal_px, vertical_px)
        })
    }
}
