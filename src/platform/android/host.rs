//! Window-system primitives the Android adapter is built on.

use crate::error::HostError;
use crate::overlay::placement::LayoutParams;
use crate::overlay::style::{dp_to_px, Argb, ResolvedStyle, TextAppearance, TEXT_APPEARANCE};

/// Everything needed to construct the overlay view hierarchy, in pixels.
///
/// Font size stays in scaled pixels because `TextView.setTextSize(float)`
/// takes sp.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSpec {
    pub text: String,
    pub text_size_sp: f32,
    pub text_color: Argb,
    pub background_color: Argb,
    pub corner_radius_px: f32,
    pub padding_horizontal_px: i32,
    pub padding_vertical_px: i32,
    pub elevation_px: f32,
    pub appearance: TextAppearance,
}

impl ViewSpec {
    pub fn new(text: &str, style: &ResolvedStyle, density: f32) -> Self {
        Self {
            text: text.to_string(),
            text_size_sp: style.font_size,
            text_color: style.text_color,
            background_color: style.background_color,
            corner_radius_px: dp_to_px(style.corner_radius, density),
            padding_horizontal_px: dp_to_px(style.padding_horizontal, density) as i32,
            padding_vertical_px: dp_to_px(style.padding_vertical, density) as i32,
            elevation_px: dp_to_px(TEXT_APPEARANCE.elevation_dp, density),
            appearance: TEXT_APPEARANCE,
        }
    }
}

/// Android `WindowManager` / `Settings` access.
///
/// The JNI implementation lives in `jni_host`; tests use
/// [`FakeWindowHost`](crate::testing::FakeWindowHost). Every call is made on
/// the Android main thread.
pub trait WindowHost: Send {
    /// `Build.VERSION.SDK_INT`
    fn sdk_int(&self) -> i32;

    /// `DisplayMetrics.density`
    fn density(&self) -> f32;

    /// `Settings.canDrawOverlays(context)`
    fn can_draw_overlays(&self) -> Result<bool, HostError>;

    /// Launch `ACTION_MANAGE_OVERLAY_PERMISSION` for this package.
    fn open_overlay_settings(&mut self) -> Result<(), HostError>;

    /// Build the view hierarchy and `WindowManager.addView` it.
    fn add_view(&mut self, view: &ViewSpec, params: &LayoutParams) -> Result<(), HostError>;

    fn remove_view(&mut self) -> Result<(), HostError>;

    fn update_view_layout(&mut self, params: &LayoutParams) -> Result<(), HostError>;

    fn set_text(&mut self, text: &str) -> Result<(), HostError>;

    fn set_text_size(&mut self, sp: f32) -> Result<(), HostError>;

    fn set_text_color(&mut self, color: Argb) -> Result<(), HostError>;

    /// Replace the rounded background drawable.
    fn set_background(&mut self, color: Argb, corner_radius_px: f32) -> Result<(), HostError>;

    /// Symmetric padding: left = right = horizontal, top = bottom = vertical.
    fn set_padding(&mut self, horizontal_px: i32, vertical_px: i32) -> Result<(), HostError>;
}
