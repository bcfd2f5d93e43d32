//! AVKit / UIKit primitives the PiP adapter is built on.

use std::path::Path;

use crate::error::HostError;
use crate::overlay::style::{Argb, ResolvedStyle, TEXT_APPEARANCE};

/// Label content and the style groups UILabel can render.
///
/// Padding has no UILabel counterpart and is not carried.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelSpec {
    pub text: String,
    pub font_size: f32,
    pub text_color: Argb,
    pub background_color: Argb,
    pub corner_radius: f32,
    pub max_lines: u32,
}

impl LabelSpec {
    pub fn new(text: &str, style: &ResolvedStyle) -> Self {
        Self {
            text: text.to_string(),
            font_size: style.font_size,
            text_color: style.text_color,
            background_color: style.background_color,
            corner_radius: style.corner_radius,
            max_lines: TEXT_APPEARANCE.max_lines,
        }
    }

    pub fn apply_style(&mut self, style: &ResolvedStyle) {
        self.font_size = style.font_size;
        self.text_color = style.text_color;
        self.background_color = style.background_color;
        self.corner_radius = style.corner_radius;
    }
}

/// Player, PiP controller and PiP-window label access.
///
/// The objc2 implementation lives in `objc_host`; tests use
/// [`FakePipHost`](crate::testing::FakePipHost).
pub trait PipHost: Send {
    fn is_pip_supported(&self) -> bool;

    /// Configure the audio session, build the muted looping player for
    /// `video` and the PiP controller around its 1x1 layer.
    fn prepare_player(&mut self, video: &Path) -> Result<(), HostError>;

    fn play(&mut self) -> Result<(), HostError>;

    fn pause(&mut self) -> Result<(), HostError>;

    /// `isPictureInPicturePossible`: the player layer is ready and a
    /// start request would be honored.
    fn is_pip_possible(&self) -> bool;

    fn start_pip(&mut self) -> Result<(), HostError>;

    fn stop_pip(&mut self) -> Result<(), HostError>;

    fn is_pip_active(&self) -> bool;

    /// Add the label to the PiP floating window, filling its bounds.
    ///
    /// Returns `Ok(false)` while the window does not exist yet.
    fn inject_label(&mut self, label: &LabelSpec) -> Result<bool, HostError>;

    fn remove_label(&mut self) -> Result<(), HostError>;

    fn set_label_text(&mut self, text: &str) -> Result<(), HostError>;

    fn set_label_font_size(&mut self, size: f32) -> Result<(), HostError>;

    fn set_label_text_color(&mut self, color: Argb) -> Result<(), HostError>;

    /// Background color and layer corner radius, redrawn together.
    fn set_label_background(&mut self, color: Argb, corner_radius: f32)
        -> Result<(), HostError>;
}
