//! Overlay style model: sparse updates merged into a resolved style.

use serde::{Deserialize, Serialize};

/// 32-bit ARGB color, one byte each for alpha, red, green, blue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Argb(pub u32);

impl Argb {
    pub const WHITE: Argb = Argb(0xFFFF_FFFF);

    /// Dart ints are 64-bit; only the low 32 bits carry the color.
    pub fn from_wire(value: i64) -> Self {
        Argb(value as u32)
    }

    pub fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub fn blue(self) -> u8 {
        self.0 as u8
    }

    /// Android `@ColorInt` representation.
    pub fn to_color_int(self) -> i32 {
        self.0 as i32
    }

    /// Components scaled to `0.0..=1.0` in `[r, g, b, a]` order (UIColor).
    pub fn to_unit_rgba(self) -> [f64; 4] {
        [
            f64::from(self.red()) / 255.0,
            f64::from(self.green()) / 255.0,
            f64::from(self.blue()) / 255.0,
            f64::from(self.alpha()) / 255.0,
        ]
    }
}

/// Sparse style update; `None` leaves the current value unchanged.
///
/// Numeric values are device-independent units. Font size is in scaled
/// pixels (sp on Android, points on iOS).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<Argb>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Argb>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_horizontal: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_vertical: Option<f32>,
}

impl OverlayStyle {
    pub fn is_empty(&self) -> bool {
        *self == OverlayStyle::default()
    }
}

/// Render groups touched by a style update.
///
/// Background color and corner radius share one group because both live on
/// the same background drawable and are redrawn together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StyleChanges {
    pub font_size: bool,
    pub text_color: bool,
    pub background: bool,
    pub padding: bool,
}

impl StyleChanges {
    pub fn all() -> Self {
        Self {
            font_size: true,
            text_color: true,
            background: true,
            padding: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == StyleChanges::default()
    }
}

/// Fully populated style currently applied to the surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedStyle {
    pub font_size: f32,
    pub text_color: Argb,
    pub background_color: Argb,
    pub corner_radius: f32,
    pub padding_horizontal: f32,
    pub padding_vertical: f32,
}

impl ResolvedStyle {
    /// Merge a sparse update, returning the render groups that changed.
    ///
    /// Fields absent from `update` keep their current value.
    pub fn merge(&mut self, update: &OverlayStyle) -> StyleChanges {
        let mut changes = StyleChanges::default();

        if let Some(size) = update.font_size {
            self.font_size = size;
            changes.font_size = true;
        }
        if let Some(color) = update.text_color {
            self.text_color = color;
            changes.text_color = true;
        }
        if let Some(color) = update.background_color {
            self.background_color = color;
            changes.background = true;
        }
        if let Some(radius) = update.corner_radius {
            self.corner_radius = radius;
            changes.background = true;
        }
        if let Some(horizontal) = update.padding_horizontal {
            self.padding_horizontal = horizontal;
            changes.padding = true;
        }
        if let Some(vertical) = update.padding_vertical {
            self.padding_vertical = vertical;
            changes.padding = true;
        }

        changes
    }
}

/// Fixed parts of the visual contract that style updates never touch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextAppearance {
    pub max_lines: u32,
    pub letter_spacing: f32,
    pub shadow_radius: f32,
    pub shadow_dx: f32,
    pub shadow_dy: f32,
    pub shadow_color: Argb,
    pub elevation_dp: f32,
}

pub const TEXT_APPEARANCE: TextAppearance = TextAppearance {
    max_lines: 2,
    letter_spacing: 0.02,
    shadow_radius: 6.0,
    shadow_dx: 0.0,
    shadow_dy: 2.0,
    shadow_color: Argb(0xCC00_0000),
    elevation_dp: 12.0,
};

/// Convert device-independent pixels to physical pixels.
pub fn dp_to_px(dp: f32, density: f32) -> f32 {
    dp * density
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> ResolvedStyle {
        ResolvedStyle {
            font_size: 16.0,
            text_color: Argb::WHITE,
            background_color: Argb(0xF200_0000),
            corner_radius: 16.0,
            padding_horizontal: 20.0,
            padding_vertical: 10.0,
        }
    }

    #[test]
    fn test_merge_keeps_absent_fields() {
        let mut style = base();
        let changes = style.merge(&OverlayStyle {
            font_size: Some(18.0),
            ..Default::default()
        });

        assert_eq!(style.font_size, 18.0);
        assert_eq!(style.background_color, Argb(0xF200_0000));
        assert_eq!(style.corner_radius, 16.0);
        assert_eq!(style.padding_horizontal, 20.0);
        assert_eq!(
            changes,
            StyleChanges {
                font_size: true,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_sequential_updates_combine() {
        let mut style = base();
        style.merge(&OverlayStyle {
            background_color: Some(Argb(0xFF11_2233)),
            corner_radius: Some(20.0),
            ..Default::default()
        });
        style.merge(&OverlayStyle {
            font_size: Some(18.0),
            ..Default::default()
        });

        assert_eq!(style.background_color, Argb(0xFF11_2233));
        assert_eq!(style.corner_radius, 20.0);
        assert_eq!(style.font_size, 18.0);
    }

    #[test]
    fn test_corner_radius_alone_redraws_background() {
        let mut style = base();
        let changes = style.merge(&OverlayStyle {
            corner_radius: Some(4.0),
            ..Default::default()
        });
        assert!(changes.background);
        assert!(!changes.text_color);
    }

    #[test]
    fn test_single_padding_side_keeps_other() {
        let mut style = base();
        let changes = style.merge(&OverlayStyle {
            padding_vertical: Some(4.0),
            ..Default::default()
        });
        assert!(changes.padding);
        assert_eq!(style.padding_horizontal, 20.0);
        assert_eq!(style.padding_vertical, 4.0);
    }

    #[test]
    fn test_empty_update_changes_nothing() {
        let mut style = base();
        let changes = style.merge(&OverlayStyle::default());
        assert!(changes.is_empty());
        assert_eq!(style, base());
    }

    #[test]
    fn test_argb_components() {
        let color = Argb::from_wire(0xFF11_2233);
        assert_eq!(color.alpha(), 0xFF);
        assert_eq!(color.red(), 0x11);
        assert_eq!(color.green(), 0x22);
        assert_eq!(color.blue(), 0x33);
        assert_eq!(color.to_color_int(), 0xFF11_2233_u32 as i32);
    }

    #[test]
    fn test_argb_from_wire_truncates_to_low_bits() {
        assert_eq!(Argb::from_wire(0x1_FF00_00FF), Argb(0xFF00_00FF));
        assert_eq!(Argb::from_wire(-1), Argb(0xFFFF_FFFF));
    }

    #[test]
    fn test_unit_rgba() {
        let [r, g, b, a] = Argb(0x80FF_0000).to_unit_rgba();
        assert_eq!(r, 1.0);
        assert_eq!(g, 0.0);
        assert_eq!(b, 0.0);
        assert!((a - 128.0 / 255.0).abs() < 1e-9);
    }
}
