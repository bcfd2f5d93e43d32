//! Window placement for the Android overlay window.

use serde::{Deserialize, Serialize};

/// Overlay offset relative to its gravity anchor, in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionOffset {
    pub x: i32,
    pub y: i32,
}

impl PositionOffset {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset_by(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

/// `android.view.Gravity` bits used by the overlay.
pub mod gravity {
    pub const CENTER_HORIZONTAL: i32 = 0x01;
    pub const TOP: i32 = 0x30;
}

/// `WindowManager.LayoutParams` flag bits used by the overlay.
pub mod window_flags {
    pub const NOT_FOCUSABLE: i32 = 0x0000_0008;
    pub const NOT_TOUCH_MODAL: i32 = 0x0000_0020;
    pub const LAYOUT_NO_LIMITS: i32 = 0x0000_0200;
}

/// `ViewGroup.LayoutParams.WRAP_CONTENT`
pub const WRAP_CONTENT: i32 = -2;

/// `PixelFormat.TRANSLUCENT`
pub const PIXEL_FORMAT_TRANSLUCENT: i32 = -3;

/// First SDK with `TYPE_APPLICATION_OVERLAY` (Android O).
pub const SDK_APPLICATION_OVERLAY: i32 = 26;

/// First SDK with the runtime overlay permission (Android M).
pub const SDK_RUNTIME_OVERLAY_PERMISSION: i32 = 23;

/// Overlay window type, chosen from the running SDK level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowType {
    ApplicationOverlay,
    /// Legacy `TYPE_PHONE` for pre-O devices
    Phone,
}

impl WindowType {
    pub fn for_sdk(sdk_int: i32) -> Self {
        if sdk_int >= SDK_APPLICATION_OVERLAY {
            WindowType::ApplicationOverlay
        } else {
            WindowType::Phone
        }
    }

    pub fn raw(self) -> i32 {
        match self {
            WindowType::ApplicationOverlay => 2038,
            WindowType::Phone => 2002,
        }
    }
}

/// Mirror of the `WindowManager.LayoutParams` the overlay is attached with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutParams {
    pub width: i32,
    pub height: i32,
    pub window_type: WindowType,
    pub flags: i32,
    pub format: i32,
    pub gravity: i32,
    pub position: PositionOffset,
}

impl LayoutParams {
    /// Wrap-content, touchable but never focused, top-center.
    pub fn overlay(sdk_int: i32, position: PositionOffset) -> Self {
        Self {
            width: WRAP_CONTENT,
            height: WRAP_CONTENT,
            window_type: WindowType::for_sdk(sdk_int),
            flags: window_flags::NOT_FOCUSABLE
                | window_flags::NOT_TOUCH_MODAL
                | window_flags::LAYOUT_NO_LIMITS,
            format: PIXEL_FORMAT_TRANSLUCENT,
            gravity: gravity::TOP | gravity::CENTER_HORIZONTAL,
            position,
        }
    }

    pub fn with_position(mut self, position: PositionOffset) -> Self {
        self.position = position;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_type_by_sdk() {
        assert_eq!(WindowType::for_sdk(33), WindowType::ApplicationOverlay);
        assert_eq!(WindowType::for_sdk(26), WindowType::ApplicationOverlay);
        assert_eq!(WindowType::for_sdk(25), WindowType::Phone);
        assert_eq!(WindowType::Phone.raw(), 2002);
    }

    #[test]
    fn test_overlay_params() {
        let params = LayoutParams::overlay(30, PositionOffset::new(0, 100));
        assert_eq!(params.flags, 0x228);
        assert_eq!(params.gravity, 0x31);
        assert_eq!(params.format, -3);
        assert_eq!(params.position, PositionOffset::new(0, 100));
    }

    #[test]
    fn test_offset_saturates() {
        let p = PositionOffset::new(i32::MAX - 1, 0).offset_by(10, -5);
        assert_eq!(p, PositionOffset::new(i32::MAX, -5));
    }
}
