//! Android overlay adapter: a `WindowManager` overlay window.

use crate::error::HostError;
use crate::overlay::placement::{LayoutParams, SDK_RUNTIME_OVERLAY_PERMISSION};
use crate::overlay::style::dp_to_px;
use crate::overlay::{
    OverlayBackend, OverlaySurface, PermissionGate, PositionOffset, ResolvedStyle, StyleChanges,
};

use super::host::{ViewSpec, WindowHost};

/// Overlay window attached through the Android window manager.
///
/// Holds the layout params of the attached window; `None` means detached.
pub struct AndroidOverlay<H: WindowHost> {
    host: H,
    params: Option<LayoutParams>,
}

impl<H: WindowHost> AndroidOverlay<H> {
    pub fn new(host: H) -> Self {
        Self { host, params: None }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn layout_params(&self) -> Option<LayoutParams> {
        self.params
    }

    fn px(&self, dp: f32) -> i32 {
        dp_to_px(dp, self.host.density()) as i32
    }
}

impl<H: WindowHost> OverlaySurface for AndroidOverlay<H> {
    fn attach(
        &mut self,
        text: &str,
        style: &ResolvedStyle,
        position: PositionOffset,
    ) -> Result<(), HostError> {
        let params = LayoutParams::overlay(self.host.sdk_int(), position);
        let view = ViewSpec::new(text, style, self.host.density());

        self.host.add_view(&view, &params)?;
        self.params = Some(params);

        tracing::debug!(
            window_type = params.window_type.raw(),
            x = position.x,
            y = position.y,
            "[AndroidOverlay] view attached"
        );
        Ok(())
    }

    fn detach(&mut self) -> Result<(), HostError> {
        if self.params.is_some() {
            self.host.remove_view()?;
            self.params = None;
        }
        Ok(())
    }

    fn update_position(&mut self, position: PositionOffset) -> Result<(), HostError> {
        let params = self
            .params
            .ok_or(HostError::Unavailable {
                what: "overlay view",
            })?
            .with_position(position);
        self.params = Some(params);
        self.host.update_view_layout(&params)
    }

    fn update_text(&mut self, text: &str) -> Result<(), HostError> {
        if self.params.is_none() {
            return Err(HostError::Unavailable {
                what: "overlay view",
            });
        }
        self.host.set_text(text)
    }

    fn update_style(
        &mut self,
        style: &ResolvedStyle,
        changes: StyleChanges,
    ) -> Result<(), HostError> {
        // Nothing to redraw; the router applies the merged style on attach.
        if self.params.is_none() {
            return Ok(());
        }

        if changes.font_size {
            self.host.set_text_size(style.font_size)?;
        }
        if changes.text_color {
            self.host.set_text_color(style.text_color)?;
        }
        if changes.background {
            let radius = dp_to_px(style.corner_radius, self.host.density());
            self.host.set_background(style.background_color, radius)?;
        }
        if changes.padding {
            let horizontal = self.px(style.padding_horizontal);
            let vertical = self.px(style.padding_vertical);
            self.host.set_padding(horizontal, vertical)?;
        }
        Ok(())
    }

    fn is_attached(&self) -> bool {
        self.params.is_some()
    }

    fn supports_drag(&self) -> bool {
        true
    }
}

impl<H: WindowHost> PermissionGate for AndroidOverlay<H> {
    fn has_permission(&self) -> bool {
        if self.host.sdk_int() < SDK_RUNTIME_OVERLAY_PERMISSION {
            return true;
        }
        match self.host.can_draw_overlays() {
            Ok(granted) => granted,
            Err(err) => {
                tracing::warn!("[AndroidOverlay] canDrawOverlays failed: {}", err);
                false
            }
        }
    }

    fn request_permission(&mut self) -> Result<bool, HostError> {
        if self.has_permission() {
            return Ok(true);
        }
        self.host.open_overlay_settings()?;
        Ok(false)
    }
}

impl<H: WindowHost> OverlayBackend for AndroidOverlay<H> {
    fn name(&self) -> &'static str {
        "android"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StyleConfig;
    use crate::overlay::placement::WindowType;
    use crate::overlay::style::{Argb, OverlayStyle};
    use crate::testing::{FakeWindowHost, HostCall};

    fn overlay(sdk: i32) -> AndroidOverlay<FakeWindowHost> {
        AndroidOverlay::new(FakeWindowHost::new(sdk, 2.0))
    }

    #[test]
    fn test_attach_uses_overlay_window_type_on_new_sdk() {
        let mut overlay = overlay(33);
        let style = StyleConfig::default().resolved();
        overlay
            .attach("Track A", &style, PositionOffset::new(0, 100))
            .unwrap();

        let params = overlay.layout_params().unwrap();
        assert_eq!(params.window_type, WindowType::ApplicationOverlay);
        match &overlay.host().calls()[0] {
            HostCall::AddView { view, params } => {
                assert_eq!(view.text, "Track A");
                assert_eq!(view.corner_radius_px, 32.0);
                assert_eq!(params.position, PositionOffset::new(0, 100));
            }
            other => panic!("Expected AddView, got {:?}", other),
        }
    }

    #[test]
    fn test_legacy_window_type_on_old_sdk() {
        let mut overlay = overlay(24);
        let style = StyleConfig::default().resolved();
        overlay.attach("x", &style, PositionOffset::default()).unwrap();
        assert_eq!(
            overlay.layout_params().unwrap().window_type,
            WindowType::Phone
        );
    }

    #[test]
    fn test_style_redraws_only_changed_groups() {
        let mut overlay = overlay(33);
        let mut style = StyleConfig::default().resolved();
        overlay.attach("x", &style, PositionOffset::default()).unwrap();
        overlay.host().clear_calls();

        let changes = style.merge(&OverlayStyle {
            corner_radius: Some(20.0),
            padding_vertical: Some(4.0),
            ..Default::default()
        });
        overlay.update_style(&style, changes).unwrap();

        assert_eq!(
            overlay.host().calls(),
            vec![
                HostCall::SetBackground {
                    color: Argb(0xF200_0000),
                    corner_radius_px: 40.0
                },
                // horizontal falls back to the current 20dp
                HostCall::SetPadding {
                    horizontal_px: 40,
                    vertical_px: 8
                },
            ]
        );
    }

    #[test]
    fn test_style_while_detached_touches_nothing() {
        let mut overlay = overlay(33);
        let style = StyleConfig::default().resolved();
        overlay.update_style(&style, StyleChanges::all()).unwrap();
        assert!(overlay.host().calls().is_empty());
    }

    #[test]
    fn test_position_update_requires_attached_view() {
        let mut overlay = overlay(33);
        assert!(overlay.update_position(PositionOffset::new(1, 1)).is_err());
    }

    #[test]
    fn test_permission_is_requeried_each_call() {
        let mut overlay = overlay(33);
        overlay.host().set_can_draw(false);
        assert!(!overlay.has_permission());
        overlay.host().set_can_draw(true);
        assert!(overlay.has_permission());
        assert_eq!(overlay.request_permission(), Ok(true));
    }

    #[test]
    fn test_request_permission_opens_settings_when_missing() {
        let mut overlay = overlay(33);
        overlay.host().set_can_draw(false);
        assert_eq!(overlay.request_permission(), Ok(false));
        assert_eq!(overlay.host().calls(), vec![HostCall::OpenSettings]);
    }

    #[test]
    fn test_pre_marshmallow_always_granted() {
        let overlay = overlay(22);
        overlay.host().set_can_draw(false);
        assert!(overlay.has_permission());
    }
}
