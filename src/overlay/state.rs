//! Router-owned overlay state.

use super::placement::PositionOffset;
use super::style::ResolvedStyle;

/// Transient UI state of the single overlay instance.
///
/// Reset to defaults on `hide` and when the host closes the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayState {
    pub visible: bool,
    pub current_text: String,
    pub style: ResolvedStyle,
    pub position: PositionOffset,
    default_style: ResolvedStyle,
    default_position: PositionOffset,
}

impl OverlayState {
    pub fn new(default_style: ResolvedStyle, default_position: PositionOffset) -> Self {
        Self {
            visible: false,
            current_text: String::new(),
            style: default_style,
            position: default_position,
            default_style,
            default_position,
        }
    }

    pub fn reset(&mut self) {
        self.visible = false;
        self.current_text.clear();
        self.style = self.default_style;
        self.position = self.default_position;
    }

    pub fn default_position(&self) -> PositionOffset {
        self.default_position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StyleConfig;
    use crate::overlay::style::OverlayStyle;

    #[test]
    fn test_reset_restores_defaults() {
        let defaults = StyleConfig::default().resolved();
        let mut state = OverlayState::new(defaults, PositionOffset::new(0, 100));
        state.visible = true;
        state.current_text = "Track A".to_string();
        state.position = PositionOffset::new(40, 300);
        state.style.merge(&OverlayStyle {
            font_size: Some(30.0),
            ..Default::default()
        });

        state.reset();

        assert!(!state.visible);
        assert!(state.current_text.is_empty());
        assert_eq!(state.style, defaults);
        assert_eq!(state.position, PositionOffset::new(0, 100));
    }
}
