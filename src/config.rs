//! Configuration management for overlay defaults
//!
//! This module provides runtime configuration loading from JSON files,
//! so default text, placement, drag threshold and the default visual style
//! can be tuned without recompilation. Mobile builds use the compiled-in
//! defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::overlay::style::{Argb, ResolvedStyle};

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub overlay: OverlayConfig,
    #[serde(default)]
    pub style: StyleConfig,
    #[serde(default)]
    pub pip: PipConfig,
}

/// Command router and placement parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Text shown when `show` is called without a `text` argument
    pub default_text: String,
    /// Horizontal offset from the centered gravity anchor, in pixels
    pub initial_offset_x: i32,
    /// Distance from the top edge, in pixels
    pub initial_offset_y: i32,
    /// Displacement (pixels, per axis) before a touch becomes a drag
    pub drag_threshold_px: f32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            default_text: "♪ Nothing playing ♪".to_string(),
            initial_offset_x: 0,
            initial_offset_y: 100,
            drag_threshold_px: 10.0,
        }
    }
}

/// Default visual style applied when the surface is first attached
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleConfig {
    pub font_size: f32,
    pub text_color: u32,
    pub background_color: u32,
    pub corner_radius: f32,
    pub padding_horizontal: f32,
    pub padding_vertical: f32,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            font_size: 16.0,
            text_color: 0xFFFF_FFFF,
            // Dark, ~95% opaque
            background_color: 0xF200_0000,
            corner_radius: 16.0,
            padding_horizontal: 20.0,
            padding_vertical: 10.0,
        }
    }
}

impl StyleConfig {
    /// Resolve into the full style the surface starts from
    pub fn resolved(&self) -> ResolvedStyle {
        ResolvedStyle {
            font_size: self.font_size,
            text_color: Argb(self.text_color),
            background_color: Argb(self.background_color),
            corner_radius: self.corner_radius,
            padding_horizontal: self.padding_horizontal,
            padding_vertical: self.padding_vertical,
        }
    }
}

/// Picture-in-Picture host parameters (iOS)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipConfig {
    /// Delay before injecting the label into the PiP window
    pub inject_delay_ms: u64,
    /// Extra attempts when the PiP window has not materialized yet
    pub inject_retry_limit: u32,
    /// Extra attempts while the controller is not yet able to start PiP
    #[serde(default = "default_start_retry_limit")]
    pub start_retry_limit: u32,
    /// File name of the decoded placeholder video under the temp dir
    pub video_file_name: String,
}

fn default_start_retry_limit() -> u32 {
    20
}

impl Default for PipConfig {
    fn default() -> Self {
        Self {
            inject_delay_ms: 100,
            inject_retry_limit: 5,
            start_retry_limit: default_start_retry_limit(),
            video_file_name: "pip_video.mp4".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The loaded configuration, or the defaults if the file is missing or
    /// the JSON is invalid.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    tracing::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                tracing::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Load configuration for the current platform
    ///
    /// Mobile builds have no writable asset path; they run on defaults.
    pub fn load() -> Self {
        cfg_if::cfg_if! {
            if #[cfg(any(target_os = "android", target_os = "ios"))] {
                tracing::info!("[Config] Using default configuration on mobile");
                Self::default()
            } else {
                Self::load_from_file("assets/overlay_config.json")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.overlay.initial_offset_y, 100);
        assert_eq!(config.overlay.drag_threshold_px, 10.0);
        assert_eq!(config.style.background_color, 0xF200_0000);
        assert_eq!(config.pip.inject_delay_ms, 100);
    }

    #[test]
    fn test_partial_json_falls_back_per_section() {
        let parsed: AppConfig =
            serde_json::from_str(r#"{"pip": {"inject_delay_ms": 250, "inject_retry_limit": 0, "video_file_name": "a.mp4"}}"#)
                .unwrap();
        assert_eq!(parsed.pip.inject_delay_ms, 250);
        assert_eq!(parsed.pip.start_retry_limit, 20);
        assert_eq!(parsed.overlay.default_text, "♪ Nothing playing ♪");
        assert_eq!(parsed.style.corner_radius, 16.0);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = AppConfig::load_from_file("does/not/exist.json");
        assert_eq!(config.overlay.initial_offset_x, 0);
    }

    #[test]
    fn test_style_config_resolves() {
        let style = StyleConfig::default().resolved();
        assert_eq!(style.text_color, Argb(0xFFFF_FFFF));
        assert_eq!(style.padding_vertical, 10.0);
    }
}
