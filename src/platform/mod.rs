//! Platform adapters.
//!
//! The adapter logic is generic over small host traits so it builds and is
//! tested on every target; only the JNI and Objective-C hosts are gated to
//! their operating system.

pub mod android;
pub mod headless;
pub mod ios;

pub use headless::{FailPoint, HeadlessBackend, HeadlessProbe, SurfaceOp};

use crate::config::AppConfig;
use crate::error::HostError;
use crate::overlay::{
    OverlayBackend, OverlaySurface, PermissionGate, PositionOffset, ResolvedStyle, StyleChanges,
};

/// Create the backend for the current build target.
pub fn create_backend(config: &AppConfig) -> Box<dyn OverlayBackend> {
    cfg_if::cfg_if! {
        if #[cfg(target_os = "android")] {
            let _ = config;
            match android::JniWindowHost::from_android_context() {
                Ok(host) => Box::new(android::AndroidOverlay::new(host)),
                Err(err) => {
                    tracing::error!("[Platform] window host unavailable: {}", err);
                    Box::new(UnavailableBackend::new(err))
                }
            }
        } else if #[cfg(target_os = "ios")] {
            match ios::ObjcPipHost::from_root_view() {
                Ok(host) => {
                    let mut overlay = ios::PipOverlay::new(
                        host,
                        ios::MainQueueScheduler,
                        config.pip.clone(),
                        std::env::temp_dir(),
                    );
                    // Retried on the first show if this fails.
                    if let Err(err) = overlay.prepare() {
                        tracing::warn!("[Platform] PiP player not prepared: {}", err);
                    }
                    Box::new(overlay)
                }
                Err(err) => {
                    tracing::error!("[Platform] PiP host unavailable: {}", err);
                    Box::new(UnavailableBackend::new(err))
                }
            }
        } else {
            let _ = config;
            Box::new(HeadlessBackend::new())
        }
    }
}

/// Stand-in used when the platform host could not be constructed yet.
///
/// Every surface call fails with the construction error, so commands
/// report their usual error code instead of panicking. The router replaces
/// it as soon as the host can be built.
pub struct UnavailableBackend {
    reason: HostError,
}

impl UnavailableBackend {
    pub fn new(reason: HostError) -> Self {
        Self { reason }
    }
}

impl OverlaySurface for UnavailableBackend {
    fn attach(&mut self, _: &str, _: &ResolvedStyle, _: PositionOffset) -> Result<(), HostError> {
        Err(self.reason.clone())
    }

    fn detach(&mut self) -> Result<(), HostError> {
        Ok(())
    }

    fn update_position(&mut self, _: PositionOffset) -> Result<(), HostError> {
        Err(self.reason.clone())
    }

    fn update_text(&mut self, _: &str) -> Result<(), HostError> {
        Err(self.reason.clone())
    }

    fn update_style(&mut self, _: &ResolvedStyle, _: StyleChanges) -> Result<(), HostError> {
        Ok(())
    }

    fn is_attached(&self) -> bool {
        false
    }
}

impl PermissionGate for UnavailableBackend {
    /// PiP needs no permission; an Android host that cannot be reached
    /// cannot confirm it.
    fn has_permission(&self) -> bool {
        cfg!(target_os = "ios")
    }

    fn request_permission(&mut self) -> Result<bool, HostError> {
        Err(self.reason.clone())
    }
}

impl OverlayBackend for UnavailableBackend {
    fn name(&self) -> &'static str {
        "unavailable"
    }

    fn availability(&self) -> Result<(), HostError> {
        Err(self.reason.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StyleConfig;

    #[test]
    #[cfg(not(any(target_os = "android", target_os = "ios")))]
    fn test_desktop_backend_is_headless() {
        let backend = create_backend(&AppConfig::default());
        assert_eq!(backend.name(), "headless");
    }

    #[test]
    fn test_unavailable_backend_reports_reason() {
        let reason = HostError::Unavailable {
            what: "android context",
        };
        let mut backend = UnavailableBackend::new(reason.clone());
        let style = StyleConfig::default().resolved();
        assert_eq!(backend.has_permission(), cfg!(target_os = "ios"));
        assert_eq!(backend.availability(), Err(reason.clone()));
        assert_eq!(
            backend.attach("x", &style, PositionOffset::default()),
            Err(reason)
        );
        assert!(backend.detach().is_ok());
    }
}
