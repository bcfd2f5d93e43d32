//! iOS overlay adapter: a label hosted in the Picture-in-Picture window.
//!
//! A silent 1x1 looping video keeps a PiP session alive; once the floating
//! window appears the label is injected into it. Lifecycle callbacks from the
//! PiP controller delegate arrive as [`HostEvent`]s.

use std::path::PathBuf;
use std::time::Duration;

use crate::config::PipConfig;
use crate::error::HostError;
use crate::overlay::{
    HostEvent, HostEventOutcome, OverlayBackend, OverlaySurface, PermissionGate, PositionOffset,
    ResolvedStyle, StyleChanges,
};

use super::asset;
use super::host::{LabelSpec, PipHost};
use super::queue::EventScheduler;

pub struct PipOverlay<H: PipHost, S: EventScheduler> {
    host: H,
    scheduler: S,
    config: PipConfig,
    temp_dir: PathBuf,
    player_ready: bool,
    /// Label prepared on attach; injected once the PiP window exists
    label: Option<LabelSpec>,
    injected: bool,
    started: bool,
}

impl<H: PipHost, S: EventScheduler> PipOverlay<H, S> {
    pub fn new(host: H, scheduler: S, config: PipConfig, temp_dir: PathBuf) -> Self {
        Self {
            host,
            scheduler,
            config,
            temp_dir,
            player_ready: false,
            label: None,
            injected: false,
            started: false,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn label(&self) -> Option<&LabelSpec> {
        self.label.as_ref()
    }

    fn inject_delay(&self) -> Duration {
        Duration::from_millis(self.config.inject_delay_ms)
    }

    /// Build the audio session, player and PiP controller ahead of the first
    /// `show`, so the controller has time to become possible.
    pub fn prepare(&mut self) -> Result<(), HostError> {
        if !self.host.is_pip_supported() {
            return Ok(());
        }
        self.ensure_player()
    }

    /// Decode the video and build the player once.
    fn ensure_player(&mut self) -> Result<(), HostError> {
        if self.player_ready {
            return Ok(());
        }
        let video = asset::write_pip_video(&self.temp_dir, &self.config.video_file_name)?;
        self.host.prepare_player(&video)?;
        self.player_ready = true;
        tracing::info!("[PipOverlay] player prepared");
        Ok(())
    }

    fn apply_label_style(&mut self, changes: StyleChanges) -> Result<(), HostError> {
        let Some(label) = self.label.as_ref() else {
            return Ok(());
        };
        if changes.font_size {
            self.host.set_label_font_size(label.font_size)?;
        }
        if changes.text_color {
            self.host.set_label_text_color(label.text_color)?;
        }
        if changes.background {
            self.host
                .set_label_background(label.background_color, label.corner_radius)?;
        }
        Ok(())
    }

    fn try_inject(&mut self, attempt: u32) -> HostEventOutcome {
        if !self.started || self.injected {
            return HostEventOutcome::Ignored;
        }
        let Some(label) = self.label.as_ref() else {
            return HostEventOutcome::Ignored;
        };

        match self.host.inject_label(label) {
            Ok(true) => {
                self.injected = true;
                tracing::debug!(attempt, "[PipOverlay] label injected");
            }
            Ok(false) if attempt < self.config.inject_retry_limit => {
                self.scheduler
                    .schedule(self.inject_delay(), HostEvent::InjectLabel { attempt: attempt + 1 });
            }
            Ok(false) => {
                tracing::warn!(attempt, "[PipOverlay] PiP window never appeared, label not shown");
            }
            Err(err) => {
                tracing::warn!("[PipOverlay] label injection failed: {}", err);
            }
        }
        HostEventOutcome::Handled
    }

    /// Ask the controller to start, or retry later while it is not possible.
    fn request_start(&mut self, attempt: u32) -> Result<(), HostError> {
        if self.host.is_pip_possible() {
            return self.host.start_pip();
        }
        if attempt >= self.config.start_retry_limit {
            return Err(HostError::Unavailable {
                what: "picture-in-picture start",
            });
        }
        tracing::debug!(attempt, "[PipOverlay] PiP not possible yet, retrying");
        self.scheduler
            .schedule(self.inject_delay(), HostEvent::StartPip { attempt: attempt + 1 });
        Ok(())
    }

    /// Tear down after the session ended; errors are only logged.
    fn teardown(&mut self) {
        if self.injected {
            if let Err(err) = self.host.remove_label() {
                tracing::warn!("[PipOverlay] remove label failed: {}", err);
            }
        }
        if let Err(err) = self.host.pause() {
            tracing::warn!("[PipOverlay] pause failed: {}", err);
        }
        self.injected = false;
        self.started = false;
        self.label = None;
    }
}

impl<H: PipHost, S: EventScheduler> OverlaySurface for PipOverlay<H, S> {
    fn attach(
        &mut self,
        text: &str,
        style: &ResolvedStyle,
        _position: PositionOffset,
    ) -> Result<(), HostError> {
        if !self.host.is_pip_supported() {
            return Err(HostError::Unsupported {
                capability: "picture-in-picture",
            });
        }
        self.ensure_player()?;

        // A session that outlived the router state is reused in place.
        if self.host.is_pip_active() && self.label.is_some() {
            self.update_text(text)?;
            if let Some(label) = self.label.as_mut() {
                label.apply_style(style);
            }
            return self.apply_label_style(StyleChanges::all());
        }

        self.host.play()?;
        self.request_start(0)?;
        self.label = Some(LabelSpec::new(text, style));
        self.injected = false;
        self.started = true;
        tracing::debug!(text, "[PipOverlay] PiP start requested");
        Ok(())
    }

    fn detach(&mut self) -> Result<(), HostError> {
        if !self.started && !self.host.is_pip_active() {
            return Ok(());
        }
        self.host.stop_pip()?;
        self.host.pause()?;
        // The label is removed when the delegate reports did-stop.
        self.started = false;
        Ok(())
    }

    fn update_position(&mut self, _position: PositionOffset) -> Result<(), HostError> {
        // The PiP window is positioned by the system.
        Ok(())
    }

    fn update_text(&mut self, text: &str) -> Result<(), HostError> {
        let label = self.label.as_mut().ok_or(HostError::Unavailable {
            what: "PiP label",
        })?;
        label.text = text.to_string();
        if self.injected {
            self.host.set_label_text(text)?;
        }
        Ok(())
    }

    fn update_style(
        &mut self,
        style: &ResolvedStyle,
        changes: StyleChanges,
    ) -> Result<(), HostError> {
        let Some(label) = self.label.as_mut() else {
            return Ok(());
        };
        label.apply_style(style);
        if self.injected {
            self.apply_label_style(changes)?;
        }
        Ok(())
    }

    fn is_attached(&self) -> bool {
        self.started
    }

    fn on_host_event(&mut self, event: &HostEvent) -> HostEventOutcome {
        match event {
            HostEvent::StartPip { attempt } => {
                if !self.started || self.host.is_pip_active() {
                    return HostEventOutcome::Ignored;
                }
                match self.request_start(*attempt) {
                    Ok(()) => HostEventOutcome::Handled,
                    Err(err) => {
                        tracing::warn!("[PipOverlay] PiP start abandoned: {}", err);
                        self.teardown();
                        HostEventOutcome::SurfaceFailed
                    }
                }
            }
            HostEvent::PipWillStart => {
                if !self.started {
                    return HostEventOutcome::Ignored;
                }
                self.scheduler
                    .schedule(self.inject_delay(), HostEvent::InjectLabel { attempt: 0 });
                HostEventOutcome::Handled
            }
            HostEvent::InjectLabel { attempt } => self.try_inject(*attempt),
            HostEvent::PipDidStop => {
                self.teardown();
                tracing::info!("[PipOverlay] PiP stopped");
                HostEventOutcome::SurfaceClosed
            }
            HostEvent::PipFailedToStart { reason } => {
                tracing::warn!("[PipOverlay] PiP failed to start: {}", reason);
                self.teardown();
                HostEventOutcome::SurfaceFailed
            }
        }
    }
}

impl<H: PipHost, S: EventScheduler> PermissionGate for PipOverlay<H, S> {
    fn has_permission(&self) -> bool {
        true
    }

    fn request_permission(&mut self) -> Result<bool, HostError> {
        Ok(true)
    }
}

impl<H: PipHost, S: EventScheduler> OverlayBackend for PipOverlay<H, S> {
    fn name(&self) -> &'static str {
        "ios"
    }
}
