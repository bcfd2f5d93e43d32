// OverlayContext: the process-wide overlay command router
// Owns the platform backend, the overlay state and the drag controller

use std::sync::{Mutex, MutexGuard};
use tokio::sync::broadcast;

use crate::channel::{MethodCall, MethodResponse, OverlayCommand};
use crate::config::AppConfig;
use crate::error::{log_overlay_error, HostError, OverlayError};
use crate::overlay::{
    DragController, DragOutcome, HostEvent, HostEventOutcome, OverlayBackend, OverlayEvent,
    OverlayState, OverlayStyle, PositionOffset, TouchEvent,
};
use crate::platform;

/// Capacity of the unsolicited-event channel
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Builds the platform backend; called again while the current backend is
/// unavailable
pub type BackendFactory = Box<dyn Fn() -> Box<dyn OverlayBackend> + Send + Sync>;

/// Everything mutated by commands, guarded by one lock
struct RouterState {
    backend: Box<dyn OverlayBackend>,
    overlay: OverlayState,
    drag: DragController,
}

impl RouterState {
    fn reset(&mut self) {
        self.overlay.reset();
        self.drag.reset();
    }
}

/// OverlayContext: single serialized command stream for the overlay
///
/// All commands, touches and host callbacks go through one mutex, so the
/// backend never sees interleaved calls. Lock poisoning is reported with the
/// error code of the command that hit it.
pub struct OverlayContext {
    router: Mutex<RouterState>,
    events: broadcast::Sender<OverlayEvent>,
    default_text: String,
    factory: Option<BackendFactory>,
}

impl OverlayContext {
    /// Create a context for the current platform with the loaded configuration
    pub fn new() -> Self {
        Self::with_config(AppConfig::load())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let factory_config = config.clone();
        Self::with_factory(
            Box::new(move || platform::create_backend(&factory_config)),
            &config,
        )
    }

    /// Create a context that rebuilds its backend until the platform host
    /// becomes reachable (Android context handed over, iOS root view set)
    pub fn with_factory(factory: BackendFactory, config: &AppConfig) -> Self {
        let mut context = Self::with_backend(factory(), config);
        context.factory = Some(factory);
        context
    }

    /// Create a context around an explicit backend (tests, CLI)
    pub fn with_backend(backend: Box<dyn OverlayBackend>, config: &AppConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let default_position =
            PositionOffset::new(config.overlay.initial_offset_x, config.overlay.initial_offset_y);

        tracing::info!(backend = backend.name(), "[OverlayContext] created");

        Self {
            router: Mutex::new(RouterState {
                backend,
                overlay: OverlayState::new(config.style.resolved(), default_position),
                drag: DragController::new(config.overlay.drag_threshold_px),
            }),
            events,
            default_text: config.overlay.default_text.clone(),
            factory: None,
        }
    }

    // ========================================================================
    // LOCK HELPER
    // ========================================================================

    /// Acquire the router lock, converting poisoning into the caller's error
    fn lock_router<E>(
        &self,
        context: &str,
        to_error: impl FnOnce(HostError) -> E,
    ) -> Result<MutexGuard<'_, RouterState>, E> {
        let mut router = self.router.lock().map_err(|_| {
            tracing::error!("[OverlayContext] router lock poisoned during {}", context);
            to_error(HostError::LockPoisoned {
                component: "overlay_router",
            })
        })?;
        self.refresh_backend(&mut router);
        Ok(router)
    }

    /// Swap an unavailable backend for a freshly built one when it is ready
    fn refresh_backend(&self, router: &mut RouterState) {
        let Some(factory) = &self.factory else {
            return;
        };
        if router.backend.availability().is_ok() {
            return;
        }
        let backend = factory();
        if backend.availability().is_ok() {
            tracing::info!(backend = backend.name(), "[OverlayContext] platform backend ready");
            router.backend = backend;
        }
    }

    /// Build the platform backend now if it is still unavailable
    ///
    /// Called once the platform hands over its context; returns whether a
    /// usable backend is in place.
    pub fn prepare_backend(&self) -> bool {
        match self.lock_router("prepareBackend", |err| err) {
            Ok(router) => router.backend.availability().is_ok(),
            Err(_) => false,
        }
    }

    // ========================================================================
    // COMMANDS
    // ========================================================================

    /// Show the overlay, or refresh it in place when already visible
    ///
    /// # Errors
    /// - `NoPermission` when the overlay capability is not granted
    /// - `ShowFailed` when the surface cannot be attached or refreshed
    pub fn show(&self, text: Option<String>, style: &OverlayStyle) -> Result<bool, OverlayError> {
        let mut router = self.lock_router("show", OverlayError::show_failed)?;
        let router = &mut *router;

        router
            .backend
            .availability()
            .map_err(OverlayError::show_failed)?;
        if !router.backend.has_permission() {
            return Err(OverlayError::NoPermission);
        }

        let text = text.unwrap_or_else(|| self.default_text.clone());

        if router.overlay.visible {
            router
                .backend
                .update_text(&text)
                .map_err(OverlayError::show_failed)?;
            router.overlay.current_text = text;

            let changes = router.overlay.style.merge(style);
            if !changes.is_empty() {
                router
                    .backend
                    .update_style(&router.overlay.style, changes)
                    .map_err(OverlayError::show_failed)?;
            }
            tracing::debug!("[OverlayContext] show refreshed visible overlay");
            return Ok(true);
        }

        router.overlay.style.merge(style);
        let position = router.overlay.default_position();
        router
            .backend
            .attach(&text, &router.overlay.style, position)
            .map_err(OverlayError::show_failed)?;

        router.overlay.visible = true;
        router.overlay.current_text = text;
        router.overlay.position = position;
        router.drag.reset();

        tracing::info!(backend = router.backend.name(), "[OverlayContext] overlay shown");
        Ok(true)
    }

    /// Hide the overlay and reset state; succeeds when already hidden
    pub fn hide(&self) -> Result<bool, OverlayError> {
        let mut router = self.lock_router("hide", OverlayError::hide_failed)?;

        if router.overlay.visible {
            router
                .backend
                .detach()
                .map_err(OverlayError::hide_failed)?;
            tracing::info!("[OverlayContext] overlay hidden");
        }
        router.reset();
        Ok(true)
    }

    /// Replace the text; `Ok(false)` when nothing is shown
    pub fn update_text(&self, text: Option<String>) -> Result<bool, OverlayError> {
        let mut router = self.lock_router("updateText", OverlayError::update_failed)?;

        if !router.overlay.visible {
            return Ok(false);
        }

        let text = text.unwrap_or_default();
        router
            .backend
            .update_text(&text)
            .map_err(OverlayError::update_failed)?;
        router.overlay.current_text = text;
        Ok(true)
    }

    /// Merge a sparse style; re-render only the affected groups when visible
    pub fn update_style(&self, style: &OverlayStyle) -> Result<bool, OverlayError> {
        let mut router = self.lock_router("updateStyle", OverlayError::update_style_failed)?;
        let router = &mut *router;

        let changes = router.overlay.style.merge(style);
        if router.overlay.visible && !changes.is_empty() {
            router
                .backend
                .update_style(&router.overlay.style, changes)
                .map_err(OverlayError::update_style_failed)?;
        }
        Ok(true)
    }

    /// Current permission; never fails
    pub fn has_permission(&self) -> bool {
        match self.lock_router("hasPermission", |err| err) {
            Ok(router) => router.backend.has_permission(),
            Err(_) => false,
        }
    }

    /// `true` if granted; otherwise open the OS settings and return `false`
    pub fn request_permission(&self) -> Result<bool, OverlayError> {
        let mut router = self.lock_router("requestPermission", OverlayError::request_failed)?;
        router
            .backend
            .request_permission()
            .map_err(OverlayError::request_failed)
    }

    /// Best-effort teardown when the host engine goes away
    pub fn dispose(&self) {
        let mut router = match self.router.lock() {
            Ok(router) => router,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(err) = router.backend.detach() {
            tracing::warn!("[OverlayContext] detach during dispose failed: {}", err);
        }
        router.reset();
        tracing::info!("[OverlayContext] disposed");
    }

    // ========================================================================
    // DISPATCH
    // ========================================================================

    /// Execute a decoded command, logging failures
    pub fn dispatch(&self, command: OverlayCommand) -> Result<bool, OverlayError> {
        let name = command.name();
        tracing::debug!(command = name, "[OverlayContext] dispatch");

        let result = match command {
            OverlayCommand::Show { text, style } => self.show(text, &style),
            OverlayCommand::Hide => self.hide(),
            OverlayCommand::UpdateText { text } => self.update_text(text),
            OverlayCommand::UpdateStyle { style } => self.update_style(&style),
            OverlayCommand::HasPermission => Ok(self.has_permission()),
            OverlayCommand::RequestPermission => self.request_permission(),
        };

        if let Err(err) = &result {
            log_overlay_error(err, name);
        }
        result
    }

    pub fn handle_method_call(&self, call: &MethodCall) -> MethodResponse {
        let result = OverlayCommand::try_from(call).and_then(|command| self.dispatch(command));
        MethodResponse::from_result(result)
    }

    /// Decode, dispatch and encode one bridge call
    pub fn invoke_json(&self, method: &str, args_json: &str) -> String {
        let response = match MethodCall::from_parts(method, args_json) {
            Ok(call) => self.handle_method_call(&call),
            Err(err) => {
                log_overlay_error(&err, method);
                MethodResponse::from_result(Err(err))
            }
        };
        response.to_json_string()
    }

    // ========================================================================
    // INGRESS
    // ========================================================================

    /// Feed a touch on the overlay into the drag controller
    ///
    /// Positions produced while dragging are applied immediately; placement
    /// failures are logged and otherwise ignored.
    pub fn handle_touch(&self, event: TouchEvent) -> DragOutcome {
        let Ok(mut router) = self.router.lock() else {
            tracing::warn!("[OverlayContext] router lock poisoned during touch");
            return DragOutcome::Ignored;
        };
        let router = &mut *router;

        if !router.overlay.visible || !router.backend.supports_drag() {
            return DragOutcome::Ignored;
        }

        let outcome = router.drag.handle(event, router.overlay.position);
        if let DragOutcome::Moved { position } = outcome {
            router.overlay.position = position;
            if let Err(err) = router.backend.update_position(position) {
                tracing::warn!("[OverlayContext] position update failed: {}", err);
            }
        }
        outcome
    }

    /// Forward a platform lifecycle callback to the surface
    pub fn handle_host_event(&self, event: HostEvent) -> HostEventOutcome {
        let Ok(mut router) = self.router.lock() else {
            tracing::warn!("[OverlayContext] router lock poisoned during host event");
            return HostEventOutcome::Ignored;
        };

        let outcome = router.backend.on_host_event(&event);
        match outcome {
            HostEventOutcome::SurfaceClosed => {
                router.reset();
                drop(router);
                // No subscribers is fine
                let _ = self.events.send(OverlayEvent::Close);
            }
            HostEventOutcome::SurfaceFailed => router.reset(),
            HostEventOutcome::Handled | HostEventOutcome::Ignored => {}
        }
        outcome
    }

    /// Subscribe to unsolicited events (`onClose`)
    pub fn subscribe_events(&self) -> broadcast::Receiver<OverlayEvent> {
        self.events.subscribe()
    }

    // ========================================================================
    // INSPECTION
    // ========================================================================

    /// Copy of the current overlay state
    pub fn state(&self) -> Option<OverlayState> {
        self.router.lock().ok().map(|router| router.overlay.clone())
    }

    pub fn backend_name(&self) -> Option<&'static str> {
        self.router.lock().ok().map(|router| router.backend.name())
    }
}

impl Default for OverlayContext {
    fn default() -> Self {
        Self::new()
    }
}
