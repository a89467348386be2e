//! HostController: sequences load, resize and teardown for one renderer and
//! reports every outcome to observers.
//!
//! Loading is split in two halves. [`HostController::select`] invalidates the
//! current session and hands out a [`LoadTicket`]; [`HostController::resolve`]
//! performs the load for that ticket. Only the most recently issued ticket can
//! change the session, so a late completion of a superseded load is ignored.

use std::path::Path;

use log::{debug, error, info, warn};
use rivhost_api::coercion::coerce_text;
use rivhost_api::{Renderer, SurfaceDescriptor, Value, VisualHandle};
use serde::{Deserialize, Serialize};

use crate::catalog::{ExternalSelection, FileSource, FileSourceCatalog};
use crate::config::{CatalogConfig, HostSettings};
use crate::controls::{ControlSelection, InstanceRef, PropertyWrite};
use crate::diagnostics::{DiagnosticsCfg, HostEvent, HostObserver, HostStatus, ObserverId, Observers};
use crate::error::{
    BindError, ControlError, ControlScope, HostError, HostResult, InvalidState, LoadError,
    NotFoundError, PickError, RenderCallError,
};
use crate::ids::{GenerationCounter, LoadTicket};
use crate::input::{InputQueue, PointerDisposition, PointerEvent, PointerMapper};
use crate::renderer_handle::{Lifecycle, RendererHandle};
use crate::session::HostSession;

pub const STATUS_READY: &str = "Ready to load animation";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostState {
    Idle,
    Loading,
    Ready,
    TearingDown,
    Disposed,
}

/// Result of resolving a [`LoadTicket`].
#[derive(Clone, Debug, PartialEq)]
pub enum LoadOutcome {
    Ready,
    Failed(LoadError),
    /// A newer load was issued; this completion changed nothing.
    Superseded,
}

pub struct HostController<R: Renderer> {
    handle: RendererHandle<R>,
    input: InputQueue,
    mapper: PointerMapper,
    catalog: FileSourceCatalog,
    settings: HostSettings,
    session: HostSession,
    generations: GenerationCounter,
    pending: Option<LoadTicket>,
    state: HostState,
    error: Option<String>,
    status: String,
    busy: bool,
    observers: Observers,
}

impl<R: Renderer> HostController<R> {
    pub fn new(renderer: R, settings: HostSettings) -> Self {
        let generations = GenerationCounter::new();
        Self {
            handle: RendererHandle::new(renderer),
            input: InputQueue::new(),
            mapper: PointerMapper::default(),
            catalog: FileSourceCatalog::new(&settings),
            session: HostSession::empty(generations.current(), Lifecycle::Uninitialized),
            generations,
            settings,
            pending: None,
            state: HostState::Idle,
            error: None,
            status: STATUS_READY.to_string(),
            busy: false,
            observers: Observers::new(DiagnosticsCfg::default()),
        }
    }

    pub fn with_catalog(mut self, catalog: FileSourceCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Build the catalog from a configuration document.
    pub fn with_config(mut self, config: &CatalogConfig) -> Self {
        self.catalog = FileSourceCatalog::from_config(config, &self.settings);
        self
    }

    pub fn with_diagnostics(mut self, cfg: DiagnosticsCfg) -> Self {
        self.observers.set_cfg(cfg);
        self
    }

    // ----- observation -----

    pub fn subscribe(&mut self, observer: impl HostObserver + 'static) -> ObserverId {
        self.observers.subscribe(Box::new(observer))
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Recently emitted events, oldest first.
    pub fn recent_events(&self) -> Vec<HostEvent> {
        self.observers.history().cloned().collect()
    }

    pub fn state(&self) -> HostState {
        self.state
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn status_text(&self) -> &str {
        &self.status
    }

    pub fn status(&self) -> HostStatus {
        HostStatus {
            state: self.state,
            status_text: self.status.clone(),
            busy: self.busy,
            error: self.error.clone(),
            controls_enabled: self.state == HostState::Ready,
        }
    }

    pub fn session(&self) -> &HostSession {
        &self.session
    }

    pub fn catalog(&self) -> &FileSourceCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut FileSourceCatalog {
        &mut self.catalog
    }

    pub fn settings(&self) -> &HostSettings {
        &self.settings
    }

    pub fn handle(&self) -> &RendererHandle<R> {
        &self.handle
    }

    pub fn renderer(&self) -> &R {
        self.handle.renderer()
    }

    pub fn input(&self) -> &InputQueue {
        &self.input
    }

    pub fn pending_ticket(&self) -> Option<&LoadTicket> {
        self.pending.as_ref()
    }

    /// `"<w> × <h>"` of the current surface.
    pub fn dimensions_text(&self) -> String {
        let (w, h) = self.handle.surface_size();
        format!("{w} × {h}")
    }

    pub fn file_info_text(&self) -> String {
        match self.session.source() {
            Some(source) => source.description(),
            None => "No file loaded".to_string(),
        }
    }

    // ----- internal notification helpers -----

    fn emit(&mut self, event: HostEvent) {
        self.observers.emit(event);
    }

    fn set_state(&mut self, to: HostState) {
        if self.state == to {
            return;
        }
        let from = self.state;
        self.state = to;
        info!("host state {from:?} -> {to:?}");
        self.emit(HostEvent::StateChanged { from, to });
    }

    fn set_status(&mut self, text: impl Into<String>) {
        let text = text.into();
        if self.status == text {
            return;
        }
        self.status = text.clone();
        self.emit(HostEvent::StatusChanged { text });
    }

    fn set_busy(&mut self, busy: bool) {
        if self.busy != busy {
            self.busy = busy;
            self.emit(HostEvent::BusyChanged { busy });
        }
    }

    fn raise_error(&mut self, message: String) {
        warn!("{message}");
        self.error = Some(message.clone());
        self.emit(HostEvent::ErrorRaised { message });
    }

    fn clear_error(&mut self) {
        if self.error.take().is_some() {
            self.emit(HostEvent::ErrorCleared);
        }
    }

    /// Surface `err` on the error overlay and hand it back.
    fn fail<T>(&mut self, err: impl Into<HostError>) -> HostResult<T> {
        let err = err.into();
        self.raise_error(err.to_string());
        Err(err)
    }

    fn ensure_alive(&self, operation: &'static str) -> HostResult<()> {
        match self.state {
            HostState::Disposed | HostState::TearingDown => Err(InvalidState {
                operation,
                state: self.handle.lifecycle(),
            }
            .into()),
            _ => Ok(()),
        }
    }

    /// Stop the loop and unload ahead of a content swap. Renderer faults are
    /// reported on the error overlay and the swap goes ahead.
    fn release_content(&mut self) {
        let stopped = if self.handle.is_looping() {
            self.handle.stop_loop()
        } else {
            Ok(())
        };
        let unloaded = self.handle.unload_content();
        if let Err(e) = stopped.and(unloaded) {
            self.raise_error(e.to_string());
        }
    }

    /// Swap in an explicit empty session and tell observers.
    fn reset_session(&mut self) {
        let generation = self.generations.current();
        self.session = HostSession::empty(generation, self.handle.lifecycle());
        self.emit(HostEvent::SessionReset { generation });
    }

    // ----- lifecycle -----

    /// Initialize the renderer against a surface. The returned visual must be
    /// attached to the host's surface tree by the caller.
    pub fn attach_surface(
        &mut self,
        surface: SurfaceDescriptor,
        width: u32,
        height: u32,
    ) -> HostResult<VisualHandle> {
        self.ensure_alive("attach a surface")?;
        match self.handle.initialize(&surface, width, height) {
            Ok(visual) => {
                self.mapper = PointerMapper::for_surface(&surface);
                self.session.set_lifecycle(self.handle.lifecycle());
                self.set_status(STATUS_READY);
                Ok(visual)
            }
            Err(e) => self.fail(e),
        }
    }

    /// Begin loading `source`. The current session is invalidated before this
    /// returns; the load itself happens in [`resolve`](Self::resolve).
    pub fn select(&mut self, source: FileSource) -> HostResult<LoadTicket> {
        self.ensure_alive("select content")?;
        if !self.handle.lifecycle().is_initialized() {
            return Err(InvalidState {
                operation: "select content",
                state: self.handle.lifecycle(),
            }
            .into());
        }
        self.clear_error();
        let generation = self.generations.advance();
        if let Some(old) = self.pending.take() {
            debug!("load of '{}' superseded", old.source.path());
        }
        // Stop and unload first so nothing reaches the old content mid-swap.
        self.release_content();
        self.input.reset();
        self.reset_session();

        let ticket = LoadTicket { generation, source };
        self.pending = Some(ticket.clone());
        self.set_state(HostState::Loading);
        self.set_busy(true);
        self.set_status(format!("Loading {}...", ticket.source.display_name()));
        Ok(ticket)
    }

    /// Complete a load issued by [`select`](Self::select).
    pub fn resolve(&mut self, ticket: LoadTicket) -> LoadOutcome {
        let is_pending = self
            .pending
            .as_ref()
            .is_some_and(|p| p.generation == ticket.generation);
        if !is_pending || !self.generations.is_current(ticket.generation) {
            debug!(
                "ignoring stale completion for '{}' ({:?})",
                ticket.source.path(),
                ticket.generation
            );
            return LoadOutcome::Superseded;
        }
        self.pending = None;
        let LoadTicket { generation, source } = ticket;

        if let Err(e) = self.handle.load_content(&source) {
            self.session = HostSession::empty(generation, self.handle.lifecycle());
            self.emit(HostEvent::SessionReset { generation });
            self.set_state(HostState::Idle);
            self.set_busy(false);
            self.set_status(format!("Failed to load {}: {e}", source.display_name()));
            self.raise_error(e.to_string());
            return LoadOutcome::Failed(e);
        }

        info!("loaded '{}'", source.path());
        self.catalog.note_recent(&source);
        self.emit(HostEvent::ContentLoaded {
            path: source.path().to_string(),
            display_name: source.display_name().to_string(),
        });
        let name = source.display_name().to_string();
        self.session = HostSession::loaded(source, generation);
        self.set_state(HostState::Ready);
        self.discover();
        if self.settings.auto_play {
            if let Err(e) = self.start_playback() {
                self.raise_error(format!("Playback failed: {e}"));
            }
        }
        self.set_busy(false);
        self.set_status(format!("Loaded {name}"));
        LoadOutcome::Ready
    }

    /// `select` followed by `resolve`.
    pub fn load(&mut self, source: FileSource) -> HostResult<()> {
        let ticket = self.select(source)?;
        match self.resolve(ticket) {
            LoadOutcome::Failed(e) => Err(e.into()),
            LoadOutcome::Ready | LoadOutcome::Superseded => Ok(()),
        }
    }

    /// Load the catalog's default source.
    pub fn load_default(&mut self) -> HostResult<()> {
        match self.catalog.get_default() {
            Some(source) => self.load(source),
            None => self.fail(HostError::NoSource),
        }
    }

    /// Validate an external pick and load it. A cancelled pick is returned
    /// without touching the error overlay.
    pub fn open_external(&mut self, selection: ExternalSelection) -> HostResult<()> {
        self.ensure_alive("open an external file")?;
        match self.catalog.resolve_external(selection) {
            Ok(source) => self.load(source),
            Err(PickError::Cancelled) => Err(PickError::Cancelled.into()),
            Err(e) => self.fail(e),
        }
    }

    pub fn open_external_path(&mut self, path: &Path) -> HostResult<()> {
        self.ensure_alive("open an external file")?;
        match self.catalog.resolve_external_path(path) {
            Ok(source) => self.load(source),
            Err(e) => self.fail(e),
        }
    }

    /// Drop the current content and return to the idle state.
    pub fn clear_content(&mut self) -> HostResult<()> {
        self.ensure_alive("clear content")?;
        self.generations.advance();
        self.pending = None;
        self.clear_error();
        self.release_content();
        self.input.reset();
        self.reset_session();
        self.set_state(HostState::Idle);
        self.set_busy(false);
        self.set_status(STATUS_READY);
        Ok(())
    }

    pub fn resize(&mut self, width: u32, height: u32) -> HostResult<()> {
        self.ensure_alive("resize")?;
        match self.handle.resize(width, height) {
            Ok(()) => Ok(()),
            Err(RenderCallError::InvalidState(e)) => Err(e.into()),
            Err(e) => self.fail(e),
        }
    }

    /// Stop the loop, release the renderer and drop the visual. Terminal and
    /// idempotent; any pending load is superseded.
    pub fn dispose(&mut self) {
        if self.state == HostState::Disposed {
            return;
        }
        self.set_state(HostState::TearingDown);
        self.generations.advance();
        self.pending = None;
        self.input.reset();
        let released = self.handle.dispose();
        self.reset_session();
        if let Err(e) = released {
            self.raise_error(e.to_string());
        }
        self.set_busy(false);
        self.set_state(HostState::Disposed);
        self.emit(HostEvent::Disposed);
    }

    // ----- discovery -----

    fn discover(&mut self) {
        let controls = self.session.controls_mut();
        match controls.discover_state_machines(&mut self.handle) {
            Ok(selection) => {
                let names = controls.state_machines().iter().map(|sm| sm.name.clone()).collect();
                let active = controls.active_state_machine().map(|sm| sm.name.clone());
                self.emit(HostEvent::StateMachinesDiscovered { names, selection });
                self.emit(HostEvent::ActiveStateMachineChanged { name: active });
            }
            Err(e) => {
                error!("state machine discovery failed: {e}");
                self.raise_error(format!("State machine discovery failed: {e}"));
            }
        }

        let controls = self.session.controls_mut();
        match controls.discover_view_models(&mut self.handle) {
            Ok(selection) => {
                let names = controls.view_models().iter().map(|vm| vm.name.clone()).collect();
                self.emit(HostEvent::ViewModelsDiscovered { names, selection });
            }
            Err(e) => {
                error!("view model discovery failed: {e}");
                self.raise_error(format!("View model discovery failed: {e}"));
            }
        }
    }

    // ----- playback -----

    fn start_playback(&mut self) -> Result<(), RenderCallError> {
        self.handle.start_loop()?;
        self.handle.with_content("play", |r| {
            r.play_state_machine();
            Ok(())
        })
    }

    /// Start the loop and play the active state machine. No-op without
    /// content.
    pub fn play(&mut self) -> HostResult<()> {
        self.ensure_alive("play")?;
        if !self.handle.lifecycle().has_content() {
            return Ok(());
        }
        if let Err(e) = self.start_playback() {
            return self.fail(e);
        }
        self.set_status("Playing");
        Ok(())
    }

    pub fn pause(&mut self) -> HostResult<()> {
        self.ensure_alive("pause")?;
        if !self.handle.lifecycle().has_content() {
            return Ok(());
        }
        let paused = self.handle.with_content("pause", |r| {
            r.pause_state_machine();
            Ok(())
        });
        if let Err(e) = paused {
            return self.fail(e);
        }
        self.set_status("Paused");
        Ok(())
    }

    /// Reset the active state machine and stop the render loop.
    pub fn stop(&mut self) -> HostResult<()> {
        self.ensure_alive("stop")?;
        if !self.handle.lifecycle().has_content() {
            return Ok(());
        }
        let stopped = self
            .handle
            .with_content("stop", |r| {
                r.reset_state_machine();
                Ok(())
            })
            .and_then(|()| self.handle.stop_loop());
        if let Err(e) = stopped {
            return self.fail(e);
        }
        self.set_status("Stopped");
        Ok(())
    }

    // ----- pointer input -----

    fn after_pointer(&mut self, disposition: PointerDisposition) -> PointerDisposition {
        if let Some(fault) = self.input.take_fault() {
            self.raise_error(format!("Pointer input failed: {fault}"));
        }
        disposition
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) -> PointerDisposition {
        let disposition = self.input.pointer_move(&mut self.handle, x, y);
        self.after_pointer(disposition)
    }

    pub fn pointer_press(&mut self, x: f32, y: f32) -> PointerDisposition {
        let disposition = self.input.pointer_press(&mut self.handle, x, y);
        self.after_pointer(disposition)
    }

    pub fn pointer_release(&mut self, x: f32, y: f32) -> PointerDisposition {
        let disposition = self.input.pointer_release(&mut self.handle, x, y);
        self.after_pointer(disposition)
    }

    pub fn capture_lost(&mut self) -> PointerDisposition {
        let disposition = self.input.capture_lost(&mut self.handle);
        self.after_pointer(disposition)
    }

    /// Forward an event already in renderer space.
    pub fn pointer_event(&mut self, event: PointerEvent) -> PointerDisposition {
        let disposition = self.input.dispatch(&mut self.handle, event);
        self.after_pointer(disposition)
    }

    /// Forward an event in physical pixels, scaled by the surface's factor.
    pub fn physical_pointer_event(&mut self, event: PointerEvent) -> PointerDisposition {
        let event = self.mapper.map(event);
        self.pointer_event(event)
    }

    // ----- state machines -----

    pub fn set_active_state_machine(&mut self, index: usize) -> HostResult<()> {
        let result = self
            .session
            .controls_mut()
            .set_active_state_machine(&mut self.handle, index)
            .map(|sm| sm.name.clone());
        self.after_activation(result)
    }

    pub fn set_active_state_machine_by_name(&mut self, name: &str) -> HostResult<()> {
        let result = self
            .session
            .controls_mut()
            .set_active_state_machine_by_name(&mut self.handle, name)
            .map(|sm| sm.name.clone());
        self.after_activation(result)
    }

    fn after_activation(&mut self, result: Result<String, ControlError>) -> HostResult<()> {
        match result {
            Ok(name) => {
                self.emit(HostEvent::ActiveStateMachineChanged { name: Some(name) });
                Ok(())
            }
            Err(e) => self.fail(e),
        }
    }

    pub fn set_input(&mut self, name: &str, value: Value) -> HostResult<()> {
        let result = self
            .session
            .controls_mut()
            .set_input(&mut self.handle, name, value.clone());
        match result {
            Ok(()) => {
                self.emit(HostEvent::ControlChanged {
                    scope: ControlScope::Input,
                    name: name.to_string(),
                    value,
                    forwarded: true,
                });
                Ok(())
            }
            Err(e) => self.fail(e),
        }
    }

    pub fn set_boolean_input(&mut self, name: &str, value: bool) -> HostResult<()> {
        self.set_input(name, Value::Bool(value))
    }

    pub fn set_number_input(&mut self, name: &str, value: f32) -> HostResult<()> {
        self.set_input(name, Value::Number(value))
    }

    pub fn fire_input_trigger(&mut self, name: &str) -> HostResult<()> {
        self.set_input(name, Value::Trigger)
    }

    /// Apply a text edit to an input, parsed by the input's kind.
    pub fn set_input_text(&mut self, name: &str, text: &str) -> HostResult<()> {
        let kind = match self.session.controls().input(name) {
            Some(point) => point.kind,
            None => {
                return self.fail(ControlError::UnknownControlPoint {
                    scope: ControlScope::Input,
                    name: name.to_string(),
                })
            }
        };
        match coerce_text(kind, text) {
            Ok(value) => self.set_input(name, value),
            Err(e) => self.fail(ControlError::from(e)),
        }
    }

    // ----- view models -----

    pub fn select_view_model(&mut self, index: usize) -> HostResult<()> {
        match self.session.controls_mut().select_view_model(index) {
            Ok(_) => Ok(()),
            Err(e) => self.fail(e),
        }
    }

    pub fn select_view_model_by_name(&mut self, name: &str) -> HostResult<()> {
        match self.session.controls_mut().select_view_model_by_name(name) {
            Ok(_) => Ok(()),
            Err(e) => self.fail(e),
        }
    }

    pub fn create_instance(&mut self, view_model: &str) -> HostResult<InstanceRef> {
        let result = self
            .session
            .controls_mut()
            .create_instance(&mut self.handle, view_model)
            .map(|inst| inst.handle());
        match result {
            Ok(instance) => {
                self.emit(HostEvent::InstanceCreated {
                    id: instance.id.0,
                    view_model: view_model.to_string(),
                });
                Ok(instance)
            }
            Err(e) => self.fail(e),
        }
    }

    pub fn bind_instance(&mut self, instance: InstanceRef) -> HostResult<()> {
        let result = self
            .session
            .controls_mut()
            .bind_instance(&mut self.handle, instance);
        match result {
            Ok(outcome) => {
                self.emit(HostEvent::InstanceBound {
                    id: instance.id.0,
                    flushed: outcome.flushed,
                });
                if outcome.failed.is_empty() {
                    Ok(())
                } else {
                    self.fail(BindError::FlushRejected {
                        id: instance.id.0,
                        names: outcome.failed,
                    })
                }
            }
            Err(e) => self.fail(e),
        }
    }

    /// Create and bind an instance of the selected view model.
    pub fn instantiate_selected_view_model(&mut self) -> HostResult<InstanceRef> {
        let controls = self.session.controls();
        let name = match (controls.view_model_selection(), controls.selected_view_model()) {
            (ControlSelection::Active(_), Some(vm)) => vm.name.clone(),
            _ => return self.fail(NotFoundError::ViewModelIndex(0)),
        };
        let instance = self.create_instance(&name)?;
        self.bind_instance(instance)?;
        Ok(instance)
    }

    pub fn set_property(&mut self, name: &str, value: Value) -> HostResult<PropertyWrite> {
        let result = self
            .session
            .controls_mut()
            .set_property(&mut self.handle, name, value.clone());
        match result {
            Ok(PropertyWrite::Dropped) => Ok(PropertyWrite::Dropped),
            Ok(write) => {
                self.emit(HostEvent::ControlChanged {
                    scope: ControlScope::Property,
                    name: name.to_string(),
                    value,
                    forwarded: write == PropertyWrite::Applied,
                });
                Ok(write)
            }
            Err(e) => self.fail(e),
        }
    }

    pub fn set_string_property(&mut self, name: &str, value: &str) -> HostResult<PropertyWrite> {
        self.set_property(name, Value::Text(value.to_string()))
    }

    pub fn set_number_property(&mut self, name: &str, value: f32) -> HostResult<PropertyWrite> {
        self.set_property(name, Value::Number(value))
    }

    pub fn set_boolean_property(&mut self, name: &str, value: bool) -> HostResult<PropertyWrite> {
        self.set_property(name, Value::Bool(value))
    }

    pub fn set_color_property(&mut self, name: &str, argb: u32) -> HostResult<PropertyWrite> {
        self.set_property(name, Value::Color(argb))
    }

    pub fn set_enum_property(&mut self, name: &str, index: u32) -> HostResult<PropertyWrite> {
        self.set_property(name, Value::Enum(index))
    }

    pub fn fire_property_trigger(&mut self, name: &str) -> HostResult<PropertyWrite> {
        self.set_property(name, Value::Trigger)
    }

    /// Apply a text edit to a property, parsed by the property's kind.
    pub fn set_property_text(&mut self, name: &str, text: &str) -> HostResult<PropertyWrite> {
        let kind = match self.session.controls().property(name) {
            Some(point) => point.kind,
            None => {
                return self.fail(ControlError::UnknownControlPoint {
                    scope: ControlScope::Property,
                    name: name.to_string(),
                })
            }
        };
        match coerce_text(kind, text) {
            Ok(value) => self.set_property(name, value),
            Err(e) => self.fail(ControlError::from(e)),
        }
    }
}

impl<R: Renderer> Drop for HostController<R> {
    fn drop(&mut self) {
        // Faults are already logged by the handle.
        let _ = self.handle.dispose();
    }
}
