//! HostSession: what the UI observes about the current content.

use crate::catalog::FileSource;
use crate::controls::{ControlSurface, StateMachine, ViewModelInstance};
use crate::ids::Generation;
use crate::renderer_handle::Lifecycle;

/// Current source, its control surface and the renderer lifecycle.
///
/// The control surface is replaced wholesale whenever the source changes.
#[derive(Debug)]
pub struct HostSession {
    source: Option<FileSource>,
    controls: ControlSurface,
    lifecycle: Lifecycle,
}

impl HostSession {
    /// Explicit "no content" session.
    pub(crate) fn empty(generation: Generation, lifecycle: Lifecycle) -> Self {
        Self {
            source: None,
            controls: ControlSurface::new(generation),
            lifecycle,
        }
    }

    /// Session for content that has just finished loading.
    pub(crate) fn loaded(source: FileSource, generation: Generation) -> Self {
        Self {
            source: Some(source),
            controls: ControlSurface::new(generation),
            lifecycle: Lifecycle::ContentLoaded,
        }
    }

    pub fn source(&self) -> Option<&FileSource> {
        self.source.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_none()
    }

    pub fn controls(&self) -> &ControlSurface {
        &self.controls
    }

    pub(crate) fn controls_mut(&mut self) -> &mut ControlSurface {
        &mut self.controls
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub(crate) fn set_lifecycle(&mut self, lifecycle: Lifecycle) {
        self.lifecycle = lifecycle;
    }

    pub fn generation(&self) -> Generation {
        self.controls.generation()
    }

    pub fn active_state_machine(&self) -> Option<&StateMachine> {
        self.controls.active_state_machine()
    }

    pub fn instance(&self) -> Option<&ViewModelInstance> {
        self.controls.instance()
    }
}
