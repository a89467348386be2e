//! Renderer boundary.
//!
//! The animation engine is an opaque, stateful collaborator. Hosts implement
//! [`Renderer`] over the native engine (or a scripted stand-in) and hand it to
//! the host bridge, which owns it exclusively and enforces lifecycle ordering.
//! Implementations may assume calls arrive in a valid order; they do not need
//! to re-check lifecycle state themselves.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{InputInfo, InstanceId, InstanceInfo, StateMachineInfo, ViewModelInfo};

/// Failure reported by a renderer call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RendererFault {
    /// The renderer declined the request (bad content, unknown name, ...).
    #[error("rejected: {0}")]
    Rejected(String),
    /// The renderer failed internally. The host treats this like a rejection
    /// but reports it separately.
    #[error("internal renderer failure: {0}")]
    Internal(String),
}

impl RendererFault {
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

pub type RenderResult<T = ()> = Result<T, RendererFault>;

/// Host-provided description of the drawable surface the renderer binds to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurfaceDescriptor {
    /// Opaque host identifier for the surface (compositor handle, window id, ...).
    pub id: u64,
    /// Physical pixels per renderer-space unit.
    pub scale_factor: f32,
}

impl SurfaceDescriptor {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            scale_factor: 1.0,
        }
    }
}

/// Drawable produced by a successful `initialize`; the host attaches it to its
/// own visual tree.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct VisualHandle(pub u64);

/// Capabilities the host bridge consumes from an animation renderer.
pub trait Renderer {
    // Lifecycle
    fn initialize(&mut self, surface: &SurfaceDescriptor, width: u32, height: u32)
        -> RenderResult;
    fn visual(&self) -> Option<VisualHandle>;
    fn load_from_package(&mut self, path: &str) -> RenderResult;
    fn load_from_path(&mut self, path: &Path) -> RenderResult;
    /// Drop any loaded content, returning to the initialized-but-empty state.
    fn unload(&mut self);
    fn set_size(&mut self, width: u32, height: u32);
    fn start_loop(&mut self);
    fn stop_loop(&mut self);
    fn dispose(&mut self);

    // Playback of the active state machine
    fn play_state_machine(&mut self);
    fn pause_state_machine(&mut self);
    fn reset_state_machine(&mut self);

    // Pointer input, renderer-space coordinates
    fn queue_pointer_move(&mut self, x: f32, y: f32);
    fn queue_pointer_press(&mut self, x: f32, y: f32);
    fn queue_pointer_release(&mut self, x: f32, y: f32);

    // State machines
    fn state_machines(&self) -> RenderResult<Vec<StateMachineInfo>>;
    fn default_state_machine(&self) -> Option<StateMachineInfo>;
    fn set_active_state_machine(&mut self, index: usize) -> RenderResult;
    /// Inputs of the currently active state machine.
    fn state_machine_inputs(&self) -> RenderResult<Vec<InputInfo>>;
    fn set_boolean_input(&mut self, name: &str, value: bool) -> RenderResult;
    fn set_number_input(&mut self, name: &str, value: f32) -> RenderResult;
    fn fire_trigger(&mut self, name: &str) -> RenderResult;

    // View models
    fn view_models(&self) -> RenderResult<Vec<ViewModelInfo>>;

    fn view_model_by_name(&self, name: &str) -> Option<ViewModelInfo> {
        self.view_models()
            .ok()?
            .into_iter()
            .find(|vm| vm.name == name)
    }

    fn view_model_at(&self, index: usize) -> Option<ViewModelInfo> {
        self.view_models().ok()?.into_iter().nth(index)
    }

    fn create_view_model_instance(&mut self, view_model: &str) -> RenderResult<InstanceInfo>;
    fn bind_view_model_instance(&mut self, instance: InstanceId) -> RenderResult;
    fn set_string_property(&mut self, name: &str, value: &str) -> RenderResult;
    fn set_number_property(&mut self, name: &str, value: f32) -> RenderResult;
    fn set_boolean_property(&mut self, name: &str, value: bool) -> RenderResult;
    fn set_color_property(&mut self, name: &str, argb: u32) -> RenderResult;
    fn set_enum_property(&mut self, name: &str, index: u32) -> RenderResult;
    fn fire_view_model_trigger(&mut self, name: &str) -> RenderResult;
}
