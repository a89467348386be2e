//! Error taxonomy for the host bridge.
//!
//! Every boundary call returns one of these; the controller folds them into
//! its error overlay. Nothing here panics across the host/UI boundary.

use std::path::PathBuf;

use rivhost_api::coercion::CoerceError;
use rivhost_api::{RendererFault, ValueKind};
use serde::Serialize;
use thiserror::Error;

use crate::catalog::format_file_size;
use crate::renderer_handle::Lifecycle;

/// A call arrived while the renderer was in a lifecycle state that forbids it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} is not valid while the renderer is {state}")]
pub struct InvalidState {
    pub operation: &'static str,
    pub state: Lifecycle,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InitError {
    #[error("surface size {width}x{height} is empty")]
    EmptySurface { width: u32, height: u32 },
    #[error("renderer initialization failed: {0}")]
    Renderer(RendererFault),
    #[error(transparent)]
    InvalidState(#[from] InvalidState),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    #[error("invalid content source '{path}': {reason}")]
    InvalidSource { path: String, reason: String },
    #[error("renderer rejected '{path}': {reason}")]
    Rejected { path: String, reason: String },
    #[error("renderer failed while loading '{path}': {reason}")]
    Fault { path: String, reason: String },
    #[error(transparent)]
    InvalidState(#[from] InvalidState),
}

impl LoadError {
    pub(crate) fn from_fault(path: &str, fault: RendererFault) -> Self {
        match fault {
            RendererFault::Rejected(reason) => LoadError::Rejected {
                path: path.to_string(),
                reason,
            },
            RendererFault::Internal(reason) => LoadError::Fault {
                path: path.to_string(),
                reason,
            },
        }
    }
}

/// A renderer call accepted by the handle failed inside the renderer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderCallError {
    #[error("renderer failed to {operation}: {fault}")]
    Fault {
        operation: &'static str,
        fault: RendererFault,
    },
    #[error(transparent)]
    InvalidState(#[from] InvalidState),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotFoundError {
    #[error("no state machine named '{0}'")]
    StateMachine(String),
    #[error("no state machine at index {0}")]
    StateMachineIndex(usize),
    #[error("no view model named '{0}'")]
    ViewModel(String),
    #[error("no view model at index {0}")]
    ViewModelIndex(usize),
    #[error("no view model instance has been created")]
    Instance,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindError {
    #[error("instance {0} is not the current view model instance")]
    UnknownInstance(u32),
    #[error("instance {0} belongs to previously loaded content")]
    StaleInstance(u32),
    #[error("renderer rejected binding: {0}")]
    Rejected(RendererFault),
    /// The instance is bound but these pending edits were refused.
    #[error("instance {id} bound, but the renderer refused pending edits to {}", names.join(", "))]
    FlushRejected { id: u32, names: Vec<String> },
    #[error(transparent)]
    InvalidState(#[from] InvalidState),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PickError {
    #[error("selection cancelled")]
    Cancelled,
    #[error("file picking is not supported here: {0}")]
    Unsupported(String),
    #[error("'{}' does not have the {extension} extension", path.display())]
    InvalidExtension { path: PathBuf, extension: String },
    #[error("'{}' is too small to be valid content ({})", path.display(), format_file_size(*size))]
    TooSmall { path: PathBuf, size: u64 },
    #[error(
        "'{}' is {}, above the {} limit",
        path.display(),
        format_file_size(*size),
        format_file_size(*limit)
    )]
    TooLarge { path: PathBuf, size: u64, limit: u64 },
    #[error("cannot read '{}': {reason}", path.display())]
    Io { path: PathBuf, reason: String },
}

/// Which discovered set a control point belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlScope {
    Input,
    Property,
}

impl std::fmt::Display for ControlScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControlScope::Input => f.write_str("state machine input"),
            ControlScope::Property => f.write_str("view model property"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControlError {
    #[error("unknown {scope} '{name}'")]
    UnknownControlPoint { scope: ControlScope, name: String },
    #[error("'{name}' is a {expected} control, got a {actual} value")]
    KindMismatch {
        name: String,
        expected: ValueKind,
        actual: ValueKind,
    },
    #[error("{scope}s cannot hold {kind} values")]
    UnsupportedKind { scope: ControlScope, kind: ValueKind },
    #[error("renderer rejected '{name}': {fault}")]
    Rejected { name: String, fault: RendererFault },
    #[error("discovery failed: {0}")]
    Discovery(RendererFault),
    #[error(transparent)]
    Coerce(#[from] CoerceError),
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
    #[error(transparent)]
    InvalidState(#[from] InvalidState),
}

/// Umbrella error returned by [`HostController`](crate::HostController).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HostError {
    #[error(transparent)]
    Init(#[from] InitError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
    #[error(transparent)]
    Bind(#[from] BindError),
    #[error(transparent)]
    Pick(#[from] PickError),
    #[error(transparent)]
    Control(#[from] ControlError),
    #[error(transparent)]
    Renderer(#[from] RenderCallError),
    #[error(transparent)]
    InvalidState(#[from] InvalidState),
    #[error("no content source is available")]
    NoSource,
}

pub type HostResult<T> = Result<T, HostError>;
