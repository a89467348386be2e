//! rivhost-api-core: typed control values and the renderer boundary (core, engine-agnostic)
//!
//! Everything the host bridge needs to talk to an opaque animation renderer lives
//! here: the [`Renderer`] trait, the descriptors it returns during discovery, and
//! the [`Value`] type carried by every control point.

pub mod coercion;
pub mod descriptor;
pub mod json;
pub mod renderer;
pub mod value;

pub use descriptor::{
    InputInfo, InstanceId, InstanceInfo, PropertyInfo, PropertyValueInfo, StateMachineInfo,
    ViewModelInfo,
};
pub use renderer::{RenderResult, Renderer, RendererFault, SurfaceDescriptor, VisualHandle};
pub use value::{Value, ValueKind};
