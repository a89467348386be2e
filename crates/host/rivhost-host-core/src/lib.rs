//! rivhost-host-core: the animation host bridge
//!
//! Sits between a UI surface and an opaque, stateful [`Renderer`](rivhost_api::Renderer).
//! The pieces, leaves first:
//!
//! - [`RendererHandle`]: lifecycle of one renderer bound to one surface.
//! - [`InputQueue`]: ordered pointer forwarding, dropped while no content is loaded.
//! - [`ControlSurface`]: mirror of state machine inputs and view model properties.
//! - [`FileSourceCatalog`]: bundled and external content sources.
//! - [`HostController`]: load/resize/teardown sequencing, errors and observers.
//!
//! All mutation is single-threaded; observers are called synchronously.

pub mod catalog;
pub mod config;
pub mod controls;
pub mod diagnostics;
pub mod error;
pub mod host;
pub mod ids;
pub mod input;
pub mod renderer_handle;
pub mod session;

pub use crate::catalog::{
    display_name_from_filename, format_file_size, CatalogItem, ExternalSelection, FileSource,
    FileSourceCatalog, PickedFile, RecentFiles, SourceKind,
};
pub use crate::config::{
    fallback_config, load_catalog_config, load_catalog_file, load_catalog_layers, CatalogConfig,
    CatalogEntry, ConfigError, ConfigLoad, ConfigOrigin, HostSettings, ValidationReport,
};
pub use crate::controls::{
    BindOutcome, BindingState, ControlPoint, ControlSelection, ControlSet, ControlSurface, InstanceRef,
    PropertyWrite, StateMachine, ViewModel, ViewModelInstance,
};
pub use crate::diagnostics::{DiagnosticsCfg, HostEvent, HostObserver, HostStatus, ObserverId};
pub use crate::error::{
    BindError, ControlError, ControlScope, HostError, HostResult, InitError, InvalidState,
    LoadError, NotFoundError, PickError, RenderCallError,
};
pub use crate::host::{HostController, HostState, LoadOutcome, STATUS_READY};
pub use crate::ids::{Generation, LoadTicket};
pub use crate::input::{InputQueue, PointerDisposition, PointerEvent, PointerMapper};
pub use crate::renderer_handle::{Lifecycle, RendererHandle};
pub use crate::session::HostSession;
