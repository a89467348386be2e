//! RendererHandle: exclusive owner of one renderer bound to one surface.
//!
//! The handle tracks the renderer's lifecycle and refuses calls that are not
//! valid in the current state, so renderer implementations never see an
//! out-of-order call.

use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;

use log::{debug, info, warn};
use rivhost_api::{RenderResult, Renderer, RendererFault, SurfaceDescriptor, VisualHandle};
use serde::{Deserialize, Serialize};

use crate::catalog::{FileSource, SourceKind};
use crate::error::{InitError, InvalidState, LoadError, RenderCallError};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    Uninitialized,
    Initialized,
    ContentLoaded,
    Disposed,
}

impl Lifecycle {
    /// `Initialized` or later, and not disposed.
    #[inline]
    pub fn is_initialized(self) -> bool {
        matches!(self, Lifecycle::Initialized | Lifecycle::ContentLoaded)
    }

    #[inline]
    pub fn has_content(self) -> bool {
        self == Lifecycle::ContentLoaded
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Lifecycle::Uninitialized => "uninitialized",
            Lifecycle::Initialized => "initialized",
            Lifecycle::ContentLoaded => "showing content",
            Lifecycle::Disposed => "disposed",
        };
        f.write_str(label)
    }
}

/// Run a renderer call, converting a panic inside the renderer into
/// [`RendererFault::Internal`].
pub(crate) fn guard<T>(call: impl FnOnce() -> RenderResult<T>) -> RenderResult<T> {
    match catch_unwind(AssertUnwindSafe(call)) {
        Ok(result) => result,
        Err(payload) => Err(RendererFault::Internal(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("renderer panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("renderer panicked: {s}")
    } else {
        "renderer panicked".to_string()
    }
}

#[derive(Debug)]
pub struct RendererHandle<R> {
    renderer: R,
    lifecycle: Lifecycle,
    surface_size: (u32, u32),
    visual: Option<VisualHandle>,
    looping: bool,
    content_path: Option<String>,
}

impl<R: Renderer> RendererHandle<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            lifecycle: Lifecycle::Uninitialized,
            surface_size: (0, 0),
            visual: None,
            looping: false,
            content_path: None,
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn surface_size(&self) -> (u32, u32) {
        self.surface_size
    }

    pub fn visual(&self) -> Option<VisualHandle> {
        self.visual
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Path of the content currently loaded, if any.
    pub fn content_path(&self) -> Option<&str> {
        self.content_path.as_deref()
    }

    /// Read-only access to the wrapped renderer.
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    fn require_initialized(&self, operation: &'static str) -> Result<(), InvalidState> {
        if self.lifecycle.is_initialized() {
            Ok(())
        } else {
            Err(InvalidState {
                operation,
                state: self.lifecycle,
            })
        }
    }

    /// Renderer access for calls that need loaded content.
    pub(crate) fn content(&self, operation: &'static str) -> Result<&R, InvalidState> {
        if self.lifecycle.has_content() {
            Ok(&self.renderer)
        } else {
            Err(InvalidState {
                operation,
                state: self.lifecycle,
            })
        }
    }

    pub(crate) fn content_mut(&mut self, operation: &'static str) -> Result<&mut R, InvalidState> {
        if self.lifecycle.has_content() {
            Ok(&mut self.renderer)
        } else {
            Err(InvalidState {
                operation,
                state: self.lifecycle,
            })
        }
    }

    /// Run a guarded call against loaded content.
    pub(crate) fn with_content<T>(
        &mut self,
        operation: &'static str,
        call: impl FnOnce(&mut R) -> RenderResult<T>,
    ) -> Result<T, RenderCallError> {
        let renderer = self.content_mut(operation)?;
        guard(|| call(renderer)).map_err(|fault| RenderCallError::Fault { operation, fault })
    }

    fn run(&mut self, operation: &'static str, call: impl FnOnce(&mut R)) -> Result<(), RenderCallError> {
        let renderer = &mut self.renderer;
        guard(|| {
            call(renderer);
            Ok(())
        })
        .map_err(|fault| {
            warn!("renderer failed to {operation}: {fault}");
            RenderCallError::Fault { operation, fault }
        })
    }

    /// Bind the renderer to a surface. On success returns the visual the host
    /// must attach to its own surface tree.
    pub fn initialize(
        &mut self,
        surface: &SurfaceDescriptor,
        width: u32,
        height: u32,
    ) -> Result<VisualHandle, InitError> {
        if self.lifecycle != Lifecycle::Uninitialized {
            return Err(InvalidState {
                operation: "initialize",
                state: self.lifecycle,
            }
            .into());
        }
        if width == 0 || height == 0 {
            return Err(InitError::EmptySurface { width, height });
        }
        let renderer = &mut self.renderer;
        guard(|| renderer.initialize(surface, width, height)).map_err(InitError::Renderer)?;
        let renderer = &self.renderer;
        let visual = guard(|| Ok(renderer.visual()))
            .map_err(InitError::Renderer)?
            .ok_or_else(|| {
                InitError::Renderer(RendererFault::internal(
                    "initialized renderer produced no visual",
                ))
            })?;
        self.visual = Some(visual);
        self.surface_size = (width, height);
        self.lifecycle = Lifecycle::Initialized;
        info!("renderer initialized at {width}x{height}");
        Ok(visual)
    }

    /// Load `source`, replacing whatever was loaded before. A failed load
    /// leaves the renderer with no content.
    pub fn load_content(&mut self, source: &FileSource) -> Result<(), LoadError> {
        self.require_initialized("load")?;
        if !source.is_valid() {
            return Err(LoadError::InvalidSource {
                path: source.path().to_string(),
                reason: "path is empty or has the wrong extension".to_string(),
            });
        }
        if let Err(e) = self.unload_content() {
            warn!("replacing content after a failed unload: {e}");
        }

        let renderer = &mut self.renderer;
        let path = source.path();
        let result = guard(|| match source.kind() {
            SourceKind::Bundled => renderer.load_from_package(path),
            SourceKind::External => renderer.load_from_path(Path::new(path)),
        });

        match result {
            Ok(()) => {
                self.lifecycle = Lifecycle::ContentLoaded;
                self.content_path = Some(path.to_string());
                debug!("content loaded from {path}");
                Ok(())
            }
            Err(fault) => {
                warn!("loading {path} failed: {fault}");
                let _ = self.run("unload after a failed load", |r| r.unload());
                Err(LoadError::from_fault(path, fault))
            }
        }
    }

    /// Drop loaded content. No-op when nothing is loaded. The content is
    /// considered gone even when the renderer faults while unloading.
    pub fn unload_content(&mut self) -> Result<(), RenderCallError> {
        if !self.lifecycle.has_content() {
            return Ok(());
        }
        self.lifecycle = Lifecycle::Initialized;
        self.content_path = None;
        self.run("unload content", |r| r.unload())
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderCallError> {
        self.require_initialized("resize")?;
        self.run("resize", |r| r.set_size(width, height))?;
        self.surface_size = (width, height);
        Ok(())
    }

    pub fn start_loop(&mut self) -> Result<(), RenderCallError> {
        self.require_initialized("start the render loop")?;
        if !self.looping {
            self.run("start the render loop", |r| r.start_loop())?;
            self.looping = true;
        }
        Ok(())
    }

    /// The loop counts as stopped even when the renderer faults.
    pub fn stop_loop(&mut self) -> Result<(), RenderCallError> {
        self.require_initialized("stop the render loop")?;
        if self.looping {
            self.looping = false;
            self.run("stop the render loop", |r| r.stop_loop())?;
        }
        Ok(())
    }

    /// Stop the loop, release the renderer and drop the visual. Safe to call
    /// any number of times; the handle is disposed afterwards even when the
    /// renderer faults, and the first fault is returned.
    pub fn dispose(&mut self) -> Result<(), RenderCallError> {
        if self.lifecycle == Lifecycle::Disposed {
            return Ok(());
        }
        let stopped = if self.looping {
            self.looping = false;
            self.run("stop the render loop", |r| r.stop_loop())
        } else {
            Ok(())
        };
        let released = self.run("dispose", |r| r.dispose());
        self.visual = None;
        self.content_path = None;
        self.lifecycle = Lifecycle::Disposed;
        info!("renderer disposed");
        stopped.and(released)
    }
}
