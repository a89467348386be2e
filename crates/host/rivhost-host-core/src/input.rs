//! Pointer forwarding.
//!
//! Events are forwarded to the renderer in arrival order, one call per event.
//! Nothing is buffered: while no content is loaded every event is dropped.

use log::{trace, warn};
use rivhost_api::{Renderer, RendererFault, SurfaceDescriptor};
use serde::{Deserialize, Serialize};

use crate::renderer_handle::{guard, RendererHandle};

/// A pointer event in renderer-space coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerEvent {
    Move { x: f32, y: f32 },
    Press { x: f32, y: f32 },
    Release { x: f32, y: f32 },
    /// The input source lost pointer capture without a release.
    CaptureLost,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PointerDisposition {
    Forwarded,
    Dropped,
    /// The renderer faulted while handling the event. See
    /// [`InputQueue::take_fault`].
    Faulted,
}

#[derive(Debug, Default)]
pub struct InputQueue {
    last: Option<(f32, f32)>,
    pressed: bool,
    forwarded: u64,
    dropped: u64,
    fault: Option<RendererFault>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last coordinate forwarded to the renderer.
    pub fn last_position(&self) -> Option<(f32, f32)> {
        self.last
    }

    /// A press has been forwarded without a matching release.
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn forwarded(&self) -> u64 {
        self.forwarded
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Fault raised by the most recent faulted event, if not yet taken.
    pub fn take_fault(&mut self) -> Option<RendererFault> {
        self.fault.take()
    }

    /// Forget pointer state. Called whenever content is swapped out.
    pub fn reset(&mut self) {
        self.last = None;
        self.pressed = false;
    }

    pub fn pointer_move<R: Renderer>(
        &mut self,
        handle: &mut RendererHandle<R>,
        x: f32,
        y: f32,
    ) -> PointerDisposition {
        self.forward(handle, x, y, |r| r.queue_pointer_move(x, y))
    }

    pub fn pointer_press<R: Renderer>(
        &mut self,
        handle: &mut RendererHandle<R>,
        x: f32,
        y: f32,
    ) -> PointerDisposition {
        let disposition = self.forward(handle, x, y, |r| r.queue_pointer_press(x, y));
        if disposition == PointerDisposition::Forwarded {
            self.pressed = true;
        }
        disposition
    }

    pub fn pointer_release<R: Renderer>(
        &mut self,
        handle: &mut RendererHandle<R>,
        x: f32,
        y: f32,
    ) -> PointerDisposition {
        let disposition = self.forward(handle, x, y, |r| r.queue_pointer_release(x, y));
        self.pressed = false;
        disposition
    }

    /// Synthesize a release at the last forwarded coordinate if a press is
    /// outstanding, so the renderer never stays in a button-down state.
    pub fn capture_lost<R: Renderer>(&mut self, handle: &mut RendererHandle<R>) -> PointerDisposition {
        match (self.pressed, self.last) {
            (true, Some((x, y))) => self.pointer_release(handle, x, y),
            _ => {
                self.pressed = false;
                PointerDisposition::Dropped
            }
        }
    }

    pub fn dispatch<R: Renderer>(
        &mut self,
        handle: &mut RendererHandle<R>,
        event: PointerEvent,
    ) -> PointerDisposition {
        match event {
            PointerEvent::Move { x, y } => self.pointer_move(handle, x, y),
            PointerEvent::Press { x, y } => self.pointer_press(handle, x, y),
            PointerEvent::Release { x, y } => self.pointer_release(handle, x, y),
            PointerEvent::CaptureLost => self.capture_lost(handle),
        }
    }

    fn forward<R: Renderer>(
        &mut self,
        handle: &mut RendererHandle<R>,
        x: f32,
        y: f32,
        call: impl FnOnce(&mut R),
    ) -> PointerDisposition {
        let Ok(renderer) = handle.content_mut("forward pointer input") else {
            self.dropped += 1;
            trace!("pointer dropped at ({x}, {y}): no content");
            return PointerDisposition::Dropped;
        };
        let result = guard(|| {
            call(renderer);
            Ok(())
        });
        match result {
            Ok(()) => {
                self.last = Some((x, y));
                self.forwarded += 1;
                trace!("pointer forwarded at ({x}, {y})");
                PointerDisposition::Forwarded
            }
            Err(fault) => {
                warn!("pointer event at ({x}, {y}) failed: {fault}");
                self.dropped += 1;
                self.fault = Some(fault);
                PointerDisposition::Faulted
            }
        }
    }
}

/// Converts physical pixel coordinates into renderer space.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointerMapper {
    pub scale_factor: f32,
}

impl Default for PointerMapper {
    fn default() -> Self {
        Self { scale_factor: 1.0 }
    }
}

impl PointerMapper {
    /// Non-finite or non-positive scales are treated as 1.
    pub fn new(scale_factor: f32) -> Self {
        let scale_factor = if scale_factor.is_finite() && scale_factor > 0.0 {
            scale_factor
        } else {
            1.0
        };
        Self { scale_factor }
    }

    pub fn for_surface(surface: &SurfaceDescriptor) -> Self {
        Self::new(surface.scale_factor)
    }

    #[inline]
    pub fn to_renderer(&self, x: f32, y: f32) -> (f32, f32) {
        (x / self.scale_factor, y / self.scale_factor)
    }

    pub fn map(&self, event: PointerEvent) -> PointerEvent {
        match event {
            PointerEvent::Move { x, y } => {
                let (x, y) = self.to_renderer(x, y);
                PointerEvent::Move { x, y }
            }
            PointerEvent::Press { x, y } => {
                let (x, y) = self.to_renderer(x, y);
                PointerEvent::Press { x, y }
            }
            PointerEvent::Release { x, y } => {
                let (x, y) = self.to_renderer(x, y);
                PointerEvent::Release { x, y }
            }
            PointerEvent::CaptureLost => PointerEvent::CaptureLost,
        }
    }
}
