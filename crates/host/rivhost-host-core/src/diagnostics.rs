//! Host events, observers and the UI-facing status snapshot.
//!
//! Events are delivered synchronously, on the thread performing the mutation,
//! in the order the mutations happen.

use std::collections::VecDeque;

use log::debug;
use rivhost_api::Value;
use serde::{Deserialize, Serialize};

use crate::controls::ControlSelection;
use crate::error::ControlScope;
use crate::host::HostState;
use crate::ids::Generation;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
#[non_exhaustive]
pub enum HostEvent {
    StateChanged {
        from: HostState,
        to: HostState,
    },
    StatusChanged {
        text: String,
    },
    BusyChanged {
        busy: bool,
    },
    ErrorRaised {
        message: String,
    },
    ErrorCleared,
    /// Every control point of the previous content is gone.
    SessionReset {
        generation: Generation,
    },
    ContentLoaded {
        path: String,
        display_name: String,
    },
    StateMachinesDiscovered {
        names: Vec<String>,
        selection: ControlSelection,
    },
    ActiveStateMachineChanged {
        name: Option<String>,
    },
    ViewModelsDiscovered {
        names: Vec<String>,
        selection: ControlSelection,
    },
    InstanceCreated {
        id: u32,
        view_model: String,
    },
    InstanceBound {
        id: u32,
        flushed: usize,
    },
    ControlChanged {
        scope: ControlScope,
        name: String,
        value: Value,
        /// False when the write stayed host-side.
        forwarded: bool,
    },
    Disposed,
}

pub trait HostObserver {
    fn on_event(&mut self, event: &HostEvent);
}

impl<F: FnMut(&HostEvent)> HostObserver for F {
    fn on_event(&mut self, event: &HostEvent) {
        self(event)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Diagnostics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsCfg {
    /// Log every event at debug level.
    pub log_events: bool,
    /// Number of recent events retained for inspection. Zero disables.
    pub history: usize,
}

impl Default for DiagnosticsCfg {
    fn default() -> Self {
        DiagnosticsCfg {
            log_events: true,
            history: 64,
        }
    }
}

pub(crate) struct Observers {
    cfg: DiagnosticsCfg,
    next_id: u64,
    entries: Vec<(ObserverId, Box<dyn HostObserver>)>,
    history: VecDeque<HostEvent>,
}

impl Observers {
    pub(crate) fn new(cfg: DiagnosticsCfg) -> Self {
        Self {
            cfg,
            next_id: 0,
            entries: Vec::new(),
            history: VecDeque::new(),
        }
    }

    pub(crate) fn set_cfg(&mut self, cfg: DiagnosticsCfg) {
        while self.history.len() > cfg.history {
            self.history.pop_front();
        }
        self.cfg = cfg;
    }

    pub(crate) fn subscribe(&mut self, observer: Box<dyn HostObserver>) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, observer));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(existing, _)| *existing != id);
        self.entries.len() != before
    }

    pub(crate) fn emit(&mut self, event: HostEvent) {
        if self.cfg.log_events {
            debug!("host event: {event:?}");
        }
        for (_, observer) in &mut self.entries {
            observer.on_event(&event);
        }
        if self.cfg.history > 0 {
            if self.history.len() == self.cfg.history {
                self.history.pop_front();
            }
            self.history.push_back(event);
        }
    }

    pub(crate) fn history(&self) -> impl Iterator<Item = &HostEvent> {
        self.history.iter()
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("cfg", &self.cfg)
            .field("observers", &self.entries.len())
            .field("history", &self.history.len())
            .finish()
    }
}

/// Snapshot of everything a status bar shows.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HostStatus {
    pub state: HostState,
    pub status_text: String,
    pub busy: bool,
    pub error: Option<String>,
    /// True when controls should be editable.
    pub controls_enabled: bool,
}
