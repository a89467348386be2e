//! ControlSurface: host-side mirror of the loaded content's control points.
//!
//! A surface belongs to one content generation. The controller builds a new
//! surface on every content swap instead of clearing the old one, so a stale
//! control point can never be forwarded to new content.

pub mod control_set;
pub mod state_machine;
pub mod view_model;

pub use control_set::{ControlPoint, ControlSet};
pub use state_machine::StateMachine;
pub use view_model::{BindingState, InstanceRef, ViewModel, ViewModelInstance};

use log::{debug, info, warn};
use rivhost_api::{RenderResult, Renderer, Value};
use serde::Serialize;

use crate::error::{BindError, ControlError, ControlScope, NotFoundError};
use crate::ids::Generation;
use crate::renderer_handle::{guard, RendererHandle};

/// Which member of a discovered collection is selected. `NoControls` is the
/// explicit empty state for content exposing nothing.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum ControlSelection {
    NoControls,
    Active(usize),
}

impl ControlSelection {
    pub fn index(self) -> Option<usize> {
        match self {
            ControlSelection::NoControls => None,
            ControlSelection::Active(i) => Some(i),
        }
    }
}

/// What happened to a property write.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PropertyWrite {
    /// Forwarded to the renderer.
    Applied,
    /// Instance unbound: kept host-side until bind.
    Deferred,
    /// Trigger on an unbound instance: not retained.
    Dropped,
}

/// Result of binding an instance: pending edits forwarded and the names of
/// those the renderer refused. Refused edits are rolled back host-side.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BindOutcome {
    pub flushed: usize,
    pub failed: Vec<String>,
}

/// Default-first, else index 0, else nothing.
fn default_selection<T>(items: &[T], is_default: impl Fn(&T) -> bool) -> ControlSelection {
    match items.iter().position(is_default) {
        Some(i) => ControlSelection::Active(i),
        None if items.is_empty() => ControlSelection::NoControls,
        None => ControlSelection::Active(0),
    }
}

fn forward_property<R: Renderer>(renderer: &mut R, name: &str, value: &Value) -> RenderResult {
    match value {
        Value::Text(s) => renderer.set_string_property(name, s),
        Value::Number(n) => renderer.set_number_property(name, *n),
        Value::Bool(b) => renderer.set_boolean_property(name, *b),
        Value::Color(c) => renderer.set_color_property(name, *c),
        Value::Enum(i) => renderer.set_enum_property(name, *i),
        Value::Trigger => renderer.fire_view_model_trigger(name),
    }
}

#[derive(Debug)]
pub struct ControlSurface {
    generation: Generation,
    state_machines: Vec<StateMachine>,
    active: ControlSelection,
    view_models: Vec<ViewModel>,
    selected_view_model: ControlSelection,
    instance: Option<ViewModelInstance>,
}

impl ControlSurface {
    pub fn new(generation: Generation) -> Self {
        Self {
            generation,
            state_machines: Vec::new(),
            active: ControlSelection::NoControls,
            view_models: Vec::new(),
            selected_view_model: ControlSelection::NoControls,
            instance: None,
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn state_machines(&self) -> &[StateMachine] {
        &self.state_machines
    }

    pub fn active_selection(&self) -> ControlSelection {
        self.active
    }

    pub fn active_state_machine(&self) -> Option<&StateMachine> {
        self.active.index().and_then(|i| self.state_machines.get(i))
    }

    /// Inputs of the active state machine.
    pub fn inputs(&self) -> Option<&ControlSet> {
        self.active_state_machine().map(StateMachine::inputs)
    }

    pub fn view_models(&self) -> &[ViewModel] {
        &self.view_models
    }

    pub fn view_model_selection(&self) -> ControlSelection {
        self.selected_view_model
    }

    pub fn selected_view_model(&self) -> Option<&ViewModel> {
        self.selected_view_model
            .index()
            .and_then(|i| self.view_models.get(i))
    }

    pub fn instance(&self) -> Option<&ViewModelInstance> {
        self.instance.as_ref()
    }

    /// Nothing discovered at all.
    pub fn is_empty(&self) -> bool {
        self.state_machines.is_empty() && self.view_models.is_empty()
    }

    pub fn input(&self, name: &str) -> Option<&ControlPoint> {
        self.inputs()?.get(name)
    }

    pub fn property(&self, name: &str) -> Option<&ControlPoint> {
        self.instance.as_ref()?.properties.get(name)
    }

    /// Enumerate state machines and activate the default one.
    pub fn discover_state_machines<R: Renderer>(
        &mut self,
        handle: &mut RendererHandle<R>,
    ) -> Result<ControlSelection, ControlError> {
        let renderer = handle.content("discover state machines")?;
        let infos = guard(|| renderer.state_machines()).map_err(ControlError::Discovery)?;
        self.state_machines = infos.iter().map(StateMachine::from_info).collect();
        self.active = ControlSelection::NoControls;

        let mut selection = default_selection(&self.state_machines, |sm| sm.is_default);
        if !self.state_machines.iter().any(|sm| sm.is_default) {
            let preferred =
                guard(|| Ok(renderer.default_state_machine())).map_err(ControlError::Discovery)?;
            if let Some(preferred) = preferred {
                if preferred.index < self.state_machines.len() {
                    selection = ControlSelection::Active(preferred.index);
                }
            }
        }
        match selection {
            ControlSelection::NoControls => {
                info!("content exposes no state machines");
                Ok(ControlSelection::NoControls)
            }
            ControlSelection::Active(index) => {
                self.activate(handle, index)?;
                Ok(self.active)
            }
        }
    }

    pub fn set_active_state_machine<R: Renderer>(
        &mut self,
        handle: &mut RendererHandle<R>,
        index: usize,
    ) -> Result<&StateMachine, ControlError> {
        if index >= self.state_machines.len() {
            return Err(NotFoundError::StateMachineIndex(index).into());
        }
        self.activate(handle, index)?;
        Ok(&self.state_machines[index])
    }

    pub fn set_active_state_machine_by_name<R: Renderer>(
        &mut self,
        handle: &mut RendererHandle<R>,
        name: &str,
    ) -> Result<&StateMachine, ControlError> {
        let index = self
            .state_machines
            .iter()
            .position(|sm| sm.name == name)
            .ok_or_else(|| NotFoundError::StateMachine(name.to_string()))?;
        self.set_active_state_machine(handle, index)
    }

    fn activate<R: Renderer>(
        &mut self,
        handle: &mut RendererHandle<R>,
        index: usize,
    ) -> Result<(), ControlError> {
        let renderer = handle.content_mut("activate a state machine")?;
        guard(|| renderer.set_active_state_machine(index)).map_err(ControlError::Discovery)?;
        // The renderer has switched: from here on the previous inputs are stale.
        self.active = ControlSelection::NoControls;
        for sm in &mut self.state_machines {
            sm.inputs = ControlSet::new();
        }
        let infos = guard(|| renderer.state_machine_inputs()).map_err(|fault| {
            warn!("inputs of state machine {index} unavailable: {fault}");
            ControlError::Discovery(fault)
        })?;

        let machine = &mut self.state_machines[index];
        machine.inputs = state_machine::inputs_from_infos(&machine.name, infos);
        self.active = ControlSelection::Active(index);
        debug!(
            "state machine '{}' active with {} inputs",
            machine.name,
            machine.inputs.len()
        );
        Ok(())
    }

    /// Enumerate view models and select the default one.
    pub fn discover_view_models<R: Renderer>(
        &mut self,
        handle: &mut RendererHandle<R>,
    ) -> Result<ControlSelection, ControlError> {
        let renderer = handle.content("discover view models")?;
        let infos = guard(|| renderer.view_models()).map_err(ControlError::Discovery)?;
        self.view_models = infos.into_iter().map(ViewModel::from_info).collect();
        self.selected_view_model = default_selection(&self.view_models, |vm| vm.is_default);
        if self.selected_view_model == ControlSelection::NoControls {
            info!("content exposes no view models");
        }
        Ok(self.selected_view_model)
    }

    pub fn select_view_model(&mut self, index: usize) -> Result<&ViewModel, NotFoundError> {
        if index >= self.view_models.len() {
            return Err(NotFoundError::ViewModelIndex(index));
        }
        self.selected_view_model = ControlSelection::Active(index);
        Ok(&self.view_models[index])
    }

    pub fn select_view_model_by_name(&mut self, name: &str) -> Result<&ViewModel, NotFoundError> {
        let index = self
            .view_models
            .iter()
            .position(|vm| vm.name == name)
            .ok_or_else(|| NotFoundError::ViewModel(name.to_string()))?;
        self.select_view_model(index)
    }

    /// Create an instance of `view_model`, replacing any current instance.
    pub fn create_instance<R: Renderer>(
        &mut self,
        handle: &mut RendererHandle<R>,
        view_model: &str,
    ) -> Result<&ViewModelInstance, ControlError> {
        let index = self
            .view_models
            .iter()
            .position(|vm| vm.name == view_model)
            .ok_or_else(|| NotFoundError::ViewModel(view_model.to_string()))?;
        let renderer = handle.content_mut("create a view model instance")?;
        let info = guard(|| renderer.create_view_model_instance(view_model)).map_err(|fault| {
            ControlError::Rejected {
                name: view_model.to_string(),
                fault,
            }
        })?;
        self.selected_view_model = ControlSelection::Active(index);
        let instance = self
            .instance
            .insert(ViewModelInstance::from_info(info, self.generation));
        debug!(
            "created instance {} of '{view_model}' with {} properties",
            instance.id().0,
            instance.properties.len()
        );
        Ok(instance)
    }

    /// Bind the current instance, then forward edits made while it was
    /// unbound.
    pub fn bind_instance<R: Renderer>(
        &mut self,
        handle: &mut RendererHandle<R>,
        target: InstanceRef,
    ) -> Result<BindOutcome, BindError> {
        if target.generation != self.generation {
            return Err(BindError::StaleInstance(target.id.0));
        }
        let instance = match self.instance.as_mut() {
            Some(inst) if inst.id() == target.id => inst,
            _ => return Err(BindError::UnknownInstance(target.id.0)),
        };
        let renderer = handle.content_mut("bind a view model instance")?;
        guard(|| renderer.bind_view_model_instance(target.id)).map_err(BindError::Rejected)?;

        instance.binding = BindingState::Bound;

        let mut outcome = BindOutcome::default();
        for point in instance.properties.iter_mut().filter(|p| p.dirty) {
            let Some(value) = point.value.clone() else {
                point.commit();
                continue;
            };
            match guard(|| forward_property(&mut *renderer, &point.name, &value)) {
                Ok(()) => {
                    point.commit();
                    outcome.flushed += 1;
                }
                Err(fault) => {
                    warn!("flushing '{}' after bind failed: {fault}", point.name);
                    point.roll_back();
                    outcome.failed.push(point.name.clone());
                }
            }
        }
        info!(
            "instance {} bound, {} pending edits flushed, {} refused",
            target.id.0,
            outcome.flushed,
            outcome.failed.len()
        );
        Ok(outcome)
    }

    /// Set a state machine input. Triggers fire.
    pub fn set_input<R: Renderer>(
        &mut self,
        handle: &mut RendererHandle<R>,
        name: &str,
        value: Value,
    ) -> Result<(), ControlError> {
        let unknown = || ControlError::UnknownControlPoint {
            scope: ControlScope::Input,
            name: name.to_string(),
        };
        let machine = self
            .active
            .index()
            .and_then(|i| self.state_machines.get_mut(i))
            .ok_or_else(unknown)?;
        let point = machine.inputs.get_mut(name).ok_or_else(unknown)?;
        if value.kind() != point.kind {
            return Err(ControlError::KindMismatch {
                name: name.to_string(),
                expected: point.kind,
                actual: value.kind(),
            });
        }
        let renderer = handle.content_mut("set a state machine input")?;
        let result = match &value {
            Value::Bool(b) => guard(|| renderer.set_boolean_input(name, *b)),
            Value::Number(n) => guard(|| renderer.set_number_input(name, *n)),
            Value::Trigger => guard(|| renderer.fire_trigger(name)),
            other => {
                return Err(ControlError::UnsupportedKind {
                    scope: ControlScope::Input,
                    kind: other.kind(),
                })
            }
        };
        result.map_err(|fault| ControlError::Rejected {
            name: name.to_string(),
            fault,
        })?;
        if !value.is_trigger() {
            point.value = Some(value);
        }
        Ok(())
    }

    /// Set a property of the current instance. Writes to an unbound instance
    /// stay host-side.
    pub fn set_property<R: Renderer>(
        &mut self,
        handle: &mut RendererHandle<R>,
        name: &str,
        value: Value,
    ) -> Result<PropertyWrite, ControlError> {
        let unknown = || ControlError::UnknownControlPoint {
            scope: ControlScope::Property,
            name: name.to_string(),
        };
        let instance = self.instance.as_mut().ok_or_else(unknown)?;
        let bound = instance.is_bound();
        let point = instance.properties.get_mut(name).ok_or_else(unknown)?;
        if value.kind() != point.kind {
            return Err(ControlError::KindMismatch {
                name: name.to_string(),
                expected: point.kind,
                actual: value.kind(),
            });
        }

        if !bound {
            if value.is_trigger() {
                debug!("trigger '{name}' fired on an unbound instance, dropped");
                return Ok(PropertyWrite::Dropped);
            }
            point.defer(value);
            return Ok(PropertyWrite::Deferred);
        }

        let renderer = handle.content_mut("set a view model property")?;
        guard(|| forward_property(&mut *renderer, name, &value)).map_err(|fault| {
            ControlError::Rejected {
                name: name.to_string(),
                fault,
            }
        })?;
        if !value.is_trigger() {
            point.value = Some(value);
        }
        Ok(PropertyWrite::Applied)
    }
}
