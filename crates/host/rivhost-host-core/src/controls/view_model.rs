use rivhost_api::{InstanceId, InstanceInfo, PropertyInfo, ViewModelInfo};
use serde::Serialize;

use super::control_set::{ControlPoint, ControlSet};
use crate::ids::Generation;

/// A view model definition discovered on loaded content.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ViewModel {
    pub name: String,
    pub index: usize,
    pub is_default: bool,
    pub properties: Vec<PropertyInfo>,
}

impl ViewModel {
    pub fn from_info(info: ViewModelInfo) -> Self {
        Self {
            name: info.name,
            index: info.index,
            is_default: info.is_default,
            properties: info.properties,
        }
    }

    pub fn property_count(&self) -> usize {
        self.properties.len()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum BindingState {
    Created,
    Bound,
}

/// Reference to an instance, tagged with the content generation it was
/// created under.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct InstanceRef {
    pub id: InstanceId,
    pub generation: Generation,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ViewModelInstance {
    id: InstanceId,
    view_model: String,
    generation: Generation,
    pub(crate) binding: BindingState,
    pub(crate) properties: ControlSet,
}

impl ViewModelInstance {
    pub(crate) fn from_info(info: InstanceInfo, generation: Generation) -> Self {
        let properties = info
            .properties
            .into_iter()
            .enumerate()
            .map(|(index, p)| ControlPoint::new(p.name, index, p.kind, p.value))
            .collect();
        Self {
            id: info.id,
            view_model: info.view_model,
            generation,
            binding: BindingState::Created,
            properties,
        }
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn handle(&self) -> InstanceRef {
        InstanceRef {
            id: self.id,
            generation: self.generation,
        }
    }

    pub fn view_model(&self) -> &str {
        &self.view_model
    }

    pub fn binding(&self) -> BindingState {
        self.binding
    }

    pub fn is_bound(&self) -> bool {
        self.binding == BindingState::Bound
    }

    pub fn properties(&self) -> &ControlSet {
        &self.properties
    }

    /// Properties edited while unbound and awaiting a flush.
    pub fn pending(&self) -> usize {
        self.properties.iter().filter(|p| p.dirty).count()
    }
}
