//! Discovery descriptors returned by a [`Renderer`](crate::Renderer).
//!
//! These are plain records: the renderer reports what the loaded content exposes
//! and the host mirrors it. Nothing here is dynamically typed; every control
//! point carries an explicit [`ValueKind`].

use serde::{Deserialize, Serialize};

use crate::{Value, ValueKind};

/// Renderer-assigned identity of a created view-model instance.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct InstanceId(pub u32);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateMachineInfo {
    pub name: String,
    pub index: usize,
    #[serde(default)]
    pub is_default: bool,
}

/// One input of the currently active state machine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputInfo {
    pub name: String,
    pub kind: ValueKind,
    /// Current renderer-side value; `None` for triggers or when unknown.
    #[serde(default)]
    pub value: Option<Value>,
}

/// Declared property of a view-model definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertyInfo {
    pub name: String,
    pub kind: ValueKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewModelInfo {
    pub name: String,
    pub index: usize,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub properties: Vec<PropertyInfo>,
}

impl ViewModelInfo {
    /// Number of declared properties.
    #[inline]
    pub fn property_count(&self) -> usize {
        self.properties.len()
    }
}

/// Property of a freshly created instance, with its initial value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertyValueInfo {
    pub name: String,
    pub kind: ValueKind,
    #[serde(default)]
    pub value: Option<Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InstanceInfo {
    pub id: InstanceId,
    pub view_model: String,
    #[serde(default)]
    pub properties: Vec<PropertyValueInfo>,
}
