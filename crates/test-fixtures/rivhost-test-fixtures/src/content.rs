//! Serializable description of what a piece of content exposes to discovery.

use anyhow::{bail, Context, Result};
use rivhost_api::json::{parse_value, value_to_shorthand_json};
use rivhost_api::{
    InputInfo, PropertyInfo, PropertyValueInfo, StateMachineInfo, Value, ValueKind, ViewModelInfo,
};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A content fixture file: the path it is loadable from plus its description.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContentFixture {
    pub path: String,
    #[serde(flatten)]
    pub spec: ContentSpec,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ContentSpec {
    #[serde(default)]
    pub state_machines: Vec<StateMachineSpec>,
    #[serde(default)]
    pub view_models: Vec<ViewModelSpec>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StateMachineSpec {
    pub name: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub inputs: Vec<InputSpec>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InputSpec {
    pub name: String,
    pub kind: ValueKind,
    /// Shorthand value JSON, see `rivhost_api::json`.
    #[serde(default)]
    pub value: Option<JsonValue>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ViewModelSpec {
    pub name: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub properties: Vec<PropertySpec>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PropertySpec {
    pub name: String,
    pub kind: ValueKind,
    #[serde(default)]
    pub value: Option<JsonValue>,
}

fn resolve_value(name: &str, kind: ValueKind, raw: Option<&JsonValue>) -> Result<Option<Value>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let value = parse_value(raw.clone()).with_context(|| format!("value of '{name}'"))?;
    if value.kind() != kind {
        bail!("'{name}' declares {kind} but its value is {}", value.kind());
    }
    Ok(Some(value))
}

impl ContentSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state_machine(mut self, sm: StateMachineSpec) -> Self {
        self.state_machines.push(sm);
        self
    }

    pub fn with_view_model(mut self, vm: ViewModelSpec) -> Self {
        self.view_models.push(vm);
        self
    }

    /// Check every declared value parses and matches its kind.
    pub fn validate(&self) -> Result<()> {
        for (i, _) in self.state_machines.iter().enumerate() {
            self.inputs_of(i)?;
        }
        for vm in &self.view_models {
            self.instance_properties(&vm.name)?;
        }
        Ok(())
    }

    pub fn state_machine_infos(&self) -> Vec<StateMachineInfo> {
        self.state_machines
            .iter()
            .enumerate()
            .map(|(index, sm)| StateMachineInfo {
                name: sm.name.clone(),
                index,
                is_default: sm.is_default,
            })
            .collect()
    }

    pub fn inputs_of(&self, index: usize) -> Result<Vec<InputInfo>> {
        let Some(sm) = self.state_machines.get(index) else {
            bail!("no state machine at index {index}");
        };
        sm.inputs
            .iter()
            .map(|input| {
                Ok(InputInfo {
                    name: input.name.clone(),
                    kind: input.kind,
                    value: resolve_value(&input.name, input.kind, input.value.as_ref())?,
                })
            })
            .collect()
    }

    pub fn view_model_infos(&self) -> Vec<ViewModelInfo> {
        self.view_models
            .iter()
            .enumerate()
            .map(|(index, vm)| ViewModelInfo {
                name: vm.name.clone(),
                index,
                is_default: vm.is_default,
                properties: vm
                    .properties
                    .iter()
                    .map(|p| PropertyInfo {
                        name: p.name.clone(),
                        kind: p.kind,
                    })
                    .collect(),
            })
            .collect()
    }

    pub fn instance_properties(&self, view_model: &str) -> Result<Vec<PropertyValueInfo>> {
        let Some(vm) = self.view_models.iter().find(|vm| vm.name == view_model) else {
            bail!("no view model named '{view_model}'");
        };
        vm.properties
            .iter()
            .map(|p| {
                Ok(PropertyValueInfo {
                    name: p.name.clone(),
                    kind: p.kind,
                    value: resolve_value(&p.name, p.kind, p.value.as_ref())?,
                })
            })
            .collect()
    }
}

impl StateMachineSpec {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            is_default: false,
            inputs: Vec::new(),
        }
    }

    pub fn default_flag(mut self) -> Self {
        self.is_default = true;
        self
    }

    pub fn input(mut self, name: &str, value: Value) -> Self {
        self.inputs.push(InputSpec {
            name: name.to_string(),
            kind: value.kind(),
            value: (!value.is_trigger()).then(|| value_to_shorthand_json(&value)),
        });
        self
    }
}

impl ViewModelSpec {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            is_default: false,
            properties: Vec::new(),
        }
    }

    pub fn default_flag(mut self) -> Self {
        self.is_default = true;
        self
    }

    pub fn property(mut self, name: &str, value: Value) -> Self {
        self.properties.push(PropertySpec {
            name: name.to_string(),
            kind: value.kind(),
            value: (!value.is_trigger()).then(|| value_to_shorthand_json(&value)),
        });
        self
    }
}
