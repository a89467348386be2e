use log::warn;
use rivhost_api::{InputInfo, StateMachineInfo};
use serde::Serialize;

use super::control_set::{ControlPoint, ControlSet};

/// A state machine exposed by loaded content. Only the active machine has
/// its inputs populated.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StateMachine {
    pub name: String,
    pub index: usize,
    pub is_default: bool,
    #[serde(skip)]
    pub(crate) inputs: ControlSet,
}

impl StateMachine {
    pub fn from_info(info: &StateMachineInfo) -> Self {
        Self {
            name: info.name.clone(),
            index: info.index,
            is_default: info.is_default,
            inputs: ControlSet::new(),
        }
    }

    pub fn inputs(&self) -> &ControlSet {
        &self.inputs
    }
}

/// Mirror the renderer's input list. Inputs of kinds a state machine cannot
/// hold are skipped.
pub(crate) fn inputs_from_infos(machine: &str, infos: Vec<InputInfo>) -> ControlSet {
    infos
        .into_iter()
        .enumerate()
        .filter_map(|(index, info)| {
            if !info.kind.is_input_kind() {
                warn!(
                    "state machine '{machine}': input '{}' has unsupported kind {}, skipped",
                    info.name, info.kind
                );
                return None;
            }
            Some(ControlPoint::new(info.name, index, info.kind, info.value))
        })
        .collect()
}
