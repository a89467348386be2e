//! ScriptedRenderer: an in-memory [`Renderer`] driven by content fixtures.
//!
//! Every mutating call is appended to a call log so tests can assert exactly
//! what reached the renderer and in which order. Failures (rejected loads,
//! panics, rejected binds) are scripted up front.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::Result;
use rivhost_api::{
    InputInfo, InstanceId, InstanceInfo, PropertyValueInfo, RenderResult, Renderer, RendererFault,
    StateMachineInfo, SurfaceDescriptor, Value, ValueKind, ViewModelInfo, VisualHandle,
};

use crate::content::ContentSpec;

/// One recorded mutating call.
#[derive(Clone, Debug, PartialEq)]
pub enum RendererCall {
    Initialize { width: u32, height: u32 },
    LoadPackage(String),
    LoadPath(PathBuf),
    Unload,
    SetSize { width: u32, height: u32 },
    StartLoop,
    StopLoop,
    Dispose,
    Play,
    Pause,
    Reset,
    PointerMove { x: f32, y: f32 },
    PointerPress { x: f32, y: f32 },
    PointerRelease { x: f32, y: f32 },
    SetActiveStateMachine(usize),
    SetInput { name: String, value: Value },
    FireTrigger(String),
    CreateInstance(String),
    BindInstance(InstanceId),
    SetProperty { name: String, value: Value },
    FireViewModelTrigger(String),
}

impl RendererCall {
    pub fn is_pointer(&self) -> bool {
        matches!(
            self,
            RendererCall::PointerMove { .. }
                | RendererCall::PointerPress { .. }
                | RendererCall::PointerRelease { .. }
        )
    }

    pub fn is_property_write(&self) -> bool {
        matches!(
            self,
            RendererCall::SetProperty { .. } | RendererCall::FireViewModelTrigger(_)
        )
    }
}

#[derive(Debug)]
struct Loaded {
    spec: ContentSpec,
    active: Option<usize>,
    inputs: Vec<InputInfo>,
    instances: HashMap<InstanceId, Vec<PropertyValueInfo>>,
    bound: Option<InstanceId>,
}

#[derive(Debug, Default)]
pub struct ScriptedRenderer {
    library: HashMap<String, ContentSpec>,
    init_failure: Option<String>,
    load_failures: HashMap<String, String>,
    load_panics: HashSet<String>,
    panics: HashSet<String>,
    bind_failure: Option<String>,
    input_failures: HashMap<usize, String>,
    rejected_inputs: HashSet<String>,
    rejected_properties: HashSet<String>,

    visual: Option<VisualHandle>,
    size: (u32, u32),
    loaded: Option<Loaded>,
    looping: bool,
    playing: bool,
    disposed: bool,
    next_instance: u32,
    calls: Vec<RendererCall>,
}

impl ScriptedRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renderer knowing every content fixture listed in the manifest.
    pub fn from_fixtures() -> Result<Self> {
        let mut renderer = Self::new();
        for fixture in crate::contents::all()? {
            renderer.library.insert(fixture.path, fixture.spec);
        }
        Ok(renderer)
    }

    pub fn with_content(mut self, path: &str, spec: ContentSpec) -> Self {
        self.library.insert(path.to_string(), spec);
        self
    }

    pub fn fail_initialize(mut self, reason: &str) -> Self {
        self.init_failure = Some(reason.to_string());
        self
    }

    pub fn fail_load(mut self, path: &str, reason: &str) -> Self {
        self.load_failures
            .insert(path.to_string(), reason.to_string());
        self
    }

    pub fn panic_on_load(mut self, path: &str) -> Self {
        self.load_panics.insert(path.to_string());
        self
    }

    /// Panic whenever the [`Renderer`] method named `call` runs, for example
    /// `"pause_state_machine"`.
    pub fn panic_on(mut self, call: &str) -> Self {
        self.panics.insert(call.to_string());
        self
    }

    pub fn reject_bind(mut self, reason: &str) -> Self {
        self.bind_failure = Some(reason.to_string());
        self
    }

    pub fn reject_input(mut self, name: &str) -> Self {
        self.rejected_inputs.insert(name.to_string());
        self
    }

    /// `state_machine_inputs` fails with `reason` while state machine
    /// `index` is active.
    pub fn fail_inputs_of(mut self, index: usize, reason: &str) -> Self {
        self.input_failures.insert(index, reason.to_string());
        self
    }

    pub fn reject_property(mut self, name: &str) -> Self {
        self.rejected_properties.insert(name.to_string());
        self
    }

    fn crash_if_scripted(&self, call: &str) {
        if self.panics.contains(call) {
            panic!("scripted renderer crashed in {call}");
        }
    }

    pub fn calls(&self) -> &[RendererCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn count(&self, pred: impl Fn(&RendererCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    pub fn pointer_calls(&self) -> Vec<RendererCall> {
        self.calls.iter().filter(|c| c.is_pointer()).cloned().collect()
    }

    pub fn load_calls(&self) -> usize {
        self.count(|c| matches!(c, RendererCall::LoadPackage(_) | RendererCall::LoadPath(_)))
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn has_content(&self) -> bool {
        self.loaded.is_some()
    }

    /// Renderer-side value of an input of the active state machine.
    pub fn input_value(&self, name: &str) -> Option<Value> {
        self.loaded
            .as_ref()?
            .inputs
            .iter()
            .find(|i| i.name == name)?
            .value
            .clone()
    }

    /// Renderer-side value of a property of the bound instance.
    pub fn bound_property(&self, name: &str) -> Option<Value> {
        let loaded = self.loaded.as_ref()?;
        let id = loaded.bound?;
        loaded
            .instances
            .get(&id)?
            .iter()
            .find(|p| p.name == name)?
            .value
            .clone()
    }

    fn load(&mut self, key: &str) -> RenderResult {
        self.loaded = None;
        if self.load_panics.contains(key) {
            panic!("scripted renderer crashed while loading {key}");
        }
        if let Some(reason) = self.load_failures.get(key) {
            return Err(RendererFault::rejected(reason.clone()));
        }
        let spec = self
            .library
            .get(key)
            .cloned()
            .ok_or_else(|| RendererFault::rejected(format!("no content at {key}")))?;
        self.loaded = Some(Loaded {
            spec,
            active: None,
            inputs: Vec::new(),
            instances: HashMap::new(),
            bound: None,
        });
        Ok(())
    }

    fn loaded(&self) -> RenderResult<&Loaded> {
        self.loaded
            .as_ref()
            .ok_or_else(|| RendererFault::rejected("no content loaded"))
    }

    fn loaded_mut(&mut self) -> RenderResult<&mut Loaded> {
        self.loaded
            .as_mut()
            .ok_or_else(|| RendererFault::rejected("no content loaded"))
    }

    fn write_input(&mut self, name: &str, kind: ValueKind, value: Option<Value>) -> RenderResult {
        if self.rejected_inputs.contains(name) {
            return Err(RendererFault::rejected(format!("input '{name}' refused")));
        }
        let loaded = self.loaded_mut()?;
        let input = loaded
            .inputs
            .iter_mut()
            .find(|i| i.name == name && i.kind == kind)
            .ok_or_else(|| RendererFault::rejected(format!("no {kind} input '{name}'")))?;
        if value.is_some() {
            input.value = value;
        }
        Ok(())
    }

    fn write_property(&mut self, name: &str, value: Value) -> RenderResult {
        if self.rejected_properties.contains(name) {
            return Err(RendererFault::rejected(format!("property '{name}' refused")));
        }
        let kind = value.kind();
        let loaded = self.loaded_mut()?;
        let id = loaded
            .bound
            .ok_or_else(|| RendererFault::rejected("no bound view model instance"))?;
        let props = loaded
            .instances
            .get_mut(&id)
            .ok_or_else(|| RendererFault::internal("bound instance vanished"))?;
        let prop = props
            .iter_mut()
            .find(|p| p.name == name && p.kind == kind)
            .ok_or_else(|| RendererFault::rejected(format!("no {kind} property '{name}'")))?;
        if !value.is_trigger() {
            prop.value = Some(value);
        }
        Ok(())
    }
}

impl Renderer for ScriptedRenderer {
    fn initialize(
        &mut self,
        surface: &SurfaceDescriptor,
        width: u32,
        height: u32,
    ) -> RenderResult {
        self.crash_if_scripted("initialize");
        self.calls.push(RendererCall::Initialize { width, height });
        if let Some(reason) = &self.init_failure {
            return Err(RendererFault::rejected(reason.clone()));
        }
        self.size = (width, height);
        self.visual = Some(VisualHandle(surface.id));
        Ok(())
    }

    fn visual(&self) -> Option<VisualHandle> {
        self.crash_if_scripted("visual");
        self.visual
    }

    fn load_from_package(&mut self, path: &str) -> RenderResult {
        self.crash_if_scripted("load_from_package");
        self.calls.push(RendererCall::LoadPackage(path.to_string()));
        self.load(path)
    }

    fn load_from_path(&mut self, path: &Path) -> RenderResult {
        self.crash_if_scripted("load_from_path");
        self.calls.push(RendererCall::LoadPath(path.to_path_buf()));
        self.load(&path.to_string_lossy())
    }

    fn unload(&mut self) {
        self.crash_if_scripted("unload");
        self.calls.push(RendererCall::Unload);
        self.loaded = None;
        self.playing = false;
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.crash_if_scripted("set_size");
        self.calls.push(RendererCall::SetSize { width, height });
        self.size = (width, height);
    }

    fn start_loop(&mut self) {
        self.crash_if_scripted("start_loop");
        self.calls.push(RendererCall::StartLoop);
        self.looping = true;
    }

    fn stop_loop(&mut self) {
        self.crash_if_scripted("stop_loop");
        self.calls.push(RendererCall::StopLoop);
        self.looping = false;
    }

    fn dispose(&mut self) {
        self.crash_if_scripted("dispose");
        self.calls.push(RendererCall::Dispose);
        self.disposed = true;
        self.loaded = None;
        self.visual = None;
        self.looping = false;
    }

    fn play_state_machine(&mut self) {
        self.crash_if_scripted("play_state_machine");
        self.calls.push(RendererCall::Play);
        self.playing = true;
    }

    fn pause_state_machine(&mut self) {
        self.crash_if_scripted("pause_state_machine");
        self.calls.push(RendererCall::Pause);
        self.playing = false;
    }

    fn reset_state_machine(&mut self) {
        self.crash_if_scripted("reset_state_machine");
        self.calls.push(RendererCall::Reset);
        self.playing = false;
    }

    fn queue_pointer_move(&mut self, x: f32, y: f32) {
        self.crash_if_scripted("queue_pointer_move");
        self.calls.push(RendererCall::PointerMove { x, y });
    }

    fn queue_pointer_press(&mut self, x: f32, y: f32) {
        self.crash_if_scripted("queue_pointer_press");
        self.calls.push(RendererCall::PointerPress { x, y });
    }

    fn queue_pointer_release(&mut self, x: f32, y: f32) {
        self.crash_if_scripted("queue_pointer_release");
        self.calls.push(RendererCall::PointerRelease { x, y });
    }

    fn state_machines(&self) -> RenderResult<Vec<StateMachineInfo>> {
        self.crash_if_scripted("state_machines");
        Ok(self.loaded()?.spec.state_machine_infos())
    }

    fn default_state_machine(&self) -> Option<StateMachineInfo> {
        self.crash_if_scripted("default_state_machine");
        let infos = self.loaded.as_ref()?.spec.state_machine_infos();
        infos
            .iter()
            .find(|sm| sm.is_default)
            .or_else(|| infos.first())
            .cloned()
    }

    fn set_active_state_machine(&mut self, index: usize) -> RenderResult {
        self.crash_if_scripted("set_active_state_machine");
        self.calls.push(RendererCall::SetActiveStateMachine(index));
        let loaded = self.loaded_mut()?;
        let inputs = loaded
            .spec
            .inputs_of(index)
            .map_err(|e| RendererFault::rejected(e.to_string()))?;
        loaded.active = Some(index);
        loaded.inputs = inputs;
        Ok(())
    }

    fn state_machine_inputs(&self) -> RenderResult<Vec<InputInfo>> {
        self.crash_if_scripted("state_machine_inputs");
        let loaded = self.loaded()?;
        let Some(active) = loaded.active else {
            return Err(RendererFault::rejected("no active state machine"));
        };
        if let Some(reason) = self.input_failures.get(&active) {
            return Err(RendererFault::rejected(reason.clone()));
        }
        Ok(loaded.inputs.clone())
    }

    fn set_boolean_input(&mut self, name: &str, value: bool) -> RenderResult {
        self.crash_if_scripted("set_boolean_input");
        self.calls.push(RendererCall::SetInput {
            name: name.to_string(),
            value: Value::Bool(value),
        });
        self.write_input(name, ValueKind::Bool, Some(Value::Bool(value)))
    }

    fn set_number_input(&mut self, name: &str, value: f32) -> RenderResult {
        self.crash_if_scripted("set_number_input");
        self.calls.push(RendererCall::SetInput {
            name: name.to_string(),
            value: Value::Number(value),
        });
        self.write_input(name, ValueKind::Number, Some(Value::Number(value)))
    }

    fn fire_trigger(&mut self, name: &str) -> RenderResult {
        self.crash_if_scripted("fire_trigger");
        self.calls.push(RendererCall::FireTrigger(name.to_string()));
        self.write_input(name, ValueKind::Trigger, None)
    }

    fn view_models(&self) -> RenderResult<Vec<ViewModelInfo>> {
        self.crash_if_scripted("view_models");
        Ok(self.loaded()?.spec.view_model_infos())
    }

    fn create_view_model_instance(&mut self, view_model: &str) -> RenderResult<InstanceInfo> {
        self.crash_if_scripted("create_view_model_instance");
        self.calls
            .push(RendererCall::CreateInstance(view_model.to_string()));
        let id = InstanceId(self.next_instance);
        let loaded = self.loaded_mut()?;
        let properties = loaded
            .spec
            .instance_properties(view_model)
            .map_err(|e| RendererFault::rejected(e.to_string()))?;
        loaded.instances.insert(id, properties.clone());
        self.next_instance = self.next_instance.wrapping_add(1);
        Ok(InstanceInfo {
            id,
            view_model: view_model.to_string(),
            properties,
        })
    }

    fn bind_view_model_instance(&mut self, instance: InstanceId) -> RenderResult {
        self.crash_if_scripted("bind_view_model_instance");
        self.calls.push(RendererCall::BindInstance(instance));
        if let Some(reason) = &self.bind_failure {
            return Err(RendererFault::rejected(reason.clone()));
        }
        let loaded = self.loaded_mut()?;
        if !loaded.instances.contains_key(&instance) {
            return Err(RendererFault::rejected(format!(
                "unknown instance {}",
                instance.0
            )));
        }
        loaded.bound = Some(instance);
        Ok(())
    }

    fn set_string_property(&mut self, name: &str, value: &str) -> RenderResult {
        self.crash_if_scripted("set_string_property");
        let value = Value::Text(value.to_string());
        self.calls.push(RendererCall::SetProperty {
            name: name.to_string(),
            value: value.clone(),
        });
        self.write_property(name, value)
    }

    fn set_number_property(&mut self, name: &str, value: f32) -> RenderResult {
        self.crash_if_scripted("set_number_property");
        self.calls.push(RendererCall::SetProperty {
            name: name.to_string(),
            value: Value::Number(value),
        });
        self.write_property(name, Value::Number(value))
    }

    fn set_boolean_property(&mut self, name: &str, value: bool) -> RenderResult {
        self.crash_if_scripted("set_boolean_property");
        self.calls.push(RendererCall::SetProperty {
            name: name.to_string(),
            value: Value::Bool(value),
        });
        self.write_property(name, Value::Bool(value))
    }

    fn set_color_property(&mut self, name: &str, argb: u32) -> RenderResult {
        self.crash_if_scripted("set_color_property");
        self.calls.push(RendererCall::SetProperty {
            name: name.to_string(),
            value: Value::Color(argb),
        });
        self.write_property(name, Value::Color(argb))
    }

    fn set_enum_property(&mut self, name: &str, index: u32) -> RenderResult {
        self.crash_if_scripted("set_enum_property");
        self.calls.push(RendererCall::SetProperty {
            name: name.to_string(),
            value: Value::Enum(index),
        });
        self.write_property(name, Value::Enum(index))
    }

    fn fire_view_model_trigger(&mut self, name: &str) -> RenderResult {
        self.crash_if_scripted("fire_view_model_trigger");
        self.calls
            .push(RendererCall::FireViewModelTrigger(name.to_string()));
        self.write_property(name, Value::Trigger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{StateMachineSpec, ViewModelSpec};

    fn sample() -> ScriptedRenderer {
        ScriptedRenderer::new().with_content(
            "a.riv",
            ContentSpec::new()
                .with_state_machine(StateMachineSpec::new("Idle").input("on", Value::Bool(false)))
                .with_view_model(ViewModelSpec::new("Vm").property("n", Value::Number(0.0))),
        )
    }

    #[test]
    fn loads_known_content_only() {
        let mut r = sample();
        assert!(r.load_from_package("a.riv").is_ok());
        assert!(r.has_content());
        assert!(r.load_from_package("b.riv").is_err());
        assert!(!r.has_content());
        assert_eq!(r.load_calls(), 2);
    }

    #[test]
    fn input_writes_hit_active_machine() {
        let mut r = sample();
        r.load_from_package("a.riv").unwrap();
        r.set_active_state_machine(0).unwrap();
        r.set_boolean_input("on", true).unwrap();
        assert_eq!(r.input_value("on"), Some(Value::Bool(true)));
        assert!(r.set_number_input("on", 1.0).is_err());
    }

    #[test]
    fn property_writes_need_a_bound_instance() {
        let mut r = sample();
        r.load_from_package("a.riv").unwrap();
        let inst = r.create_view_model_instance("Vm").unwrap();
        assert!(r.set_number_property("n", 2.0).is_err());
        r.bind_view_model_instance(inst.id).unwrap();
        r.set_number_property("n", 2.0).unwrap();
        assert_eq!(r.bound_property("n"), Some(Value::Number(2.0)));
    }

    #[test]
    fn fixtures_library_knows_catalog_paths() {
        let mut r = ScriptedRenderer::from_fixtures().unwrap();
        r.load_from_package("Assets/RiveAssets/vector_feathering__avatar.riv")
            .unwrap();
        let sms = r.state_machines().unwrap();
        assert_eq!(sms.len(), 2);
        assert_eq!(r.default_state_machine().unwrap().name, "Active");
    }

    #[test]
    fn scripted_failures_fire_on_their_call_only() {
        let mut r = sample()
            .with_content(
                "b.riv",
                ContentSpec::new()
                    .with_state_machine(StateMachineSpec::new("A"))
                    .with_state_machine(StateMachineSpec::new("B")),
            )
            .fail_inputs_of(1, "inputs unavailable")
            .reject_property("n");
        r.load_from_package("b.riv").unwrap();
        r.set_active_state_machine(0).unwrap();
        assert!(r.state_machine_inputs().is_ok());
        r.set_active_state_machine(1).unwrap();
        assert!(r.state_machine_inputs().is_err());

        r.load_from_package("a.riv").unwrap();
        let inst = r.create_view_model_instance("Vm").unwrap();
        r.bind_view_model_instance(inst.id).unwrap();
        assert!(r.set_number_property("n", 1.0).is_err());
    }

    #[test]
    #[should_panic(expected = "crashed in pause_state_machine")]
    fn panic_on_names_the_call() {
        let mut r = sample().panic_on("pause_state_machine");
        r.play_state_machine();
        r.pause_state_machine();
    }
}
