#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use rivhost_api::SurfaceDescriptor;
use rivhost_host::{FileSource, HostController, HostEvent, HostSettings};
use rivhost_test_fixtures::ScriptedRenderer;

pub const AVATAR: &str = "Assets/RiveAssets/vector_feathering__avatar.riv";
pub const MEETING: &str = "Assets/RiveAssets/meeting_ui.riv";
pub const LOGO: &str = "Assets/RiveAssets/static_logo.riv";
pub const DATATEST: &str = "datatest.riv";

pub type Host = HostController<ScriptedRenderer>;

/// Controller with an attached 800x600 surface.
pub fn host_with(renderer: ScriptedRenderer, settings: HostSettings) -> Host {
    let mut host = HostController::new(renderer, settings);
    host.attach_surface(SurfaceDescriptor::new(7), 800, 600)
        .expect("scripted renderer initializes");
    host
}

pub fn fixture_host() -> Host {
    host_with(
        ScriptedRenderer::from_fixtures().expect("fixtures load"),
        HostSettings::default(),
    )
}

/// Fixture host with `path` already loaded.
pub fn loaded_host(path: &str) -> Host {
    let mut host = fixture_host();
    host.load(FileSource::bundled(path)).expect("fixture content loads");
    host
}

pub fn record(host: &mut Host) -> Rc<RefCell<Vec<HostEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    host.subscribe(move |e: &HostEvent| sink.borrow_mut().push(e.clone()));
    events
}
