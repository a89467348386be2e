mod common;

use common::{fixture_host, loaded_host, record, AVATAR, LOGO, MEETING};
use rivhost_host::{
    BindingState, DiagnosticsCfg, FileSource, HostController, HostError, HostEvent, HostSettings,
    HostState, Lifecycle, STATUS_READY,
};
use rivhost_test_fixtures::{RendererCall, ScriptedRenderer};

#[test]
fn fresh_host_reports_ready_text() {
    let host = fixture_host();
    assert_eq!(host.state(), HostState::Idle);
    assert_eq!(host.status_text(), STATUS_READY);
    assert_eq!(host.file_info_text(), "No file loaded");
    assert_eq!(host.dimensions_text(), "800 × 600");
    assert_eq!(host.session().lifecycle(), Lifecycle::Initialized);
    let status = host.status();
    assert!(!status.busy);
    assert!(!status.controls_enabled);
    assert!(status.error.is_none());
}

#[test]
fn loaded_host_describes_its_content() {
    let host = loaded_host(MEETING);
    assert_eq!(host.file_info_text(), "Meeting Ui (Bundled Asset)");
    assert_eq!(host.status_text(), "Loaded Meeting Ui");
    assert!(host.status().controls_enabled);
    assert_eq!(host.session().lifecycle(), Lifecycle::ContentLoaded);
}

#[test]
fn playback_commands_update_status() {
    let mut host = loaded_host(AVATAR);
    host.pause().unwrap();
    assert_eq!(host.status_text(), "Paused");
    assert!(!host.renderer().is_playing());

    host.play().unwrap();
    assert_eq!(host.status_text(), "Playing");
    assert!(host.renderer().is_playing());
    assert!(host.renderer().is_looping());

    host.stop().unwrap();
    assert_eq!(host.status_text(), "Stopped");
    assert!(!host.renderer().is_looping());
    assert!(host.renderer().calls().contains(&RendererCall::Reset));
}

#[test]
fn playback_without_content_is_a_no_op() {
    let mut host = fixture_host();
    host.play().unwrap();
    host.pause().unwrap();
    host.stop().unwrap();
    assert_eq!(host.status_text(), STATUS_READY);
    assert_eq!(
        host.renderer().count(|c| matches!(
            c,
            RendererCall::Play | RendererCall::Pause | RendererCall::Reset | RendererCall::StartLoop
        )),
        0
    );
}

#[test]
fn resize_reaches_renderer_and_dimensions() {
    let mut host = loaded_host(AVATAR);
    host.resize(1024, 768).unwrap();
    assert_eq!(host.renderer().size(), (1024, 768));
    assert_eq!(host.dimensions_text(), "1024 × 768");
}

#[test]
fn dispose_is_terminal_and_idempotent() {
    let mut host = loaded_host(AVATAR);
    let events = record(&mut host);
    host.dispose();
    host.dispose();

    assert_eq!(host.state(), HostState::Disposed);
    assert!(host.session().is_empty());
    assert!(host.renderer().is_disposed());
    assert!(!host.renderer().is_looping());
    assert_eq!(host.renderer().count(|c| *c == RendererCall::Dispose), 1);
    assert_eq!(
        events
            .borrow()
            .iter()
            .filter(|e| **e == HostEvent::Disposed)
            .count(),
        1
    );

    assert!(matches!(
        host.load(FileSource::bundled(AVATAR)),
        Err(HostError::InvalidState(_))
    ));
    assert!(host.resize(10, 10).is_err());
    assert!(host.play().is_err());
}

#[test]
fn dropping_the_controller_disposes_the_renderer() {
    let mut host = loaded_host(LOGO);
    host.dispose();
    // Drop after an explicit dispose must not double-dispose.
    drop(host);

    let host = loaded_host(LOGO);
    drop(host);
}

#[test]
fn selected_view_model_can_be_instantiated_in_one_step() {
    let mut host = loaded_host(AVATAR);
    let instance = host.instantiate_selected_view_model().unwrap();
    let current = host.session().instance().unwrap();
    assert_eq!(current.handle(), instance);
    assert_eq!(current.binding(), BindingState::Bound);
    assert_eq!(current.view_model(), "Avatar");

    let mut empty = loaded_host(LOGO);
    assert!(empty.instantiate_selected_view_model().is_err());
}

#[test]
fn observers_can_unsubscribe() {
    let mut host = fixture_host();
    let events = std::rc::Rc::new(std::cell::RefCell::new(0usize));
    let counter = events.clone();
    let id = host.subscribe(move |_: &HostEvent| *counter.borrow_mut() += 1);
    host.load(FileSource::bundled(LOGO)).unwrap();
    let seen = *events.borrow();
    assert!(seen > 0);

    assert!(host.unsubscribe(id));
    assert!(!host.unsubscribe(id));
    host.load(FileSource::bundled(AVATAR)).unwrap();
    assert_eq!(*events.borrow(), seen);
}

#[test]
fn recent_events_keep_a_bounded_history() {
    let mut host = HostController::new(
        ScriptedRenderer::from_fixtures().unwrap(),
        HostSettings::default(),
    )
    .with_diagnostics(DiagnosticsCfg {
        log_events: false,
        history: 3,
    });
    host.attach_surface(rivhost_api::SurfaceDescriptor::new(1), 10, 10)
        .unwrap();
    host.load(FileSource::bundled(AVATAR)).unwrap();

    let recent = host.recent_events();
    assert_eq!(recent.len(), 3);
    assert_eq!(
        recent.last(),
        Some(&HostEvent::StatusChanged {
            text: "Loaded Vector Feathering Avatar".into()
        })
    );

    let quiet = HostController::new(
        ScriptedRenderer::from_fixtures().unwrap(),
        HostSettings::default(),
    )
    .with_diagnostics(DiagnosticsCfg {
        log_events: false,
        history: 0,
    });
    assert!(quiet.recent_events().is_empty());
}

#[test]
fn settings_parse_with_defaults() {
    let settings = HostSettings::from_json(r#"{ "auto_play": false, "recent_limit": 2 }"#).unwrap();
    assert!(!settings.auto_play);
    assert_eq!(settings.recent_limit, 2);
    assert_eq!(settings.content_extension, ".riv");

    let mut host = common::host_with(ScriptedRenderer::from_fixtures().unwrap(), settings);
    for path in [AVATAR, MEETING, LOGO] {
        host.load(FileSource::bundled(path)).unwrap();
    }
    let recent: Vec<_> = host
        .catalog()
        .recent()
        .iter()
        .map(|s| s.path().to_string())
        .collect();
    assert_eq!(recent, vec![LOGO.to_string(), MEETING.to_string()]);
}
