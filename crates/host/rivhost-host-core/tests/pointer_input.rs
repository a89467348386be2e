mod common;

use common::{fixture_host, loaded_host, AVATAR, MEETING};
use rivhost_api::SurfaceDescriptor;
use rivhost_host::{FileSource, HostController, HostSettings, PointerDisposition, PointerEvent};
use rivhost_test_fixtures::{RendererCall, ScriptedRenderer};

#[test]
fn capture_loss_releases_at_last_position() {
    let mut host = loaded_host(AVATAR);
    host.pointer_press(10.0, 10.0);
    host.pointer_move(50.0, 50.0);
    assert_eq!(host.capture_lost(), PointerDisposition::Forwarded);

    assert_eq!(
        host.renderer().pointer_calls(),
        vec![
            RendererCall::PointerPress { x: 10.0, y: 10.0 },
            RendererCall::PointerMove { x: 50.0, y: 50.0 },
            RendererCall::PointerRelease { x: 50.0, y: 50.0 },
        ]
    );
    assert!(!host.input().is_pressed());

    // A second loss has nothing to release.
    assert_eq!(host.capture_lost(), PointerDisposition::Dropped);
    assert_eq!(host.renderer().pointer_calls().len(), 3);
}

#[test]
fn capture_loss_without_press_is_dropped() {
    let mut host = loaded_host(AVATAR);
    host.pointer_move(5.0, 5.0);
    assert_eq!(host.capture_lost(), PointerDisposition::Dropped);
    assert_eq!(host.renderer().pointer_calls().len(), 1);
}

#[test]
fn events_are_forwarded_in_order_without_coalescing() {
    let mut host = loaded_host(AVATAR);
    for i in 0..5 {
        host.pointer_move(i as f32, 0.0);
    }
    host.pointer_move(4.0, 0.0);
    host.pointer_press(4.0, 0.0);
    host.pointer_release(4.0, 0.0);

    let calls = host.renderer().pointer_calls();
    assert_eq!(calls.len(), 8);
    for (i, call) in calls.iter().take(5).enumerate() {
        assert_eq!(*call, RendererCall::PointerMove { x: i as f32, y: 0.0 });
    }
    assert_eq!(calls[5], RendererCall::PointerMove { x: 4.0, y: 0.0 });
    assert_eq!(host.input().forwarded(), 8);
}

#[test]
fn pointer_events_without_content_are_dropped() {
    let mut host = fixture_host();
    assert_eq!(host.pointer_press(1.0, 1.0), PointerDisposition::Dropped);
    assert_eq!(host.pointer_move(2.0, 2.0), PointerDisposition::Dropped);
    assert!(host.renderer().pointer_calls().is_empty());
    assert_eq!(host.input().dropped(), 2);
    assert!(!host.input().is_pressed());

    // Before a surface is even attached.
    let mut bare = HostController::new(
        ScriptedRenderer::from_fixtures().unwrap(),
        HostSettings::default(),
    );
    assert_eq!(bare.pointer_move(1.0, 1.0), PointerDisposition::Dropped);
}

#[test]
fn pointer_events_during_load_are_dropped() {
    let mut host = loaded_host(AVATAR);
    host.pointer_press(3.0, 3.0);
    let ticket = host.select(FileSource::bundled(MEETING)).unwrap();

    assert_eq!(host.pointer_move(9.0, 9.0), PointerDisposition::Dropped);
    // The swap forgot the outstanding press.
    assert_eq!(host.capture_lost(), PointerDisposition::Dropped);
    host.resolve(ticket);

    assert_eq!(host.pointer_move(1.0, 2.0), PointerDisposition::Forwarded);
    assert_eq!(
        host.renderer().pointer_calls(),
        vec![
            RendererCall::PointerPress { x: 3.0, y: 3.0 },
            RendererCall::PointerMove { x: 1.0, y: 2.0 },
        ]
    );
}

#[test]
fn pointer_events_after_dispose_are_dropped() {
    let mut host = loaded_host(AVATAR);
    host.dispose();
    assert_eq!(host.pointer_press(1.0, 1.0), PointerDisposition::Dropped);
    assert!(host.renderer().pointer_calls().is_empty());
}

#[test]
fn physical_coordinates_are_scaled_into_renderer_space() {
    let mut host = HostController::new(
        ScriptedRenderer::from_fixtures().unwrap(),
        HostSettings::default(),
    );
    let surface = SurfaceDescriptor {
        scale_factor: 2.0,
        ..SurfaceDescriptor::new(3)
    };
    host.attach_surface(surface, 1600, 1200).unwrap();
    host.load(FileSource::bundled(AVATAR)).unwrap();

    host.physical_pointer_event(PointerEvent::Press { x: 100.0, y: 40.0 });
    host.physical_pointer_event(PointerEvent::CaptureLost);
    // Already in renderer space.
    host.pointer_event(PointerEvent::Move { x: 100.0, y: 40.0 });

    assert_eq!(
        host.renderer().pointer_calls(),
        vec![
            RendererCall::PointerPress { x: 50.0, y: 20.0 },
            RendererCall::PointerRelease { x: 50.0, y: 20.0 },
            RendererCall::PointerMove { x: 100.0, y: 40.0 },
        ]
    );
}
