use std::cell::RefCell;
use std::rc::Rc;

use rivhost_api::SurfaceDescriptor;
use rivhost_host::{load_catalog_config, FileSourceCatalog, HostController, HostEvent, HostSettings};
use rivhost_test_fixtures::{catalogs, ScriptedRenderer};
use serde_json::to_string_pretty;

fn main() -> anyhow::Result<()> {
    let settings = HostSettings::default();

    // Catalog from the bundled fixture document.
    let loaded = load_catalog_config(&catalogs::json("default")?, &settings);
    println!("catalog: {} ({:?})", loaded.report.summary(), loaded.origin);
    let catalog = FileSourceCatalog::from_config(&loaded.config, &settings);

    let mut host = HostController::new(ScriptedRenderer::from_fixtures()?, settings)
        .with_catalog(catalog);
    let events = Rc::new(RefCell::new(Vec::<HostEvent>::new()));
    let sink = events.clone();
    host.subscribe(move |e: &HostEvent| sink.borrow_mut().push(e.clone()));

    host.attach_surface(SurfaceDescriptor::new(1), 800, 600)?;
    host.load_default()?;
    println!("{} | {}", host.file_info_text(), host.dimensions_text());

    let controls = host.session().controls();
    if let Some(sm) = controls.active_state_machine() {
        println!("active state machine: {}", sm.name);
        for point in sm.inputs().iter() {
            println!("  {} [{}] = {}", point.name, point.kind, point.display_value());
        }
    }

    host.set_number_input("mood", 0.9)?;
    host.fire_input_trigger("wave")?;
    let instance = host.instantiate_selected_view_model()?;
    host.set_string_property("displayName", "Grace")?;
    println!("bound instance {:?}", instance.id);

    // Swap content; the old instance is now stale.
    let next = host
        .catalog()
        .list_available()
        .into_iter()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("catalog has a single entry"))?;
    host.load(next)?;
    if let Err(e) = host.bind_instance(instance) {
        println!("after swap: {e}");
    }

    host.dispose();
    println!("status: {}", to_string_pretty(&host.status())?);
    println!("{} events observed", events.borrow().len());
    Ok(())
}
