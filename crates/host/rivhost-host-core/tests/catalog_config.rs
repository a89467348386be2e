mod common;

use std::fs;
use std::path::PathBuf;

use common::{host_with, AVATAR, MEETING};
use rivhost_host::{
    load_catalog_config, load_catalog_file, load_catalog_layers, CatalogConfig, CatalogEntry,
    CatalogItem, ConfigError, ConfigOrigin, ExternalSelection, FileSource, FileSourceCatalog,
    HostController, HostError, HostSettings, PickError, PickedFile, SourceKind,
};
use rivhost_test_fixtures::{catalogs, RendererCall, ScriptedRenderer};

fn scratch_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("rivhost-{}-{name}", std::process::id()))
}

fn catalog_from(name: &str) -> (FileSourceCatalog, rivhost_host::ConfigLoad) {
    let loaded = load_catalog_config(&catalogs::json(name).unwrap(), &HostSettings::default());
    let catalog = FileSourceCatalog::from_config(&loaded.config, &HostSettings::default());
    (catalog, loaded)
}

#[test]
fn default_flag_picks_the_default_source() {
    let mut catalog = FileSourceCatalog::new(&HostSettings::default());
    catalog.add_entry(CatalogItem::new(FileSource::bundled("a.riv")).default_flag());
    catalog.add_entry(CatalogItem::new(FileSource::bundled("b.riv")));
    assert_eq!(catalog.get_default().unwrap().path(), "a.riv");

    // No flag falls back to the first entry.
    let mut plain = FileSourceCatalog::new(&HostSettings::default());
    plain.add_entry(CatalogItem::new(FileSource::bundled("x.riv")));
    plain.add_entry(CatalogItem::new(FileSource::bundled("y.riv")));
    assert_eq!(plain.get_default().unwrap().path(), "x.riv");

    assert!(FileSourceCatalog::new(&HostSettings::default())
        .get_default()
        .is_none());
}

#[test]
fn fixture_catalog_lists_enabled_entries_in_order() {
    let (catalog, loaded) = catalog_from("default");
    assert_eq!(loaded.origin, ConfigOrigin::Document);
    assert!(loaded.report.is_valid());

    let names: Vec<_> = catalog
        .list_available()
        .iter()
        .map(|s| s.display_name().to_string())
        .collect();
    assert_eq!(names, vec!["Vector Feathering Avatar", "Meeting UI", "Static Logo"]);
    assert_eq!(catalog.len(), 4);
    // "package" is an accepted spelling of bundled.
    assert_eq!(catalog.find(MEETING).unwrap().kind(), SourceKind::Bundled);
    assert_eq!(catalog.get_default().unwrap().path(), AVATAR);
}

#[test]
fn multiple_defaults_warn_and_first_wins() {
    let (catalog, loaded) = catalog_from("multi-default");
    assert_eq!(loaded.origin, ConfigOrigin::Document);
    assert_eq!(
        loaded.report.warnings,
        vec!["Multiple default files found (2). Only the first will be used.".to_string()]
    );
    assert_eq!(catalog.get_default().unwrap().path(), "b.riv");
    assert_eq!(loaded.config.default_file().unwrap().display_name, "B");
}

#[test]
fn empty_catalog_is_a_warning_not_an_error() {
    let (catalog, loaded) = catalog_from("empty");
    assert_eq!(loaded.origin, ConfigOrigin::Document);
    assert!(!loaded.report.has_errors());
    assert_eq!(loaded.report.warnings, vec!["No files configured".to_string()]);
    assert!(catalog.is_empty());
    assert!(catalog.get_default().is_none());
}

#[test]
fn unusable_documents_fall_back_to_builtin_catalog() {
    for name in ["malformed", "invalid-entry"] {
        let (catalog, loaded) = catalog_from(name);
        assert_eq!(loaded.origin, ConfigOrigin::Fallback, "{name}");
        assert!(loaded.report.has_errors(), "{name}");
        assert_eq!(catalog.get_default().unwrap().path(), "datatest.riv");
        assert_eq!(
            catalog.get_default().unwrap().display_name(),
            "Data Test (Fallback)"
        );
    }

    let (_, loaded) = catalog_from("invalid-entry");
    assert_eq!(
        loaded.report.errors,
        vec!["file 0: filePath is required".to_string()]
    );
}

#[test]
fn catalog_files_load_from_disk() {
    let settings = HostSettings::default();
    let loaded = load_catalog_file(&catalogs::path("default").unwrap(), &settings);
    assert_eq!(loaded.origin, ConfigOrigin::Document);
    assert_eq!(loaded.config.available_files.len(), 4);

    let missing = load_catalog_file(&scratch_path("does-not-exist.json"), &settings);
    assert_eq!(missing.origin, ConfigOrigin::Fallback);
    assert!(missing.report.errors[0].starts_with("cannot read"));
}

fn user_catalog() -> CatalogConfig {
    let mut entry = CatalogEntry::new("Mine", "mine.riv", SourceKind::Bundled);
    entry.is_default = true;
    CatalogConfig {
        version: "1.0".into(),
        description: "User catalog".into(),
        available_files: vec![entry],
    }
}

#[test]
fn valid_user_catalog_takes_precedence() {
    let settings = HostSettings::default();
    let user = scratch_path("user-valid.json");
    user_catalog().save(&user).unwrap();
    let loaded = load_catalog_layers(
        Some(&user),
        &catalogs::path("default").unwrap(),
        &settings,
    );
    fs::remove_file(&user).ok();

    assert_eq!(loaded.origin, ConfigOrigin::User);
    assert_eq!(loaded.config, user_catalog());
    let catalog = FileSourceCatalog::from_config(&loaded.config, &settings);
    assert_eq!(catalog.get_default().unwrap().path(), "mine.riv");
}

#[test]
fn missing_or_unusable_user_catalog_uses_the_default() {
    let settings = HostSettings::default();
    let default = catalogs::path("default").unwrap();

    let missing = load_catalog_layers(Some(&scratch_path("user-missing.json")), &default, &settings);
    assert_eq!(missing.origin, ConfigOrigin::Document);
    assert_eq!(missing.config.available_files.len(), 4);

    let none = load_catalog_layers(None, &default, &settings);
    assert_eq!(none.origin, ConfigOrigin::Document);

    let broken = scratch_path("user-broken.json");
    fs::write(&broken, "{ \"availableFiles\": [").unwrap();
    let skipped = load_catalog_layers(Some(&broken), &default, &settings);
    assert_eq!(skipped.origin, ConfigOrigin::Document);
    assert!(skipped.report.is_valid());

    let nothing = load_catalog_layers(Some(&broken), &scratch_path("no-default.json"), &settings);
    fs::remove_file(&broken).ok();
    assert_eq!(nothing.origin, ConfigOrigin::Fallback);
    assert_eq!(nothing.config.default_file().unwrap().file_path, "datatest.riv");
}

#[test]
fn saved_catalog_reloads_unchanged() {
    let config: CatalogConfig = catalogs::load("default").unwrap();
    let path = scratch_path("saved.json");
    config.save(&path).unwrap();
    let reloaded = load_catalog_file(&path, &HostSettings::default());
    fs::remove_file(&path).ok();
    assert_eq!(reloaded.origin, ConfigOrigin::Document);
    assert_eq!(reloaded.config, config);
}

#[test]
fn invalid_catalog_is_not_saved() {
    let config = CatalogConfig {
        version: String::new(),
        description: String::new(),
        available_files: vec![CatalogEntry::new("", "x.riv", SourceKind::Bundled)],
    };
    let path = scratch_path("invalid.json");
    let err = config.save(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(ref summary) if summary.contains("version is required")));
    assert!(!path.exists());
}

#[test]
fn external_picks_are_validated_and_deduplicated() {
    let mut catalog = FileSourceCatalog::new(&HostSettings::default());
    let pick = || ExternalSelection::Picked {
        path: PathBuf::from("/downloads/my_cool-animation.RIV"),
        size: 4096,
    };

    let first = catalog.resolve_external(pick()).unwrap();
    assert_eq!(first.kind(), SourceKind::External);
    assert_eq!(first.display_name(), "My Cool Animation");
    let second = catalog.resolve_external(pick()).unwrap();
    assert_eq!(first, second);
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog.items()[0].tags, vec!["external".to_string()]);
    assert_eq!(catalog.recent().len(), 1);

    assert!(matches!(
        catalog.resolve_external(ExternalSelection::Picked {
            path: PathBuf::from("notes.txt"),
            size: 4096,
        }),
        Err(PickError::InvalidExtension { .. })
    ));
    assert!(matches!(
        catalog.resolve_external(ExternalSelection::Picked {
            path: PathBuf::from("tiny.riv"),
            size: 3,
        }),
        Err(PickError::TooSmall { size: 3, .. })
    ));
    assert!(matches!(
        catalog.resolve_external(ExternalSelection::Picked {
            path: PathBuf::from("huge.riv"),
            size: u64::MAX,
        }),
        Err(PickError::TooLarge { .. })
    ));
    assert_eq!(
        catalog.resolve_external(ExternalSelection::Cancelled),
        Err(PickError::Cancelled)
    );
    assert_eq!(catalog.len(), 1);
}

#[test]
fn external_paths_are_checked_on_disk() {
    let mut catalog = FileSourceCatalog::new(&HostSettings::default());
    let good = scratch_path("real.riv");
    let small = scratch_path("stub.riv");
    fs::write(&good, [0u8; 64]).unwrap();
    fs::write(&small, b"riv").unwrap();

    let source = catalog.resolve_external_path(&good).unwrap();
    let small_err = catalog.resolve_external_path(&small).unwrap_err();
    let missing_err = catalog
        .resolve_external_path(&scratch_path("gone.riv"))
        .unwrap_err();
    fs::remove_file(&good).ok();
    fs::remove_file(&small).ok();

    assert_eq!(source.kind(), SourceKind::External);
    assert!(matches!(small_err, PickError::TooSmall { size: 3, .. }));
    assert!(matches!(missing_err, PickError::Io { .. }));
}

#[test]
fn controller_loads_catalog_default() {
    let config: CatalogConfig = catalogs::load("default").unwrap();
    let mut host = HostController::new(
        ScriptedRenderer::from_fixtures().unwrap(),
        HostSettings::default(),
    )
    .with_config(&config);
    host.attach_surface(rivhost_api::SurfaceDescriptor::new(1), 320, 240)
        .unwrap();
    host.load_default().unwrap();
    assert_eq!(host.session().source().unwrap().path(), AVATAR);
    assert_eq!(host.catalog().recent().most_recent().unwrap().path(), AVATAR);

    let mut empty = host_with(
        ScriptedRenderer::from_fixtures().unwrap(),
        HostSettings::default(),
    );
    assert_eq!(empty.load_default().unwrap_err(), HostError::NoSource);
    assert!(empty.error().is_some());
}

#[test]
fn external_selection_loads_through_path_api() {
    let mut host = host_with(
        ScriptedRenderer::from_fixtures().unwrap(),
        HostSettings::default(),
    );
    host.open_external(ExternalSelection::Picked {
        path: PathBuf::from(MEETING),
        size: 2048,
    })
    .unwrap();
    assert!(host
        .renderer()
        .calls()
        .contains(&RendererCall::LoadPath(PathBuf::from(MEETING))));
    assert_eq!(host.session().source().unwrap().kind(), SourceKind::External);
    assert_eq!(
        host.file_info_text(),
        host.session().source().unwrap().description()
    );

    let err = host.open_external(ExternalSelection::Cancelled).unwrap_err();
    assert_eq!(err, HostError::Pick(PickError::Cancelled));
    assert!(host.error().is_none());
    // The previous content is untouched by a cancelled pick.
    assert!(host.session().controls().input("volume").is_some());

    assert!(host
        .open_external(ExternalSelection::Unsupported("no picker".into()))
        .is_err());
    assert!(host.error().unwrap().contains("no picker"));
}

#[test]
fn multi_select_loads_the_first_accepted_file() {
    let mut host = host_with(
        ScriptedRenderer::from_fixtures().unwrap(),
        HostSettings::default(),
    );
    host.open_external(ExternalSelection::PickedMany(vec![
        PickedFile::new("/tmp/readme.md", 2048),
        PickedFile::new(MEETING, 2048),
        PickedFile::new(AVATAR, 2048),
    ]))
    .unwrap();

    assert_eq!(host.session().source().unwrap().path(), MEETING);
    assert!(host.error().is_none());
    assert!(host.catalog().find(AVATAR).is_some());
    assert!(host.catalog().find("/tmp/readme.md").is_none());
}
