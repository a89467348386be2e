use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

mod content;
mod scripted;

pub use content::{ContentFixture, ContentSpec, InputSpec, PropertySpec, StateMachineSpec, ViewModelSpec};
pub use scripted::{RendererCall, ScriptedRenderer};

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    contents: HashMap<String, String>,
    catalogs: HashMap<String, String>,
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a, T>(map: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    map.get(name)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

/// Content descriptions: what a loaded `.riv` exposes to discovery.
pub mod contents {
    use super::*;

    pub fn keys() -> Vec<String> {
        let mut keys: Vec<String> = MANIFEST.contents.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn json(name: &str) -> Result<String> {
        let rel = lookup(&MANIFEST.contents, "content", name)?;
        read_to_string(rel)
    }

    pub fn load(name: &str) -> Result<ContentFixture> {
        let rel = lookup(&MANIFEST.contents, "content", name)?;
        super::load_json(rel)
    }

    /// Content path the fixture is registered under (what a catalog entry points at).
    pub fn content_path(name: &str) -> Result<String> {
        Ok(load(name)?.path)
    }

    /// Every content fixture, in key order.
    pub fn all() -> Result<Vec<ContentFixture>> {
        keys().iter().map(|k| load(k)).collect()
    }
}

/// Catalog configuration documents.
pub mod catalogs {
    use super::*;

    pub fn keys() -> Vec<String> {
        let mut keys: Vec<String> = MANIFEST.catalogs.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn json(name: &str) -> Result<String> {
        let rel = lookup(&MANIFEST.catalogs, "catalog", name)?;
        read_to_string(rel)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let rel = lookup(&MANIFEST.catalogs, "catalog", name)?;
        super::load_json(rel)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let rel = lookup(&MANIFEST.catalogs, "catalog", name)?;
        Ok(resolve_path(rel))
    }
}
