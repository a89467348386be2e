use indexmap::IndexMap;
use log::debug;
use rivhost_api::{Value, ValueKind};
use serde::Serialize;

/// A named, typed, externally settable value on loaded content.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ControlPoint {
    pub name: String,
    /// Ordinal assigned at discovery.
    pub index: usize,
    pub kind: ValueKind,
    /// Last known value. Triggers never hold one.
    pub value: Option<Value>,
    /// Edited host-side and not yet forwarded.
    #[serde(skip)]
    pub(crate) dirty: bool,
    /// Value the renderer held before the first unforwarded edit.
    #[serde(skip)]
    committed: Option<Value>,
}

impl ControlPoint {
    pub fn new(name: impl Into<String>, index: usize, kind: ValueKind, value: Option<Value>) -> Self {
        let value = if kind == ValueKind::Trigger {
            None
        } else {
            value.filter(|v| v.kind() == kind)
        };
        Self {
            name: name.into(),
            index,
            kind,
            value,
            dirty: false,
            committed: None,
        }
    }

    /// Record an edit that has not reached the renderer yet.
    pub(crate) fn defer(&mut self, value: Value) {
        if !self.dirty {
            self.committed = self.value.take();
            self.dirty = true;
        }
        self.value = Some(value);
    }

    /// The pending edit reached the renderer.
    pub(crate) fn commit(&mut self) {
        self.committed = None;
        self.dirty = false;
    }

    /// The renderer refused the pending edit: show what it still holds.
    pub(crate) fn roll_back(&mut self) {
        self.value = self.committed.take();
        self.dirty = false;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Value shown in an editor: the mirrored value or the kind's default.
    pub fn display_value(&self) -> String {
        match &self.value {
            Some(v) => v.display(),
            None => Value::default_for(self.kind).display(),
        }
    }
}

/// Insertion-ordered control points keyed by case-sensitive name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ControlSet {
    points: IndexMap<String, ControlPoint>,
}

impl ControlSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `point`. Returns false, keeping the first, when the name is taken.
    pub fn insert(&mut self, point: ControlPoint) -> bool {
        if self.points.contains_key(&point.name) {
            debug!("duplicate control point '{}' ignored", point.name);
            return false;
        }
        self.points.insert(point.name.clone(), point);
        true
    }

    pub fn get(&self, name: &str) -> Option<&ControlPoint> {
        self.points.get(name)
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut ControlPoint> {
        self.points.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.points.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ControlPoint> {
        self.points.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut ControlPoint> {
        self.points.values_mut()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.points.keys().map(String::as_str)
    }
}

impl FromIterator<ControlPoint> for ControlSet {
    fn from_iter<I: IntoIterator<Item = ControlPoint>>(iter: I) -> Self {
        let mut set = ControlSet::new();
        for point in iter {
            set.insert(point);
        }
        set
    }
}
