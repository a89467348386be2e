//! Value: runtime instances carried by control points.
//! Numbers use f32 to match the renderer's native input precision.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse kind of a control point. State-machine inputs only ever use
/// `Bool`, `Number` and `Trigger`; view-model properties may use all six.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    #[serde(alias = "boolean")]
    Bool,
    Number,
    #[serde(alias = "string")]
    Text,
    Color,
    Enum,
    Trigger,
}

impl ValueKind {
    /// Kinds a state-machine input may carry.
    #[inline]
    pub fn is_input_kind(self) -> bool {
        matches!(self, ValueKind::Bool | ValueKind::Number | ValueKind::Trigger)
    }

    /// Stable lowercase label, identical to the serde representation.
    pub fn label(self) -> &'static str {
        match self {
            ValueKind::Bool => "bool",
            ValueKind::Number => "number",
            ValueKind::Text => "text",
            ValueKind::Color => "color",
            ValueKind::Enum => "enum",
            ValueKind::Trigger => "trigger",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Value {
    /// Boolean switch
    Bool(bool),

    /// Scalar number
    Number(f32),

    /// Text / string
    Text(String),

    /// Packed color, `0xAARRGGBB`
    Color(u32),

    /// Enum variant index
    Enum(u32),

    /// Fire-only signal; carries no state
    Trigger,
}

impl Value {
    /// Return the coarse kind of this value.
    #[inline]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(_) => ValueKind::Number,
            Value::Text(_) => ValueKind::Text,
            Value::Color(_) => ValueKind::Color,
            Value::Enum(_) => ValueKind::Enum,
            Value::Trigger => ValueKind::Trigger,
        }
    }

    /// Zero value used when the renderer reports a control point without an
    /// initial value.
    pub fn default_for(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Bool => Value::Bool(false),
            ValueKind::Number => Value::Number(0.0),
            ValueKind::Text => Value::Text(String::new()),
            ValueKind::Color => Value::Color(0xFF00_0000),
            ValueKind::Enum => Value::Enum(0),
            ValueKind::Trigger => Value::Trigger,
        }
    }

    #[inline]
    pub fn is_trigger(&self) -> bool {
        matches!(self, Value::Trigger)
    }

    /// Human-readable rendering used for status lines and editor widgets.
    pub fn display(&self) -> String {
        match self {
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => format!("{n:.2}"),
            Value::Text(s) => s.clone(),
            Value::Color(c) => crate::coercion::format_color(*c),
            Value::Enum(i) => format!("#{i}"),
            Value::Trigger => "trigger".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(Value::Bool(true).kind(), ValueKind::Bool);
        assert_eq!(Value::Number(1.5).kind(), ValueKind::Number);
        assert_eq!(Value::Text("a".into()).kind(), ValueKind::Text);
        assert_eq!(Value::Color(0xFF00FF00).kind(), ValueKind::Color);
        assert_eq!(Value::Enum(2).kind(), ValueKind::Enum);
        assert_eq!(Value::Trigger.kind(), ValueKind::Trigger);
    }

    #[test]
    fn defaults_have_requested_kind() {
        for kind in [
            ValueKind::Bool,
            ValueKind::Number,
            ValueKind::Text,
            ValueKind::Color,
            ValueKind::Enum,
            ValueKind::Trigger,
        ] {
            assert_eq!(Value::default_for(kind).kind(), kind);
        }
    }

    #[test]
    fn input_kinds_exclude_view_model_only_kinds() {
        assert!(ValueKind::Bool.is_input_kind());
        assert!(ValueKind::Trigger.is_input_kind());
        assert!(!ValueKind::Text.is_input_kind());
        assert!(!ValueKind::Color.is_input_kind());
    }

    #[test]
    fn kind_accepts_legacy_aliases() {
        let k: ValueKind = serde_json::from_str("\"boolean\"").unwrap();
        assert_eq!(k, ValueKind::Bool);
        let k: ValueKind = serde_json::from_str("\"string\"").unwrap();
        assert_eq!(k, ValueKind::Text);
    }

    #[test]
    fn display_formats_each_kind() {
        assert_eq!(Value::Number(0.5).display(), "0.50");
        assert_eq!(Value::Color(0xFF112233).display(), "#FF112233");
        assert_eq!(Value::Enum(3).display(), "#3");
    }
}
