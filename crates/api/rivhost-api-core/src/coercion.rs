//! Coercion helpers between UI text edits and typed Values.
//! Editors hand us strings; control points need a Value of their discovered kind.

use thiserror::Error;

use crate::{Value, ValueKind};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoerceError {
    #[error("'{text}' is not a valid {kind} value")]
    Invalid { kind: ValueKind, text: String },
    #[error("trigger inputs cannot be set from text")]
    Trigger,
}

/// Format a packed `0xAARRGGBB` color as `#AARRGGBB`.
pub fn format_color(argb: u32) -> String {
    format!("#{argb:08X}")
}

/// Parse `#RRGGBB` (opaque) or `#AARRGGBB`. The leading `#` is optional.
pub fn parse_color(text: &str) -> Option<u32> {
    let hex = text.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        6 => u32::from_str_radix(hex, 16).ok().map(|rgb| 0xFF00_0000 | rgb),
        8 => u32::from_str_radix(hex, 16).ok(),
        _ => None,
    }
}

/// Parse the loose boolean spellings editors produce.
pub fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Some(true),
        "false" | "0" | "off" | "no" => Some(false),
        _ => None,
    }
}

/// Convert editor text into a Value of `kind`.
pub fn coerce_text(kind: ValueKind, text: &str) -> Result<Value, CoerceError> {
    let invalid = || CoerceError::Invalid {
        kind,
        text: text.to_string(),
    };
    match kind {
        ValueKind::Bool => parse_bool(text).map(Value::Bool).ok_or_else(invalid),
        ValueKind::Number => {
            let n: f32 = text.trim().parse().map_err(|_| invalid())?;
            if n.is_finite() {
                Ok(Value::Number(n))
            } else {
                Err(invalid())
            }
        }
        ValueKind::Text => Ok(Value::Text(text.to_string())),
        ValueKind::Color => parse_color(text).map(Value::Color).ok_or_else(invalid),
        ValueKind::Enum => text
            .trim()
            .trim_start_matches('#')
            .parse::<u32>()
            .map(Value::Enum)
            .map_err(|_| invalid()),
        ValueKind::Trigger => Err(CoerceError::Trigger),
    }
}
