use serde::de::Error as _;
use serde_json::{json, Value as JsonValue};

use crate::coercion::{format_color, parse_color};
use crate::Value;

/// Normalize shorthand `Value` JSON into the canonical `{ "type": ..., "data": ... }`
/// representation understood by the serde derives on [`Value`]. Accepted forms:
///
/// - primitives: `true`, `0.5`, `"label"` (bool / number / text)
/// - tagged shorthands: `{ "number": 1 }`, `{ "bool": true }`, `{ "text": "a" }`,
///   `{ "color": "#FF00FF00" }` or `{ "color": 4278255360 }`, `{ "enum": 2 }`,
///   `{ "trigger": null }` and the bare string `"trigger"` inside `{ "type": ... }`
/// - canonical objects pass through untouched
pub fn normalize_value_json(value: JsonValue) -> JsonValue {
    match value {
        JsonValue::Number(n) => json!({ "type": "number", "data": n }),
        JsonValue::Bool(b) => json!({ "type": "bool", "data": b }),
        JsonValue::String(s) => json!({ "type": "text", "data": s }),
        JsonValue::Object(obj) => {
            if obj.contains_key("type") {
                return JsonValue::Object(obj);
            }
            if let Some(n) = obj.get("number").and_then(|x| x.as_f64()) {
                return json!({ "type": "number", "data": n });
            }
            if let Some(b) = obj.get("bool").and_then(|x| x.as_bool()) {
                return json!({ "type": "bool", "data": b });
            }
            if let Some(s) = obj.get("text").and_then(|x| x.as_str()) {
                return json!({ "type": "text", "data": s });
            }
            if let Some(color) = obj.get("color") {
                if let Some(n) = color.as_u64() {
                    return json!({ "type": "color", "data": n });
                }
                if let Some(argb) = color.as_str().and_then(parse_color) {
                    return json!({ "type": "color", "data": argb });
                }
            }
            if let Some(i) = obj.get("enum").and_then(|x| x.as_u64()) {
                return json!({ "type": "enum", "data": i });
            }
            if obj.contains_key("trigger") {
                return json!({ "type": "trigger" });
            }
            JsonValue::Object(obj)
        }
        other => other,
    }
}

/// Normalize then deserialize into the strongly typed [`Value`] enum. This keeps
/// JSON shorthands consistent across call-sites (fixtures, config, tests).
pub fn parse_value(value: JsonValue) -> Result<Value, serde_json::Error> {
    if value.is_null() {
        return Err(serde_json::Error::custom("null is not a control value"));
    }
    let normalized = normalize_value_json(value);
    serde_json::from_value(normalized)
}

/// Compact shorthand form, the inverse of [`normalize_value_json`] for
/// primitives. Colors export as `#AARRGGBB` strings for readability.
pub fn value_to_shorthand_json(value: &Value) -> JsonValue {
    match value {
        Value::Bool(b) => json!(b),
        Value::Number(n) => json!(n),
        Value::Text(s) => json!(s),
        Value::Color(c) => json!({ "color": format_color(*c) }),
        Value::Enum(i) => json!({ "enum": i }),
        Value::Trigger => json!({ "trigger": null }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_normalize_to_canonical() {
        assert_eq!(parse_value(json!(true)).unwrap(), Value::Bool(true));
        assert_eq!(parse_value(json!(0.25)).unwrap(), Value::Number(0.25));
        assert_eq!(
            parse_value(json!("hi")).unwrap(),
            Value::Text("hi".to_string())
        );
    }

    #[test]
    fn tagged_shorthands() {
        assert_eq!(
            parse_value(json!({ "color": "#00FF00" })).unwrap(),
            Value::Color(0xFF00FF00)
        );
        assert_eq!(
            parse_value(json!({ "color": 16711680u32 })).unwrap(),
            Value::Color(0x00FF0000)
        );
        assert_eq!(parse_value(json!({ "enum": 1 })).unwrap(), Value::Enum(1));
        assert_eq!(
            parse_value(json!({ "trigger": null })).unwrap(),
            Value::Trigger
        );
    }

    #[test]
    fn canonical_passes_through() {
        let v = parse_value(json!({ "type": "number", "data": 3.0 })).unwrap();
        assert_eq!(v, Value::Number(3.0));
        let t = parse_value(json!({ "type": "trigger" })).unwrap();
        assert_eq!(t, Value::Trigger);
    }

    #[test]
    fn null_and_unknown_shapes_fail() {
        assert!(parse_value(JsonValue::Null).is_err());
        assert!(parse_value(json!({ "mystery": 1 })).is_err());
        assert!(parse_value(json!([1, 2])).is_err());
    }

    #[test]
    fn shorthand_export_reparses() {
        for v in [
            Value::Bool(false),
            Value::Number(1.5),
            Value::Text("x".into()),
            Value::Color(0x80FF0000),
            Value::Enum(4),
            Value::Trigger,
        ] {
            assert_eq!(parse_value(value_to_shorthand_json(&v)).unwrap(), v);
        }
    }
}
