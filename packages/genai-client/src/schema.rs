//! Gemini response schemas generated from Rust types.
//!
//! Gemini's `responseSchema` accepts an OpenAPI 3.0 subset: upper-case type
//! names, `nullable` instead of `["T", "null"]`, no `$ref`, no
//! `additionalProperties`. `schemars` output is rewritten to fit.
//!
//! ```rust,ignore
//! #[derive(Deserialize, JsonSchema)]
//! struct Article {
//!     title: String,
//!     sections: Vec<Section>,
//! }
//!
//! let schema = Article::gemini_schema();
//! ```

use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Keys the Gemini schema dialect rejects.
const UNSUPPORTED_KEYS: &[&str] = &[
    "$schema",
    "definitions",
    "title",
    "additionalProperties",
    "default",
    "examples",
];

/// Types usable as a Gemini `responseSchema`.
///
/// Automatically implemented for any type that implements `JsonSchema + DeserializeOwned`.
pub trait ResponseSchema: JsonSchema + DeserializeOwned {
    fn gemini_schema() -> Value {
        let schema = schema_for!(Self);
        let mut value = serde_json::to_value(schema).unwrap_or_default();

        let definitions = value.get("definitions").cloned();
        if let Some(defs) = definitions {
            inline_refs(&mut value, &defs);
        }

        to_gemini_dialect(&mut value);
        value
    }
}

impl<T: JsonSchema + DeserializeOwned> ResponseSchema for T {}

fn inline_refs(value: &mut Value, definitions: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(ref_path)) = map.get("$ref").cloned() {
                let type_name = ref_path.trim_start_matches("#/definitions/");
                if let Some(def) = definitions.get(type_name) {
                    *value = def.clone();
                    inline_refs(value, definitions);
                    return;
                }
            }
            for (_, v) in map.iter_mut() {
                inline_refs(v, definitions);
            }
        }
        Value::Array(arr) => {
            for item in arr.iter_mut() {
                inline_refs(item, definitions);
            }
        }
        _ => {}
    }
}

/// Rewrite one schema node. Only schema positions are recursed into, so
/// property names like `title` or `type` survive.
fn to_gemini_dialect(value: &mut Value) {
    let Value::Object(map) = value else {
        return;
    };

    collapse_nullable_any_of(map);

    for key in UNSUPPORTED_KEYS {
        map.remove(*key);
    }

    match map.get("type").cloned() {
        Some(Value::String(ty)) => {
            map.insert("type".into(), Value::String(ty.to_uppercase()));
        }
        Some(Value::Array(types)) => {
            let nullable = types.iter().any(|t| t == "null");
            if let Some(Value::String(ty)) = types.iter().find(|t| *t != "null") {
                map.insert("type".into(), Value::String(ty.to_uppercase()));
            }
            if nullable {
                map.insert("nullable".into(), Value::Bool(true));
            }
        }
        _ => {}
    }

    if let Some(Value::Object(properties)) = map.get_mut("properties") {
        for (_, property) in properties.iter_mut() {
            to_gemini_dialect(property);
        }
    }
    if let Some(items) = map.get_mut("items") {
        match items {
            Value::Array(arr) => arr.iter_mut().for_each(to_gemini_dialect),
            other => to_gemini_dialect(other),
        }
    }
    for key in ["anyOf", "oneOf", "allOf"] {
        if let Some(Value::Array(variants)) = map.get_mut(key) {
            variants.iter_mut().for_each(to_gemini_dialect);
        }
    }
}

/// `Option<Struct>` renders as `anyOf: [{..}, {"type": "null"}]`; Gemini wants
/// the struct schema with `nullable: true`.
fn collapse_nullable_any_of(map: &mut Map<String, Value>) {
    let Some(Value::Array(variants)) = map.get("anyOf") else {
        return;
    };
    if variants.len() != 2 {
        return;
    }
    let is_null = |v: &Value| v.get("type").and_then(Value::as_str) == Some("null");
    let Some(inner) = variants.iter().find(|v| !is_null(v)).cloned() else {
        return;
    };
    if !variants.iter().any(is_null) {
        return;
    }

    map.remove("anyOf");
    if let Value::Object(inner) = inner {
        for (k, v) in inner {
            map.entry(k).or_insert(v);
        }
    }
    map.insert("nullable".into(), Value::Bool(true));
}
