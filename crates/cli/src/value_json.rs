//! JSON <-> `Value` conversion and `Dual` parsing, for the CLI surface only.

use granary_core::{Error, Result, Value};
use granary_storage::Dual;

pub fn parse(input: &str) -> Result<Value> {
    let json: serde_json::Value = serde_json::from_str(input)
        .map_err(|e| Error::InvalidConfig(format!("invalid JSON value: {e}")))?;
    Ok(from_json(json))
}

pub fn stringify(value: &Value) -> String {
    serde_json::to_string(&to_json(value)).unwrap_or_else(|_| "null".to_string())
}

/// An argument that parses as an integer is an offset; anything else is a
/// comma-tag expression.
pub fn parse_dual(input: &str) -> Dual {
    match input.parse::<i64>() {
        Ok(n) => Dual::Offset(n),
        Err(_) => Dual::Tags(input.to_string()),
    }
}

fn from_json(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else {
                Value::Float(n.as_f64().unwrap_or(0.0))
            }
        }
        serde_json::Value::String(s) => Value::Str(s),
        serde_json::Value::Array(items) => Value::Seq(items.into_iter().map(from_json).collect()),
        serde_json::Value::Object(map) => {
            Value::Map(map.into_iter().map(|(k, v)| (Value::Str(k), from_json(v))).collect())
        }
    }
}

fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(i) => serde_json::Value::Number((*i).into()),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Str(s) => serde_json::Value::String(s.clone()),
        Value::Bytes(b) => serde_json::Value::String(format!("<{} bytes>", b.len())),
        Value::Seq(items) => serde_json::Value::Array(items.iter().map(to_json).collect()),
        Value::Set(items) => serde_json::Value::Array(items.iter().map(to_json).collect()),
        Value::Map(entries) => {
            let mut obj = serde_json::Map::new();
            for (k, v) in entries {
                obj.insert(format!("{k}"), to_json(v));
            }
            serde_json::Value::Object(obj)
        }
    }
}
