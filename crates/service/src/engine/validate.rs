//! Wire payload checks shared by every resource.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::ServiceError;

pub const INVALID_IDS: &str = "Formato inválido. Se espera un array de IDs.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// Absent when missing, `null`, empty, `false` or `0`.
    Text,
    /// Absent only when missing or `null`; `0` counts as provided.
    Number,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldRule {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldRule {
    pub const fn text(name: &'static str) -> Self { Self { name, kind: FieldKind::Text } }

    pub const fn number(name: &'static str) -> Self { Self { name, kind: FieldKind::Number } }

    fn is_present(&self, value: Option<&Value>) -> bool {
        match (self.kind, value) {
            (_, None) | (_, Some(Value::Null)) => false,
            (FieldKind::Number, Some(_)) => true,
            (FieldKind::Text, Some(v)) => is_truthy(v),
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Names of the required fields `payload` does not provide, in rule order.
pub fn missing_fields(rules: &[FieldRule], payload: &Value) -> Vec<String> {
    let object = payload.as_object();
    rules
        .iter()
        .filter(|rule| !rule.is_present(object.and_then(|o| o.get(rule.name))))
        .map(|rule| rule.name.to_string())
        .collect()
}

pub fn require_fields(rules: &[FieldRule], payload: &Value, message: &str) -> Result<(), ServiceError> {
    let missing = missing_fields(rules, payload);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::missing_fields(message, missing))
    }
}

/// Decode an already presence-checked payload into its typed form.
///
/// Payload fields are `serde_json::Value`, so any value that passed the presence
/// check decodes; only a non-object body can still fail here.
pub fn decode_payload<T: DeserializeOwned>(payload: Value, message: &str) -> Result<T, ServiceError> {
    serde_json::from_value(payload).map_err(|e| ServiceError::invalid(format!("{message} ({e})")))
}

/// Extract the `ids` array of a bulk delete body.
///
/// Only string entries can ever equal a key, so other entries are dropped here.
pub fn parse_ids(payload: &Value) -> Result<Vec<String>, ServiceError> {
    let ids = payload
        .get("ids")
        .and_then(Value::as_array)
        .ok_or_else(|| ServiceError::invalid(INVALID_IDS))?;
    Ok(ids.iter().filter_map(Value::as_str).map(str::to_string).collect())
}
