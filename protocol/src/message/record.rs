//! The ordered field container for one request or one response.
//!
//! A [`FieldRecord`] is created per API call, filled, signed or verified
//! exactly once, and then handed to the transport. It holds no long-lived
//! state and is never shared between calls.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use super::field::Field;
use crate::error::GatewayError;

/// Ordered mapping from [`Field`] to string value.
///
/// Insertion order is preserved because that is the order the form is
/// rendered in on the wire. Setting an existing field replaces its value in
/// place. A field that was never set reads as the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldRecord {
    entries: Vec<(Field, String)>,
}

impl FieldRecord {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a record from `(name, value)` pairs, skipping names outside
    /// the gateway vocabulary. Later duplicates overwrite earlier ones.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut record = Self::new();
        for (name, value) in pairs {
            match name.as_ref().parse::<Field>() {
                Ok(field) => record.set(field, value),
                Err(unknown) => tracing::trace!(%unknown, "ignoring field"),
            }
        }
        record
    }

    /// Builds a record from a JSON object such as a decoded POST callback.
    ///
    /// String values are taken verbatim; numbers and booleans are rendered
    /// with their JSON text (`{"ACTION": 0}` reads as `"0"`); `null` is
    /// treated as absent. Unknown keys are ignored.
    ///
    /// # Errors
    ///
    /// [`GatewayError::MalformedResponse`] if `value` is not an object or a
    /// known field holds an array/object.
    pub fn from_json(value: &Value) -> Result<Self, GatewayError> {
        let object = value
            .as_object()
            .ok_or_else(|| GatewayError::MalformedResponse("expected a JSON object".into()))?;

        let mut record = Self::new();
        for (name, raw) in object {
            let Some(field) = Field::from_name(name) else {
                continue;
            };
            let text = match raw {
                Value::Null => continue,
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(GatewayError::MalformedResponse(format!(
                        "field {} is not a scalar",
                        field
                    )))
                }
            };
            record.set(field, text);
        }
        Ok(record)
    }

    /// Sets a field, replacing any previous value without moving it.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(f, _)| *f == field) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((field, value)),
        }
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// Returns the value if the field was set (possibly to the empty string).
    pub fn get(&self, field: Field) -> Option<&str> {
        self.entries
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the value, or `""` when the field was never set.
    pub fn value(&self, field: Field) -> &str {
        self.get(field).unwrap_or("")
    }

    /// Returns `true` if the field is set to a non-empty value.
    pub fn has(&self, field: Field) -> bool {
        !self.value(field).is_empty()
    }

    /// Removes a field, returning its previous value.
    pub fn remove(&mut self, field: Field) -> Option<String> {
        let index = self.entries.iter().position(|(f, _)| *f == field)?;
        Some(self.entries.remove(index).1)
    }

    /// Keeps the fields for which `keep` returns `true`, in their current order.
    pub fn retain(&mut self, mut keep: impl FnMut(Field) -> bool) {
        self.entries.retain(|(field, _)| keep(*field));
    }

    /// Keeps only the listed fields, re-ordered to match `order`.
    pub fn retain_ordered(&mut self, order: &[Field]) {
        let mut ordered = Vec::with_capacity(order.len());
        for field in order {
            if let Some(value) = self.remove(*field) {
                ordered.push((*field, value));
            }
        }
        self.entries = ordered;
    }

    /// Iterates over `(field, value)` in wire order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.entries.iter().map(|(f, v)| (*f, v.as_str()))
    }

    /// `(wire name, value)` pairs, ready for form encoding by a transport.
    pub fn to_form_pairs(&self) -> Vec<(&'static str, &str)> {
        self.iter().map(|(f, v)| (f.name(), v)).collect()
    }

    /// Number of fields set.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no field was set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Serializes as a JSON object keyed by wire name, in insertion order.
impl Serialize for FieldRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (field, value) in &self.entries {
            map.serialize_entry(field.name(), value)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_fields_read_as_empty() {
        let record = FieldRecord::new().with(Field::Order, "AB12");
        assert_eq!(record.value(Field::Order), "AB12");
        assert_eq!(record.value(Field::Rrn), "");
        assert_eq!(record.get(Field::Rrn), None);
        assert!(!record.has(Field::Rrn));
    }

    #[test]
    fn set_replaces_in_place() {
        let mut record = FieldRecord::new()
            .with(Field::Order, "1")
            .with(Field::Amount, "2");
        record.set(Field::Order, "3");
        let order: Vec<_> = record.iter().collect();
        assert_eq!(order, vec![(Field::Order, "3"), (Field::Amount, "2")]);
    }

    #[test]
    fn from_pairs_ignores_unknown_names() {
        let record = FieldRecord::from_pairs([
            ("ORDER", "AB12"),
            ("SESSION_ID", "zzz"),
            ("AMOUNT", "10.00"),
        ]);
        assert_eq!(record.len(), 2);
        assert_eq!(record.value(Field::Amount), "10.00");
    }

    #[test]
    fn empty_value_is_set_but_not_present() {
        let record = FieldRecord::from_pairs([("APPROVAL", "")]);
        assert_eq!(record.get(Field::Approval), Some(""));
        assert!(!record.has(Field::Approval));
    }

    #[test]
    fn from_json_renders_scalars() {
        let record = FieldRecord::from_json(&json!({
            "ACTION": 0,
            "RC": "00",
            "ECI": null,
            "unknown": [1, 2],
        }))
        .unwrap();
        assert_eq!(record.value(Field::Action), "0");
        assert_eq!(record.value(Field::Rc), "00");
        assert_eq!(record.get(Field::Eci), None);
    }

    #[test]
    fn from_json_rejects_non_objects_and_nested_values() {
        assert!(matches!(
            FieldRecord::from_json(&json!(["ORDER"])),
            Err(GatewayError::MalformedResponse(_))
        ));
        assert!(matches!(
            FieldRecord::from_json(&json!({"ORDER": {"x": 1}})),
            Err(GatewayError::MalformedResponse(_))
        ));
    }

    #[test]
    fn retain_ordered_drops_and_reorders() {
        let mut record = FieldRecord::new()
            .with(Field::Nonce, "n")
            .with(Field::Email, "e")
            .with(Field::Order, "o");
        record.retain_ordered(&[Field::Order, Field::Nonce]);
        let names: Vec<_> = record.iter().map(|(f, _)| f).collect();
        assert_eq!(names, vec![Field::Order, Field::Nonce]);
    }

    #[test]
    fn serializes_in_insertion_order() {
        let record = FieldRecord::new()
            .with(Field::TrType, "0")
            .with(Field::Amount, "10.00");
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"TRTYPE":"0","AMOUNT":"10.00"}"#);
    }
}
