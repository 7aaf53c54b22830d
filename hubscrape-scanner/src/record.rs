use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::Serialize;
use std::fmt;

/// One attribute value pulled out of a detail page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
    /// Tag ids grouped under one tag type, in page order.
    List(Vec<String>),
}

impl FieldValue {
    /// Converts a scalar JSON value. Arrays and objects have no scalar form.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => Some(FieldValue::Null),
            serde_json::Value::Bool(b) => Some(FieldValue::Bool(*b)),
            serde_json::Value::Number(n) => Some(FieldValue::Number(n.clone())),
            serde_json::Value::String(s) => Some(FieldValue::Text(s.clone())),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Renders the value as a table cell. Lists become JSON arrays.
    pub fn to_cell(&self, null_marker: &str) -> String {
        match self {
            FieldValue::Null => null_marker.to_string(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Text(s) => s.clone(),
            FieldValue::List(items) => {
                serde_json::to_string(items).unwrap_or_else(|_| items.join(","))
            }
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_cell("null"))
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(items: Vec<String>) -> Self {
        FieldValue::List(items)
    }
}

/// Attributes extracted from one model detail page.
///
/// Fields keep the order in which they were first seen on the page, so the
/// table built from a run has stable, page-driven column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ModelRecord {
    fields: IndexMap<String, FieldValue>,
}

impl ModelRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Sets `name`, replacing any earlier value in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Appends `item` to the list stored under `name`, creating the list on
    /// first use. Returns `false` when `name` already holds a scalar.
    pub fn push_to_list(&mut self, name: &str, item: impl Into<String>) -> bool {
        match self.fields.entry(name.to_string()) {
            Entry::Occupied(mut slot) => match slot.get_mut() {
                FieldValue::List(items) => {
                    items.push(item.into());
                    true
                }
                _ => false,
            },
            Entry::Vacant(slot) => {
                slot.insert(FieldValue::List(vec![item.into()]));
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}
